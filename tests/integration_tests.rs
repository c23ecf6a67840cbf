use approx::assert_relative_eq;
use contagion_engine::analysis::contagion::ContagionReport;
use contagion_engine::core::network::FinancialNetwork;
use contagion_engine::simulation::random_network::{generate_random_network, NetworkConfig};
use contagion_engine::solver::clearing::ClearingSolver;
use nalgebra::{dmatrix, dvector, DMatrix, DVector};

/// Example 3.3 from Rogers & Veraart: both banks cover their obligations
/// from assets and receipts, so the clearing vector equals the nominal one.
#[test]
fn example_3_3_fully_solvent() {
    let network = FinancialNetwork::new(
        dmatrix![0.0, 2.0; 2.2, 0.0],
        dvector![1.0, 1.0],
        0.5,
        0.5,
    )
    .unwrap();

    let outcome = ClearingSolver::solve(&network).unwrap();

    assert_eq!(outcome.clearing_vector(), &dvector![2.0, 2.2]);
    assert_eq!(outcome.insolvent_count(), 0);
    assert!(outcome.insolvency_levels().is_empty());
    // Seed empty set plus the single non-changing detection round.
    assert_eq!(outcome.insolvency_sets().len(), 2);
}

/// Example 3.3 with bank 0's liability raised from 2 to 2.2.
#[test]
fn example_3_3_raised_liability() {
    let network = FinancialNetwork::new(
        dmatrix![0.0, 2.2; 2.2, 0.0],
        dvector![1.0, 1.0],
        0.5,
        0.5,
    )
    .unwrap();

    let outcome = ClearingSolver::solve(&network).unwrap();
    assert_eq!(outcome.clearing_vector(), &dvector![2.2, 2.2]);
    assert_eq!(outcome.insolvent_count(), 0);
}

/// A two-level cascade: bank 0 defaults fundamentally, its shortfall drags
/// bank 2 under a round later, and bank 1 (no obligations) never defaults.
#[test]
fn acyclic_two_level_cascade() {
    let network = FinancialNetwork::new(
        dmatrix![
            0.0, 0.0, 0.60141038;
            0.0, 0.0, 0.0;
            0.0, 0.61136804, 0.0
        ],
        dvector![0.47727664, 0.63927659, 0.32352602],
        0.5,
        0.5,
    )
    .unwrap();

    let outcome = ClearingSolver::solve(&network).unwrap();

    // Cascade order.
    assert_eq!(outcome.insolvency_round(0), Some(0));
    assert_eq!(outcome.insolvency_round(2), Some(1));
    assert_eq!(outcome.insolvency_round(1), None);
    assert_eq!(outcome.insolvency_levels(), &[1, 1]);
    assert_eq!(
        outcome.final_insolvency_set().iter().copied().collect::<Vec<_>>(),
        vec![0, 2]
    );

    // Fixed-point payments: bank 0 receives nothing and pays alpha * e0;
    // bank 2 receives bank 0's whole payment and pays
    // alpha * e2 + beta * lambda0.
    let lambda = outcome.clearing_vector();
    let lambda0 = 0.5 * 0.47727664;
    assert_relative_eq!(lambda[0], lambda0, epsilon = 1e-12);
    assert_eq!(lambda[1], 0.0);
    assert_relative_eq!(lambda[2], 0.5 * 0.32352602 + 0.5 * lambda0, epsilon = 1e-12);
}

/// The circular network of Rogers & Veraart §5.1 with n = 6, a = 2,
/// epsilon = 1, gamma = 0.4: every bank ends up insolvent, banks 1, 3, 5
/// at level 0 and banks 0, 2, 4 by contagion at level 1. The greatest
/// clearing vector has a closed form.
#[test]
fn circular_network_full_contagion() {
    let n = 6;
    let a = 2.0;
    let epsilon = 1.0;
    let gamma = 0.4;
    let alpha = 0.5;
    let beta = 0.5;

    let mut liabilities = DMatrix::zeros(n, n);
    liabilities[(0, 1)] = a;
    liabilities[(2, 3)] = a;
    liabilities[(4, 5)] = a;
    liabilities[(1, 2)] = a + epsilon;
    liabilities[(3, 4)] = a + epsilon;
    liabilities[(5, 0)] = a + epsilon;

    let even_assets = gamma * (1.0 - epsilon);
    let odd_assets = gamma * (1.0 + epsilon);
    let external_assets = DVector::from_fn(n, |i, _| {
        if i % 2 == 0 {
            even_assets
        } else {
            odd_assets
        }
    });

    let network =
        FinancialNetwork::new(liabilities, external_assets, alpha, beta).unwrap();
    let outcome = ClearingSolver::solve(&network).unwrap();

    assert_eq!(outcome.insolvent_count(), n);
    assert_eq!(outcome.insolvency_levels(), &[3, 3]);
    for bank in [1, 3, 5] {
        assert_eq!(outcome.insolvency_round(bank), Some(0));
    }
    for bank in [0, 2, 4] {
        assert_eq!(outcome.insolvency_round(bank), Some(1));
    }

    // Closed-form greatest clearing vector from the article.
    let scale = (alpha * gamma) / (1.0 - beta * beta);
    let even_paid = scale * ((1.0 - epsilon) + beta * (1.0 + epsilon));
    let odd_paid = scale * (beta * (1.0 - epsilon) + (1.0 + epsilon));

    let lambda = outcome.clearing_vector();
    for bank in 0..n {
        let expected = if bank % 2 == 0 { even_paid } else { odd_paid };
        assert_relative_eq!(lambda[bank], expected, epsilon = 1e-12);
    }
}

/// Full pipeline: generate, clear, report.
#[test]
fn full_pipeline_random_network() {
    let config = NetworkConfig {
        bank_count: 100,
        liability_probability: 0.05,
        // Thin assets so that defaults actually occur.
        asset_scale: 0.1,
        ..Default::default()
    };

    let network = generate_random_network(&config).unwrap();
    let outcome = ClearingSolver::solve(&network).unwrap();
    let report = ContagionReport::from_outcome(&network, &outcome);

    assert_eq!(report.bank_count, 100);
    assert_eq!(
        report.fundamental_defaults + report.contagion_defaults,
        report.total_defaults
    );
    assert_eq!(
        report.insolvency_levels.iter().sum::<usize>(),
        report.total_defaults
    );
    assert!(report.paid_fraction() >= 0.0 && report.paid_fraction() <= 1.0 + 1e-9);
    assert_relative_eq!(
        report.total_obligations - report.total_paid,
        report.total_shortfall(),
        epsilon = 1e-9
    );
}

/// Re-running the solver on the same network is safe and deterministic:
/// the outcome is a value, nothing in the network mutates.
#[test]
fn reruns_are_identical() {
    let network = FinancialNetwork::new(
        dmatrix![
            0.0, 0.0, 0.60141038;
            0.0, 0.0, 0.0;
            0.0, 0.61136804, 0.0
        ],
        dvector![0.47727664, 0.63927659, 0.32352602],
        0.5,
        0.5,
    )
    .unwrap();

    let first = ClearingSolver::solve(&network).unwrap();
    let second = ClearingSolver::solve(&network).unwrap();

    assert_eq!(first.clearing_vector(), second.clearing_vector());
    assert_eq!(first.insolvency_sets(), second.insolvency_sets());
    assert_eq!(first.insolvency_levels(), second.insolvency_levels());
}
