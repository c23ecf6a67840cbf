//! Contagion cascade example.
//!
//! Walks through the six-bank circular network of Rogers & Veraart §5.1:
//! three banks default fundamentally and pull the remaining three under one
//! round later, so the whole ring ends up insolvent.

use contagion_engine::analysis::contagion::ContagionReport;
use contagion_engine::core::network::FinancialNetwork;
use contagion_engine::solver::clearing::ClearingSolver;
use nalgebra::{DMatrix, DVector};

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  contagion-engine: Circular Cascade Example  ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let n = 6;
    let a = 2.0;
    let epsilon = 1.0;
    let gamma = 0.4;

    // Banks form a ring: even banks owe a, odd banks owe a + epsilon.
    let mut liabilities = DMatrix::zeros(n, n);
    for bank in 0..n {
        let next = (bank + 1) % n;
        liabilities[(bank, next)] = if bank % 2 == 0 { a } else { a + epsilon };
    }
    let external_assets = DVector::from_fn(n, |i, _| {
        if i % 2 == 0 {
            gamma * (1.0 - epsilon)
        } else {
            gamma * (1.0 + epsilon)
        }
    });

    let network = FinancialNetwork::new(liabilities, external_assets, 0.5, 0.5)
        .expect("valid network");
    let outcome = ClearingSolver::solve(&network).expect("clearing converges");

    println!("{}", ContagionReport::from_outcome(&network, &outcome));

    println!("--- Default order ---");
    for bank in 0..n {
        match outcome.insolvency_round(bank) {
            Some(round) => println!("  Bank {}: insolvent at round {}", bank, round),
            None => println!("  Bank {}: stays solvent", bank),
        }
    }

    println!("\n--- Payments ---");
    for bank in 0..n {
        println!(
            "  Bank {} pays {:.4} of {:.4}",
            bank,
            outcome.clearing_vector()[bank],
            network.total_liabilities()[bank]
        );
    }
}
