//! Basic clearing example.
//!
//! Demonstrates the greatest clearing vector on the two-bank network of
//! Rogers & Veraart's Example 3.3, then over-extends bank 0 so the default
//! spreads to its counterparty.

use contagion_engine::analysis::contagion::ContagionReport;
use contagion_engine::core::network::FinancialNetwork;
use contagion_engine::solver::clearing::ClearingSolver;
use nalgebra::{dmatrix, dvector};

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  contagion-engine: Basic Clearing Example  ║");
    println!("╚════════════════════════════════════════════╝\n");

    // --- Scenario 1: both banks solvent ---
    println!("━━━ Scenario 1: Example 3.3, both banks solvent ━━━\n");

    let network = FinancialNetwork::new(
        dmatrix![0.0, 2.0; 2.2, 0.0],
        dvector![1.0, 1.0],
        0.5,
        0.5,
    )
    .expect("valid network");

    let outcome = ClearingSolver::solve(&network).expect("clearing converges");
    println!("{}", ContagionReport::from_outcome(&network, &outcome));
    println!(
        "Clearing vector: [{:.4}, {:.4}]\n",
        outcome.clearing_vector()[0],
        outcome.clearing_vector()[1]
    );

    // --- Scenario 2: bank 0 over-extended, dragging bank 1 down ---
    println!("━━━ Scenario 2: bank 0 over-extended ━━━\n");

    let stressed = FinancialNetwork::new(
        dmatrix![0.0, 3.0; 2.2, 0.0],
        dvector![0.5, 0.5],
        0.5,
        0.5,
    )
    .expect("valid network");

    let outcome = ClearingSolver::solve(&stressed).expect("clearing converges");
    println!("{}", ContagionReport::from_outcome(&stressed, &outcome));
    for bank in 0..2 {
        println!(
            "Bank {} pays {:.4} of {:.4}{}",
            bank,
            outcome.clearing_vector()[bank],
            stressed.total_liabilities()[bank],
            if outcome.is_insolvent(bank) {
                "  (insolvent)"
            } else {
                ""
            }
        );
    }
}
