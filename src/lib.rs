//! # contagion-engine
//!
//! Greatest-clearing-vector solver for interbank default contagion.
//!
//! Given a network of banks with nominal interbank liabilities and external
//! assets, this engine computes the greatest clearing vector of the
//! Rogers & Veraart model: the actual payment each bank makes once
//! insolvencies and bankruptcy costs (recovery rates α and β) are accounted
//! for, together with the round-by-round insolvency trace of the cascade.
//!
//! ## Architecture
//!
//! - **core** — The financial network: liabilities, external assets, derived
//!   totals and relative liabilities
//! - **solver** — The monotone fixed-point clearing iteration
//! - **analysis** — Contagion reporting over a clearing outcome
//! - **simulation** — Random network generation for stress testing

pub mod analysis;
pub mod core;
pub mod simulation;
pub mod solver;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::contagion::ContagionReport;
    pub use crate::core::network::{FinancialNetwork, NetworkError};
    pub use crate::simulation::random_network::{generate_random_network, NetworkConfig};
    pub use crate::solver::clearing::{ClearingOutcome, ClearingSolver, SolverError};
}
