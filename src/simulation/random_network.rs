//! Random interbank network generation.
//!
//! Generates Erdős–Rényi-style liability networks for stress testing the
//! clearing solver under various density and asset regimes.

use crate::core::network::{FinancialNetwork, NetworkError};
use nalgebra::{DMatrix, DVector};
use rand::Rng;

/// Configuration for generating a random interbank network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of banks in the network.
    pub bank_count: usize,
    /// Probability that any ordered pair of distinct banks carries a
    /// liability.
    pub liability_probability: f64,
    /// External assets are drawn uniformly from [0, asset_scale).
    pub asset_scale: f64,
    /// Liabilities are drawn uniformly from [0, max_liability).
    pub max_liability: f64,
    /// Recovery rate on external assets of insolvent banks.
    pub alpha: f64,
    /// Recovery rate on interbank receivables of insolvent banks.
    pub beta: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bank_count: 10,
            liability_probability: 0.05,
            asset_scale: 20.0,
            max_liability: 1.0,
            alpha: 0.5,
            beta: 0.5,
        }
    }
}

/// Generate a random interbank network for testing.
///
/// Each off-diagonal liability is present independently with
/// `liability_probability`; the diagonal is always zero. Errors only if the
/// configured recovery rates are out of range.
pub fn generate_random_network(config: &NetworkConfig) -> Result<FinancialNetwork, NetworkError> {
    let mut rng = rand::thread_rng();
    let n = config.bank_count;

    let mut liabilities = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            if i != j && rng.gen_bool(config.liability_probability) {
                liabilities[(i, j)] = rng.gen_range(0.0..config.max_liability);
            }
        }
    }

    let external_assets =
        DVector::from_fn(n, |_, _| config.asset_scale * rng.gen::<f64>());

    FinancialNetwork::new(liabilities, external_assets, config.alpha, config.beta)
}
