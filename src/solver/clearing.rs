use crate::core::network::FinancialNetwork;
use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors arising from the clearing iteration.
///
/// Both variants are fatal and non-retryable: a singular restricted system
/// stays singular on retry, and non-convergence contradicts the proven
/// monotonicity of the insolvency sets, so it indicates a logic or input
/// defect rather than a legitimate runtime outcome.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("insolvency set failed to stabilize within {rounds} rounds for {banks} banks")]
    NonConvergence { banks: usize, rounds: usize },
    #[error("restricted payment system is singular at round {round} ({insolvent} insolvent banks)")]
    SingularSystem { round: usize, insolvent: usize },
}

/// Result of a clearing run: the greatest clearing vector plus the full
/// insolvency trace.
///
/// The outcome is an immutable value; the solver never mutates the network
/// it is given, so re-running on the same network is always safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingOutcome {
    /// The greatest clearing vector: each bank's actual payment.
    clearing_vector: DVector<f64>,
    /// Insolvency set per round; index 0 is the a-priori empty set. The
    /// final entry repeats its predecessor (the fixed-point round).
    insolvency_sets: Vec<BTreeSet<usize>>,
    /// Entry `k` = number of banks first identified as insolvent at round `k`.
    insolvency_levels: Vec<usize>,
}

impl ClearingOutcome {
    /// The greatest clearing vector: each bank's actual payment, bounded by
    /// its total nominal liability.
    pub fn clearing_vector(&self) -> &DVector<f64> {
        &self.clearing_vector
    }

    /// The insolvency set observed at each round, starting from the empty set.
    pub fn insolvency_sets(&self) -> &[BTreeSet<usize>] {
        &self.insolvency_sets
    }

    /// Per-round counts of newly insolvent banks.
    pub fn insolvency_levels(&self) -> &[usize] {
        &self.insolvency_levels
    }

    /// Number of detection rounds executed, including the final
    /// non-changing round.
    pub fn rounds(&self) -> usize {
        self.insolvency_sets.len() - 1
    }

    /// The stable insolvency set at the fixed point.
    pub fn final_insolvency_set(&self) -> &BTreeSet<usize> {
        // The trace always carries at least the a-priori empty set.
        &self.insolvency_sets[self.insolvency_sets.len() - 1]
    }

    /// Number of banks insolvent at the fixed point.
    pub fn insolvent_count(&self) -> usize {
        self.final_insolvency_set().len()
    }

    /// Whether `bank` is insolvent at the fixed point.
    pub fn is_insolvent(&self, bank: usize) -> bool {
        self.final_insolvency_set().contains(&bank)
    }

    /// The round at which `bank` first became insolvent (its insolvency
    /// level), or `None` if it stayed solvent.
    pub fn insolvency_round(&self, bank: usize) -> Option<usize> {
        self.insolvency_sets
            .iter()
            .position(|set| set.contains(&bank))
            .map(|position| position - 1)
    }
}

/// Computes the greatest clearing vector of a [`FinancialNetwork`] by
/// Picard iteration (the Rogers–Veraart "GA" algorithm).
///
/// Starting from the assumption that every bank pays in full, each round
/// recomputes incomes, detects the insolvent banks, and re-solves their
/// payments as a coupled linear system. The insolvency set grows
/// monotonically, so the iteration reaches a fixed point in at most N+1
/// rounds for an N-bank network.
///
/// # Examples
///
/// ```
/// use contagion_engine::core::network::FinancialNetwork;
/// use contagion_engine::solver::clearing::ClearingSolver;
/// use nalgebra::{dmatrix, dvector};
///
/// // Example 3.3 from Rogers & Veraart: both banks stay solvent.
/// let network = FinancialNetwork::new(
///     dmatrix![0.0, 2.0; 2.2, 0.0],
///     dvector![1.0, 1.0],
///     0.5,
///     0.5,
/// ).unwrap();
///
/// let outcome = ClearingSolver::solve(&network).unwrap();
/// assert_eq!(outcome.clearing_vector()[0], 2.0);
/// assert_eq!(outcome.clearing_vector()[1], 2.2);
/// assert_eq!(outcome.insolvent_count(), 0);
/// ```
pub struct ClearingSolver;

impl ClearingSolver {
    /// Run the clearing iteration to its fixed point.
    ///
    /// Returns the greatest clearing vector together with the insolvency
    /// trace. Fails with [`SolverError::SingularSystem`] if a restricted
    /// payment system has no unique solution, or
    /// [`SolverError::NonConvergence`] if the insolvency set does not
    /// stabilize within N+1 rounds (which cannot happen for valid inputs).
    pub fn solve(network: &FinancialNetwork) -> Result<ClearingOutcome, SolverError> {
        let n = network.bank_count();
        let liabilities = network.liabilities();
        let pi = network.relative_liabilities();
        let pi_t = pi.transpose();
        let l_bar = network.total_liabilities();
        let assets = network.external_assets();
        let (alpha, beta) = (network.alpha(), network.beta());

        // Every bank starts out paying its obligations in full.
        let mut lambda = l_bar.clone();
        let mut insolvency_sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new()];
        let mut insolvency_levels: Vec<usize> = Vec::new();

        for round in 0..=n {
            // income[j] = sum_i lambda[i] * pi[(i, j)] + e[j]
            let income = &pi_t * &lambda + assets;
            let insolvent: BTreeSet<usize> =
                (0..n).filter(|&i| income[i] < l_bar[i]).collect();

            debug!(
                "round {}: {} insolvent of {} banks",
                round,
                insolvent.len(),
                n
            );

            // The sets grow monotonically, so equal cardinality means the
            // set itself is unchanged and the fixed point is reached.
            let converged = insolvent.len() == insolvency_sets[round].len();
            let newly_insolvent = insolvent.difference(&insolvency_sets[round]).count();
            insolvency_sets.push(insolvent);

            if converged {
                return Ok(ClearingOutcome {
                    clearing_vector: lambda,
                    insolvency_sets,
                    insolvency_levels,
                });
            }
            insolvency_levels.push(newly_insolvent);

            // Rebuild payments: solvent banks pay in full, insolvent banks
            // pay alpha * external assets + beta * receipts. Receipts among
            // insolvent banks are mutually coupled, so they are solved
            // simultaneously as a dense linear system.
            lambda = l_bar.clone();
            let current = &insolvency_sets[round + 1];
            let indices: Vec<usize> = current.iter().copied().collect();
            let k = indices.len();

            // A = I_k - beta * Pi[I, I]^T. The transpose converts the
            // payer-row convention of Pi into the receipt equations.
            let mut a = DMatrix::identity(k, k);
            for r in 0..k {
                for c in 0..k {
                    a[(r, c)] -= beta * pi[(indices[c], indices[r])];
                }
            }

            // b = alpha * e[I] + beta * (nominal liabilities owed to I by
            // solvent banks; solvent banks always pay in full).
            let mut b = DVector::zeros(k);
            for r in 0..k {
                let bank = indices[r];
                let solvent_receipts: f64 = (0..n)
                    .filter(|payer| !current.contains(payer))
                    .map(|payer| liabilities[(payer, bank)])
                    .sum();
                b[r] = alpha * assets[bank] + beta * solvent_receipts;
            }

            let x = a
                .lu()
                .solve(&b)
                .ok_or(SolverError::SingularSystem { round, insolvent: k })?;
            for r in 0..k {
                lambda[indices[r]] = x[r];
            }
        }

        Err(SolverError::NonConvergence {
            banks: n,
            rounds: n + 1,
        })
    }
}
