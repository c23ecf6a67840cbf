use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Errors arising from network construction.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("liability matrix must be square, got {rows}x{cols}")]
    NonSquareLiabilities { rows: usize, cols: usize },
    #[error("external assets length {assets} does not match bank count {banks}")]
    DimensionMismatch { banks: usize, assets: usize },
    #[error("recovery rate {name} must lie in [0, 1], got {value}")]
    RecoveryRateOutOfRange { name: &'static str, value: f64 },
    #[error("negative {what} entry {value} for bank {bank}")]
    NegativeEntry {
        what: &'static str,
        bank: usize,
        value: f64,
    },
    #[error("bank index {index} out of range for {banks} banks")]
    BankIndexOutOfRange { index: usize, banks: usize },
}

/// An interbank network with nominal liabilities, external assets, and
/// recovery rates.
///
/// `liabilities[(i, j)]` is the amount bank `i` nominally owes bank `j`.
/// `alpha` and `beta` are the fractions of external assets and interbank
/// receivables, respectively, that an insolvent bank's creditors actually
/// recover (the Rogers–Veraart bankruptcy-cost model).
///
/// Total liabilities (row sums) and the relative-liability matrix (each row
/// normalized by its total) are derived once at construction. Rows with zero
/// total liability normalize to all-zero rows. A nonzero diagonal entry —
/// a bank owing itself — is accepted but economically meaningless.
///
/// # Examples
///
/// ```
/// use contagion_engine::core::network::FinancialNetwork;
/// use nalgebra::{dmatrix, dvector};
///
/// let network = FinancialNetwork::new(
///     dmatrix![0.0, 2.0; 2.2, 0.0],
///     dvector![1.0, 1.0],
///     0.5,
///     0.5,
/// ).unwrap();
///
/// assert_eq!(network.total_liabilities()[0], 2.0);
/// assert_eq!(network.relative_liabilities()[(1, 0)], 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct FinancialNetwork {
    /// Nominal interbank liabilities; row = debtor, column = creditor.
    liabilities: DMatrix<f64>,
    /// Assets each bank holds outside the interbank network.
    external_assets: DVector<f64>,
    /// Recovery rate on external assets of insolvent banks.
    alpha: f64,
    /// Recovery rate on interbank receivables of insolvent banks.
    beta: f64,
    /// Row sums of `liabilities`: each bank's total nominal obligation.
    total_liabilities: DVector<f64>,
    /// Row-normalized liabilities; zero-liability rows are all-zero.
    relative_liabilities: DMatrix<f64>,
}

impl FinancialNetwork {
    /// Build a network from a dense liability matrix.
    ///
    /// Validates shape, non-negativity, and recovery rates eagerly; the
    /// derived quantities are computed here and never recomputed.
    pub fn new(
        liabilities: DMatrix<f64>,
        external_assets: DVector<f64>,
        alpha: f64,
        beta: f64,
    ) -> Result<Self, NetworkError> {
        let (rows, cols) = liabilities.shape();
        if rows != cols {
            return Err(NetworkError::NonSquareLiabilities { rows, cols });
        }
        if external_assets.len() != rows {
            return Err(NetworkError::DimensionMismatch {
                banks: rows,
                assets: external_assets.len(),
            });
        }
        for (name, value) in [("alpha", alpha), ("beta", beta)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NetworkError::RecoveryRateOutOfRange { name, value });
            }
        }
        for i in 0..rows {
            for j in 0..cols {
                if liabilities[(i, j)] < 0.0 {
                    return Err(NetworkError::NegativeEntry {
                        what: "liability",
                        bank: i,
                        value: liabilities[(i, j)],
                    });
                }
            }
            if external_assets[i] < 0.0 {
                return Err(NetworkError::NegativeEntry {
                    what: "external asset",
                    bank: i,
                    value: external_assets[i],
                });
            }
        }

        let total_liabilities =
            DVector::from_iterator(rows, liabilities.row_iter().map(|row| row.sum()));

        // Guarded normalization: a bank with no obligations has no creditors
        // to distribute payments to, so its row stays zero.
        let mut relative_liabilities = DMatrix::zeros(rows, cols);
        for i in 0..rows {
            let total = total_liabilities[i];
            if total > 0.0 {
                for j in 0..cols {
                    relative_liabilities[(i, j)] = liabilities[(i, j)] / total;
                }
            }
        }

        Ok(Self {
            liabilities,
            external_assets,
            alpha,
            beta,
            total_liabilities,
            relative_liabilities,
        })
    }

    /// Build a network from a sparse list of `(debtor, creditor, amount)`
    /// liability entries. Entries for the same pair accumulate.
    pub fn from_entries(
        entries: &[(usize, usize, f64)],
        external_assets: Vec<f64>,
        alpha: f64,
        beta: f64,
    ) -> Result<Self, NetworkError> {
        let banks = external_assets.len();
        let mut liabilities = DMatrix::zeros(banks, banks);
        for &(debtor, creditor, amount) in entries {
            for index in [debtor, creditor] {
                if index >= banks {
                    return Err(NetworkError::BankIndexOutOfRange { index, banks });
                }
            }
            liabilities[(debtor, creditor)] += amount;
        }
        Self::new(
            liabilities,
            DVector::from_vec(external_assets),
            alpha,
            beta,
        )
    }

    // --- Accessors ---

    /// Number of banks in the network.
    pub fn bank_count(&self) -> usize {
        self.external_assets.len()
    }

    pub fn liabilities(&self) -> &DMatrix<f64> {
        &self.liabilities
    }

    pub fn external_assets(&self) -> &DVector<f64> {
        &self.external_assets
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn total_liabilities(&self) -> &DVector<f64> {
        &self.total_liabilities
    }

    pub fn relative_liabilities(&self) -> &DMatrix<f64> {
        &self.relative_liabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    fn sample_network() -> FinancialNetwork {
        FinancialNetwork::new(
            dmatrix![0.0, 2.0; 2.2, 0.0],
            dvector![1.0, 1.0],
            0.5,
            0.5,
        )
        .unwrap()
    }

    #[test]
    fn test_derived_quantities() {
        let network = sample_network();
        assert_eq!(network.bank_count(), 2);
        assert_eq!(network.total_liabilities()[0], 2.0);
        assert_eq!(network.total_liabilities()[1], 2.2);
        assert_relative_eq!(network.relative_liabilities()[(0, 1)], 1.0);
        assert_relative_eq!(network.relative_liabilities()[(1, 0)], 1.0);
    }

    #[test]
    fn test_relative_rows_sum_to_one_or_zero() {
        let network = FinancialNetwork::new(
            dmatrix![0.0, 1.0, 3.0; 0.0, 0.0, 0.0; 2.0, 2.0, 0.0],
            dvector![1.0, 1.0, 1.0],
            0.5,
            0.5,
        )
        .unwrap();

        let pi = network.relative_liabilities();
        assert_relative_eq!(pi.row(0).sum(), 1.0);
        assert_eq!(pi.row(1).sum(), 0.0);
        assert_relative_eq!(pi.row(2).sum(), 1.0);
    }

    #[test]
    fn test_non_square_rejected() {
        let result = FinancialNetwork::new(
            DMatrix::zeros(2, 3),
            dvector![1.0, 1.0],
            0.5,
            0.5,
        );
        assert!(matches!(
            result,
            Err(NetworkError::NonSquareLiabilities { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn test_mismatched_assets_rejected() {
        let result = FinancialNetwork::new(
            DMatrix::zeros(2, 2),
            dvector![1.0, 1.0, 1.0],
            0.5,
            0.5,
        );
        assert!(matches!(result, Err(NetworkError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_recovery_rate_out_of_range() {
        let result =
            FinancialNetwork::new(DMatrix::zeros(2, 2), dvector![1.0, 1.0], 1.5, 0.5);
        assert!(matches!(
            result,
            Err(NetworkError::RecoveryRateOutOfRange { name: "alpha", .. })
        ));
    }

    #[test]
    fn test_negative_liability_rejected() {
        let result = FinancialNetwork::new(
            dmatrix![0.0, -1.0; 0.0, 0.0],
            dvector![1.0, 1.0],
            0.5,
            0.5,
        );
        assert!(matches!(result, Err(NetworkError::NegativeEntry { .. })));
    }

    #[test]
    fn test_from_entries() {
        let network = FinancialNetwork::from_entries(
            &[(0, 1, 1.5), (0, 1, 0.5), (1, 0, 2.2)],
            vec![1.0, 1.0],
            0.5,
            0.5,
        )
        .unwrap();
        assert_eq!(network.liabilities()[(0, 1)], 2.0);
        assert_eq!(network.liabilities()[(1, 0)], 2.2);
    }

    #[test]
    fn test_from_entries_index_out_of_range() {
        let result =
            FinancialNetwork::from_entries(&[(0, 5, 1.0)], vec![1.0, 1.0], 0.5, 0.5);
        assert!(matches!(
            result,
            Err(NetworkError::BankIndexOutOfRange { index: 5, banks: 2 })
        ));
    }
}
