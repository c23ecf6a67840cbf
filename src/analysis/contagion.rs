use crate::core::network::FinancialNetwork;
use crate::solver::clearing::ClearingOutcome;
use serde::{Deserialize, Serialize};

/// Post-hoc analysis of a clearing run: how far the default cascade spread
/// and how much of the nominal obligations actually got paid.
///
/// Level-0 (fundamental) defaults are banks that are insolvent even when
/// every counterparty pays in full; every later level is a contagion
/// default, caused only by the shortfalls of earlier levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContagionReport {
    /// Number of banks in the network.
    pub bank_count: usize,
    /// Banks insolvent at round 0, before any contagion.
    pub fundamental_defaults: usize,
    /// Banks dragged into insolvency by earlier defaults.
    pub contagion_defaults: usize,
    /// Total insolvent banks at the fixed point.
    pub total_defaults: usize,
    /// Detection rounds executed, including the final non-changing one.
    pub rounds: usize,
    /// Newly insolvent banks per round.
    pub insolvency_levels: Vec<usize>,
    /// Sum of nominal obligations across all banks.
    pub total_obligations: f64,
    /// Sum of actual clearing payments.
    pub total_paid: f64,
    /// Unpaid nominal obligation per bank.
    pub shortfall_by_bank: Vec<f64>,
}

impl ContagionReport {
    /// Compute a report from a network and the outcome of clearing it.
    pub fn from_outcome(network: &FinancialNetwork, outcome: &ClearingOutcome) -> Self {
        let fundamental_defaults = outcome.insolvency_levels().first().copied().unwrap_or(0);
        let total_defaults = outcome.insolvent_count();

        let total_obligations = network.total_liabilities().sum();
        let total_paid = outcome.clearing_vector().sum();
        let shortfall_by_bank = network
            .total_liabilities()
            .iter()
            .zip(outcome.clearing_vector().iter())
            .map(|(nominal, paid)| nominal - paid)
            .collect();

        ContagionReport {
            bank_count: network.bank_count(),
            fundamental_defaults,
            contagion_defaults: total_defaults - fundamental_defaults,
            total_defaults,
            rounds: outcome.rounds(),
            insolvency_levels: outcome.insolvency_levels().to_vec(),
            total_obligations,
            total_paid,
            shortfall_by_bank,
        }
    }

    /// Total unpaid nominal obligation across the network.
    pub fn total_shortfall(&self) -> f64 {
        self.total_obligations - self.total_paid
    }

    /// Fraction of nominal obligations actually paid, in [0, 1].
    pub fn paid_fraction(&self) -> f64 {
        if self.total_obligations == 0.0 {
            return 1.0;
        }
        self.total_paid / self.total_obligations
    }

    /// Fraction of banks that defaulted.
    pub fn default_rate(&self) -> f64 {
        if self.bank_count == 0 {
            return 0.0;
        }
        self.total_defaults as f64 / self.bank_count as f64
    }
}

impl std::fmt::Display for ContagionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Contagion Report ===")?;
        writeln!(f, "Banks:                {}", self.bank_count)?;
        writeln!(f, "Fundamental defaults: {}", self.fundamental_defaults)?;
        writeln!(f, "Contagion defaults:   {}", self.contagion_defaults)?;
        writeln!(f, "Total defaults:       {}", self.total_defaults)?;
        writeln!(f, "Rounds:               {}", self.rounds)?;
        writeln!(f, "Total obligations:    {:.6}", self.total_obligations)?;
        writeln!(f, "Total paid:           {:.6}", self.total_paid)?;
        writeln!(f, "Total shortfall:      {:.6}", self.total_shortfall())?;
        writeln!(f, "Paid fraction:        {:.1}%", self.paid_fraction() * 100.0)?;

        if !self.insolvency_levels.is_empty() {
            writeln!(f, "\n--- Cascade ---")?;
            for (level, count) in self.insolvency_levels.iter().enumerate() {
                writeln!(f, "  Level {}: {} newly insolvent", level, count)?;
            }
        }
        Ok(())
    }
}
