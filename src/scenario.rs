//! Scenario runner for comparing extraordinary payment strategies
//!
//! Holds a base configuration and runs sequential variants of it, e.g. how a
//! fixed yearly extraordinary payment should be split between installment
//! reduction and term reduction.

use serde::{Deserialize, Serialize};

use crate::amortization::{ExtraordinaryPayment, LedgerSummary};
use crate::error::MortgageResult;
use crate::simulation::{ScheduledPayment, SimulationConfig, SimulationDriver};

/// Outcome of one strategy variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Years (from year 1) whose extraordinary payment reduced the installment;
    /// later years reduced the term
    pub installment_reduction_years: u32,

    /// Installment in force when the simulation ended
    pub final_installment: f64,

    pub summary: LedgerSummary,
}

/// Runs variants of a base simulation
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(SimulationConfig::plain(378_000.0, 2.1, 30));
/// for result in runner.strategy_sweep(10_000.0, 0.005, 30)? {
///     println!("{}: {:.2}", result.installment_reduction_years, result.summary.total_interest);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_config: SimulationConfig,
}

impl ScenarioRunner {
    pub fn new(base_config: SimulationConfig) -> Self {
        Self { base_config }
    }

    pub fn base_config(&self) -> &SimulationConfig {
        &self.base_config
    }

    /// Run the base configuration as is
    pub fn run_base(&self) -> MortgageResult<LedgerSummary> {
        Self::summarize(self.base_config.clone()).map(|(summary, _)| summary)
    }

    /// Run the base configuration with extra scheduled payments appended
    pub fn run_with(&self, payments: &[ScheduledPayment]) -> MortgageResult<LedgerSummary> {
        let mut config = self.base_config.clone();
        config.extraordinary_payments.extend_from_slice(payments);
        Self::summarize(config).map(|(summary, _)| summary)
    }

    /// Sweep the split between installment reduction and term reduction
    ///
    /// For every `k` in `0..=years`, pays `amount` at month 12 of years
    /// `1..=years`, reducing the installment in years before `k` and the term
    /// from year `k` on.
    pub fn strategy_sweep(&self, amount: f64, rate: f64, years: u32) -> MortgageResult<Vec<StrategyResult>> {
        (0..=years)
            .map(|split| {
                let mut config = self.base_config.clone();
                config.extraordinary_payments.extend((1..=years).map(|year| {
                    let payment = if year < split {
                        ExtraordinaryPayment::InstallmentReduction { amount, rate }
                    } else {
                        ExtraordinaryPayment::TermReduction { amount, rate }
                    };
                    ScheduledPayment::new(year, 12, payment)
                }));

                let (summary, final_installment) = Self::summarize(config)?;
                Ok(StrategyResult {
                    installment_reduction_years: split,
                    final_installment,
                    summary,
                })
            })
            .collect()
    }

    fn summarize(config: SimulationConfig) -> MortgageResult<(LedgerSummary, f64)> {
        let engine = SimulationDriver::new(config).run()?;
        Ok((engine.ledger().summary(), engine.installment()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraordinary_payments_save_interest() {
        let runner = ScenarioRunner::new(SimulationConfig::plain(378_000.0, 2.1, 30));
        let base = runner.run_base().unwrap();
        let with_extra = runner
            .run_with(&[ScheduledPayment::new(
                3,
                12,
                ExtraordinaryPayment::InstallmentReduction { amount: 10_000.0, rate: 0.0 },
            )])
            .unwrap();

        assert_eq!(base.payment_count, 360);
        assert_eq!(with_extra.payment_count, 360);
        assert!(with_extra.total_interest < base.total_interest);
        assert!(with_extra.last_installment < base.last_installment);
    }

    #[test]
    fn test_strategy_sweep() {
        let runner = ScenarioRunner::new(SimulationConfig::plain(120_000.0, 3.0, 15));
        let results = runner.strategy_sweep(5_000.0, 0.005, 5).unwrap();

        assert_eq!(results.len(), 6);
        assert_eq!(results[0].installment_reduction_years, 0);

        // Reducing the term every year pays the least interest and finishes earliest
        let all_term = &results[0];
        let mostly_installment = &results[5];
        assert!(all_term.summary.total_interest < mostly_installment.summary.total_interest);
        assert!(all_term.summary.payment_count < mostly_installment.summary.payment_count);
        assert!(mostly_installment.final_installment < all_term.final_installment);
    }
}
