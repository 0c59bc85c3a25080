//! Simulation driver: steps the amortization engine month by month
//!
//! A simulation is fully described by a [`SimulationConfig`], which can be
//! built in code or loaded from a JSON file:
//!
//! ```json
//! {
//!   "principal": 378000.0,
//!   "annual_rate_percent": 2.1,
//!   "term_years": 30,
//!   "start": "2025-01-01",
//!   "bank_name": "Sabadell",
//!   "expenses": [{ "name": "life insurance", "amount": 266.0, "frequency": "quarterly" }],
//!   "extraordinary_payments": [
//!     { "year": 3, "month": 12, "mode": "installment_reduction", "amount": 10000.0, "rate": 0.0 }
//!   ]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{Months, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::amortization::{AmortizationEngine, ExpenseFrequency, ExtraordinaryPayment};
use crate::error::{MortgageError, MortgageResult};

/// A recurring expense definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseConfig {
    pub name: String,
    pub amount: f64,
    pub frequency: ExpenseFrequency,
}

/// A one-off extraordinary payment at a given (year, month) of the loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    /// Loan year, 1-based from the start date
    pub year: u32,

    /// Month within the loan year, 1-12
    pub month: u32,

    #[serde(flatten)]
    pub payment: ExtraordinaryPayment,
}

impl ScheduledPayment {
    pub fn new(year: u32, month: u32, payment: ExtraordinaryPayment) -> Self {
        Self { year, month, payment }
    }

    fn validate(&self) -> MortgageResult<()> {
        if self.year == 0 {
            return Err(MortgageError::invalid_payment("year", "loan years are 1-based"));
        }
        if !(1..=12).contains(&self.month) {
            return Err(MortgageError::invalid_payment(
                "month",
                format!("must be between 1 and 12, got {}", self.month),
            ));
        }
        Ok(())
    }
}

/// Full description of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub principal: f64,

    /// Nominal annual rate in percent
    pub annual_rate_percent: f64,

    pub term_years: u32,

    /// Date of the first payment; only year and month are used
    #[serde(default = "default_start")]
    pub start: NaiveDate,

    /// Lender name, used as the chart title
    #[serde(default)]
    pub bank_name: Option<String>,

    #[serde(default)]
    pub expenses: Vec<ExpenseConfig>,

    #[serde(default)]
    pub extraordinary_payments: Vec<ScheduledPayment>,
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

impl Default for SimulationConfig {
    /// 378000 at 2.1% over 30 years, quarterly life insurance and a 10000
    /// installment reduction at the end of year 3
    fn default() -> Self {
        Self {
            principal: 378_000.0,
            annual_rate_percent: 2.1,
            term_years: 30,
            start: default_start(),
            bank_name: Some("Sabadell".to_string()),
            expenses: vec![ExpenseConfig {
                name: "life insurance".to_string(),
                amount: 266.0,
                frequency: ExpenseFrequency::Quarterly,
            }],
            extraordinary_payments: vec![ScheduledPayment::new(
                3,
                12,
                ExtraordinaryPayment::InstallmentReduction { amount: 10_000.0, rate: 0.0 },
            )],
        }
    }
}

impl SimulationConfig {
    /// Config for a plain loan with no expenses or extraordinary payments
    pub fn plain(principal: f64, annual_rate_percent: f64, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
            start: default_start(),
            bank_name: None,
            expenses: Vec::new(),
            extraordinary_payments: Vec::new(),
        }
    }

    /// Load a config from a JSON file
    pub fn from_json_path(path: &Path) -> MortgageResult<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Load a config from any JSON reader
    ///
    /// Expense frequencies are checked before the typed decode so that an
    /// unknown one surfaces as `UnknownExpenseFrequency`.
    pub fn from_json_reader<R: Read>(reader: R) -> MortgageResult<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        if let Some(expenses) = value.get("expenses").and_then(Value::as_array) {
            for frequency in expenses.iter().filter_map(|e| e.get("frequency")).filter_map(Value::as_str) {
                frequency.parse::<ExpenseFrequency>()?;
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Period label (YYYY-MM) for a 0-based year and month offset
    pub fn period_label(&self, year: u32, month: u32) -> MortgageResult<String> {
        let date = self
            .start
            .checked_add_months(Months::new(year * 12 + month))
            .ok_or_else(|| MortgageError::invalid_loan("start", "period date out of range"))?;
        Ok(date.format("%Y-%m").to_string())
    }
}

/// Runs a configured simulation to completion
#[derive(Debug, Clone)]
pub struct SimulationDriver {
    config: SimulationConfig,
}

impl SimulationDriver {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Build the engine with all expenses registered
    pub fn build_engine(&self) -> MortgageResult<AmortizationEngine> {
        let mut engine = AmortizationEngine::new(
            self.config.principal,
            self.config.annual_rate_percent,
            self.config.term_years,
        )?;
        for expense in &self.config.expenses {
            engine.register_expense(expense.name.clone(), expense.amount, expense.frequency)?;
        }
        for scheduled in &self.config.extraordinary_payments {
            scheduled.validate()?;
        }
        Ok(engine)
    }

    /// Step the loan year by year, month by month until the term ends or the debt is paid
    ///
    /// Each month pays the regular installment, then any extraordinary payment
    /// scheduled for that month, then charges due ancillary expenses. The run
    /// stops the moment the debt reaches zero, even mid-year.
    pub fn run(&self) -> MortgageResult<AmortizationEngine> {
        let mut engine = self.build_engine()?;

        'years: for year in 0..self.config.term_years {
            for month in 0..12 {
                if engine.is_settled() {
                    info!("Loan settled before year {} month {}", year + 1, month + 1);
                    break 'years;
                }

                let period = self.config.period_label(year, month)?;
                engine.advance_period(&period)?;

                for scheduled in self
                    .config
                    .extraordinary_payments
                    .iter()
                    .filter(|s| s.year == year + 1 && s.month == month + 1)
                {
                    if engine.is_settled() {
                        debug!("{}: skipping extraordinary payment, loan already settled", period);
                        continue;
                    }
                    engine.apply_extraordinary_payment(scheduled.payment, &period)?;
                }

                engine.tick_expenses(&period);
            }
        }

        info!(
            "Simulation finished: {} ledger rows, debt {:.2}",
            engine.ledger().len(),
            engine.debt()
        );
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::EventKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_plain_loan_runs_full_term() {
        let engine = SimulationDriver::new(SimulationConfig::plain(150_000.0, 3.0, 15))
            .run()
            .unwrap();

        assert_eq!(engine.ledger().len(), 180);
        assert_eq!(engine.debt(), 0.0);
        assert_eq!(engine.ledger().records()[0].period, "2025-01");
        assert_eq!(engine.ledger().last().unwrap().period, "2039-12");
    }

    #[test]
    fn test_stops_immediately_when_debt_reaches_zero() {
        let mut config = SimulationConfig::plain(100_000.0, 2.0, 10);
        config.extraordinary_payments = vec![ScheduledPayment::new(
            2,
            5,
            ExtraordinaryPayment::TermReduction { amount: 1_000_000.0, rate: 0.0 },
        )];
        config.expenses = vec![ExpenseConfig {
            name: "alarm".to_string(),
            amount: 55.0,
            frequency: ExpenseFrequency::Monthly,
        }];

        let engine = SimulationDriver::new(config).run().unwrap();
        let last = engine.ledger().last().unwrap();

        // Payoff month still books its installment, payoff and expense, nothing after
        assert_eq!(last.period, "2026-05");
        assert!(engine.ledger().iter().all(|r| r.period.as_str() <= "2026-05"));
        assert_eq!(engine.ledger().of_kind(EventKind::MonthlyAmortization).count(), 17);
        assert_eq!(engine.debt(), 0.0);
    }

    #[test]
    fn test_regular_principal_plus_extraordinary_equals_loan() {
        let mut config = SimulationConfig::plain(200_000.0, 2.5, 20);
        config.extraordinary_payments = vec![
            ScheduledPayment::new(2, 6, ExtraordinaryPayment::TermReduction { amount: 15_000.0, rate: 0.0 }),
            ScheduledPayment::new(5, 12, ExtraordinaryPayment::InstallmentReduction { amount: 8_000.0, rate: 0.005 }),
        ];

        let engine = SimulationDriver::new(config).run().unwrap();
        let ledger = engine.ledger();
        let regular: f64 = ledger.of_kind(EventKind::MonthlyAmortization).map(|r| r.principal).sum();
        let extra: f64 = ledger
            .iter()
            .filter(|r| matches!(r.kind, EventKind::ExtraTermAmortization | EventKind::ExtraPaymentAmortization))
            .map(|r| r.principal)
            .sum();

        assert_relative_eq!(extra, 15_000.0 + 8_000.0 * 0.995, epsilon = 1e-6);
        assert_relative_eq!(regular, 200_000.0 - extra, epsilon = 1e-4);
        assert_eq!(engine.debt(), 0.0);
    }

    #[test]
    fn test_remaining_term_never_increases() {
        let mut config = SimulationConfig::plain(200_000.0, 2.5, 20);
        config.extraordinary_payments = vec![
            ScheduledPayment::new(1, 12, ExtraordinaryPayment::TermReduction { amount: 20_000.0, rate: 0.0 }),
            ScheduledPayment::new(3, 12, ExtraordinaryPayment::InstallmentReduction { amount: 20_000.0, rate: 0.0 }),
        ];
        let driver = SimulationDriver::new(config);
        let mut engine = driver.build_engine().unwrap();

        let mut previous = engine.remaining_term_months();
        for year in 0..5 {
            for month in 0..12 {
                let period = driver.config().period_label(year, month).unwrap();
                engine.advance_period(&period).unwrap();
                for s in driver.config().extraordinary_payments.iter().filter(|s| s.year == year + 1 && s.month == month + 1) {
                    engine.apply_extraordinary_payment(s.payment, &period).unwrap();
                }
                assert!(engine.remaining_term_months() <= previous);
                previous = engine.remaining_term_months();
            }
        }
    }

    #[test]
    fn test_default_config_matches_reference_driver() {
        let engine = SimulationDriver::new(SimulationConfig::default()).run().unwrap();
        let ledger = engine.ledger();

        let extra: Vec<_> = ledger.of_kind(EventKind::ExtraPaymentAmortization).collect();
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].period, "2027-12");

        let insurance: Vec<_> = ledger.of_kind(EventKind::ExtraExpense).collect();
        assert_eq!(insurance[0].period, "2025-03");
        assert_eq!(insurance[1].period, "2025-06");
        assert_eq!(insurance.len(), 120);
    }

    #[test]
    fn test_rejects_bad_schedule() {
        let mut config = SimulationConfig::plain(100_000.0, 2.0, 10);
        config.extraordinary_payments = vec![ScheduledPayment::new(
            1,
            13,
            ExtraordinaryPayment::TermReduction { amount: 1_000.0, rate: 0.0 },
        )];
        assert!(SimulationDriver::new(config).run().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "principal": 250000.0,
            "annual_rate_percent": 3.1,
            "term_years": 25,
            "start": "2030-06-01",
            "expenses": [{ "name": "home", "amount": 641.0, "frequency": "yearly" }],
            "extraordinary_payments": [
                { "year": 2, "month": 6, "mode": "term_reduction", "amount": 5000.0, "rate": 0.005 },
                { "year": 4, "month": 1, "mode": "monthly", "amount": 1500.0 }
            ]
        }"#;

        let config = SimulationConfig::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(config.term_years, 25);
        assert_eq!(config.bank_name, None);
        assert_eq!(config.expenses[0].frequency, ExpenseFrequency::Yearly);
        assert_eq!(
            config.extraordinary_payments[0].payment,
            ExtraordinaryPayment::TermReduction { amount: 5000.0, rate: 0.005 }
        );
        assert_eq!(config.period_label(0, 0).unwrap(), "2030-06");
        assert_eq!(config.period_label(1, 7).unwrap(), "2032-01");
    }

    #[test]
    fn test_unknown_frequency_in_json_is_rejected() {
        let json = r#"{
            "principal": 250000.0, "annual_rate_percent": 3.1, "term_years": 25,
            "expenses": [{ "name": "home", "amount": 641.0, "frequency": "weekly" }]
        }"#;
        let err = SimulationConfig::from_json_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, MortgageError::UnknownExpenseFrequency(ref f) if f == "weekly"));
    }

    #[test]
    fn test_json_frequency_is_case_insensitive() {
        let json = r#"{
            "principal": 250000.0, "annual_rate_percent": 3.1, "term_years": 25,
            "expenses": [{ "name": "home", "amount": 641.0, "frequency": "Yearly" }]
        }"#;
        let config = SimulationConfig::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(config.expenses[0].frequency, ExpenseFrequency::Yearly);
    }
}
