//! Recurring ancillary expenses (insurance and similar) charged alongside the loan

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::ledger::{EventKind, LedgerRecord};
use crate::error::{MortgageError, MortgageResult};

/// How often an ancillary expense is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ExpenseFrequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl ExpenseFrequency {
    /// Months between two charges
    pub fn interval_months(&self) -> u32 {
        match self {
            ExpenseFrequency::Monthly => 1,
            ExpenseFrequency::Quarterly => 3,
            ExpenseFrequency::Yearly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseFrequency::Monthly => "monthly",
            ExpenseFrequency::Quarterly => "quarterly",
            ExpenseFrequency::Yearly => "yearly",
        }
    }
}

impl FromStr for ExpenseFrequency {
    type Err = MortgageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(ExpenseFrequency::Monthly),
            "quarterly" => Ok(ExpenseFrequency::Quarterly),
            "yearly" => Ok(ExpenseFrequency::Yearly),
            _ => Err(MortgageError::UnknownExpenseFrequency(s.to_string())),
        }
    }
}

impl TryFrom<String> for ExpenseFrequency {
    type Error = MortgageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ExpenseFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered recurring expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncillaryExpense {
    pub name: String,
    pub amount: f64,
    pub frequency: ExpenseFrequency,

    /// Ticks elapsed since the last charge (or since registration)
    pub since_last_charge: u32,
}

impl AncillaryExpense {
    pub fn new(name: impl Into<String>, amount: f64, frequency: ExpenseFrequency) -> Self {
        Self {
            name: name.into(),
            amount,
            frequency,
            since_last_charge: 0,
        }
    }

    /// Whether this tick is a charge period
    fn is_due(&self) -> bool {
        self.since_last_charge + 1 >= self.frequency.interval_months()
    }
}

/// Schedules ancillary expenses in registration order
#[derive(Debug, Clone, Default)]
pub struct ExpenseScheduler {
    expenses: Vec<AncillaryExpense>,
}

impl ExpenseScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an expense; a duplicate name replaces the earlier entry in place
    pub fn register(
        &mut self,
        name: impl Into<String>,
        amount: f64,
        frequency: ExpenseFrequency,
    ) -> MortgageResult<()> {
        let name = name.into();
        if !amount.is_finite() || amount < 0.0 {
            return Err(MortgageError::invalid_loan(
                "expense_amount",
                format!("expense '{}' must have a non-negative amount, got {}", name, amount),
            ));
        }

        let expense = AncillaryExpense::new(name, amount, frequency);
        match self.expenses.iter_mut().find(|e| e.name == expense.name) {
            Some(existing) => {
                warn!(
                    "Expense '{}' registered twice, replacing {:.2} {} with {:.2} {}",
                    expense.name, existing.amount, existing.frequency, expense.amount, expense.frequency
                );
                *existing = expense;
            }
            None => self.expenses.push(expense),
        }
        Ok(())
    }

    /// Register an expense whose frequency is given as text
    pub fn register_str(&mut self, name: impl Into<String>, amount: f64, frequency: &str) -> MortgageResult<()> {
        let frequency = frequency.parse::<ExpenseFrequency>()?;
        self.register(name, amount, frequency)
    }

    pub fn get(&self, name: &str) -> Option<&AncillaryExpense> {
        self.expenses.iter().find(|e| e.name == name)
    }

    pub fn expenses(&self) -> &[AncillaryExpense] {
        &self.expenses
    }

    /// Advance every expense by one period, returning the charges that fired
    ///
    /// An expense fires when its counter reaches `interval - 1`, then the
    /// counter resets to zero; otherwise the counter increments.
    pub fn tick(&mut self, period: &str, debt: f64) -> Vec<LedgerRecord> {
        let mut charges = Vec::new();

        for expense in &mut self.expenses {
            if expense.is_due() {
                debug!("{}: charging expense '{}' {:.2}", period, expense.name, expense.amount);
                charges.push(LedgerRecord {
                    debt,
                    period: period.to_string(),
                    principal: 0.0,
                    interest: 0.0,
                    payment: expense.amount,
                    kind: EventKind::ExtraExpense,
                    frequency: expense.frequency.to_string(),
                    expense: Some(expense.name.clone()),
                });
                expense.since_last_charge = 0;
            } else {
                expense.since_last_charge += 1;
            }
        }

        charges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired_ticks(frequency: ExpenseFrequency, ticks: u32) -> Vec<u32> {
        let mut scheduler = ExpenseScheduler::new();
        scheduler.register("insurance", 100.0, frequency).unwrap();
        (1..=ticks)
            .filter(|t| !scheduler.tick(&format!("t{}", t), 1000.0).is_empty())
            .collect()
    }

    #[test]
    fn test_monthly_fires_every_tick() {
        assert_eq!(fired_ticks(ExpenseFrequency::Monthly, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_quarterly_fires_every_third_tick() {
        assert_eq!(fired_ticks(ExpenseFrequency::Quarterly, 12), vec![3, 6, 9, 12]);
    }

    #[test]
    fn test_yearly_fires_every_twelfth_tick() {
        assert_eq!(fired_ticks(ExpenseFrequency::Yearly, 36), vec![12, 24, 36]);
    }

    #[test]
    fn test_counter_resets_when_fired() {
        let mut scheduler = ExpenseScheduler::new();
        scheduler.register("insurance", 266.0, ExpenseFrequency::Quarterly).unwrap();

        scheduler.tick("2025-01", 1000.0);
        scheduler.tick("2025-02", 1000.0);
        assert_eq!(scheduler.get("insurance").unwrap().since_last_charge, 2);

        let charges = scheduler.tick("2025-03", 1000.0);
        assert_eq!(charges.len(), 1);
        assert_eq!(scheduler.get("insurance").unwrap().since_last_charge, 0);

        let charge = &charges[0];
        assert_eq!(charge.kind, EventKind::ExtraExpense);
        assert_eq!(charge.payment, 266.0);
        assert_eq!(charge.principal, 0.0);
        assert_eq!(charge.interest, 0.0);
        assert_eq!(charge.frequency, "quarterly");
        assert_eq!(charge.expense.as_deref(), Some("insurance"));
    }

    #[test]
    fn test_charges_follow_registration_order() {
        let mut scheduler = ExpenseScheduler::new();
        scheduler.register("alarm", 55.0, ExpenseFrequency::Monthly).unwrap();
        scheduler.register("home", 641.0, ExpenseFrequency::Monthly).unwrap();
        scheduler.register("life", 88.0, ExpenseFrequency::Monthly).unwrap();

        let names: Vec<String> = scheduler
            .tick("2025-01", 1000.0)
            .into_iter()
            .filter_map(|r| r.expense)
            .collect();
        assert_eq!(names, vec!["alarm", "home", "life"]);
    }

    #[test]
    fn test_duplicate_replaces_in_place() {
        let mut scheduler = ExpenseScheduler::new();
        scheduler.register("life", 266.0, ExpenseFrequency::Quarterly).unwrap();
        scheduler.register("home", 641.0, ExpenseFrequency::Yearly).unwrap();
        scheduler.tick("2025-01", 1000.0);
        scheduler.register("life", 90.0, ExpenseFrequency::Monthly).unwrap();

        assert_eq!(scheduler.expenses().len(), 2);
        let life = &scheduler.expenses()[0];
        assert_eq!(life.name, "life");
        assert_eq!(life.amount, 90.0);
        assert_eq!(life.frequency, ExpenseFrequency::Monthly);
        assert_eq!(life.since_last_charge, 0);
    }

    #[test]
    fn test_unknown_frequency_rejected() {
        let mut scheduler = ExpenseScheduler::new();
        let err = scheduler.register_str("life", 266.0, "biweekly").unwrap_err();
        assert!(matches!(err, MortgageError::UnknownExpenseFrequency(ref f) if f == "biweekly"));
        assert!(scheduler.expenses().is_empty());

        scheduler.register_str("life", 266.0, "Quarterly").unwrap();
        assert_eq!(scheduler.get("life").unwrap().frequency, ExpenseFrequency::Quarterly);
    }

    #[test]
    fn test_frequency_deserializes_like_from_str() {
        let parsed: ExpenseFrequency = serde_json::from_str("\" Yearly \"").unwrap();
        assert_eq!(parsed, ExpenseFrequency::Yearly);
        assert_eq!(serde_json::to_string(&ExpenseFrequency::Quarterly).unwrap(), "\"quarterly\"");
        assert!(serde_json::from_str::<ExpenseFrequency>("\"weekly\"").is_err());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut scheduler = ExpenseScheduler::new();
        assert!(scheduler.register("life", -1.0, ExpenseFrequency::Monthly).is_err());
    }
}
