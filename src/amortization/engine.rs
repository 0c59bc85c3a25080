//! Core amortization engine: monthly recurrence, extraordinary payments and expenses

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::expenses::{ExpenseFrequency, ExpenseScheduler};
use super::ledger::{round2, EventKind, Ledger, LedgerRecord, NO_FREQUENCY};
use crate::error::{MortgageError, MortgageResult};
use crate::loan::{annuity_installment, remaining_term_for, LoanState, LoanTerms};

/// Residual debt below this is treated as paid off
const DEBT_EPSILON: f64 = 1e-6;

/// An out-of-schedule payment and how it is applied to the loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExtraordinaryPayment {
    /// Booked exactly like a regular installment, with a caller-chosen gross amount
    Monthly { amount: f64 },
    /// Keeps the installment and shortens the remaining term
    TermReduction {
        amount: f64,
        /// Cost rate applied to the amount (fees, commissions), as a decimal
        rate: f64,
    },
    /// Keeps the remaining term and lowers the installment
    InstallmentReduction {
        amount: f64,
        /// Cost rate applied to the amount (fees, commissions), as a decimal
        rate: f64,
    },
}

impl ExtraordinaryPayment {
    pub fn amount(&self) -> f64 {
        match *self {
            ExtraordinaryPayment::Monthly { amount }
            | ExtraordinaryPayment::TermReduction { amount, .. }
            | ExtraordinaryPayment::InstallmentReduction { amount, .. } => amount,
        }
    }

    fn validate(&self) -> MortgageResult<()> {
        let amount = self.amount();
        if !amount.is_finite() || amount <= 0.0 {
            return Err(MortgageError::invalid_payment(
                "amount",
                format!("must be a positive amount, got {}", amount),
            ));
        }
        if let ExtraordinaryPayment::TermReduction { rate, .. }
        | ExtraordinaryPayment::InstallmentReduction { rate, .. } = *self
        {
            if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
                return Err(MortgageError::invalid_payment(
                    "rate",
                    format!("must be in [0, 1), got {}", rate),
                ));
            }
        }
        Ok(())
    }
}

/// Amortization engine for a single fixed-rate loan
#[derive(Debug, Clone)]
pub struct AmortizationEngine {
    terms: LoanTerms,
    state: LoanState,
    expenses: ExpenseScheduler,
    ledger: Ledger,
}

impl AmortizationEngine {
    /// Create an engine for a new loan
    pub fn new(principal: f64, annual_rate_percent: f64, term_years: u32) -> MortgageResult<Self> {
        Ok(Self::from_terms(LoanTerms::new(principal, annual_rate_percent, term_years)?))
    }

    /// Create an engine from already validated terms
    pub fn from_terms(terms: LoanTerms) -> Self {
        let state = LoanState::from_terms(&terms);
        info!(
            "Loan: principal {:.2}, rate {}%, term {} months, installment {:.2}",
            terms.principal,
            terms.annual_rate_percent,
            terms.term_months(),
            state.installment
        );

        Self {
            terms,
            state,
            expenses: ExpenseScheduler::new(),
            ledger: Ledger::new(),
        }
    }

    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    pub fn state(&self) -> &LoanState {
        &self.state
    }

    pub fn debt(&self) -> f64 {
        self.state.debt
    }

    pub fn installment(&self) -> f64 {
        self.state.installment
    }

    pub fn remaining_term_months(&self) -> f64 {
        self.state.remaining_term_months
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_settled()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    pub fn expenses(&self) -> &ExpenseScheduler {
        &self.expenses
    }

    /// Projected total payment and pending interest at the current installment
    ///
    /// `installment * remaining_term` and that total minus the original
    /// principal, rounded to cents. This is a static projection: once an
    /// extraordinary payment has been applied it no longer matches what the
    /// ledger will actually record.
    pub fn calculate_outstanding(&self) -> (f64, f64) {
        let total = self.state.installment * self.state.remaining_term_months;
        let pending_interest = total - self.terms.principal;
        (round2(total), round2(pending_interest))
    }

    /// Pay the regular installment for one period
    pub fn advance_period(&mut self, period: &str) -> MortgageResult<&LedgerRecord> {
        let installment = self.state.installment;
        self.pay_installment(installment, period)
    }

    /// Apply an out-of-schedule payment
    pub fn apply_extraordinary_payment(
        &mut self,
        payment: ExtraordinaryPayment,
        period: &str,
    ) -> MortgageResult<&LedgerRecord> {
        payment.validate()?;

        match payment {
            ExtraordinaryPayment::Monthly { amount } => self.pay_installment(amount, period),
            ExtraordinaryPayment::TermReduction { amount, rate } => {
                self.pay_extraordinary(amount, rate, EventKind::ExtraTermAmortization, period)
            }
            ExtraordinaryPayment::InstallmentReduction { amount, rate } => {
                self.pay_extraordinary(amount, rate, EventKind::ExtraPaymentAmortization, period)
            }
        }
    }

    /// Register a recurring ancillary expense
    pub fn register_expense(
        &mut self,
        name: impl Into<String>,
        amount: f64,
        frequency: ExpenseFrequency,
    ) -> MortgageResult<()> {
        self.expenses.register(name, amount, frequency)
    }

    /// Charge the ancillary expenses due this period, returning how many fired
    pub fn tick_expenses(&mut self, period: &str) -> usize {
        let charges = self.expenses.tick(period, self.state.debt);
        let fired = charges.len();
        for charge in charges {
            self.ledger.add_row(charge);
        }
        fired
    }

    /// Regular installment split: interest on the debt, the rest amortizes
    fn pay_installment(&mut self, amount: f64, period: &str) -> MortgageResult<&LedgerRecord> {
        if self.state.is_settled() {
            return Err(MortgageError::LoanSettled);
        }

        let interest = self.state.debt * self.terms.monthly_rate();
        let mut principal = amount - interest;
        if principal < 0.0 {
            return Err(MortgageError::invalid_payment(
                "amount",
                format!("{:.2} does not cover the interest due of {:.2}", amount, interest),
            ));
        }

        if principal >= self.state.debt - DEBT_EPSILON {
            if principal > self.state.debt + DEBT_EPSILON {
                info!(
                    "{}: payment {:.2} exceeds outstanding debt {:.2}, clamping principal",
                    period, amount, self.state.debt
                );
            }
            principal = self.state.debt;
        }

        self.state.reduce_debt(principal);
        self.state.count_down();

        debug!(
            "{}: installment {:.2} = principal {:.2} + interest {:.2}, debt {:.2}",
            period,
            principal + interest,
            principal,
            interest,
            self.state.debt
        );

        Ok(self.ledger.add_row(LedgerRecord {
            debt: self.state.debt,
            period: period.to_string(),
            principal,
            interest,
            payment: principal + interest,
            kind: EventKind::MonthlyAmortization,
            frequency: ExpenseFrequency::Monthly.to_string(),
            expense: None,
        }))
    }

    /// Extraordinary payment carrying its own cost rate
    fn pay_extraordinary(
        &mut self,
        amount: f64,
        rate: f64,
        kind: EventKind,
        period: &str,
    ) -> MortgageResult<&LedgerRecord> {
        if self.state.is_settled() {
            return Err(MortgageError::LoanSettled);
        }

        let mut payment = amount;
        let mut principal = payment * (1.0 - rate);
        if principal >= self.state.debt - DEBT_EPSILON {
            payment = self.state.debt / (1.0 - rate);
            principal = self.state.debt;
            if amount > payment + DEBT_EPSILON {
                info!(
                    "{}: extraordinary payment {:.2} exceeds payoff amount {:.2}, clamping",
                    period, amount, payment
                );
            }
        }
        let interest = payment - principal;

        self.state.reduce_debt(principal);

        match kind {
            EventKind::ExtraTermAmortization => {
                let months = remaining_term_for(
                    self.state.debt,
                    self.terms.monthly_rate(),
                    self.state.installment,
                )
                .unwrap_or(self.state.remaining_term_months);
                self.state.shorten_term(months);
            }
            EventKind::ExtraPaymentAmortization => {
                // An exhausted count-down pays off the rest in one period
                self.state.installment = annuity_installment(
                    self.state.debt,
                    self.terms.monthly_rate(),
                    self.state.remaining_term_months.max(1.0),
                );
            }
            EventKind::MonthlyAmortization | EventKind::ExtraExpense => {}
        }

        info!(
            "{}: {} of {:.2}, debt {:.2}, installment {:.2}, remaining term {:.2} months",
            period,
            kind,
            payment,
            self.state.debt,
            self.state.installment,
            self.state.remaining_term_months
        );

        Ok(self.ledger.add_row(LedgerRecord {
            debt: self.state.debt,
            period: period.to_string(),
            principal,
            interest,
            payment,
            kind,
            frequency: NO_FREQUENCY.to_string(),
            expense: None,
        }))
    }
}
