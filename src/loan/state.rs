//! Running state of a loan while it is being amortized

use serde::{Deserialize, Serialize};

use super::terms::LoanTerms;

/// Outstanding position of the loan at a point in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    /// Outstanding debt, never negative
    pub debt: f64,

    /// Remaining term in months (fractional after a term recompute)
    pub remaining_term_months: f64,

    /// Current recurring installment
    pub installment: f64,
}

impl LoanState {
    /// Initial state at origination
    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self {
            debt: terms.principal,
            remaining_term_months: terms.term_months() as f64,
            installment: terms.base_installment(),
        }
    }

    /// Whether the loan has been paid off
    pub fn is_settled(&self) -> bool {
        self.debt <= 0.0
    }

    /// Reduce the debt by `principal`, clamping at zero
    pub fn reduce_debt(&mut self, principal: f64) {
        self.debt = (self.debt - principal).max(0.0);
    }

    /// Count down one period of the remaining term
    pub fn count_down(&mut self) {
        self.remaining_term_months = (self.remaining_term_months - 1.0).max(0.0);
    }

    /// Replace the remaining term, never letting it grow
    pub fn shorten_term(&mut self, months: f64) {
        self.remaining_term_months = months.max(0.0).min(self.remaining_term_months);
    }
}
