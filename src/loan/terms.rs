//! Fixed-rate loan terms and the annuity formulas derived from them

use serde::{Deserialize, Serialize};

use crate::error::{MortgageError, MortgageResult};

/// Contract terms of a fixed-rate installment loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Nominal annual interest rate in percent (2.1 means 2.1%)
    pub annual_rate_percent: f64,

    /// Contract term in years
    pub term_years: u32,
}

impl LoanTerms {
    /// Validate and build loan terms
    pub fn new(principal: f64, annual_rate_percent: f64, term_years: u32) -> MortgageResult<Self> {
        if !principal.is_finite() || principal <= 0.0 {
            return Err(MortgageError::invalid_loan(
                "principal",
                format!("must be a positive amount, got {}", principal),
            ));
        }
        if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
            return Err(MortgageError::invalid_loan(
                "annual_rate_percent",
                format!("must be zero or positive, got {}", annual_rate_percent),
            ));
        }
        if term_years == 0 {
            return Err(MortgageError::invalid_loan("term_years", "must be at least one year"));
        }

        Ok(Self {
            principal,
            annual_rate_percent,
            term_years,
        })
    }

    /// Monthly interest rate as a decimal (annual / 100 / 12)
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }

    /// Contract term in months
    pub fn term_months(&self) -> u32 {
        self.term_years * 12
    }

    /// Installment that amortizes the full principal over the full term
    pub fn base_installment(&self) -> f64 {
        annuity_installment(self.principal, self.monthly_rate(), self.term_months() as f64)
    }
}

/// Fixed installment paying off `debt` in `months` periods at `monthly_rate`
///
/// `debt * r(1+r)^n / ((1+r)^n - 1)`, or straight-line `debt / n` when the
/// rate is zero. Returns 0 when there is nothing left to amortize.
pub fn annuity_installment(debt: f64, monthly_rate: f64, months: f64) -> f64 {
    if debt <= 0.0 || months <= 0.0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return debt / months;
    }

    let growth = (1.0 + monthly_rate).powf(months);
    debt * monthly_rate * growth / (growth - 1.0)
}

/// Months needed to retire `debt` with a fixed `installment`
///
/// Solves the annuity equation for n: `ln(I / (I - D r)) / ln(1 + r)`.
/// Returns `None` when the installment does not cover the monthly interest.
pub fn remaining_term_for(debt: f64, monthly_rate: f64, installment: f64) -> Option<f64> {
    if debt <= 0.0 {
        return Some(0.0);
    }
    if installment <= 0.0 {
        return None;
    }
    if monthly_rate == 0.0 {
        return Some(debt / installment);
    }

    let covered = installment - debt * monthly_rate;
    if covered <= 0.0 {
        return None;
    }
    Some((installment / covered).ln() / (1.0 + monthly_rate).ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_invalid_terms() {
        assert!(LoanTerms::new(0.0, 2.1, 30).is_err());
        assert!(LoanTerms::new(-1.0, 2.1, 30).is_err());
        assert!(LoanTerms::new(100_000.0, -0.5, 30).is_err());
        assert!(LoanTerms::new(100_000.0, f64::NAN, 30).is_err());
        assert!(LoanTerms::new(100_000.0, 2.1, 0).is_err());
    }

    #[test]
    fn test_reference_installment() {
        let terms = LoanTerms::new(378_000.0, 2.1, 30).unwrap();
        assert_relative_eq!(terms.monthly_rate(), 0.00175, epsilon = 1e-12);

        // Closed form computed independently with n = 360, r = 0.00175
        let r: f64 = 0.00175;
        let factor = (1.0 + r).powi(360);
        let expected = 378_000.0 * r * factor / (factor - 1.0);

        assert_relative_eq!(terms.base_installment(), expected, epsilon = 1e-9);
        assert!(terms.base_installment() > 1413.0 && terms.base_installment() < 1414.0);
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let terms = LoanTerms::new(120_000.0, 0.0, 10).unwrap();
        assert_relative_eq!(terms.base_installment(), 1000.0, epsilon = 1e-9);
        assert_eq!(remaining_term_for(60_000.0, 0.0, 1000.0), Some(60.0));
    }

    #[test]
    fn test_term_inverts_installment() {
        let installment = annuity_installment(200_000.0, 0.003, 240.0);
        let months = remaining_term_for(200_000.0, 0.003, installment).unwrap();
        assert_relative_eq!(months, 240.0, epsilon = 1e-6);
    }

    #[test]
    fn test_term_undefined_when_interest_not_covered() {
        assert_eq!(remaining_term_for(100_000.0, 0.01, 500.0), None);
    }
}
