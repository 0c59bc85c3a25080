//! Error types for the amortization engine and its I/O boundary

use thiserror::Error;

/// Result alias used throughout the library
pub type MortgageResult<T> = Result<T, MortgageError>;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid loan parameter: {field} ({reason})")]
    InvalidLoanParameters { field: String, reason: String },

    #[error("Unknown expense frequency: {0} (expected monthly, quarterly or yearly)")]
    UnknownExpenseFrequency(String),

    #[error("Invalid extraordinary payment: {field} ({reason})")]
    InvalidPayment { field: String, reason: String },

    #[error("Loan is already settled, no outstanding debt")]
    LoanSettled,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MortgageError {
    pub(crate) fn invalid_loan(field: &str, reason: impl Into<String>) -> Self {
        MortgageError::InvalidLoanParameters {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_payment(field: &str, reason: impl Into<String>) -> Self {
        MortgageError::InvalidPayment {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
