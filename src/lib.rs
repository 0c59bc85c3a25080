//! Mortgage Simulator - amortization schedules for fixed-rate installment loans
//!
//! This library provides:
//! - Month-by-month amortization with interest/principal split
//! - Extraordinary payments that shorten the term or lower the installment
//! - Recurring ancillary expenses (insurance, alarms) charged alongside the loan
//! - Ledger summaries, chart series and flat CSV export
//! - Strategy sweeps comparing how to apply yearly extraordinary payments

pub mod error;
pub mod loan;
pub mod amortization;
pub mod simulation;
pub mod scenario;
pub mod report;
pub mod export;

// Re-export commonly used types
pub use error::{MortgageError, MortgageResult};
pub use loan::{LoanState, LoanTerms};
pub use amortization::{
    AmortizationEngine, EventKind, ExpenseFrequency, ExtraordinaryPayment, Ledger, LedgerRecord,
    LedgerSummary,
};
pub use simulation::{SimulationConfig, SimulationDriver};
pub use scenario::ScenarioRunner;
pub use report::Reporter;
