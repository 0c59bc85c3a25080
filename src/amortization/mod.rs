//! Amortization engine for a single loan

mod engine;
mod expenses;
mod ledger;

pub use engine::{AmortizationEngine, ExtraordinaryPayment};
pub use expenses::{AncillaryExpense, ExpenseFrequency, ExpenseScheduler};
pub use ledger::{round2, EventKind, Ledger, LedgerRecord, LedgerSummary, NO_FREQUENCY};
