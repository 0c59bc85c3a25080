//! Loan terms and the mutable loan state tracked during amortization

mod terms;
mod state;

pub use terms::{annuity_installment, remaining_term_for, LoanTerms};
pub use state::LoanState;
