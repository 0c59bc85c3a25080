//! Ledger records produced by the amortization engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Frequency tag used for rows that are not ancillary expenses
pub const NO_FREQUENCY: &str = "-";

/// Kind of event a ledger row records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Regular installment (or an extraordinary payment booked as one)
    MonthlyAmortization,
    /// Extraordinary payment that shortens the term
    ExtraTermAmortization,
    /// Extraordinary payment that lowers the installment
    ExtraPaymentAmortization,
    /// Ancillary expense charge
    ExtraExpense,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MonthlyAmortization => "monthly_amortization",
            EventKind::ExtraTermAmortization => "extra_term_amortization",
            EventKind::ExtraPaymentAmortization => "extra_payment_amortization",
            EventKind::ExtraExpense => "extra_expense",
        }
    }

    /// Whether the row reduces principal
    pub fn is_amortization(&self) -> bool {
        !matches!(self, EventKind::ExtraExpense)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Outstanding debt after the event
    pub debt: f64,

    /// Period label (YYYY-MM)
    pub period: String,

    /// Principal portion
    pub principal: f64,

    /// Interest portion
    pub interest: f64,

    /// Gross amount paid
    pub payment: f64,

    pub kind: EventKind,

    /// `monthly`, `-`, or the expense's frequency
    pub frequency: String,

    /// Expense name for `extra_expense` rows
    pub expense: Option<String>,
}

/// Append-only payment history, in the order events happened
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    records: Vec<LedgerRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning the stored row
    pub fn add_row(&mut self, record: LedgerRecord) -> &LedgerRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&LedgerRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerRecord> {
        self.records.iter()
    }

    /// Rows of a single event kind, in ledger order
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &LedgerRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Summary statistics over the whole history
    pub fn summary(&self) -> LedgerSummary {
        let total_interest: f64 = self.records.iter().map(|r| r.interest).sum();
        let total_principal: f64 = self.records.iter().map(|r| r.principal).sum();
        let total_ancillary: f64 = self
            .of_kind(EventKind::ExtraExpense)
            .map(|r| r.payment)
            .sum();

        let regular: Vec<&LedgerRecord> = self.of_kind(EventKind::MonthlyAmortization).collect();
        let first_installment = regular.first().map(|r| r.payment).unwrap_or(0.0);
        let last_installment = regular.last().map(|r| r.payment).unwrap_or(0.0);

        // Everything booked until the 13th regular installment
        let mut installments = 0;
        let first_year_paid: f64 = self
            .records
            .iter()
            .take_while(|r| {
                if r.kind == EventKind::MonthlyAmortization {
                    installments += 1;
                }
                installments <= 12
            })
            .map(|r| r.payment)
            .sum();

        LedgerSummary {
            total_paid: round2(total_principal + total_interest),
            total_interest: round2(total_interest),
            total_principal: round2(total_principal),
            total_ancillary: round2(total_ancillary),
            payment_count: regular.len(),
            first_installment: round2(first_installment),
            last_installment: round2(last_installment),
            first_year_paid: round2(first_year_paid),
        }
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a LedgerRecord;
    type IntoIter = std::slice::Iter<'a, LedgerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Summary statistics for a finished simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Principal plus interest over every amortization row
    pub total_paid: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    /// Ancillary expenses charged, not part of `total_paid`
    pub total_ancillary: f64,
    /// Number of regular installments
    pub payment_count: usize,
    pub first_installment: f64,
    pub last_installment: f64,
    /// Gross paid over the first twelve installments, expenses included
    pub first_year_paid: f64,
}

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
