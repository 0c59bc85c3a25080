//! Flat CSV export of the ledger

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::amortization::{round2, EventKind, Ledger, LedgerRecord};
use crate::error::MortgageResult;

/// One exported row, amounts rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize)]
struct ExportRow<'a> {
    period: &'a str,
    principal: f64,
    interest: f64,
    remaining_debt: f64,
    ancillary_cost: f64,
}

impl<'a> From<&'a LedgerRecord> for ExportRow<'a> {
    fn from(record: &'a LedgerRecord) -> Self {
        let ancillary = if record.kind == EventKind::ExtraExpense {
            record.payment
        } else {
            0.0
        };
        Self {
            period: &record.period,
            principal: round2(record.principal),
            interest: round2(record.interest),
            remaining_debt: round2(record.debt),
            ancillary_cost: round2(ancillary),
        }
    }
}

/// Write the ledger as CSV, one row per record in ledger order
pub fn write_ledger_csv<W: Write>(ledger: &Ledger, writer: W) -> MortgageResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in ledger {
        csv_writer.serialize(ExportRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the ledger as CSV to a file
pub fn export_ledger<P: AsRef<Path>>(ledger: &Ledger, path: P) -> MortgageResult<()> {
    let file = File::create(path)?;
    write_ledger_csv(ledger, file)
}
