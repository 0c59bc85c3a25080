//! Reporting over a finished ledger: summary block and chart series

mod chart;

pub use chart::{Axis, ChartSeries, Series};

use crate::amortization::{Ledger, LedgerSummary};

/// Read-only view over a finished ledger
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Reporter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    pub fn summary(&self) -> LedgerSummary {
        self.ledger.summary()
    }

    /// Text summary block, amounts with thousands separators
    pub fn render_summary(&self) -> String {
        let summary = self.summary();
        format!(
            "Total paid: {}\n\
             Total interest: {}\n\
             Total amortization: {}\n\
             Total ancillary expenses: {}\n\
             Monthly payments: {}\n\
             First installment: {}\n\
             Last installment: {}\n\
             First year paid: {}",
            format_money(summary.total_paid),
            format_money(summary.total_interest),
            format_money(summary.total_principal),
            format_money(summary.total_ancillary),
            summary.payment_count,
            format_money(summary.first_installment),
            format_money(summary.last_installment),
            format_money(summary.first_year_paid),
        )
    }

    /// Dual-axis chart series for the ledger
    pub fn chart(&self, title: &str) -> ChartSeries {
        ChartSeries::from_ledger(self.ledger, title)
    }
}

/// Format an amount as `1,234,567.89`
pub fn format_money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, dec_part)
}
