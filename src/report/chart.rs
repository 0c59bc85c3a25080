//! Dual-axis time series built from the ledger
//!
//! The left axis carries the outstanding debt over the full ledger; the right
//! axis carries payment, amortization and interest of the regular
//! installments. The series serialize to JSON for any plotting front end.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::amortization::{EventKind, Ledger};
use crate::error::MortgageResult;

/// Which y axis a series is drawn against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Left,
    Right,
}

/// One plotted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub axis: Axis,
    /// Period labels, one per point
    pub periods: Vec<String>,
    pub values: Vec<f64>,
}

/// Chart ready to hand to a plotting front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub title: String,
    pub series: Vec<Series>,
    /// Every twelfth regular period, for x axis ticks
    pub ticks: Vec<String>,
}

impl ChartSeries {
    pub fn from_ledger(ledger: &Ledger, title: &str) -> Self {
        let debt = Series {
            name: "Debt".to_string(),
            axis: Axis::Left,
            periods: ledger.iter().map(|r| r.period.clone()).collect(),
            values: ledger.iter().map(|r| r.debt).collect(),
        };

        let regular: Vec<_> = ledger.of_kind(EventKind::MonthlyAmortization).collect();
        let periods: Vec<String> = regular.iter().map(|r| r.period.clone()).collect();
        let right = |name: &str, values: Vec<f64>| Series {
            name: name.to_string(),
            axis: Axis::Right,
            periods: periods.clone(),
            values,
        };

        let series = vec![
            debt,
            right("Payment", regular.iter().map(|r| r.payment).collect()),
            right("Amortization", regular.iter().map(|r| r.principal).collect()),
            right("Interest", regular.iter().map(|r| r.interest).collect()),
        ];

        Self {
            title: title.to_string(),
            ticks: periods.iter().step_by(12).cloned().collect(),
            series,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Write the chart as pretty JSON
    pub fn write_json<W: Write>(&self, writer: W) -> MortgageResult<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{SimulationConfig, SimulationDriver};

    #[test]
    fn test_series_lengths() {
        let engine = SimulationDriver::new(SimulationConfig::default()).run().unwrap();
        let ledger = engine.ledger();
        let chart = ChartSeries::from_ledger(ledger, "Sabadell");

        assert_eq!(chart.title, "Sabadell");
        assert_eq!(chart.get("Debt").unwrap().values.len(), ledger.len());
        for name in ["Payment", "Amortization", "Interest"] {
            let series = chart.get(name).unwrap();
            assert_eq!(series.axis, Axis::Right);
            assert_eq!(series.values.len(), 360);
        }
        assert_eq!(chart.ticks.len(), 30);
        assert_eq!(chart.ticks[1], "2026-01");
    }

    #[test]
    fn test_write_json() {
        let engine = SimulationDriver::new(SimulationConfig::plain(10_000.0, 2.0, 1)).run().unwrap();
        let chart = ChartSeries::from_ledger(engine.ledger(), "Loan");

        let mut buf = Vec::new();
        chart.write_json(&mut buf).unwrap();
        let parsed: ChartSeries = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.series.len(), 4);
        assert_eq!(parsed.get("Debt").unwrap().axis, Axis::Left);
    }
}
