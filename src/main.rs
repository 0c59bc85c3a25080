//! Mortgage Simulator CLI
//!
//! Runs a single amortization simulation, prints the summary and optionally
//! exports the ledger and chart series.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use mortgage_simulator::export::export_ledger;
use mortgage_simulator::{Reporter, SimulationConfig, SimulationDriver};

#[derive(Debug, Parser)]
#[command(name = "mortgage_simulator", version, about = "Simulate a fixed-rate mortgage amortization schedule")]
struct Cli {
    /// JSON scenario file; individual flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Amount borrowed
    #[arg(long)]
    principal: Option<f64>,

    /// Nominal annual interest rate in percent
    #[arg(long)]
    rate: Option<f64>,

    /// Term in years
    #[arg(long)]
    years: Option<u32>,

    /// First payment date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Lender name, used as the chart title
    #[arg(long)]
    bank_name: Option<String>,

    /// Write the ledger as CSV to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Write the chart series as JSON to this path
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Number of ledger rows to print
    #[arg(long, default_value_t = 24)]
    rows: usize,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_path(path)
                .with_context(|| format!("Failed to load scenario {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(principal) = self.principal {
            config.principal = principal;
        }
        if let Some(rate) = self.rate {
            config.annual_rate_percent = rate;
        }
        if let Some(years) = self.years {
            config.term_years = years;
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(bank_name) = &self.bank_name {
            config.bank_name = Some(bank_name.clone());
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.simulation_config()?;
    let driver = SimulationDriver::new(config);

    let initial = driver.build_engine().context("Invalid loan configuration")?;
    let (projected_total, projected_interest) = initial.calculate_outstanding();

    println!("Mortgage:");
    println!("  Loan: {:.2}", initial.terms().principal);
    println!("  Rate: {}%", initial.terms().annual_rate_percent);
    println!("  Term: {} months", initial.terms().term_months());
    println!("  Monthly installment: {:.2}", initial.installment());
    println!("  Projected total: {:.2} (interest {:.2})", projected_total, projected_interest);
    println!();

    let engine = driver.run().context("Simulation failed")?;
    let ledger = engine.ledger();

    println!("{:>8} {:>26} {:>12} {:>12} {:>12} {:>14}",
        "Period", "Kind", "Payment", "Principal", "Interest", "Debt");
    println!("{}", "-".repeat(90));
    for row in ledger.iter().take(cli.rows) {
        println!("{:>8} {:>26} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.period, row.kind.as_str(), row.payment, row.principal, row.interest, row.debt);
    }
    if ledger.len() > cli.rows {
        println!("... ({} more rows)", ledger.len() - cli.rows);
    }

    let reporter = Reporter::new(ledger);
    println!("\nSummary:");
    for line in reporter.render_summary().lines() {
        println!("  {}", line);
    }

    if let Some(path) = &cli.export {
        export_ledger(ledger, path)
            .with_context(|| format!("Failed to export ledger to {}", path.display()))?;
        println!("\nLedger written to: {}", path.display());
    }

    if let Some(path) = &cli.chart {
        let title = driver.config().bank_name.as_deref().unwrap_or("Mortgage");
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        reporter.chart(title).write_json(BufWriter::new(file))?;
        println!("Chart series written to: {}", path.display());
    }

    Ok(())
}
