//! Compare installment-reduction vs term-reduction strategies
//!
//! Pays a fixed extraordinary amount at the end of every year and sweeps how
//! many of the first years reduce the installment before switching to term
//! reduction. Outputs one summary row per variant.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use mortgage_simulator::amortization::round2;
use mortgage_simulator::scenario::StrategyResult;
use mortgage_simulator::{ScenarioRunner, SimulationConfig};

#[derive(Debug, Parser)]
#[command(name = "strategy_sweep", about = "Sweep extraordinary payment strategies")]
struct Cli {
    /// JSON scenario file used as the base; defaults to a plain 378000 / 2.1% / 30y loan
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extraordinary amount paid at the end of every year
    #[arg(long, default_value_t = 10_000.0)]
    amount: f64,

    /// Cost rate charged on each extraordinary payment, as a decimal
    #[arg(long, default_value_t = 0.005)]
    fee_rate: f64,

    /// Number of years with an extraordinary payment
    #[arg(long, default_value_t = 30)]
    years: u32,

    #[arg(long, default_value = "strategy_sweep.csv")]
    output: PathBuf,
}

/// Flat CSV row for one variant
#[derive(Debug, Serialize)]
struct SweepRow {
    installment_reduction_years: u32,
    payment_count: usize,
    first_installment: f64,
    last_installment: f64,
    final_installment: f64,
    total_interest: f64,
    total_paid: f64,
    total_ancillary: f64,
    first_year_paid: f64,
}

impl From<&StrategyResult> for SweepRow {
    fn from(result: &StrategyResult) -> Self {
        Self {
            installment_reduction_years: result.installment_reduction_years,
            payment_count: result.summary.payment_count,
            first_installment: result.summary.first_installment,
            last_installment: result.summary.last_installment,
            final_installment: round2(result.final_installment),
            total_interest: result.summary.total_interest,
            total_paid: result.summary.total_paid,
            total_ancillary: result.summary.total_ancillary,
            first_year_paid: result.summary.first_year_paid,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => SimulationConfig::from_json_path(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => SimulationConfig::plain(378_000.0, 2.1, 30),
    };

    let start = Instant::now();
    println!("Running {} variants...", cli.years + 1);

    let runner = ScenarioRunner::new(base);
    let results = runner
        .strategy_sweep(cli.amount, cli.fee_rate, cli.years)
        .context("Strategy sweep failed")?;

    println!("Sweep complete in {:?}", start.elapsed());

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    for result in &results {
        writer.serialize(SweepRow::from(result))?;
    }
    writer.flush()?;
    println!("Output written to {}", cli.output.display());

    println!("\n{:>8} {:>9} {:>14} {:>14}", "InstRed", "Payments", "LastInst", "Interest");
    for result in &results {
        println!("{:>8} {:>9} {:>14.2} {:>14.2}",
            result.installment_reduction_years,
            result.summary.payment_count,
            result.summary.last_installment,
            result.summary.total_interest,
        );
    }

    if let Some(best) = results
        .iter()
        .min_by(|a, b| a.summary.total_interest.total_cmp(&b.summary.total_interest))
    {
        println!("\nLowest interest: {} installment-reduction years ({:.2})",
            best.installment_reduction_years, best.summary.total_interest);
    }

    Ok(())
}
