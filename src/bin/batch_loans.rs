//! Amortize every loan in a portfolio CSV and write one summary row per loan
//!
//! Input columns: loan_id, principal, annual_rate, term_years and the optional
//! frequency, extra_payment, start_date.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use fincalc::batch::{load_loans, summarize_loans};
use fincalc::export::write_csv_file;

#[derive(Parser)]
#[command(name = "batch_loans", version, about = "Summarize a loan portfolio from CSV")]
struct Args {
    /// Portfolio CSV
    input: PathBuf,

    /// Summary CSV to write
    #[arg(short, long, default_value = "loan_summary.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading loans from {}...", args.input.display());
    let loans = load_loans(&args.input)
        .with_context(|| format!("Failed to load loans from {}", args.input.display()))?;
    println!("Loaded {} loans in {:?}", loans.len(), start.elapsed());

    let summaries = summarize_loans(&loans);

    let total_principal: f64 = summaries.iter().map(|s| s.principal).sum();
    let total_interest: f64 = summaries.iter().map(|s| s.total_interest).sum();
    let total_saved: f64 = summaries.iter().map(|s| s.interest_saved).sum();

    write_csv_file(&args.output, &summaries)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("\n=== Portfolio Summary ===");
    println!("Loans:            {}", summaries.len());
    println!("Total principal:  ${:.2}", total_principal);
    println!("Total interest:   ${:.2}", total_interest);
    println!("Interest saved:   ${:.2}", total_saved);
    println!("\nSummary written to {} ({:?})", args.output.display(), start.elapsed());

    Ok(())
}
