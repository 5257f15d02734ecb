//! fincalc CLI
//!
//! Runs one calculator per invocation and prints the result as JSON.
//!
//! ```bash
//! fincalc loan --principal 200000 --rate 0.045 --years 30 --schedule loan.csv
//! fincalc credit-card --balance 5000 --rate 0.18 --payment 200
//! fincalc irr -100 39 59 55 20
//! fincalc json mortgage params.json
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fincalc::converters::{self, RateTable, Unit};
use fincalc::export::write_csv_file;
use fincalc::growth::{
    ContributionTiming, DepositPlan, WithdrawalKind, WithdrawalPlan, NEVER_DEPLETED,
    NEVER_PAID_OFF,
};
use fincalc::solvers::{
    irr_with_config, required_rate_for_target, SolveMethod, SolverConfig, TargetRateParams,
};
use fincalc::{
    calculate_compound_interest, calculate_depletion, calculate_loan, calculate_mortgage,
    calculate_payoff, CompoundInterestParams, Compounding, CreditCardParams, DepletionParams,
    Frequency, IrrParams, IrrResult, LoanParams, MortgageParams,
};

#[derive(Parser)]
#[command(name = "fincalc")]
#[command(version, about = "Loan, savings, IRR and conversion calculators", long_about = None)]
struct Cli {
    /// Write the period-by-period schedule to this CSV file
    #[arg(long, global = true)]
    schedule: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-rate loan amortization
    Loan(LoanArgs),
    /// Mortgage payment with taxes, insurance, PMI and HOA
    Mortgage(MortgageArgs),
    /// Compound growth with optional deposits and withdrawals
    Compound(CompoundArgs),
    /// Months to pay off a credit card at a fixed payment
    CreditCard(CreditCardArgs),
    /// How long savings last under monthly withdrawals
    Depletion(DepletionArgs),
    /// Internal rate of return of a cash flow series
    Irr(IrrArgs),
    /// Rate needed to grow a present value into a target
    TargetRate(TargetArgs),
    /// Compound annual growth rate
    Cagr(CagrArgs),
    /// Unit or currency conversion
    Convert(ConvertArgs),
    /// Run a calculator from a JSON parameter file
    Json(JsonArgs),
}

#[derive(Args)]
struct LoanArgs {
    #[arg(long)]
    principal: f64,
    /// Annual rate as a decimal (0.045 for 4.5%)
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, default_value_t = Frequency::Monthly)]
    frequency: Frequency,
    /// Extra principal paid every period
    #[arg(long, default_value_t = 0.0)]
    extra: f64,
    /// Origination date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
}

#[derive(Args)]
struct MortgageArgs {
    #[arg(long)]
    price: f64,
    #[arg(long)]
    down: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long, default_value_t = 30.0)]
    years: f64,
    /// Annual property tax as a fraction of the price
    #[arg(long, default_value_t = 0.0)]
    tax_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    insurance: f64,
    /// Annual PMI premium as a fraction of the loan amount
    #[arg(long, default_value_t = 0.0)]
    pmi_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    hoa: f64,
    #[arg(long, default_value_t = 0.0)]
    extra: f64,
}

#[derive(Args)]
struct CompoundArgs {
    #[arg(long)]
    principal: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    #[arg(long, default_value_t = Compounding::Monthly)]
    compounding: Compounding,
    #[arg(long)]
    deposit: Option<f64>,
    #[arg(long, default_value_t = Frequency::Monthly)]
    deposit_frequency: Frequency,
    /// Deposit at the start of each period instead of the end
    #[arg(long)]
    deposit_at_start: bool,
    #[arg(long, default_value_t = 0.0)]
    deposit_growth: f64,
    #[arg(long)]
    withdrawal: Option<f64>,
    #[arg(long, default_value_t = Frequency::Monthly)]
    withdrawal_frequency: Frequency,
    #[arg(long, value_enum, default_value_t = WithdrawalArg::Fixed)]
    withdrawal_kind: WithdrawalArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WithdrawalArg {
    Fixed,
    PercentOfBalance,
    PercentOfInterest,
}

impl From<WithdrawalArg> for WithdrawalKind {
    fn from(arg: WithdrawalArg) -> Self {
        match arg {
            WithdrawalArg::Fixed => WithdrawalKind::FixedAmount,
            WithdrawalArg::PercentOfBalance => WithdrawalKind::PercentOfBalance,
            WithdrawalArg::PercentOfInterest => WithdrawalKind::PercentOfInterest,
        }
    }
}

#[derive(Args)]
struct CreditCardArgs {
    #[arg(long)]
    balance: f64,
    /// APR as a decimal
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    payment: f64,
}

#[derive(Args)]
struct DepletionArgs {
    #[arg(long)]
    balance: f64,
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    withdrawal: f64,
    /// Yearly increase of the withdrawal
    #[arg(long, default_value_t = 0.0)]
    increase: f64,
}

#[derive(Args)]
struct IrrArgs {
    /// Cash flows, first one usually negative
    #[arg(required = true, allow_negative_numbers = true)]
    flows: Vec<f64>,
    #[arg(long, default_value_t = 1)]
    periods_per_year: u32,
    #[arg(long)]
    guess: Option<f64>,
    #[arg(long, default_value_t = 100)]
    max_iterations: u32,
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,
}

#[derive(Args)]
struct TargetArgs {
    #[arg(long)]
    present: f64,
    #[arg(long)]
    target: f64,
    #[arg(long)]
    years: f64,
    /// Contribution at the end of every period
    #[arg(long, default_value_t = 0.0)]
    contribution: f64,
    #[arg(long, default_value_t = 12)]
    periods_per_year: u32,
}

#[derive(Args)]
struct CagrArgs {
    #[arg(long)]
    begin: f64,
    #[arg(long)]
    end: f64,
    #[arg(long)]
    years: f64,
}

#[derive(Args)]
struct ConvertArgs {
    value: f64,
    from: String,
    to: String,
    /// Rate table JSON (`/latest` response) for currency conversion
    #[arg(long)]
    rates: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Calculator {
    Loan,
    Mortgage,
    Compound,
    CreditCard,
    Depletion,
    Irr,
    TargetRate,
}

#[derive(Args)]
struct JsonArgs {
    #[arg(value_enum)]
    calculator: Calculator,
    file: PathBuf,
}

#[derive(Serialize)]
struct RateOutput {
    rate: f64,
}

#[derive(Serialize)]
struct ConversionOutput<'a> {
    value: f64,
    from: &'a str,
    to: &'a str,
    result: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Loan(args) => {
            let mut params = LoanParams::new(args.principal, args.rate, args.years)
                .with_frequency(args.frequency)
                .with_extra_payment(args.extra);
            params.start_date = args.start;
            run_loan(&cli_output(&cli.schedule, cli.compact), &params)
        }
        Commands::Mortgage(args) => {
            let params = MortgageParams {
                property_tax_rate: args.tax_rate,
                annual_insurance: args.insurance,
                pmi_rate: args.pmi_rate,
                monthly_hoa: args.hoa,
                extra_payment: args.extra,
                ..MortgageParams::new(args.price, args.down, args.rate, args.years)
            };
            run_mortgage(&cli_output(&cli.schedule, cli.compact), &params)
        }
        Commands::Compound(args) => {
            let mut params =
                CompoundInterestParams::new(args.principal, args.rate, args.years, args.compounding);
            if let Some(amount) = args.deposit {
                params = params.with_deposit(DepositPlan {
                    amount,
                    frequency: args.deposit_frequency,
                    timing: if args.deposit_at_start {
                        ContributionTiming::Beginning
                    } else {
                        ContributionTiming::End
                    },
                    annual_growth: args.deposit_growth,
                });
            }
            if let Some(amount) = args.withdrawal {
                params = params.with_withdrawal(WithdrawalPlan {
                    amount,
                    frequency: args.withdrawal_frequency,
                    kind: args.withdrawal_kind.into(),
                    annual_growth: 0.0,
                });
            }
            run_compound(&cli_output(&cli.schedule, cli.compact), &params)
        }
        Commands::CreditCard(args) => {
            let params = CreditCardParams::new(args.balance, args.rate, args.payment);
            run_credit_card(&cli_output(&cli.schedule, cli.compact), &params)
        }
        Commands::Depletion(args) => {
            let params = DepletionParams {
                annual_withdrawal_increase: args.increase,
                ..DepletionParams::new(args.balance, args.rate, args.withdrawal)
            };
            run_depletion(&cli_output(&cli.schedule, cli.compact), &params)
        }
        Commands::Irr(args) => {
            let params = IrrParams {
                cash_flows: args.flows,
                periods_per_year: args.periods_per_year,
                guess: args.guess,
            };
            let config = SolverConfig {
                max_iterations: args.max_iterations,
                tolerance: args.tolerance,
            };
            run_irr(&cli_output(&cli.schedule, cli.compact), &params, &config)
        }
        Commands::TargetRate(args) => {
            let params = TargetRateParams {
                present_value: args.present,
                future_value: args.target,
                years: args.years,
                contribution: args.contribution,
                periods_per_year: args.periods_per_year,
            };
            run_target(&cli_output(&cli.schedule, cli.compact), &params)
        }
        Commands::Cagr(args) => {
            let rate = converters::cagr(args.begin, args.end, args.years)?;
            print_json(&RateOutput { rate }, cli.compact)
        }
        Commands::Convert(args) => run_convert(&args, cli.compact),
        Commands::Json(args) => {
            let out = cli_output(&cli.schedule, cli.compact);
            match args.calculator {
                Calculator::Loan => run_loan(&out, &read_params(&args.file)?),
                Calculator::Mortgage => run_mortgage(&out, &read_params(&args.file)?),
                Calculator::Compound => run_compound(&out, &read_params(&args.file)?),
                Calculator::CreditCard => run_credit_card(&out, &read_params(&args.file)?),
                Calculator::Depletion => run_depletion(&out, &read_params(&args.file)?),
                Calculator::Irr => run_irr(&out, &read_params(&args.file)?, &SolverConfig::default()),
                Calculator::TargetRate => run_target(&out, &read_params(&args.file)?),
            }
        }
    }
}

/// Where results go: stdout JSON plus an optional schedule CSV
struct Output<'a> {
    schedule: Option<&'a Path>,
    compact: bool,
}

fn cli_output(schedule: &Option<PathBuf>, compact: bool) -> Output<'_> {
    Output {
        schedule: schedule.as_deref(),
        compact,
    }
}

impl Output<'_> {
    fn emit<T: Serialize, R: Serialize>(&self, result: &T, rows: &[R]) -> Result<()> {
        if let Some(path) = self.schedule {
            write_csv_file(path, rows)
                .with_context(|| format!("Failed to write schedule to {}", path.display()))?;
            info!("schedule written to {}", path.display());
        }
        print_json(result, self.compact)
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

fn read_params<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse parameters in {}", path.display()))
}

fn run_loan(out: &Output, params: &LoanParams) -> Result<()> {
    params.validate().context("Invalid loan parameters")?;
    let result = calculate_loan(params);
    out.emit(&result, &result.schedule)
}

fn run_mortgage(out: &Output, params: &MortgageParams) -> Result<()> {
    params.validate().context("Invalid mortgage parameters")?;
    let result = calculate_mortgage(params);
    out.emit(&result, &result.loan.schedule)
}

fn run_compound(out: &Output, params: &CompoundInterestParams) -> Result<()> {
    params.validate().context("Invalid compound interest parameters")?;
    let result = calculate_compound_interest(params);
    out.emit(&result, &result.breakdown)
}

fn run_credit_card(out: &Output, params: &CreditCardParams) -> Result<()> {
    params.validate().context("Invalid credit card parameters")?;
    let result = calculate_payoff(params);
    if result.months_to_payoff == NEVER_PAID_OFF {
        eprintln!("Warning: the payment never pays off this balance");
    }
    out.emit(&result, &result.schedule)
}

fn run_depletion(out: &Output, params: &DepletionParams) -> Result<()> {
    params.validate().context("Invalid depletion parameters")?;
    let result = calculate_depletion(params);
    if result.months_until_depleted == NEVER_DEPLETED {
        eprintln!("Note: savings outlast the simulation horizon");
    }
    out.emit(&result, &result.schedule)
}

fn run_irr(out: &Output, params: &IrrParams, config: &SolverConfig) -> Result<()> {
    let result = irr_with_config(params, config);
    if let Some(warning) = irr_warning(&result)? {
        eprintln!("Warning: {}", warning);
    }
    out.emit::<_, ()>(&result, &[])
}

/// Approximations are reported with a warning; only a missing IRR is an error
fn irr_warning(result: &IrrResult) -> Result<Option<&'static str>> {
    match result.method {
        SolveMethod::NoSolution => bail!("No IRR exists: the cash flows never change sign"),
        SolveMethod::Approximation => Ok(Some("solvers did not converge; rate is an approximation")),
        _ => Ok(None),
    }
}

fn run_target(out: &Output, params: &TargetRateParams) -> Result<()> {
    let result = required_rate_for_target(params, &SolverConfig::default())
        .context("Could not solve for the target rate")?;
    out.emit::<_, ()>(&result, &[])
}

fn run_convert(args: &ConvertArgs, compact: bool) -> Result<()> {
    let result = match &args.rates {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open rate table {}", path.display()))?;
            let table = RateTable::from_reader(BufReader::new(file))?;
            table.convert(args.value, &args.from, &args.to)?
        }
        None => {
            let from: Unit = args.from.parse()?;
            let to: Unit = args.to.parse()?;
            converters::units::convert(args.value, from, to)?
        }
    };

    print_json(
        &ConversionOutput {
            value: args.value,
            from: &args.from,
            to: &args.to,
            result,
        },
        compact,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fincalc::irr;

    #[test]
    fn test_irr_approximation_is_reported_not_rejected() {
        let result = irr(&IrrParams::new(vec![-1.0, 100.0]));
        assert_eq!(result.method, SolveMethod::Approximation);
        assert!(irr_warning(&result).unwrap().is_some());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["method"], "approximation");
    }

    #[test]
    fn test_irr_outcomes() {
        let converged = irr(&IrrParams::new(vec![-100.0, 110.0]));
        assert_eq!(irr_warning(&converged).unwrap(), None);

        let no_sign_change = irr(&IrrParams::new(vec![100.0, 110.0]));
        assert!(irr_warning(&no_sign_change).is_err());
    }
}
