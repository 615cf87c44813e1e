//! Debt Payoff CLI
//!
//! Command-line interface for running payoff simulations and strategy comparisons

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use debt_payoff::debt::{load_debts, load_request};
use debt_payoff::{
    get_recommended_strategy, DebtId, DebtSummary, PayoffCalculationInput, PayoffConfig,
    PayoffSchedule, PayoffStrategy, Recommendation, StrategyComparison, StrategyRunner,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "debt-payoff", version, about = "Simulate debt payoff strategies")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare snowball, avalanche, minimum-only and any requested custom/consolidation plans
    Compare {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write the month-by-month timeline of one strategy to CSV
    Timeline {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value = "avalanche")]
        strategy: PayoffStrategy,

        #[arg(long, default_value = "payoff_timeline.csv")]
        output: PathBuf,
    },
    /// Print summary statistics for the debts
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON calculation request
    #[arg(long, conflicts_with = "debts")]
    input: Option<PathBuf>,

    /// Debts CSV
    #[arg(long)]
    debts: Option<PathBuf>,

    /// Rate buckets CSV keyed by debt_id
    #[arg(long, requires = "debts")]
    buckets: Option<PathBuf>,

    /// Extra monthly payment, overriding the request
    #[arg(long)]
    extra: Option<f64>,

    /// Custom priority order as comma-separated debt ids
    #[arg(long, value_delimiter = ',')]
    priority: Vec<i64>,

    /// Simulation start date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    start: Option<NaiveDate>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct CalculationOutput<'a> {
    comparison: &'a StrategyComparison,
    recommended: &'a Recommendation,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Compare { input, format } => {
            let runner = runner_for(&input);
            let request = load_input(&input)?;
            let comparison = runner.compare(&request);
            let recommended = get_recommended_strategy(&comparison);

            match format {
                OutputFormat::Json => {
                    let output = CalculationOutput {
                        comparison: &comparison,
                        recommended: &recommended,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => print_comparison(&comparison, &recommended),
            }
        }
        Command::Timeline { input, strategy, output } => {
            let runner = runner_for(&input);
            let request = load_input(&input)?;
            let schedule = runner
                .schedule_for(strategy, &request)
                .ok_or_else(|| anyhow!("Strategy {} needs a consolidationInput in the request", strategy))?;

            write_timeline(&output, &schedule)?;
            log::info!("Timeline written to {}", output.display());

            print_schedule_line(&schedule);
            println!("\nPayoff order:");
            for payoff in schedule.payoff_order() {
                println!("  Month {:>3} ({}): {}", payoff.month, payoff.date, payoff.debt_name);
            }
            println!("\nFull timeline written to: {}", output.display());
        }
        Command::Summary { input } => {
            let request = load_input(&input)?;
            print_summary(&DebtSummary::from_debts(&request.debts));
        }
    }

    Ok(())
}

fn runner_for(args: &InputArgs) -> StrategyRunner {
    match args.start {
        Some(start) => StrategyRunner::with_config(PayoffConfig::starting(start)),
        None => StrategyRunner::new(),
    }
}

/// Build and validate the calculation request from the command line
fn load_input(args: &InputArgs) -> Result<PayoffCalculationInput> {
    let mut request = if let Some(path) = &args.input {
        load_request(path).map_err(|e| anyhow!("Failed to load request {}: {}", path.display(), e))?
    } else if let Some(path) = &args.debts {
        let debts = load_debts(path, args.buckets.as_ref())
            .map_err(|e| anyhow!("Failed to load debts {}: {}", path.display(), e))?;
        PayoffCalculationInput::new(debts, 0.0)
    } else {
        bail!("Provide either --input <request.json> or --debts <debts.csv>");
    };

    if let Some(extra) = args.extra {
        request.extra_monthly_payment = extra;
    }
    if !args.priority.is_empty() {
        request.custom_priority_order = Some(args.priority.iter().copied().map(DebtId::Real).collect());
    }

    request.validate().context("Invalid calculation request")?;
    log::info!(
        "Loaded {} debts, extra payment ${:.2}",
        request.debts.len(),
        request.extra_monthly_payment
    );

    Ok(request)
}

fn print_schedule_line(schedule: &PayoffSchedule) {
    println!(
        "{:<14} {:>7} {:>14} {:>12} {:>12}",
        schedule.strategy.as_str(),
        schedule.total_months,
        format!("${:.2}", schedule.total_interest_paid),
        format!("${:.2}", schedule.monthly_payment),
        schedule.debt_free_date.to_string(),
    );
}

fn print_comparison(comparison: &StrategyComparison, recommended: &Recommendation) {
    println!("Debt Payoff Comparison");
    println!("======================\n");

    println!(
        "{:<14} {:>7} {:>14} {:>12} {:>12}",
        "Strategy", "Months", "Interest", "Monthly", "Debt-free"
    );
    println!("{}", "-".repeat(63));

    print_schedule_line(&comparison.snowball);
    print_schedule_line(&comparison.avalanche);
    if let Some(custom) = &comparison.custom {
        print_schedule_line(custom);
    }
    if let Some(consolidation) = &comparison.consolidation {
        print_schedule_line(&consolidation.payoff_schedule);
    }
    print_schedule_line(&comparison.minimum_only);

    if let Some(consolidation) = &comparison.consolidation {
        println!("\nConsolidation:");
        println!("  Balance: ${:.2} at {:.2}%", consolidation.consolidated_balance, consolidation.new_interest_rate);
        println!("  New minimum payment: ${:.2}", consolidation.new_minimum_payment);
        println!("  Interest saved: ${:.2}", consolidation.savings.interest_saved);
        println!("  Months saved: {}", consolidation.savings.months_saved);
    }

    println!("\nRecommended: {}", recommended.strategy);
    println!("  {}", recommended.reason);
}

fn print_summary(summary: &DebtSummary) {
    println!("Debt Summary:");
    println!("  Debts: {}", summary.total_debts);
    println!("  Total Balance: ${:.2}", summary.total_balance);
    println!("  Original Balance: ${:.2}", summary.total_original_balance);
    println!("  Total Minimum Payment: ${:.2}", summary.total_minimum_payment);
    println!("  Weighted Average Rate: {:.2}%", summary.weighted_average_interest_rate);
    println!("  Paid So Far: ${:.2} ({:.1}%)", summary.total_paid, summary.percent_paid);
}

fn write_timeline(path: &Path, schedule: &PayoffSchedule) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "Month,Date,DebtId,DebtName,Payment,Principal,Interest,RemainingBalance,Bucket,BucketRate,BucketPayment,BucketRemaining,RetroactiveInterest")?;

    for row in &schedule.timeline {
        for debt in &row.debts {
            writeln!(
                out,
                "{},{},{},\"{}\",{:.2},{:.2},{:.2},{:.2},,,,,",
                row.month,
                row.date,
                debt.debt_id,
                debt.debt_name,
                debt.payment,
                debt.principal,
                debt.interest,
                debt.remaining_balance,
            )?;

            for bucket in debt.bucket_breakdown.iter().flatten() {
                writeln!(
                    out,
                    "{},{},{},\"{}\",,,{:.2},,\"{}\",{:.4},{:.2},{:.2},{:.2}",
                    row.month,
                    row.date,
                    debt.debt_id,
                    debt.debt_name,
                    bucket.interest,
                    bucket.bucket_name,
                    bucket.interest_rate,
                    bucket.payment,
                    bucket.remaining_balance,
                    bucket.retroactive_interest,
                )?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
