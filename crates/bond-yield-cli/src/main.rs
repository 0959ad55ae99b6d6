mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bond_yield_core::BondError;
use commands::bond::{BondArgs, CalculateArgs, ValidateArgs};

/// Bond yield and cash-flow calculations
#[derive(Parser)]
#[command(
    name = "byc",
    version,
    about = "Bond yield, yield-to-maturity and cash-flow schedule calculations",
    long_about = "A CLI for fixed-rate bond analytics with decimal precision. Computes \
                  current yield, yield to maturity (Newton-Raphson), total interest, \
                  premium/discount status and the projected coupon schedule from face \
                  value, coupon rate, market price, years to maturity and coupon frequency."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate yields, total interest, premium/discount and the cash-flow schedule
    Calculate(CalculateArgs),
    /// Project the coupon schedule only
    Schedule(BondArgs),
    /// Check a bond request and list every field violation
    Validate(ValidateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the result; logs go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::bond::run_calculate(args),
        Commands::Schedule(args) => commands::bond::run_schedule(args),
        Commands::Validate(args) => commands::bond::run_validate(args),
        Commands::Version => {
            println!("byc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            match e.downcast_ref::<BondError>() {
                Some(BondError::Validation(errors)) => {
                    eprintln!(
                        "{}: {} field(s) failed validation",
                        "error".red().bold(),
                        errors.len()
                    );
                    for field_error in errors {
                        eprintln!("  - {}: {}", field_error.field.bold(), field_error.message);
                    }
                }
                _ => eprintln!("{}: {}", "error".red().bold(), e),
            }
            process::exit(1);
        }
    }
}
