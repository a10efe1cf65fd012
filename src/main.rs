//! assessor - Assessment CLI
//!
//! Score rubric-based assessments, rank weak areas and explain how to improve.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use assessor::Result;
use assessor::app::AppContext;
use assessor::cli::Cli;
use assessor::cli::output::{emit_json, format_error, json_error};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                // JSON mode: error envelope on stdout
                if emit_json(&json_error(&e)).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("{}", format_error(&e));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let ctx = AppContext::from_cli(cli)?;
    assessor::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,assessor=info",
        1 => "info,assessor=debug",
        2 => "debug,assessor=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
