//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use std::process::ExitCode;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod check;
pub mod config;
pub mod run;
pub mod score;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<ExitCode> {
    match command {
        Commands::Run(args) => run::run(ctx, args),
        Commands::Score(args) => score::run(ctx, args),
        Commands::Check(args) => check::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
    }
}
