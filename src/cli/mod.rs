//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Assessor - Score rubric-based assessments and explain weak areas
#[derive(Parser, Debug)]
#[command(name = "assessor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/assessor/config.toml + ./assessor.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take the assessment: score, prioritize, explain and record
    Run(commands::run::RunArgs),

    /// Score an answer sheet without explanations or a result record
    Score(commands::score::ScoreArgs),

    /// Audit guidance coverage against a rubric
    Check(commands::check::CheckArgs),

    /// Inspect configuration
    Config(commands::config::ConfigArgs),
}

/// Input documents shared by the assessment commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Rubric document (overrides assessment.rubric)
    #[arg(long, value_name = "PATH")]
    pub rubric: Option<PathBuf>,

    /// Guidance document (overrides assessment.guidance)
    #[arg(long, value_name = "PATH")]
    pub guidance: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "assessor", "--json", "-vv", "run", "--rubric", "r.json", "--answers", "a.yaml",
            "--top", "2", "--no-remote", "--no-save",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.sources.rubric, Some(PathBuf::from("r.json")));
                assert_eq!(args.answers, Some(PathBuf::from("a.yaml")));
                assert_eq!(args.top, Some(2));
                assert!(args.no_remote);
                assert!(args.no_save);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn top_conflicts_with_all() {
        assert!(Cli::try_parse_from(["assessor", "run", "--top", "2", "--all"]).is_err());
    }

    #[test]
    fn score_requires_answers() {
        assert!(Cli::try_parse_from(["assessor", "score"]).is_err());
    }
}
