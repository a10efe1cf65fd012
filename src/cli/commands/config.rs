//! assessor config - Inspect configuration

use std::process::ExitCode;

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output;
use crate::error::{AssessError, Result};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration with secrets redacted
    Show,

    /// List the config files consulted, in merge order
    Path,
}

#[derive(Serialize)]
struct ConfigSource {
    path: String,
    exists: bool,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<ExitCode> {
    match args.action {
        ConfigAction::Show => show(ctx)?,
        ConfigAction::Path => paths(ctx)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn show(ctx: &AppContext) -> Result<()> {
    let config = ctx.config.redacted();
    if ctx.json {
        return output::emit_json(&output::json_ok(&config));
    }

    let rendered = toml::to_string_pretty(&config)
        .map_err(|err| AssessError::Config(format!("render config: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn paths(ctx: &AppContext) -> Result<()> {
    let sources: Vec<ConfigSource> = ctx
        .config_sources()
        .into_iter()
        .map(|path| ConfigSource {
            exists: path.exists(),
            path: path.display().to_string(),
        })
        .collect();

    if ctx.json {
        return output::emit_json(&output::json_ok(&sources));
    }
    for source in &sources {
        let marker = if source.exists { "found" } else { "absent" };
        println!("{} ({marker})", source.path);
    }
    Ok(())
}
