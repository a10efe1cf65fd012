//! assessor check - Audit guidance coverage

use std::process::ExitCode;

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::SourceArgs;
use crate::cli::output::{self, HumanLayout, JsonStatus};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

/// Exits non-zero when any (question, level) that can become a weak area has
/// no guidance entry. Orphaned entries only warn.
pub fn run(ctx: &AppContext, args: &CheckArgs) -> Result<ExitCode> {
    let rubric = ctx.load_rubric(args.sources.rubric.as_deref())?;
    let guidance = ctx.load_guidance(args.sources.guidance.as_deref(), true)?;
    let report = guidance.coverage(&rubric);
    let complete = report.is_complete();

    if complete {
        tracing::info!(pairs = report.required, "guidance covers every weak-area pair");
    } else {
        tracing::warn!(missing = report.missing.len(), "guidance coverage incomplete");
    }

    if ctx.json {
        let warnings = report
            .orphans
            .iter()
            .map(|q| format!("guidance entry for unknown question: {q}"))
            .collect();
        let status = if complete {
            JsonStatus::Ok
        } else {
            JsonStatus::Incomplete
        };
        output::emit_json(
            &output::json_ok(&report)
                .with_status(status)
                .with_warnings(warnings),
        )?;
    } else {
        let mut layout = HumanLayout::new(ctx.config.output.wrap_width);
        layout
            .title("Guidance coverage")
            .kv("Covered", &format!("{}/{}", report.covered(), report.required))
            .kv("Fallback", &format!("{} chars", guidance.fallback().chars().count()));

        if !report.missing.is_empty() {
            layout.section("Missing entries");
            for missing in &report.missing {
                layout.bullet(&format!("[{}] {}", missing.level, missing.question));
            }
        }
        if !report.orphans.is_empty() {
            layout.section("Entries for unknown questions");
            for orphan in &report.orphans {
                layout.bullet(orphan);
            }
        }

        layout.blank();
        if complete {
            layout.push_line(style("All weak-area pairs have guidance.").green().to_string());
        } else {
            layout.push_line(
                style(format!("{} pair(s) fall back to the generic message.", report.missing.len()))
                    .red()
                    .to_string(),
            );
        }
        output::emit_human(layout);
    }

    Ok(if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
