//! assessor score - Score an answer sheet

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::assessment::{AnswerSheet, AnswerSource};
use crate::cli::output::{self, HumanLayout};
use crate::core::{MAX_WEIGHT, Response, ScoreSummary, score};
use crate::error::Result;
use crate::utils::format::format_percentage;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Rubric document (overrides assessment.rubric)
    #[arg(long, value_name = "PATH")]
    pub rubric: Option<PathBuf>,

    /// Answer sheet (JSON/YAML: question text or id -> option text or number)
    #[arg(long, value_name = "PATH")]
    pub answers: PathBuf,
}

#[derive(Serialize)]
struct ScoreReport<'a> {
    summary: &'a ScoreSummary,
    responses: &'a [Response],
}

pub fn run(ctx: &AppContext, args: &ScoreArgs) -> Result<ExitCode> {
    let rubric = ctx.load_rubric(args.rubric.as_deref())?;
    let selections = AnswerSheet::load(&args.answers)?.collect(&rubric)?;
    let card = score(&rubric, &selections)?;

    if ctx.json {
        output::emit_json(&output::json_ok(ScoreReport {
            summary: card.summary(),
            responses: card.responses(),
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    let summary = card.summary();
    let mut layout = HumanLayout::new(ctx.config.output.wrap_width);
    layout
        .title(rubric.title().unwrap_or("Assessment score"))
        .kv("Total score", &format!("{}/{}", summary.total, summary.max_possible))
        .kv("Percentage", &format_percentage(summary.percentage))
        .kv("Overall level", &summary.tier.to_string())
        .section("Per question");
    for (idx, response) in card.responses().iter().enumerate() {
        let mark = if response.is_perfect() {
            style("✓").green().to_string()
        } else {
            style("✗").red().to_string()
        };
        layout.wrapped(&response.question, &format!("{}. {mark} ", idx + 1), "     ");
        layout.push_line(format!(
            "     {}/{MAX_WEIGHT} ({})",
            response.weight, response.level
        ));
    }
    output::emit_human(layout);
    Ok(ExitCode::SUCCESS)
}
