//! assessor run - Take the assessment end to end

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::assessment::{
    AnswerSheet, AnswerSource, Assessor, InteractiveAnswers, JsonFileSink, Outcome, PersistStatus,
    ResultSink,
};
use crate::cli::SourceArgs;
use crate::cli::output::{self, HumanLayout};
use crate::core::MAX_WEIGHT;
use crate::error::Result;
use crate::explain::ExplanationSource;
use crate::guidance::{GuidanceTable, KnowledgeLevel, Resource, ResourceKind};
use crate::utils::format::format_percentage;

/// Tips shown at the end of the report.
const TIPS_SHOWN: usize = 4;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Answer sheet; prompts on stdin when omitted
    #[arg(long, value_name = "PATH")]
    pub answers: Option<PathBuf>,

    /// Number of weak areas to explain (default: assessment.top_priorities)
    #[arg(long, value_name = "N", conflicts_with = "all")]
    pub top: Option<usize>,

    /// Explain every weak area
    #[arg(long)]
    pub all: bool,

    /// Never contact the remote explanation service
    #[arg(long)]
    pub no_remote: bool,

    /// Result record path (overrides assessment.results)
    #[arg(long, value_name = "PATH", conflicts_with = "no_save")]
    pub results: Option<PathBuf>,

    /// Do not write a result record
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    outcome: &'a Outcome,
    knowledge_level: KnowledgeLevel,
    safe_zone: bool,
    resources: &'a [Resource],
    tips: &'a [String],
    exercises: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    challenge: Option<&'a str>,
}

pub fn run(ctx: &AppContext, args: &RunArgs) -> Result<ExitCode> {
    let rubric = Arc::new(ctx.load_rubric(args.sources.rubric.as_deref())?);
    let guidance = Arc::new(ctx.load_guidance(args.sources.guidance.as_deref(), false)?);
    let assessor = Assessor::builder()
        .rubric(Arc::clone(&rubric))
        .guidance(Arc::clone(&guidance))
        .remote(ctx.remote_chain(args.no_remote)?)
        .build();

    let mut source: Box<dyn AnswerSource> = match &args.answers {
        Some(path) => Box::new(AnswerSheet::load(path)?),
        None => {
            // Keep stdout clean for the JSON document.
            let prompts: Box<dyn Write> = if ctx.json {
                Box::new(io::stderr())
            } else {
                Box::new(io::stdout())
            };
            Box::new(InteractiveAnswers::new(io::stdin().lock(), prompts))
        }
    };

    let top = if args.all {
        None
    } else {
        Some(args.top.unwrap_or(ctx.config.assessment.top_priorities))
    };
    let sink = (!args.no_save).then(|| {
        JsonFileSink::new(
            args.results
                .clone()
                .unwrap_or_else(|| ctx.config.assessment.results.clone()),
        )
    });

    let outcome = assessor.run(
        source.as_mut(),
        top,
        sink.as_ref().map(|s| s as &dyn ResultSink),
    )?;

    let knowledge_level = KnowledgeLevel::from_percentage(outcome.record.percentage);
    if ctx.json {
        emit_json(&outcome, knowledge_level, &guidance)?;
    } else {
        emit_human_report(ctx, &outcome, knowledge_level, &guidance);
    }
    Ok(ExitCode::SUCCESS)
}

fn emit_json(
    outcome: &Outcome,
    knowledge_level: KnowledgeLevel,
    guidance: &GuidanceTable,
) -> Result<()> {
    let library = guidance.resources();
    let warnings = match &outcome.persistence {
        PersistStatus::Failed { reason } => vec![format!("result record not saved: {reason}")],
        _ => Vec::new(),
    };
    let report = RunReport {
        outcome,
        knowledge_level,
        safe_zone: outcome.record.overall_level.is_safe_zone(),
        resources: library.for_level(knowledge_level),
        tips: library.tips(TIPS_SHOWN),
        exercises: library.exercises(),
        challenge: library.challenge(),
    };
    output::emit_json(&output::json_ok(report).with_warnings(warnings))
}

fn emit_human_report(
    ctx: &AppContext,
    outcome: &Outcome,
    knowledge_level: KnowledgeLevel,
    guidance: &GuidanceTable,
) {
    let record = &outcome.record;
    let mut layout = HumanLayout::new(ctx.config.output.wrap_width);

    layout
        .blank()
        .title(record.rubric_title.as_deref().unwrap_or("Assessment results"))
        .kv("Total score", &format!("{}/{}", record.total_score, record.max_score))
        .kv("Percentage", &format_percentage(record.percentage))
        .kv("Overall level", &style(record.overall_level).cyan().bold().to_string());
    let banner = if record.overall_level.is_safe_zone() {
        style("You're in the safe zone. Your security awareness is excellent.")
            .green()
            .bold()
    } else {
        style("Your security awareness needs improvement. Start with the priority areas below.")
            .yellow()
            .bold()
    };
    layout.blank().push_line(banner.to_string());

    layout.section("Question analysis");
    for (idx, item) in record.scores.iter().enumerate() {
        let mark = if item.score >= MAX_WEIGHT {
            style("✓").green().to_string()
        } else {
            style("✗").red().to_string()
        };
        layout
            .blank()
            .wrapped(&item.question, &format!("{}. {mark} ", idx + 1), "     ")
            .wrapped(&format!("Your answer: {}", item.answer), "     ", "     ")
            .push_line(format!("     Score: {}/{MAX_WEIGHT} ({})", item.score, item.level));
        if item.score < MAX_WEIGHT {
            let hint = guidance.resolve(&item.question, item.level);
            layout.wrapped(&format!("Improve: {}", hint.text()), "     ", "     ");
        }
    }

    layout.section("Priority areas");
    if outcome.weak_areas.is_empty() {
        layout.push_line("Every answer is at the top level. Nothing to remediate.");
    }
    for (idx, remediation) in outcome.remediations.iter().enumerate() {
        let area = &remediation.area;
        layout
            .blank()
            .wrapped(&area.question, &format!("{}. ", idx + 1), "   ")
            .push_line(format!(
                "   Current level: {}  Score: {}/{MAX_WEIGHT}",
                area.level, area.score
            ))
            .wrapped(&remediation.explanation.text, "   ", "   ");
        if !matches!(remediation.explanation.source, ExplanationSource::Static) {
            layout.push_line(
                style(format!("   source: {}", remediation.explanation.source))
                    .dim()
                    .to_string(),
            );
        }
    }
    let unexplained = outcome.weak_areas.len() - outcome.remediations.len();
    if unexplained > 0 {
        layout.blank().push_line(
            style(format!("{unexplained} more weak area(s); use --all to explain every one."))
                .dim()
                .to_string(),
        );
    }

    let library = guidance.resources();
    let resources = library.for_level(knowledge_level);
    if !resources.is_empty() {
        layout.section(&format!(
            "Learning resources ({} level)",
            knowledge_level.as_str().to_uppercase()
        ));
        for (idx, resource) in resources.iter().enumerate() {
            layout.blank().push_line(format!("{}. {}", idx + 1, resource.title));
            if !resource.description.is_empty() {
                layout.wrapped(&resource.description, "   ", "   ");
            }
            match resource.kind {
                ResourceKind::Article => {
                    if let Some(url) = &resource.url {
                        layout.push_line(format!("   {}", style(url).underlined()));
                    }
                }
                ResourceKind::Video => {
                    if let Some(platform) = &resource.platform {
                        layout.push_line(format!("   Platform: {platform}"));
                    }
                }
            }
        }
    }

    let tips = library.tips(TIPS_SHOWN);
    if !tips.is_empty() {
        layout.section("Quick tips");
        for tip in tips {
            layout.bullet(tip);
        }
    }

    let exercises = library.exercises();
    if !exercises.is_empty() {
        layout.section("Practical exercises");
        for (idx, exercise) in exercises.iter().enumerate() {
            layout.wrapped(exercise, &format!("{}. ", idx + 1), "   ");
        }
    }
    if let Some(challenge) = library.challenge() {
        layout
            .blank()
            .push_line(style(format!("Challenge: {challenge}")).bold().to_string());
    }

    layout.blank();
    match &outcome.persistence {
        PersistStatus::Written { path } => {
            layout.push_line(format!("Results saved to {}", path.display()));
        }
        PersistStatus::Failed { reason } => {
            layout.push_line(
                style(format!("Warning: results were not saved: {reason}"))
                    .yellow()
                    .to_string(),
            );
        }
        PersistStatus::Skipped => {}
    }

    output::emit_human(layout);
}
