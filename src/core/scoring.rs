//! Scoring engine.
//!
//! Converts one selection per rubric question into recorded responses, a
//! total, a percentage and an overall [`Tier`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::rubric::{Level, MAX_WEIGHT, Rubric};
use crate::error::{AssessError, Result};

/// Tier thresholds, evaluated high to low; the lower bound is inclusive.
pub const TIER_LADDER: [(f64, Tier); 3] = [
    (75.0, Tier::Expert),
    (50.0, Tier::Intermediate),
    (25.0, Tier::Basic),
];

/// Overall proficiency classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Beginner,
    Basic,
    Intermediate,
    Expert,
}

impl Tier {
    /// Classify a percentage. No rounding is applied: 74.99 is `Intermediate`.
    #[must_use]
    pub fn classify(percentage: f64) -> Self {
        TIER_LADDER
            .iter()
            .find(|(threshold, _)| percentage >= *threshold)
            .map_or(Self::Beginner, |(_, tier)| *tier)
    }

    /// Expert tier and above count as the safe zone.
    #[must_use]
    pub const fn is_safe_zone(&self) -> bool {
        matches!(self, Self::Expert)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The respondent's choice for one question, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub question: String,
    pub option: String,
}

impl Selection {
    pub fn new(question: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            option: option.into(),
        }
    }
}

/// A validated selection with the weight and level the rubric assigns to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub question: String,
    pub option: String,
    pub weight: u8,
    pub level: Level,
}

impl Response {
    #[must_use]
    pub const fn is_perfect(&self) -> bool {
        self.weight >= MAX_WEIGHT
    }
}

/// Totals derived from a response set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total: u32,
    pub max_possible: u32,
    pub percentage: f64,
    pub tier: Tier,
}

impl ScoreSummary {
    /// Derive the summary from responses. Always recomputed from its inputs.
    #[must_use]
    pub fn from_responses(responses: &[Response]) -> Self {
        let total: u32 = responses.iter().map(|r| u32::from(r.weight)).sum();
        let max_possible =
            u32::from(MAX_WEIGHT) * u32::try_from(responses.len()).unwrap_or(u32::MAX);
        let percentage = if max_possible == 0 {
            0.0
        } else {
            f64::from(total) / f64::from(max_possible) * 100.0
        };
        Self {
            total,
            max_possible,
            percentage,
            tier: Tier::classify(percentage),
        }
    }
}

/// Responses in rubric order plus their summary.
#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    responses: Vec<Response>,
    summary: ScoreSummary,
}

impl Scorecard {
    #[must_use]
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    #[must_use]
    pub const fn summary(&self) -> &ScoreSummary {
        &self.summary
    }
}

/// Score a selection set against the rubric.
///
/// Every rubric question must be answered exactly once with one of its
/// options. Responses come back in rubric order regardless of the order of
/// `selections`.
pub fn score(rubric: &Rubric, selections: &[Selection]) -> Result<Scorecard> {
    let mut slots: Vec<Option<Response>> = vec![None; rubric.question_count()];
    let mut answered = HashSet::with_capacity(selections.len());

    for selection in selections {
        let invalid = |reason: String| AssessError::InvalidSelection {
            question: selection.question.clone(),
            option: selection.option.clone(),
            reason,
        };

        let position = rubric
            .position(selection.question.trim())
            .ok_or_else(|| invalid("question is not part of the rubric".to_string()))?;
        if !answered.insert(position) {
            return Err(invalid("question answered more than once".to_string()));
        }
        let question = &rubric.questions()[position];
        let option = question
            .option(selection.option.trim())
            .ok_or_else(|| invalid(format!("'{}' is not an option", selection.option)))?;

        slots[position] = Some(Response {
            question: question.text.clone(),
            option: option.text.clone(),
            weight: option.weight,
            level: option.level,
        });
    }

    let responses = slots
        .into_iter()
        .zip(rubric.questions())
        .map(|(slot, question)| {
            slot.ok_or_else(|| AssessError::IncompleteResponseSet {
                question: question.text.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = ScoreSummary::from_responses(&responses);
    tracing::debug!(
        total = summary.total,
        max = summary.max_possible,
        percentage = summary.percentage,
        tier = %summary.tier,
        "scored response set"
    );

    Ok(Scorecard { responses, summary })
}
