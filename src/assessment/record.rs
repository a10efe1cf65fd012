//! Result record and persistence sinks.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::core::{Level, Response, Scorecard, Tier};
use crate::error::{AssessError, Result};
use crate::utils::fs::write_json_atomic;

/// Default result file name, relative to the working directory.
pub const DEFAULT_RESULTS_FILE: &str = "assessment_results.json";

/// Question to chosen option text, serialized as a JSON object in rubric
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap(Vec<(String, String)>);

impl AnswerMap {
    #[must_use]
    pub fn get(&self, question: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(q, _)| q == question)
            .map(|(_, answer)| answer.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, a)| (q.as_str(), a.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AnswerMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (question, answer) in &self.0 {
            map.serialize_entry(question, answer)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionScore {
    pub question: String,
    pub answer: String,
    pub score: u8,
    pub level: Level,
}

impl From<&Response> for QuestionScore {
    fn from(response: &Response) -> Self {
        Self {
            question: response.question.clone(),
            answer: response.option.clone(),
            score: response.weight,
            level: response.level,
        }
    }
}

/// Immutable snapshot of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub run_id: Uuid,
    pub completed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubric_title: Option<String>,
    pub responses: AnswerMap,
    pub scores: Vec<QuestionScore>,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub overall_level: Tier,
}

impl ResultRecord {
    #[must_use]
    pub fn from_scorecard(card: &Scorecard, rubric_title: Option<&str>) -> Self {
        let summary = card.summary();
        Self {
            run_id: Uuid::new_v4(),
            completed_at: Utc::now(),
            rubric_title: rubric_title.map(str::to_string),
            responses: AnswerMap(
                card.responses()
                    .iter()
                    .map(|r| (r.question.clone(), r.option.clone()))
                    .collect(),
            ),
            scores: card.responses().iter().map(QuestionScore::from).collect(),
            total_score: summary.total,
            max_score: summary.max_possible,
            percentage: summary.percentage,
            overall_level: summary.tier,
        }
    }
}

/// Durable storage for result records. One call per run.
pub trait ResultSink: Send + Sync {
    /// Human-readable destination, for logs.
    fn describe(&self) -> String;

    fn persist(&self, record: &ResultRecord) -> Result<PathBuf>;
}

/// Writes each record as a pretty-printed JSON file, replacing the previous
/// one atomically.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileSink {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_FILE)
    }
}

impl ResultSink for JsonFileSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn persist(&self, record: &ResultRecord) -> Result<PathBuf> {
        write_json_atomic(&self.path, record).map_err(|err| AssessError::PersistenceFailure {
            path: self.path.clone(),
            reason: err.to_string(),
        })?;
        tracing::info!(
            path = %self.path.display(),
            run_id = %record.run_id,
            "result record written"
        );
        Ok(self.path.clone())
    }
}
