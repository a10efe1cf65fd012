//! Static guidance table.
//!
//! Hand-authored remediation text keyed by (question text, level), with a
//! generic fallback for keys that have no entry. Loaded once and shared
//! read-only.

pub mod resources;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Level, MAX_WEIGHT, Rubric};
use crate::error::{AssessError, Result};
use crate::utils::fs::{DocumentFormat, parse_document};

pub use resources::{KnowledgeLevel, Resource, ResourceKind, ResourceLibrary};

/// Used when the guidance document does not supply its own fallback.
pub const DEFAULT_FALLBACK: &str = "Review the material for this topic and retake the \
assessment. Focus on why the strongest answer is safer than the one you picked.";

#[derive(Debug, Clone)]
pub struct GuidanceTable {
    fallback: String,
    entries: HashMap<(String, Level), String>,
    resources: ResourceLibrary,
}

#[derive(Debug, Deserialize)]
struct RawGuidance {
    #[serde(default)]
    fallback: Option<String>,
    #[serde(default)]
    entries: Option<Vec<RawEntry>>,
    #[serde(default)]
    resources: Option<ResourceLibrary>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    level: Option<Level>,
    #[serde(default, alias = "explanation")]
    text: Option<String>,
}

/// Where a static lookup got its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidanceMatch<'a> {
    Entry(&'a str),
    Fallback(&'a str),
}

impl<'a> GuidanceMatch<'a> {
    #[must_use]
    pub const fn text(&self) -> &'a str {
        match self {
            Self::Entry(text) | Self::Fallback(text) => text,
        }
    }
}

impl GuidanceTable {
    /// A table with no entries; every lookup yields [`DEFAULT_FALLBACK`].
    #[must_use]
    pub fn fallback_only() -> Self {
        Self {
            fallback: DEFAULT_FALLBACK.to_string(),
            entries: HashMap::new(),
            resources: ResourceLibrary::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AssessError::MalformedGuidance(format!("read {}: {err}", path.display()))
        })?;
        let table = Self::parse(&raw, DocumentFormat::from_path(path))?;
        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            "guidance loaded"
        );
        Ok(table)
    }

    pub fn parse(raw: &str, format: Option<DocumentFormat>) -> Result<Self> {
        let doc: RawGuidance = parse_document(raw, format)
            .map_err(|err| AssessError::MalformedGuidance(err.to_string()))?;

        let raw_entries = doc
            .entries
            .ok_or_else(|| AssessError::MalformedGuidance("missing `entries` list".to_string()))?;

        let mut entries = HashMap::with_capacity(raw_entries.len());
        for (pos, entry) in raw_entries.into_iter().enumerate() {
            let number = pos + 1;
            let question = non_empty(entry.question).ok_or_else(|| {
                AssessError::MalformedGuidance(format!("entry {number} has no question"))
            })?;
            let level = entry.level.ok_or_else(|| {
                AssessError::MalformedGuidance(format!("entry {number} has no level"))
            })?;
            let text = non_empty(entry.text).ok_or_else(|| {
                AssessError::MalformedGuidance(format!("entry {number} has no text"))
            })?;
            if entries.insert((question.clone(), level), text).is_some() {
                return Err(AssessError::MalformedGuidance(format!(
                    "duplicate entry for '{question}' at level {level}"
                )));
            }
        }

        Ok(Self {
            fallback: non_empty(doc.fallback).unwrap_or_else(|| DEFAULT_FALLBACK.to_string()),
            entries,
            resources: doc.resources.unwrap_or_default(),
        })
    }

    /// Exact entry for (question, level), if any.
    #[must_use]
    pub fn lookup(&self, question: &str, level: Level) -> Option<&str> {
        self.entries
            .get(&(question.to_string(), level))
            .map(String::as_str)
    }

    /// Entry for (question, level), or the generic fallback.
    #[must_use]
    pub fn resolve(&self, question: &str, level: Level) -> GuidanceMatch<'_> {
        self.lookup(question, level)
            .map_or(GuidanceMatch::Fallback(&self.fallback), GuidanceMatch::Entry)
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    #[must_use]
    pub const fn resources(&self) -> &ResourceLibrary {
        &self.resources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Audit the table against a rubric.
    ///
    /// Every (question, level) reachable through an option weighted below the
    /// maximum can become a weak area and needs an entry. Entries whose
    /// question is not in the rubric are orphans.
    #[must_use]
    pub fn coverage(&self, rubric: &Rubric) -> CoverageReport {
        let mut required = 0;
        let mut missing = Vec::new();

        for question in rubric.questions() {
            let mut levels: Vec<Level> = question
                .options
                .iter()
                .filter(|o| o.weight < MAX_WEIGHT)
                .map(|o| o.level)
                .collect();
            levels.sort_unstable();
            levels.dedup();

            for level in levels {
                required += 1;
                if self.lookup(&question.text, level).is_none() {
                    missing.push(MissingGuidance {
                        question: question.text.clone(),
                        level,
                    });
                }
            }
        }

        let mut orphans: Vec<String> = self
            .entries
            .keys()
            .filter(|(question, _)| rubric.question(question).is_none())
            .map(|(question, _)| question.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        orphans.sort();

        CoverageReport {
            required,
            missing,
            orphans,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingGuidance {
    pub question: String,
    pub level: Level,
}

/// Result of [`GuidanceTable::coverage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub required: usize,
    pub missing: Vec<MissingGuidance>,
    pub orphans: Vec<String>,
}

impl CoverageReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    #[must_use]
    pub fn covered(&self) -> usize {
        self.required - self.missing.len()
    }

    /// Convert an incomplete report into [`AssessError::GuidanceIncomplete`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(AssessError::GuidanceIncomplete {
                missing: self.missing.len(),
            })
        }
    }
}
