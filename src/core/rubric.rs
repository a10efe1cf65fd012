//! Rubric model and loader.
//!
//! A rubric is the fixed list of questions, each carrying an ordered list of
//! options with a weight (0-10) and a qualitative [`Level`]. It is loaded once
//! and never mutated afterwards.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AssessError, Result};
use crate::utils::fs::{DocumentFormat, parse_document};

/// Weight of a fully correct answer.
pub const MAX_WEIGHT: u8 = 10;

/// Qualitative sophistication of an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Wrong,
    Basic,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Self; 4] = [Self::Wrong, Self::Basic, Self::Intermediate, Self::Advanced];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wrong => "wrong",
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wrong" | "incorrect" => Ok(Self::Wrong),
            "basic" => Ok(Self::Basic),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!(
                "unknown level '{other}' (expected wrong|basic|intermediate|advanced)"
            )),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One selectable answer for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub text: String,
    pub weight: u8,
    pub level: Level,
}

/// A rubric question. Its text is its identity within the rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Find an option by its exact text.
    #[must_use]
    pub fn option(&self, text: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.text == text)
    }

    /// Find an option by its 1-based display number.
    #[must_use]
    pub fn option_number(&self, number: usize) -> Option<&AnswerOption> {
        number.checked_sub(1).and_then(|idx| self.options.get(idx))
    }

    /// Distinct levels offered by this question, in sophistication order.
    #[must_use]
    pub fn levels(&self) -> Vec<Level> {
        let mut levels: Vec<Level> = self.options.iter().map(|o| o.level).collect();
        levels.sort_unstable();
        levels.dedup();
        levels
    }
}

/// The loaded, validated rubric.
#[derive(Debug, Clone, Serialize)]
pub struct Rubric {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    questions: Vec<Question>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct RawRubric {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    questions: Option<Vec<RawQuestion>>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default, alias = "questionId")]
    id: Option<String>,
    #[serde(default, alias = "text")]
    question: Option<String>,
    #[serde(default)]
    options: Option<Vec<RawOption>>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "weight")]
    marks: Option<i64>,
    #[serde(default)]
    level: Option<String>,
}

impl Rubric {
    /// Load a rubric document (JSON or YAML) from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AssessError::malformed_rubric(None, format!("read {}: {err}", path.display()))
        })?;
        let rubric = Self::parse(&raw, DocumentFormat::from_path(path))?;
        tracing::info!(
            path = %path.display(),
            questions = rubric.question_count(),
            "rubric loaded"
        );
        Ok(rubric)
    }

    /// Parse and validate a rubric document.
    pub fn parse(raw: &str, format: Option<DocumentFormat>) -> Result<Self> {
        let doc: RawRubric = parse_document(raw, format)
            .map_err(|err| AssessError::malformed_rubric(None, err.to_string()))?;
        Self::from_raw(doc)
    }

    fn from_raw(doc: RawRubric) -> Result<Self> {
        let raw_questions = doc
            .questions
            .ok_or_else(|| AssessError::malformed_rubric(None, "missing `questions` list"))?;
        if raw_questions.is_empty() {
            return Err(AssessError::malformed_rubric(None, "`questions` list is empty"));
        }

        let mut questions = Vec::with_capacity(raw_questions.len());
        let mut index = HashMap::with_capacity(raw_questions.len());

        for (pos, raw) in raw_questions.into_iter().enumerate() {
            let text = raw
                .question
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .ok_or_else(|| {
                    AssessError::malformed_rubric(
                        None,
                        format!("question #{} has no text", pos + 1),
                    )
                })?;
            if index.contains_key(&text) {
                return Err(AssessError::malformed_rubric(Some(&text), "duplicate question"));
            }
            let options = build_options(&text, raw.options)?;
            index.insert(text.clone(), pos);
            questions.push(Question {
                id: raw.id,
                text,
                options,
            });
        }

        Ok(Self {
            title: doc.title,
            questions,
            index,
        })
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Questions in display order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, text: &str) -> Option<&Question> {
        self.position(text).map(|idx| &self.questions[idx])
    }

    /// Display position (0-based) of a question.
    #[must_use]
    pub fn position(&self, text: &str) -> Option<usize> {
        self.index.get(text).copied()
    }

    /// Highest total score obtainable.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        u32::from(MAX_WEIGHT) * u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }
}

fn build_options(question: &str, raw: Option<Vec<RawOption>>) -> Result<Vec<AnswerOption>> {
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err(AssessError::malformed_rubric(Some(question), "no options"));
    }

    let mut seen_text = HashSet::new();
    let mut weight_levels: HashMap<u8, Level> = HashMap::new();
    let mut options = Vec::with_capacity(raw.len());

    for (pos, opt) in raw.into_iter().enumerate() {
        let number = pos + 1;
        let text = opt
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                let reason = format!("option {number} has no text");
                AssessError::malformed_rubric(Some(question), reason)
            })?;
        let marks = opt.marks.ok_or_else(|| {
            AssessError::malformed_rubric(Some(question), format!("option '{text}' has no weight"))
        })?;
        let weight = u8::try_from(marks)
            .ok()
            .filter(|w| *w <= MAX_WEIGHT)
            .ok_or_else(|| {
                AssessError::malformed_rubric(
                    Some(question),
                    format!("option '{text}' weight {marks} is outside 0-{MAX_WEIGHT}"),
                )
            })?;
        let level = opt
            .level
            .ok_or_else(|| {
                let reason = format!("option '{text}' has no level");
                AssessError::malformed_rubric(Some(question), reason)
            })?
            .parse::<Level>()
            .map_err(|reason| {
                AssessError::malformed_rubric(Some(question), format!("option '{text}': {reason}"))
            })?;

        if !seen_text.insert(text.clone()) {
            return Err(AssessError::malformed_rubric(
                Some(question),
                format!("duplicate option '{text}'"),
            ));
        }
        if let Some(existing) = weight_levels.insert(weight, level) {
            if existing != level {
                return Err(AssessError::malformed_rubric(
                    Some(question),
                    format!("weight {weight} maps to both '{existing}' and '{level}'"),
                ));
            }
        }

        options.push(AnswerOption {
            text,
            weight,
            level,
        });
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::SAMPLE_RUBRIC_JSON;

    fn parse_json(raw: &str) -> Result<Rubric> {
        Rubric::parse(raw, Some(DocumentFormat::Json))
    }

    fn malformed_reason(err: AssessError) -> String {
        match err {
            AssessError::MalformedRubric { reason, .. } => reason,
            other => panic!("expected MalformedRubric, got {other:?}"),
        }
    }

    #[test]
    fn parses_sample_rubric_in_order() {
        let rubric = parse_json(SAMPLE_RUBRIC_JSON).unwrap();
        assert_eq!(rubric.question_count(), 4);
        assert_eq!(rubric.max_score(), 40);
        assert_eq!(rubric.title(), Some("App Permissions Awareness"));

        let first = &rubric.questions()[0];
        assert_eq!(rubric.position(&first.text), Some(0));
        assert_eq!(first.options[0].weight, 10);
        assert_eq!(first.options[0].level, Level::Advanced);
        assert_eq!(first.option_number(2).map(|o| o.level), Some(Level::Intermediate));
        assert!(first.option_number(0).is_none());
    }

    #[test]
    fn accepts_yaml_and_weight_alias() {
        let raw = r"
questions:
  - question: Do you review permissions?
    options:
      - text: Always
        weight: 10
        level: Advanced
      - text: Never
        weight: 0
        level: WRONG
";
        let rubric = Rubric::parse(raw, Some(DocumentFormat::Yaml)).unwrap();
        let q = rubric.question("Do you review permissions?").unwrap();
        assert_eq!(q.option("Never").unwrap().level, Level::Wrong);
        assert_eq!(q.levels(), vec![Level::Wrong, Level::Advanced]);
    }

    #[test]
    fn rejects_missing_question_list() {
        let reason = malformed_reason(parse_json(r#"{"title": "x"}"#).unwrap_err());
        assert!(reason.contains("questions"));

        let reason = malformed_reason(parse_json(r#"{"questions": []}"#).unwrap_err());
        assert!(reason.contains("empty"));

        assert!(matches!(
            parse_json(r#"{"questions": {"a": 1}}"#).unwrap_err(),
            AssessError::MalformedRubric { .. }
        ));
    }

    #[test]
    fn rejects_question_without_options() {
        let err = parse_json(r#"{"questions": [{"question": "Q1", "options": []}]}"#).unwrap_err();
        assert_eq!(err.context().unwrap()["question"], "Q1");
    }

    #[test]
    fn rejects_option_without_weight_or_level() {
        let reason = malformed_reason(
            parse_json(r#"{"questions": [{"question": "Q1", "options": [{"text": "A", "level": "basic"}]}]}"#)
                .unwrap_err(),
        );
        assert!(reason.contains("no weight"));

        let reason = malformed_reason(
            parse_json(r#"{"questions": [{"question": "Q1", "options": [{"text": "A", "marks": 5}]}]}"#)
                .unwrap_err(),
        );
        assert!(reason.contains("no level"));
    }

    #[test]
    fn rejects_out_of_range_weight() {
        for marks in ["11", "-1"] {
            let raw = format!(
                r#"{{"questions": [{{"question": "Q1", "options": [{{"text": "A", "marks": {marks}, "level": "basic"}}]}}]}}"#
            );
            let reason = malformed_reason(parse_json(&raw).unwrap_err());
            assert!(reason.contains("outside"), "{reason}");
        }
    }

    #[test]
    fn rejects_ambiguous_weight_level_mapping() {
        let raw = r#"{"questions": [{"question": "Q1", "options": [
            {"text": "A", "marks": 5, "level": "basic"},
            {"text": "B", "marks": 5, "level": "intermediate"}
        ]}]}"#;
        let reason = malformed_reason(parse_json(raw).unwrap_err());
        assert!(reason.contains("maps to both"));
    }

    #[test]
    fn allows_same_weight_same_level() {
        let raw = r#"{"questions": [{"question": "Q1", "options": [
            {"text": "A", "marks": 0, "level": "wrong"},
            {"text": "B", "marks": 0, "level": "wrong"}
        ]}]}"#;
        assert_eq!(parse_json(raw).unwrap().questions()[0].options.len(), 2);
    }

    #[test]
    fn rejects_duplicates() {
        let raw = r#"{"questions": [
            {"question": "Q1", "options": [{"text": "A", "marks": 1, "level": "basic"}]},
            {"question": "Q1", "options": [{"text": "A", "marks": 1, "level": "basic"}]}
        ]}"#;
        assert!(malformed_reason(parse_json(raw).unwrap_err()).contains("duplicate question"));

        let raw = r#"{"questions": [{"question": "Q1", "options": [
            {"text": "A", "marks": 1, "level": "basic"},
            {"text": "A", "marks": 2, "level": "intermediate"}
        ]}]}"#;
        assert!(malformed_reason(parse_json(raw).unwrap_err()).contains("duplicate option"));
    }

    #[test]
    fn rejects_unknown_level() {
        let raw = r#"{"questions": [{"question": "Q1", "options": [{"text": "A", "marks": 1, "level": "guru"}]}]}"#;
        assert!(malformed_reason(parse_json(raw).unwrap_err()).contains("unknown level"));
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Intermediate).unwrap(), "\"intermediate\"");
        let level: Level = serde_json::from_str("\"Basic\"").unwrap();
        assert_eq!(level, Level::Basic);
    }
}
