//! Answer sources: where a run's selections come from.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

use serde::Deserialize;

use crate::core::{Question, Rubric, Selection};
use crate::error::{AssessError, Result};
use crate::utils::fs::{DocumentFormat, parse_document};

/// Supplies one selection per rubric question.
pub trait AnswerSource {
    fn collect(&mut self, rubric: &Rubric) -> Result<Vec<Selection>>;
}

impl AnswerSource for Vec<Selection> {
    fn collect(&mut self, _rubric: &Rubric) -> Result<Vec<Selection>> {
        Ok(std::mem::take(self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Number(u64),
    Text(String),
}

/// Pre-filled answers keyed by question text (or question id).
///
/// Values are the chosen option's text or its 1-based number:
///
/// ```yaml
/// "An app asks for location access while you install it. What do you do?": 2
/// Q2: "The request is unrelated to its function and should be denied"
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    answers: BTreeMap<String, AnswerValue>,
}

impl AnswerSheet {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| AssessError::InvalidAnswers(format!("read {}: {err}", path.display())))?;
        let sheet = Self::parse(&raw, DocumentFormat::from_path(path))?;
        tracing::debug!(path = %path.display(), answers = sheet.len(), "answer sheet loaded");
        Ok(sheet)
    }

    pub fn parse(raw: &str, format: Option<DocumentFormat>) -> Result<Self> {
        let answers = parse_document(raw, format)
            .map_err(|err| AssessError::InvalidAnswers(err.to_string()))?;
        Ok(Self { answers })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

fn find_question<'r>(rubric: &'r Rubric, key: &str) -> Option<&'r Question> {
    let key = key.trim();
    rubric
        .question(key)
        .or_else(|| rubric.questions().iter().find(|q| q.id.as_deref() == Some(key)))
}

impl AnswerSource for AnswerSheet {
    /// Keys that match no question are passed through unchanged so scoring
    /// reports them as invalid selections.
    fn collect(&mut self, rubric: &Rubric) -> Result<Vec<Selection>> {
        let mut selections = Vec::with_capacity(self.answers.len());
        for (key, value) in &self.answers {
            let Some(question) = find_question(rubric, key) else {
                let option = match value {
                    AnswerValue::Number(n) => n.to_string(),
                    AnswerValue::Text(t) => t.clone(),
                };
                selections.push(Selection::new(key, option));
                continue;
            };

            let option = match value {
                AnswerValue::Text(text) => text.trim().to_string(),
                AnswerValue::Number(number) => usize::try_from(*number)
                    .ok()
                    .and_then(|n| question.option_number(n))
                    .map(|o| o.text.clone())
                    .ok_or_else(|| AssessError::InvalidSelection {
                        question: question.text.clone(),
                        option: number.to_string(),
                        reason: format!(
                            "option number must be between 1 and {}",
                            question.options.len()
                        ),
                    })?,
            };
            selections.push(Selection::new(&question.text, option));
        }
        Ok(selections)
    }
}

/// Prompts for each question on `output` and reads numbered choices from
/// `input`, re-prompting until the choice is in range.
pub struct InteractiveAnswers<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveAnswers<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, number: usize, question: &Question) -> Result<Selection> {
        writeln!(self.output, "\nQuestion {number}: {}", question.text)?;
        writeln!(self.output, "\nOptions:")?;
        for (idx, option) in question.options.iter().enumerate() {
            writeln!(self.output, "{}. {}", idx + 1, option.text)?;
        }

        let count = question.options.len();
        let mut line = String::new();
        loop {
            write!(self.output, "\nEnter your choice (1-{count}): ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(AssessError::InvalidAnswers(format!(
                    "input ended before question {number} was answered"
                )));
            }
            match line.trim().parse::<usize>().ok().and_then(|n| question.option_number(n)) {
                Some(option) => return Ok(Selection::new(&question.text, &option.text)),
                None => writeln!(self.output, "Please enter a number between 1 and {count}.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> AnswerSource for InteractiveAnswers<R, W> {
    fn collect(&mut self, rubric: &Rubric) -> Result<Vec<Selection>> {
        rubric
            .questions()
            .iter()
            .enumerate()
            .map(|(idx, question)| self.ask(idx + 1, question))
            .collect()
    }
}
