//! Assessment orchestration.
//!
//! One run moves through fixed stages, each a distinct type:
//!
//! ```text
//! Collecting -> Scored -> Prioritized -> Explained -> Outcome
//! ```
//!
//! Scoring errors end the run. Explanation and persistence problems degrade:
//! explanations fall back to static text, and a failed write is reported in
//! [`Outcome::persistence`] next to the still valid record.

pub mod answers;
pub mod record;

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::{Rubric, Scorecard, Selection, WeakArea, prioritize, score};
use crate::error::{AssessError, Result};
use crate::explain::{Explanation, ExplanationChain, ExplanationResolver};
use crate::guidance::GuidanceTable;

pub use answers::{AnswerSheet, AnswerSource, InteractiveAnswers};
pub use record::{
    AnswerMap, DEFAULT_RESULTS_FILE, JsonFileSink, QuestionScore, ResultRecord, ResultSink,
};

/// A weak area with its resolved explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remediation {
    #[serde(flatten)]
    pub area: WeakArea,
    pub explanation: Explanation,
}

/// What happened to the result record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PersistStatus {
    Written { path: PathBuf },
    Failed { reason: String },
    Skipped,
}

/// Loaded rubric and guidance plus the optional remote chain.
#[derive(Debug)]
pub struct Assessor {
    rubric: Option<Arc<Rubric>>,
    resolver: Option<ExplanationResolver>,
}

#[derive(Default)]
pub struct AssessorBuilder {
    rubric: Option<Arc<Rubric>>,
    guidance: Option<Arc<GuidanceTable>>,
    chain: Option<ExplanationChain>,
}

impl AssessorBuilder {
    #[must_use]
    pub fn rubric(mut self, rubric: impl Into<Arc<Rubric>>) -> Self {
        self.rubric = Some(rubric.into());
        self
    }

    #[must_use]
    pub fn guidance(mut self, guidance: impl Into<Arc<GuidanceTable>>) -> Self {
        self.guidance = Some(guidance.into());
        self
    }

    /// Remote chain; `None` keeps resolution offline.
    #[must_use]
    pub fn remote(mut self, chain: Option<ExplanationChain>) -> Self {
        self.chain = chain;
        self
    }

    #[must_use]
    pub fn build(self) -> Assessor {
        let resolver = match (&self.rubric, self.guidance) {
            (Some(rubric), Some(guidance)) => Some(ExplanationResolver::new(
                Arc::clone(rubric),
                guidance,
                self.chain,
            )),
            _ => None,
        };
        Assessor {
            rubric: self.rubric,
            resolver,
        }
    }
}

impl Assessor {
    #[must_use]
    pub fn builder() -> AssessorBuilder {
        AssessorBuilder::default()
    }

    #[must_use]
    pub const fn rubric(&self) -> Option<&Arc<Rubric>> {
        self.rubric.as_ref()
    }

    #[must_use]
    pub const fn resolver(&self) -> Option<&ExplanationResolver> {
        self.resolver.as_ref()
    }

    /// Start a run. Fails with [`AssessError::NotInitialized`] until both the
    /// rubric and the guidance are loaded.
    pub fn begin(&self) -> Result<Collecting<'_>> {
        let rubric = self
            .rubric
            .as_deref()
            .ok_or_else(|| AssessError::NotInitialized("rubric not loaded".to_string()))?;
        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| AssessError::NotInitialized("guidance not loaded".to_string()))?;
        Ok(Collecting { rubric, resolver })
    }

    /// Drive a complete run: collect, score, prioritize, explain the `top`
    /// weak areas (all when `None`) and record.
    pub fn run(
        &self,
        source: &mut dyn AnswerSource,
        top: Option<usize>,
        sink: Option<&dyn ResultSink>,
    ) -> Result<Outcome> {
        Ok(self
            .begin()?
            .collect(source)?
            .prioritize()
            .explain(top)?
            .record(sink))
    }
}

pub struct Collecting<'a> {
    rubric: &'a Rubric,
    resolver: &'a ExplanationResolver,
}

impl<'a> Collecting<'a> {
    pub fn collect(self, source: &mut dyn AnswerSource) -> Result<Scored<'a>> {
        let selections = source.collect(self.rubric)?;
        self.submit(&selections)
    }

    pub fn submit(self, selections: &[Selection]) -> Result<Scored<'a>> {
        let card = score(self.rubric, selections)?;
        Ok(Scored {
            rubric: self.rubric,
            resolver: self.resolver,
            card,
        })
    }
}

pub struct Scored<'a> {
    rubric: &'a Rubric,
    resolver: &'a ExplanationResolver,
    card: Scorecard,
}

impl<'a> Scored<'a> {
    #[must_use]
    pub const fn scorecard(&self) -> &Scorecard {
        &self.card
    }

    #[must_use]
    pub fn prioritize(self) -> Prioritized<'a> {
        let weak_areas = prioritize(self.card.responses());
        tracing::debug!(weak_areas = weak_areas.len(), "prioritized weak areas");
        Prioritized {
            rubric: self.rubric,
            resolver: self.resolver,
            card: self.card,
            weak_areas,
        }
    }
}

pub struct Prioritized<'a> {
    rubric: &'a Rubric,
    resolver: &'a ExplanationResolver,
    card: Scorecard,
    weak_areas: Vec<WeakArea>,
}

impl<'a> Prioritized<'a> {
    #[must_use]
    pub fn weak_areas(&self) -> &[WeakArea] {
        &self.weak_areas
    }

    /// Resolve explanations for the first `top` weak areas (all when `None`).
    ///
    /// Areas are resolved in parallel; the output keeps the ranking order.
    pub fn explain(self, top: Option<usize>) -> Result<Explained<'a>> {
        let count = top.map_or(self.weak_areas.len(), |n| n.min(self.weak_areas.len()));
        let tier = self.card.summary().tier;
        let resolver = self.resolver;

        let resolve = |area: &WeakArea| -> Result<Remediation> {
            let explanation = resolver.resolve(&area.question, area.level, tier)?;
            Ok(Remediation {
                area: area.clone(),
                explanation,
            })
        };

        let targets = &self.weak_areas[..count];
        let remediations = if targets.len() > 1 {
            targets.par_iter().map(resolve).collect::<Result<Vec<_>>>()?
        } else {
            targets.iter().map(resolve).collect::<Result<Vec<_>>>()?
        };

        Ok(Explained {
            rubric: self.rubric,
            card: self.card,
            weak_areas: self.weak_areas,
            remediations,
        })
    }
}

pub struct Explained<'a> {
    rubric: &'a Rubric,
    card: Scorecard,
    weak_areas: Vec<WeakArea>,
    remediations: Vec<Remediation>,
}

impl Explained<'_> {
    #[must_use]
    pub fn remediations(&self) -> &[Remediation] {
        &self.remediations
    }

    /// Assemble the result record and hand it to `sink`, if any.
    #[must_use]
    pub fn record(self, sink: Option<&dyn ResultSink>) -> Outcome {
        let record = ResultRecord::from_scorecard(&self.card, self.rubric.title());
        let persistence = match sink {
            None => PersistStatus::Skipped,
            Some(sink) => match sink.persist(&record) {
                Ok(path) => PersistStatus::Written { path },
                Err(err) => {
                    tracing::warn!(
                        destination = %sink.describe(),
                        error = %err,
                        "result record not persisted"
                    );
                    PersistStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            },
        };

        Outcome {
            record,
            scorecard: self.card,
            weak_areas: self.weak_areas,
            remediations: self.remediations,
            persistence,
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub record: ResultRecord,
    #[serde(skip)]
    pub scorecard: Scorecard,
    /// Full ranking, lowest score first.
    pub weak_areas: Vec<WeakArea>,
    /// Explanations for the requested prefix of `weak_areas`.
    pub remediations: Vec<Remediation>,
    pub persistence: PersistStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, Tier};
    use crate::explain::{ExplanationSource, remote_chain};
    use crate::test_utils::fixtures::{
        UnitTestFixture, sample_guidance, sample_rubric, selections_with_weights,
    };
    use crate::test_utils::mock_server::{CompletionServer, settings_for};

    fn offline_assessor() -> Assessor {
        Assessor::builder()
            .rubric(sample_rubric())
            .guidance(sample_guidance())
            .build()
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn describe(&self) -> String {
            "nowhere".to_string()
        }

        fn persist(&self, _record: &ResultRecord) -> Result<PathBuf> {
            Err(AssessError::PersistenceFailure {
                path: PathBuf::from("nowhere"),
                reason: "disk full".to_string(),
            })
        }
    }

    #[test]
    fn begin_requires_rubric_and_guidance() {
        let err = Assessor::builder().build().begin().err().unwrap();
        assert!(matches!(err, AssessError::NotInitialized(ref m) if m.contains("rubric")));

        let err = Assessor::builder().rubric(sample_rubric()).build().begin().err().unwrap();
        assert!(matches!(err, AssessError::NotInitialized(ref m) if m.contains("guidance")));
    }

    #[test]
    fn perfect_run_has_no_weak_areas() {
        let assessor = offline_assessor();
        let rubric = sample_rubric();
        let mut answers = selections_with_weights(&rubric, &[10, 10, 10, 10]);

        let outcome = assessor.run(&mut answers, None, None).unwrap();
        assert_eq!(outcome.record.total_score, 40);
        assert_eq!(outcome.record.overall_level, Tier::Expert);
        assert!(outcome.weak_areas.is_empty());
        assert!(outcome.remediations.is_empty());
        assert_eq!(outcome.persistence, PersistStatus::Skipped);
    }

    #[test]
    fn mixed_run_explains_in_ranking_order() {
        let assessor = offline_assessor();
        let rubric = sample_rubric();
        let mut answers = selections_with_weights(&rubric, &[10, 0, 5, 2]);

        let outcome = assessor.run(&mut answers, None, None).unwrap();
        let ranked: Vec<u8> = outcome.weak_areas.iter().map(|a| a.score).collect();
        assert_eq!(ranked, vec![0, 2, 5]);
        let explained: Vec<&str> = outcome
            .remediations
            .iter()
            .map(|r| r.area.question.as_str())
            .collect();
        let expected: Vec<&str> = outcome.weak_areas.iter().map(|a| a.question.as_str()).collect();
        assert_eq!(explained, expected);

        // Q2 answered wrong has a static entry; Q3 and Q4 only the fallback.
        assert_eq!(outcome.remediations[0].explanation.source, ExplanationSource::Static);
        assert_eq!(outcome.remediations[1].explanation.source, ExplanationSource::Generic);
    }

    #[test]
    fn top_limits_explanations_but_not_ranking() {
        let assessor = offline_assessor();
        let rubric = sample_rubric();
        let stage = assessor
            .begin()
            .unwrap()
            .submit(&selections_with_weights(&rubric, &[2, 0, 5, 2]))
            .unwrap()
            .prioritize();
        assert_eq!(stage.weak_areas().len(), 4);

        let explained = stage.explain(Some(2)).unwrap();
        assert_eq!(explained.remediations().len(), 2);
        assert_eq!(explained.remediations()[0].area.level, Level::Wrong);

        let outcome = explained.record(None);
        assert_eq!(outcome.weak_areas.len(), 4);
        assert_eq!(outcome.remediations.len(), 2);
    }

    #[test]
    fn scoring_errors_abort_the_run() {
        let assessor = offline_assessor();
        let rubric = sample_rubric();
        let mut answers = selections_with_weights(&rubric, &[10, 0, 5, 2]);
        answers.pop();

        assert!(matches!(
            assessor.run(&mut answers, None, None),
            Err(AssessError::IncompleteResponseSet { .. })
        ));
    }

    #[test]
    fn persistence_failure_keeps_result() {
        let assessor = offline_assessor();
        let rubric = sample_rubric();
        let mut answers = selections_with_weights(&rubric, &[10, 0, 5, 10]);

        let outcome = assessor.run(&mut answers, Some(3), Some(&FailingSink)).unwrap();
        assert_eq!(outcome.record.total_score, 25);
        assert!((outcome.record.percentage - 62.5).abs() < f64::EPSILON);
        assert_eq!(outcome.remediations.len(), 2);
        assert!(matches!(
            outcome.persistence,
            PersistStatus::Failed { ref reason } if reason.contains("disk full")
        ));
    }

    #[test]
    fn json_sink_receives_record() {
        let fixture = UnitTestFixture::new();
        let sink = JsonFileSink::new(fixture.data_path.join("results.json"));
        let assessor = offline_assessor();
        let rubric = sample_rubric();
        let mut answers = selections_with_weights(&rubric, &[10, 0, 5, 10]);

        let outcome = assessor.run(&mut answers, None, Some(&sink)).unwrap();
        assert_eq!(
            outcome.persistence,
            PersistStatus::Written {
                path: sink.path().to_path_buf()
            }
        );
        assert!(sink.path().exists());
    }

    #[test]
    fn remote_explanations_flow_through_run() {
        let server = CompletionServer::start();
        server.fail("primary", 500);
        server.reply("secondary", "Deny requests unrelated to the feature.");
        let chain = remote_chain(
            Some(settings_for(&server)),
            &["primary".to_string(), "secondary".to_string()],
        )
        .unwrap();

        let assessor = Assessor::builder()
            .rubric(sample_rubric())
            .guidance(sample_guidance())
            .remote(chain)
            .build();
        let rubric = sample_rubric();
        let mut answers = selections_with_weights(&rubric, &[10, 0, 5, 10]);

        let outcome = assessor.run(&mut answers, None, None).unwrap();
        assert_eq!(outcome.remediations.len(), 2);
        for remediation in &outcome.remediations {
            assert_eq!(
                remediation.explanation.source,
                ExplanationSource::Remote {
                    variant: "secondary".to_string()
                }
            );
        }
    }
}
