//! Explanation resolution.
//!
//! For one weak area, try the remote service through an ordered chain of model
//! variants, then the static guidance table, then the generic fallback text.
//! Resolution never fails because of the remote service or missing guidance;
//! the only error is a question the rubric does not contain.

pub mod chain;
pub mod prompt;
pub mod remote;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::{Level, Rubric, Tier};
use crate::error::{AssessError, Result};
use crate::guidance::{GuidanceMatch, GuidanceTable};

pub use chain::{Exhausted, FallbackChain, Resolved, Strategy};
pub use remote::{
    CompletionClient, MIN_EXPLANATION_CHARS, RemoteError, RemoteSettings, RemoteVariant,
};

pub type ExplanationChain = FallbackChain<ExplanationRequest, String, RemoteError>;

/// Context sent to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationRequest {
    pub question: String,
    pub current_level: Level,
    pub overall_tier: Tier,
}

/// Which tier of the cascade produced an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExplanationSource {
    Remote { variant: String },
    Static,
    Generic,
}

impl fmt::Display for ExplanationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { variant } => write!(f, "remote ({variant})"),
            Self::Static => f.write_str("static"),
            Self::Generic => f.write_str("generic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub text: String,
    pub source: ExplanationSource,
}

/// Build the remote chain: one variant per model name, in order, sharing one
/// client. Returns `None` when there is no API key or no variant, which
/// selects the static path without any network call.
pub fn remote_chain(
    settings: Option<RemoteSettings>,
    variants: &[String],
) -> Result<Option<ExplanationChain>> {
    let Some(settings) = settings.filter(|s| !s.api_key.trim().is_empty()) else {
        tracing::debug!("no API key configured, remote explanations disabled");
        return Ok(None);
    };
    if variants.is_empty() {
        tracing::warn!(
            "API key configured but no model variants listed, remote explanations disabled"
        );
        return Ok(None);
    }

    let client = Arc::new(CompletionClient::new(&settings)?);
    let mut chain = ExplanationChain::new();
    for model in variants {
        chain.push(RemoteVariant::new(model.clone(), Arc::clone(&client)));
    }
    tracing::debug!(variants = ?chain.names(), "remote explanation chain ready");
    Ok(Some(chain))
}

pub struct ExplanationResolver {
    chain: Option<ExplanationChain>,
    guidance: Arc<GuidanceTable>,
    rubric: Arc<Rubric>,
}

impl fmt::Debug for ExplanationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplanationResolver")
            .field("chain", &self.chain)
            .field("guidance_entries", &self.guidance.len())
            .field("questions", &self.rubric.question_count())
            .finish()
    }
}

impl ExplanationResolver {
    #[must_use]
    pub const fn new(
        rubric: Arc<Rubric>,
        guidance: Arc<GuidanceTable>,
        chain: Option<ExplanationChain>,
    ) -> Self {
        Self {
            chain,
            guidance,
            rubric,
        }
    }

    /// Resolver that never contacts the remote service.
    #[must_use]
    pub const fn offline(rubric: Arc<Rubric>, guidance: Arc<GuidanceTable>) -> Self {
        Self::new(rubric, guidance, None)
    }

    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.chain.as_ref().is_some_and(|c| !c.is_empty())
    }

    #[must_use]
    pub fn guidance(&self) -> &GuidanceTable {
        &self.guidance
    }

    /// Resolve an explanation for `question` answered at `current`.
    ///
    /// Static lookups are keyed by the per-question level; `overall` only
    /// shapes the remote prompt.
    pub fn resolve(&self, question: &str, current: Level, overall: Tier) -> Result<Explanation> {
        if self.rubric.question(question).is_none() {
            return Err(AssessError::UnknownQuestion(question.to_string()));
        }

        if let Some(chain) = &self.chain {
            let request = ExplanationRequest {
                question: question.to_string(),
                current_level: current,
                overall_tier: overall,
            };
            match chain.run(&request) {
                Ok(resolved) => {
                    tracing::info!(
                        variant = %resolved.strategy,
                        attempts = resolved.attempts,
                        "explanation resolved remotely"
                    );
                    return Ok(Explanation {
                        text: resolved.value,
                        source: ExplanationSource::Remote {
                            variant: resolved.strategy,
                        },
                    });
                }
                Err(exhausted) => {
                    tracing::warn!(
                        %exhausted,
                        "remote explanation unavailable, using static guidance"
                    );
                }
            }
        }

        let explanation = match self.guidance.resolve(question, current) {
            GuidanceMatch::Entry(text) => Explanation {
                text: text.to_string(),
                source: ExplanationSource::Static,
            },
            GuidanceMatch::Fallback(text) => Explanation {
                text: text.to_string(),
                source: ExplanationSource::Generic,
            },
        };
        tracing::info!(
            level = %current,
            source = %explanation.source,
            "explanation resolved locally"
        );
        Ok(explanation)
    }
}
