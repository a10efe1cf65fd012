//! Rubric model, scoring and weak-area prioritization.

pub mod priority;
pub mod rubric;
pub mod scoring;

pub use priority::{WeakArea, prioritize};
pub use rubric::{AnswerOption, Level, MAX_WEIGHT, Question, Rubric};
pub use scoring::{Response, ScoreSummary, Scorecard, Selection, Tier, score};
