//! Error handling for assessor.
//!
//! This module provides:
//! - [`AssessError`]: The main error enum for all assessor operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;
mod suggestions;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for assessor operations.
#[derive(Error, Debug)]
pub enum AssessError {
    #[error("Malformed rubric: {reason}")]
    MalformedRubric {
        question: Option<String>,
        reason: String,
    },

    #[error("Malformed guidance: {0}")]
    MalformedGuidance(String),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Incomplete response set: no response for question '{question}'")]
    IncompleteResponseSet { question: String },

    #[error("Invalid selection for question '{question}': {reason}")]
    InvalidSelection {
        question: String,
        option: String,
        reason: String,
    },

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Invalid answer sheet: {0}")]
    InvalidAnswers(String),

    #[error("Guidance is missing for {missing} (question, level) pair(s)")]
    GuidanceIncomplete { missing: usize },

    #[error("Failed to persist result record to {}: {reason}", .path.display())]
    PersistenceFailure { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),
}

impl AssessError {
    pub(crate) fn malformed_rubric(question: Option<&str>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::MalformedRubric {
            reason: match question {
                Some(q) => format!("question '{q}': {reason}"),
                None => reason,
            },
            question: question.map(str::to_string),
        }
    }

    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedRubric { .. } => ErrorCode::RubricMalformed,
            Self::MalformedGuidance(_) => ErrorCode::GuidanceMalformed,
            Self::NotInitialized(_) => ErrorCode::RubricNotLoaded,
            Self::IncompleteResponseSet { .. } => ErrorCode::ResponsesIncomplete,
            Self::InvalidSelection { .. } => ErrorCode::SelectionInvalid,
            Self::UnknownQuestion(_) => ErrorCode::QuestionUnknown,
            Self::InvalidAnswers(_) => ErrorCode::AnswersInvalid,
            Self::GuidanceIncomplete { .. } => ErrorCode::GuidanceIncomplete,
            Self::PersistenceFailure { .. } => ErrorCode::StorageWriteError,
            Self::Io(_) => ErrorCode::StorageReadError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::MalformedRubric {
                question: Some(question),
                ..
            } => Some(serde_json::json!({ "question": question })),
            Self::IncompleteResponseSet { question } | Self::UnknownQuestion(question) => {
                Some(serde_json::json!({ "question": question }))
            }
            Self::InvalidSelection {
                question, option, ..
            } => Some(serde_json::json!({ "question": question, "option": option })),
            Self::GuidanceIncomplete { missing } => Some(serde_json::json!({ "missing": missing })),
            Self::PersistenceFailure { path, .. } => {
                Some(serde_json::json!({ "path": path.display().to_string() }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_assess_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "SELECTION_INVALID")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 202)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "rubric", "config")
    pub category: String,
}

impl StructuredError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_assess_error(err: &AssessError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&AssessError> for StructuredError {
    fn from(err: &AssessError) -> Self {
        Self::from_assess_error(err)
    }
}

/// Result type alias using AssessError.
pub type Result<T> = std::result::Result<T, AssessError>;
