//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Rubric errors
//! - 2xx: Response errors
//! - 3xx: Config errors
//! - 4xx: Guidance errors
//! - 6xx: Storage errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for `--json` output.
///
/// Each variant maps to a numeric code (e.g., `RubricMalformed` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Rubric errors (1xx)
    // ========================================
    /// E101: Rubric source lacks required structure
    RubricMalformed,
    /// E102: Run attempted before rubric or guidance were loaded
    RubricNotLoaded,
    /// E103: Question is not part of the loaded rubric
    QuestionUnknown,

    // ========================================
    // Response errors (2xx)
    // ========================================
    /// E201: A rubric question has no response
    ResponsesIncomplete,
    /// E202: Selected option does not exist for the question
    SelectionInvalid,
    /// E203: Answer sheet could not be interpreted
    AnswersInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,
    /// E302: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Guidance errors (4xx)
    // ========================================
    /// E401: Guidance source lacks required structure
    GuidanceMalformed,
    /// E402: Guidance table does not cover every rubric level
    GuidanceIncomplete,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Failed to read from storage
    StorageReadError,
    /// E602: Failed to write the result record
    StorageWriteError,
    /// E603: Serialization/deserialization failed
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `RubricMalformed` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::RubricMalformed => 101,
            Self::RubricNotLoaded => 102,
            Self::QuestionUnknown => 103,

            Self::ResponsesIncomplete => 201,
            Self::SelectionInvalid => 202,
            Self::AnswersInvalid => 203,

            Self::ConfigInvalid => 301,
            Self::ConfigMissingRequired => 302,

            Self::GuidanceMalformed => 401,
            Self::GuidanceIncomplete => 402,

            Self::StorageReadError => 601,
            Self::StorageWriteError => 602,
            Self::SerializationError => 603,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::RubricMalformed => "Check the rubric file: it needs a `questions` list where every option has `text`, `marks` and `level`",
            Self::RubricNotLoaded => "Pass --rubric <path> or set `assessment.rubric` in the config file",
            Self::QuestionUnknown => "Use the exact question text from the loaded rubric",

            Self::ResponsesIncomplete => "Answer every question in the rubric before scoring",
            Self::SelectionInvalid => "Pick one of the listed options for the question (text or 1-based number)",
            Self::AnswersInvalid => "The answer sheet must map question text to an option text or option number",

            Self::ConfigInvalid => "Run `assessor config show` to see current values. Check TOML syntax in config file",
            Self::ConfigMissingRequired => "Set the required value in config.toml or via the matching ASSESSOR_* variable",

            Self::GuidanceMalformed => "Check the guidance file: it needs an `entries` list of {question, level, text}",
            Self::GuidanceIncomplete => "Run `assessor check` to list the (question, level) pairs without guidance",

            Self::StorageReadError => "Check file permissions and ensure the path is accessible",
            Self::StorageWriteError => "Check disk space and write permissions on the results directory",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::RubricMalformed
            | Self::RubricNotLoaded
            | Self::QuestionUnknown
            | Self::ResponsesIncomplete
            | Self::SelectionInvalid
            | Self::AnswersInvalid
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::GuidanceMalformed
            | Self::GuidanceIncomplete
            | Self::StorageReadError
            | Self::StorageWriteError => true,

            Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "rubric",
            2 => "response",
            3 => "config",
            4 => "guidance",
            6 => "storage",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::RubricMalformed,
            Self::RubricNotLoaded,
            Self::QuestionUnknown,
            Self::ResponsesIncomplete,
            Self::SelectionInvalid,
            Self::AnswersInvalid,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::GuidanceMalformed,
            Self::GuidanceIncomplete,
            Self::StorageReadError,
            Self::StorageWriteError,
            Self::SerializationError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
