use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::error::{AssessError, ErrorCode, Result, StructuredError};

#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub status: JsonStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonStatus {
    Ok,
    /// The command ran but its check did not pass.
    Incomplete,
    Error {
        /// Error code enum value (e.g., "SELECTION_INVALID")
        code: ErrorCode,
        /// Numeric error code (e.g., 202)
        numeric_code: u16,
        message: String,
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        category: String,
    },
}

impl From<StructuredError> for JsonStatus {
    fn from(err: StructuredError) -> Self {
        Self::Error {
            code: err.code,
            numeric_code: err.numeric_code,
            message: err.message,
            suggestion: err.suggestion,
            context: err.context,
            recoverable: err.recoverable,
            category: err.category,
        }
    }
}

pub fn json_ok<T: Serialize>(data: T) -> JsonResponse<T> {
    JsonResponse {
        status: JsonStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

impl<T> JsonResponse<T> {
    #[must_use]
    pub fn with_status(mut self, status: JsonStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Error envelope built from an [`AssessError`].
pub fn json_error(err: &AssessError) -> JsonResponse<serde_json::Value> {
    JsonResponse {
        status: err.to_structured().into(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
        warnings: Vec::new(),
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
    wrap_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new(80)
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new(wrap_width: usize) -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
            wrap_width,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines
            .push(crate::utils::format::rule('=', text.chars().count().max(3)));
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(String::new());
        self.lines.push(style(text).bold().to_string());
        self.lines
            .push(crate::utils::format::rule('-', text.chars().count().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        self.lines
            .push(format!("{} {value}", style(padded).dim()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.wrapped(text, "- ", "  ")
    }

    /// Wrap `text` to the layout width with the given first-line and
    /// continuation prefixes.
    pub fn wrapped(&mut self, text: &str, first: &str, rest: &str) -> &mut Self {
        let options = textwrap::Options::new(self.wrap_width.max(20))
            .initial_indent(first)
            .subsequent_indent(rest);
        for line in textwrap::wrap(text, options) {
            self.lines.push(line.into_owned());
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// Human rendering of an error with its suggestion, for stderr.
#[must_use]
pub fn format_error(err: &AssessError) -> String {
    let structured = err.to_structured();
    format!(
        "{} {}\n{} {}",
        style(format!("Error [{}]:", structured.code)).red().bold(),
        structured.message,
        style("hint:").dim(),
        structured.suggestion
    )
}
