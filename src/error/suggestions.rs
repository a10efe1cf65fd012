//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! name the offending question or option.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::ResponsesIncomplete => suggest_responses_incomplete(context),
        ErrorCode::SelectionInvalid => suggest_selection_invalid(context),
        ErrorCode::RubricMalformed => suggest_rubric_malformed(context),
        ErrorCode::ConfigMissingRequired => suggest_config_missing(context),
        _ => code.suggestion().to_string(),
    }
}

fn context_str<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(key)).and_then(Value::as_str)
}

fn suggest_responses_incomplete(context: Option<&Value>) -> String {
    match context_str(context, "question") {
        Some(question) => format!(
            "Add an answer for '{question}' to the answer sheet, or run without --answers to answer interactively"
        ),
        None => ErrorCode::ResponsesIncomplete.suggestion().to_string(),
    }
}

fn suggest_selection_invalid(context: Option<&Value>) -> String {
    match (
        context_str(context, "question"),
        context_str(context, "option"),
    ) {
        (Some(question), Some(option)) => format!(
            "'{option}' is not an option for '{question}'. Use the exact option text or its 1-based number"
        ),
        _ => ErrorCode::SelectionInvalid.suggestion().to_string(),
    }
}

fn suggest_rubric_malformed(context: Option<&Value>) -> String {
    match context_str(context, "question") {
        Some(question) => format!(
            "Fix the options of '{question}' in the rubric file: each needs `text`, `marks` (0-10) and `level`"
        ),
        None => ErrorCode::RubricMalformed.suggestion().to_string(),
    }
}

fn suggest_config_missing(context: Option<&Value>) -> String {
    match context_str(context, "config_key") {
        Some(key) => format!("Set `{key}` in config.toml or pass it on the command line"),
        None => ErrorCode::ConfigMissingRequired.suggestion().to_string(),
    }
}
