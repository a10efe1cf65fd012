//! Prompt rendering for the remote explanation service.

use super::ExplanationRequest;

pub const SYSTEM_PROMPT: &str = "You are a patient tutor. Explain concepts in plain \
language, in at most three short paragraphs, and end with one concrete action the \
learner can take today.";

/// Render the user prompt for one weak area.
#[must_use]
pub fn render(request: &ExplanationRequest) -> String {
    format!(
        "A learner answered the assessment question below with a {current}-level answer. \
Their overall proficiency is {tier}.\n\n\
Question: {question}\n\n\
Explain the key idea behind the best answer at a depth suited to a {tier} learner, \
and point out the misconception typical of a {current}-level answer.",
        current = request.current_level,
        tier = request.overall_tier,
        question = request.question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, Tier};

    #[test]
    fn prompt_carries_question_level_and_tier() {
        let prompt = render(&ExplanationRequest {
            question: "Should a flashlight read contacts?".to_string(),
            current_level: Level::Wrong,
            overall_tier: Tier::Beginner,
        });
        assert!(prompt.contains("Question: Should a flashlight read contacts?"));
        assert!(prompt.contains("wrong-level answer"));
        assert!(prompt.contains("Their overall proficiency is Beginner."));
    }
}
