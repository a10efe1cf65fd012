//! Weak-area prioritization.

use serde::Serialize;

use super::rubric::Level;
use super::scoring::Response;

/// A question whose selected answer scored below the maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakArea {
    pub question: String,
    pub level: Level,
    pub score: u8,
}

/// Rank every imperfect response, lowest score first.
///
/// The sort is stable, so equal scores keep the order of `responses`; pass
/// responses in rubric order (as [`super::scoring::score`] returns them).
/// The full ranking is returned; truncation is left to the caller.
#[must_use]
pub fn prioritize(responses: &[Response]) -> Vec<WeakArea> {
    let mut areas: Vec<WeakArea> = responses
        .iter()
        .filter(|r| !r.is_perfect())
        .map(|r| WeakArea {
            question: r.question.clone(),
            level: r.level,
            score: r.weight,
        })
        .collect();
    areas.sort_by_key(|area| area.score);
    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::score;
    use crate::test_utils::fixtures::{sample_rubric, selections_with_weights};

    fn response(question: &str, weight: u8, level: Level) -> Response {
        Response {
            question: question.to_string(),
            option: format!("{question}-option"),
            weight,
            level,
        }
    }

    #[test]
    fn perfect_responses_yield_no_weak_areas() {
        let rubric = sample_rubric();
        let card = score(&rubric, &selections_with_weights(&rubric, &[10, 10, 10, 10])).unwrap();
        assert!(prioritize(card.responses()).is_empty());
    }

    #[test]
    fn orders_by_ascending_score() {
        let rubric = sample_rubric();
        let card = score(&rubric, &selections_with_weights(&rubric, &[10, 0, 5, 10])).unwrap();
        let areas = prioritize(card.responses());

        let got: Vec<_> = areas.iter().map(|a| (a.question.as_str(), a.score)).collect();
        assert_eq!(
            got,
            vec![
                (rubric.questions()[1].text.as_str(), 0),
                (rubric.questions()[2].text.as_str(), 5),
            ]
        );
        assert_eq!(areas[0].level, Level::Wrong);
    }

    #[test]
    fn ties_keep_input_order() {
        let responses = vec![
            response("q1", 5, Level::Intermediate),
            response("q2", 2, Level::Basic),
            response("q3", 5, Level::Intermediate),
            response("q4", 2, Level::Basic),
            response("q5", 10, Level::Advanced),
        ];
        let order: Vec<_> = prioritize(&responses)
            .into_iter()
            .map(|a| a.question)
            .collect();
        assert_eq!(order, vec!["q2", "q4", "q1", "q3"]);
    }
}
