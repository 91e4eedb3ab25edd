// src/core/classify.rs

use std::collections::BTreeSet;

use crate::models::question::CorrectAnswer;
use crate::models::result::{AnswerStatus, SubmittedAnswer};

/// Classifies a submitted answer against the correct answer.
///
/// Pure function: repeated calls with identical inputs always yield the
/// same status. `PartiallyCorrect` is never produced here.
pub fn classify(correct: &CorrectAnswer, answer: Option<&SubmittedAnswer>) -> AnswerStatus {
    let Some(answer) = answer else {
        return AnswerStatus::NotAttempted;
    };

    if is_blank(answer) {
        return AnswerStatus::NotAttempted;
    }

    match correct {
        CorrectAnswer::Multiple(keys) => classify_multiple(keys, answer),
        CorrectAnswer::Range { min, max } => classify_range(*min, *max, answer),
        CorrectAnswer::Single(key) => classify_single(key, answer),
        CorrectAnswer::Scalar(value) => classify_single(&format_number(*value), answer),
    }
}

/// An empty array or an empty/whitespace string counts as unanswered.
fn is_blank(answer: &SubmittedAnswer) -> bool {
    match answer {
        SubmittedAnswer::Choice(text) => text.trim().is_empty(),
        SubmittedAnswer::Choices(keys) => keys.is_empty(),
        SubmittedAnswer::Value(_) => false,
    }
}

/// Set equality over option keys: same size, same members, order ignored.
/// No partial credit.
fn classify_multiple(correct_keys: &[String], answer: &SubmittedAnswer) -> AnswerStatus {
    let SubmittedAnswer::Choices(submitted) = answer else {
        return AnswerStatus::Incorrect;
    };

    let expected: BTreeSet<&str> = correct_keys.iter().map(|k| k.trim()).collect();
    let got: BTreeSet<&str> = submitted.iter().map(|k| k.trim()).collect();

    if submitted.len() == correct_keys.len() && expected == got {
        AnswerStatus::Correct
    } else {
        AnswerStatus::Incorrect
    }
}

/// Correct iff the answer parses as a number within [min, max].
fn classify_range(min: f64, max: f64, answer: &SubmittedAnswer) -> AnswerStatus {
    let value = match answer {
        SubmittedAnswer::Value(n) => Some(*n),
        SubmittedAnswer::Choice(text) => text.trim().parse::<f64>().ok(),
        SubmittedAnswer::Choices(_) => None,
    };

    match value {
        Some(v) if v >= min && v <= max => AnswerStatus::Correct,
        _ => AnswerStatus::Incorrect,
    }
}

/// Case-insensitive, whitespace-trimmed string equality.
fn classify_single(correct: &str, answer: &SubmittedAnswer) -> AnswerStatus {
    let text = match answer {
        SubmittedAnswer::Choice(text) => text.clone(),
        SubmittedAnswer::Value(n) => format_number(*n),
        SubmittedAnswer::Choices(_) => return AnswerStatus::Incorrect,
    };

    if text.trim().eq_ignore_ascii_case(correct.trim()) {
        AnswerStatus::Correct
    } else {
        AnswerStatus::Incorrect
    }
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(text: &str) -> SubmittedAnswer {
        SubmittedAnswer::Choice(text.to_string())
    }

    fn choices(keys: &[&str]) -> SubmittedAnswer {
        SubmittedAnswer::Choices(keys.iter().map(|k| k.to_string()).collect())
    }

    fn multiple(keys: &[&str]) -> CorrectAnswer {
        CorrectAnswer::Multiple(keys.iter().map(|k| k.to_string()).collect())
    }

    #[test]
    fn test_missing_answer_not_attempted() {
        let correct = CorrectAnswer::Single("A".to_string());
        assert_eq!(classify(&correct, None), AnswerStatus::NotAttempted);
    }

    #[test]
    fn test_blank_answers_not_attempted() {
        let correct = CorrectAnswer::Single("A".to_string());
        assert_eq!(
            classify(&correct, Some(&choice("   "))),
            AnswerStatus::NotAttempted
        );
        assert_eq!(
            classify(&multiple(&["A"]), Some(&choices(&[]))),
            AnswerStatus::NotAttempted
        );
    }

    #[test]
    fn test_single_case_insensitive_trimmed() {
        let correct = CorrectAnswer::Single("B".to_string());
        assert_eq!(classify(&correct, Some(&choice(" b "))), AnswerStatus::Correct);
        assert_eq!(classify(&correct, Some(&choice("a"))), AnswerStatus::Incorrect);
    }

    #[test]
    fn test_multiple_set_equality_order_ignored() {
        let correct = multiple(&["A", "C"]);
        assert_eq!(
            classify(&correct, Some(&choices(&["C", "A"]))),
            AnswerStatus::Correct
        );
        assert_eq!(
            classify(&correct, Some(&choices(&["A"]))),
            AnswerStatus::Incorrect
        );
        assert_eq!(
            classify(&correct, Some(&choices(&["A", "C", "D"]))),
            AnswerStatus::Incorrect
        );
    }

    #[test]
    fn test_multiple_wrong_shape_incorrect() {
        let correct = multiple(&["A", "C"]);
        assert_eq!(classify(&correct, Some(&choice("A"))), AnswerStatus::Incorrect);
    }

    #[test]
    fn test_numerical_range() {
        let correct = CorrectAnswer::Range { min: 10.0, max: 12.0 };
        assert_eq!(classify(&correct, Some(&choice("11"))), AnswerStatus::Correct);
        assert_eq!(classify(&correct, Some(&choice("10"))), AnswerStatus::Correct);
        assert_eq!(classify(&correct, Some(&choice("13"))), AnswerStatus::Incorrect);
        assert_eq!(classify(&correct, Some(&choice("abc"))), AnswerStatus::Incorrect);
        assert_eq!(
            classify(&correct, Some(&SubmittedAnswer::Value(11.5))),
            AnswerStatus::Correct
        );
    }

    #[test]
    fn test_numerical_scalar_matches_as_string() {
        let correct = CorrectAnswer::Scalar(42.0);
        assert_eq!(classify(&correct, Some(&choice("42"))), AnswerStatus::Correct);
        assert_eq!(
            classify(&correct, Some(&SubmittedAnswer::Value(42.0))),
            AnswerStatus::Correct
        );
        assert_eq!(classify(&correct, Some(&choice("41"))), AnswerStatus::Incorrect);
    }

    #[test]
    fn test_deterministic() {
        let correct = multiple(&["A", "C"]);
        let answer = choices(&["C", "A"]);
        let first = classify(&correct, Some(&answer));
        for _ in 0..10 {
            assert_eq!(classify(&correct, Some(&answer)), first);
        }
    }
}
