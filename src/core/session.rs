// src/core/session.rs

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::core::classify::classify;
use crate::error::AppError;
use crate::models::question::Question;
use crate::models::result::{AnswerStatus, AnsweredQuestion, SubmittedAnswer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Finished,
}

/// A single quiz attempt: question delivery, answer collection, timing,
/// and final scoring.
///
/// Single-writer by design; a user takes one quiz at a time. Finishing is
/// idempotent: once `Finished`, further finish attempts (explicit submit
/// or timer tick) are no-ops, so an attempt can never score twice.
pub struct QuizSession {
    subject: String,
    term: Option<String>,
    exam: Option<String>,
    questions: Vec<Question>,
    answers: HashMap<usize, SubmittedAnswer>,
    current: usize,
    started_at: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
    state: SessionState,
}

/// The scored artifact of a finished session, ready to persist.
#[derive(Debug, Clone)]
pub struct ScoredOutcome {
    pub subject: String,
    pub term: Option<String>,
    pub exam: Option<String>,
    pub questions: Vec<AnsweredQuestion>,
    pub score: i64,
    pub total_questions: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub time_taken: i64,
}

impl QuizSession {
    /// Starts a session. Fails with `InvalidSession` when the subject is
    /// blank or the question set is empty, rather than silently running
    /// with zero questions.
    pub fn start(
        subject: impl Into<String>,
        term: Option<String>,
        exam: Option<String>,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
        time_limit: Option<Duration>,
    ) -> Result<Self, AppError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(AppError::InvalidSession(
                "Cannot start a quiz without a subject".to_string(),
            ));
        }
        if questions.is_empty() {
            return Err(AppError::InvalidSession(
                "Cannot start a quiz without questions".to_string(),
            ));
        }

        Ok(Self {
            subject,
            term,
            exam,
            deadline: time_limit.map(|limit| started_at + limit),
            questions,
            answers: HashMap::new(),
            current: 0,
            started_at,
            state: SessionState::InProgress,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Records (or clears) the answer for a question index.
    pub fn record_answer(
        &mut self,
        index: usize,
        answer: Option<SubmittedAnswer>,
    ) -> Result<(), AppError> {
        if self.state == SessionState::Finished {
            return Err(AppError::InvalidSession(
                "Quiz has already been submitted".to_string(),
            ));
        }
        if index >= self.questions.len() {
            return Err(AppError::BadRequest(format!(
                "Question index {} out of range",
                index
            )));
        }

        match answer {
            Some(answer) => {
                self.answers.insert(index, answer);
            }
            None => {
                self.answers.remove(&index);
            }
        }
        Ok(())
    }

    /// Moves to the next question, saturating at the last one.
    pub fn advance(&mut self) -> Result<usize, AppError> {
        if self.state == SessionState::Finished {
            return Err(AppError::InvalidSession(
                "Quiz has already been submitted".to_string(),
            ));
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(self.current)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Timer-driven transition: forces a finish once the countdown reaches
    /// zero, scoring whatever answers are currently recorded. The deadline
    /// itself is used as the end time. Returns `None` while the session is
    /// still running or when it already finished.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ScoredOutcome> {
        if self.state == SessionState::Finished || !self.is_expired(now) {
            return None;
        }
        let deadline = self.deadline.expect("expired session has a deadline");
        self.finish(deadline)
    }

    /// Explicit submit. Classifies every recorded answer (missing answers
    /// default to `not_attempted`), awards 1 mark per correct answer, and
    /// builds the result record. A second finish is a no-op returning
    /// `None`, so exactly one scored record exists per attempt.
    pub fn finish(&mut self, ended_at: DateTime<Utc>) -> Option<ScoredOutcome> {
        if self.state == SessionState::Finished {
            return None;
        }
        self.state = SessionState::Finished;

        let mut answered = Vec::with_capacity(self.questions.len());
        let mut score = 0;
        for (index, question) in self.questions.iter().enumerate() {
            let answer = self.answers.get(&index);
            let status = classify(&question.correct_option.0, answer);
            let marks = if status == AnswerStatus::Correct { 1 } else { 0 };
            score += marks;
            answered.push(AnsweredQuestion {
                question_id: question.id,
                user_answer: answer.cloned(),
                status,
                marks,
                topic: question.topic.clone(),
            });
        }

        let time_taken = (ended_at - self.started_at).num_seconds().max(0);

        Some(ScoredOutcome {
            subject: self.subject.clone(),
            term: self.term.clone(),
            exam: self.exam.clone(),
            questions: answered,
            score,
            total_questions: self.questions.len() as i64,
            started_at: self.started_at,
            ended_at,
            time_taken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{CorrectAnswer, QuestionType};
    use sqlx::types::Json;

    fn question(id: i64, topic: &str, correct: CorrectAnswer) -> Question {
        let question_type = match &correct {
            CorrectAnswer::Multiple(_) => QuestionType::Multiple,
            CorrectAnswer::Range { .. } | CorrectAnswer::Scalar(_) => QuestionType::Numerical,
            CorrectAnswer::Single(_) => QuestionType::Single,
        };
        Question {
            id,
            subject: "Physics".to_string(),
            exam: "quiz1".to_string(),
            term: "Jan 2025".to_string(),
            topic: topic.to_string(),
            question_type,
            question: format!("Question {}", id),
            context: None,
            image: None,
            explanation: None,
            options: None,
            correct_option: Json(correct),
            created_at: None,
        }
    }

    fn sample_questions() -> Vec<Question> {
        vec![
            question(1, "waves", CorrectAnswer::Single("A".to_string())),
            question(
                2,
                "optics",
                CorrectAnswer::Multiple(vec!["A".to_string(), "C".to_string()]),
            ),
            question(3, "heat", CorrectAnswer::Range { min: 10.0, max: 12.0 }),
        ]
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_start_requires_questions() {
        let err = QuizSession::start("Physics", None, None, vec![], t0(), None);
        assert!(matches!(err, Err(AppError::InvalidSession(_))));
    }

    #[test]
    fn test_start_requires_subject() {
        let err = QuizSession::start("  ", None, None, sample_questions(), t0(), None);
        assert!(matches!(err, Err(AppError::InvalidSession(_))));
    }

    #[test]
    fn test_scoring_and_statuses() {
        let mut session =
            QuizSession::start("Physics", None, None, sample_questions(), t0(), None).unwrap();

        session
            .record_answer(0, Some(SubmittedAnswer::Choice("a".to_string())))
            .unwrap();
        session
            .record_answer(
                1,
                Some(SubmittedAnswer::Choices(vec![
                    "C".to_string(),
                    "A".to_string(),
                ])),
            )
            .unwrap();
        // Question 3 left unanswered.

        let outcome = session.finish(t0() + Duration::seconds(95)).unwrap();

        assert_eq!(outcome.score, 2);
        assert_eq!(outcome.total_questions, 3);
        assert_eq!(outcome.time_taken, 95);
        assert_eq!(outcome.questions[0].status, AnswerStatus::Correct);
        assert_eq!(outcome.questions[1].status, AnswerStatus::Correct);
        assert_eq!(outcome.questions[2].status, AnswerStatus::NotAttempted);
        assert_eq!(outcome.questions[2].marks, 0);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut session =
            QuizSession::start("Physics", None, None, sample_questions(), t0(), None).unwrap();

        let first = session.finish(t0() + Duration::seconds(30));
        assert!(first.is_some());
        assert!(session.finish(t0() + Duration::seconds(60)).is_none());
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn test_timer_forces_finish_once() {
        let mut session = QuizSession::start(
            "Physics",
            None,
            None,
            sample_questions(),
            t0(),
            Some(Duration::seconds(60)),
        )
        .unwrap();

        session
            .record_answer(0, Some(SubmittedAnswer::Choice("A".to_string())))
            .unwrap();

        // Before the deadline the tick does nothing.
        assert!(session.tick(t0() + Duration::seconds(59)).is_none());

        let outcome = session.tick(t0() + Duration::seconds(61)).unwrap();
        // Scored at the deadline, not at the tick time.
        assert_eq!(outcome.time_taken, 60);
        assert_eq!(outcome.score, 1);

        // Explicit submit arriving at the same moment is a no-op.
        assert!(session.finish(t0() + Duration::seconds(61)).is_none());
        assert!(session.tick(t0() + Duration::seconds(120)).is_none());
    }

    #[test]
    fn test_no_answers_after_finish() {
        let mut session =
            QuizSession::start("Physics", None, None, sample_questions(), t0(), None).unwrap();
        session.finish(t0());
        let err = session.record_answer(0, Some(SubmittedAnswer::Choice("A".to_string())));
        assert!(matches!(err, Err(AppError::InvalidSession(_))));
    }

    #[test]
    fn test_answer_can_be_cleared() {
        let mut session =
            QuizSession::start("Physics", None, None, sample_questions(), t0(), None).unwrap();
        session
            .record_answer(0, Some(SubmittedAnswer::Choice("A".to_string())))
            .unwrap();
        session.record_answer(0, None).unwrap();

        let outcome = session.finish(t0()).unwrap();
        assert_eq!(outcome.questions[0].status, AnswerStatus::NotAttempted);
    }

    #[test]
    fn test_advance_saturates() {
        let mut session =
            QuizSession::start("Physics", None, None, sample_questions(), t0(), None).unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.advance().unwrap(), 1);
        assert_eq!(session.advance().unwrap(), 2);
        assert_eq!(session.advance().unwrap(), 2);
    }

    #[test]
    fn test_out_of_range_answer_rejected() {
        let mut session =
            QuizSession::start("Physics", None, None, sample_questions(), t0(), None).unwrap();
        let err = session.record_answer(9, Some(SubmittedAnswer::Choice("A".to_string())));
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }
}
