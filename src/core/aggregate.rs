// src/core/aggregate.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::MIN_TOPIC_ATTEMPTS;
use crate::models::result::ScoreRow;

/// One flattened answered question, carrying the subject of its owning
/// result. Input for the topic/skill aggregations.
#[derive(Debug, Clone)]
pub struct TopicEntry {
    pub subject: String,
    pub topic: String,
    pub correct: bool,
}

/// The topic a user should focus on, with its observed accuracy.
#[derive(Debug, Clone, Serialize)]
pub struct FocusArea {
    pub topic: String,
    pub subject: String,
    pub accuracy: f64,
    pub attempted: u64,
}

/// Per-subject proficiency for the skills breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectSkill {
    pub subject: String,
    pub proficiency: f64,
    pub attempted: u64,
}

/// A user's position before joining profile data.
#[derive(Debug, Clone, Serialize)]
pub struct RankedScore {
    pub user_id: i64,
    pub total_score: i64,
    pub quizzes_taken: usize,
}

/// Number of consecutive calendar days, ending today or yesterday, on
/// which the user completed at least one quiz. A gap larger than one day
/// before the most recent activity resets the streak to zero.
pub fn current_streak(today: NaiveDate, activity_dates: &[NaiveDate]) -> u32 {
    let mut days: Vec<NaiveDate> = activity_dates.to_vec();
    days.sort_unstable();
    days.dedup();
    days.reverse();

    let Some(&latest) = days.first() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Finds the topic with the lowest accuracy.
///
/// Topics with at least `MIN_TOPIC_ATTEMPTS` answered questions are
/// preferred; when none qualifies, the minimum over all topics is used.
/// Ties keep the first-encountered topic. Returns `None` when the user has
/// no answered questions at all.
pub fn weakest_topic(entries: &[TopicEntry]) -> Option<FocusArea> {
    struct Stats {
        correct: u64,
        total: u64,
        subject: String,
    }

    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, Stats> = HashMap::new();
    for entry in entries {
        let slot = stats.entry(entry.topic.clone()).or_insert_with(|| {
            order.push(entry.topic.clone());
            Stats {
                correct: 0,
                total: 0,
                subject: entry.subject.clone(),
            }
        });
        slot.total += 1;
        if entry.correct {
            slot.correct += 1;
        }
    }

    let pick = |threshold: u64| -> Option<FocusArea> {
        let mut best: Option<FocusArea> = None;
        for topic in &order {
            let s = &stats[topic];
            if s.total < threshold {
                continue;
            }
            let accuracy = s.correct as f64 / s.total as f64 * 100.0;
            if best.as_ref().is_none_or(|b| accuracy < b.accuracy) {
                best = Some(FocusArea {
                    topic: topic.clone(),
                    subject: s.subject.clone(),
                    accuracy,
                    attempted: s.total,
                });
            }
        }
        best
    };

    pick(MIN_TOPIC_ATTEMPTS).or_else(|| pick(0))
}

/// Ranks users by total score across their distinct quizzes.
///
/// A "distinct quiz" is the (subject, term, exam) tuple; only the best
/// score per user per quiz counts, so retakes never inflate the total.
pub fn leaderboard(rows: &[ScoreRow], limit: usize) -> Vec<RankedScore> {
    type QuizKey<'a> = (i64, &'a str, Option<&'a str>, Option<&'a str>);

    let mut best: HashMap<QuizKey, i64> = HashMap::new();
    for row in rows {
        let key = (
            row.user_id,
            row.subject.as_str(),
            row.term.as_deref(),
            row.exam.as_deref(),
        );
        let entry = best.entry(key).or_insert(row.score);
        if row.score > *entry {
            *entry = row.score;
        }
    }

    let mut totals: HashMap<i64, (i64, usize)> = HashMap::new();
    for ((user_id, ..), score) in best {
        let slot = totals.entry(user_id).or_insert((0, 0));
        slot.0 += score;
        slot.1 += 1;
    }

    let mut ranked: Vec<RankedScore> = totals
        .into_iter()
        .map(|(user_id, (total_score, quizzes_taken))| RankedScore {
            user_id,
            total_score,
            quizzes_taken,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then(a.user_id.cmp(&b.user_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Per-subject accuracy percentages, sorted descending and capped.
pub fn subject_skills(entries: &[TopicEntry], cap: usize) -> Vec<SubjectSkill> {
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, (u64, u64)> = HashMap::new();
    for entry in entries {
        let slot = stats.entry(entry.subject.clone()).or_insert_with(|| {
            order.push(entry.subject.clone());
            (0, 0)
        });
        slot.1 += 1;
        if entry.correct {
            slot.0 += 1;
        }
    }

    let mut skills: Vec<SubjectSkill> = order
        .into_iter()
        .map(|subject| {
            let (correct, total) = stats[&subject];
            SubjectSkill {
                proficiency: correct as f64 / total as f64 * 100.0,
                attempted: total,
                subject,
            }
        })
        .collect();

    skills.sort_by(|a, b| {
        b.proficiency
            .partial_cmp(&a.proficiency)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    skills.truncate(cap);
    skills
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(subject: &str, topic: &str, correct: bool) -> TopicEntry {
        TopicEntry {
            subject: subject.to_string(),
            topic: topic.to_string(),
            correct,
        }
    }

    fn entries(subject: &str, topic: &str, correct: usize, total: usize) -> Vec<TopicEntry> {
        (0..total)
            .map(|i| entry(subject, topic, i < correct))
            .collect()
    }

    fn score_row(user_id: i64, subject: &str, term: &str, exam: &str, score: i64) -> ScoreRow {
        ScoreRow {
            user_id,
            subject: subject.to_string(),
            term: Some(term.to_string()),
            exam: Some(exam.to_string()),
            score,
        }
    }

    #[test]
    fn test_streak_three_consecutive_days() {
        let today = date("2025-06-10");
        let dates = [today, today - Duration::days(1), today - Duration::days(2)];
        assert_eq!(current_streak(today, &dates), 3);
    }

    #[test]
    fn test_streak_gap_breaks_run() {
        let today = date("2025-06-10");
        let dates = [today, today - Duration::days(3)];
        assert_eq!(current_streak(today, &dates), 1);
    }

    #[test]
    fn test_streak_stale_activity_is_zero() {
        let today = date("2025-06-10");
        let dates = [today - Duration::days(2), today - Duration::days(3)];
        assert_eq!(current_streak(today, &dates), 0);
    }

    #[test]
    fn test_streak_yesterday_still_counts() {
        let today = date("2025-06-10");
        let dates = [today - Duration::days(1), today - Duration::days(2)];
        assert_eq!(current_streak(today, &dates), 2);
    }

    #[test]
    fn test_streak_duplicate_days_collapse() {
        let today = date("2025-06-10");
        let dates = [today, today, today - Duration::days(1)];
        assert_eq!(current_streak(today, &dates), 2);
    }

    #[test]
    fn test_streak_empty() {
        assert_eq!(current_streak(date("2025-06-10"), &[]), 0);
    }

    #[test]
    fn test_weakest_topic_respects_threshold() {
        // Topic A: 3/5 (60%, meets threshold). Topic B: 1/3 (33%, below).
        let mut all = entries("Physics", "A", 3, 5);
        all.extend(entries("Physics", "B", 1, 3));

        let focus = weakest_topic(&all).unwrap();
        assert_eq!(focus.topic, "A");
        assert_eq!(focus.attempted, 5);
        assert!((focus.accuracy - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_weakest_topic_fallback_below_threshold() {
        // All topics below 5 attempts: true minimum wins.
        let mut all = entries("Physics", "A", 2, 3);
        all.extend(entries("Physics", "B", 1, 3));

        let focus = weakest_topic(&all).unwrap();
        assert_eq!(focus.topic, "B");
    }

    #[test]
    fn test_weakest_topic_tie_keeps_first_encountered() {
        let mut all = entries("Physics", "A", 2, 5);
        all.extend(entries("Chemistry", "B", 2, 5));

        let focus = weakest_topic(&all).unwrap();
        assert_eq!(focus.topic, "A");
        assert_eq!(focus.subject, "Physics");
    }

    #[test]
    fn test_weakest_topic_none_without_data() {
        assert!(weakest_topic(&[]).is_none());
    }

    #[test]
    fn test_leaderboard_retake_takes_max_not_sum() {
        let rows = [
            score_row(1, "Physics", "Jan 2025", "quiz1", 5),
            score_row(1, "Physics", "Jan 2025", "quiz1", 8),
        ];

        let ranked = leaderboard(&rows, 20);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].total_score, 8);
        assert_eq!(ranked[0].quizzes_taken, 1);
    }

    #[test]
    fn test_leaderboard_sums_distinct_quizzes() {
        let rows = [
            score_row(1, "Physics", "Jan 2025", "quiz1", 5),
            score_row(1, "Physics", "Jan 2025", "quiz2", 7),
            score_row(1, "Chemistry", "Jan 2025", "quiz1", 4),
        ];

        let ranked = leaderboard(&rows, 20);
        assert_eq!(ranked[0].total_score, 16);
        assert_eq!(ranked[0].quizzes_taken, 3);
    }

    #[test]
    fn test_leaderboard_sorted_and_capped() {
        let rows: Vec<ScoreRow> = (1..=25)
            .map(|uid| score_row(uid, "Physics", "Jan 2025", "quiz1", uid))
            .collect();

        let ranked = leaderboard(&rows, 20);
        assert_eq!(ranked.len(), 20);
        assert_eq!(ranked[0].user_id, 25);
        assert!(
            ranked
                .windows(2)
                .all(|w| w[0].total_score >= w[1].total_score)
        );
    }

    #[test]
    fn test_subject_skills_sorted_descending() {
        let mut all = entries("Physics", "A", 1, 4); // 25%
        all.extend(entries("Chemistry", "B", 3, 4)); // 75%

        let skills = subject_skills(&all, 5);
        assert_eq!(skills[0].subject, "Chemistry");
        assert_eq!(skills[1].subject, "Physics");
        assert!((skills[0].proficiency - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_subject_skills_capped() {
        let mut all = Vec::new();
        for i in 0..8 {
            all.extend(entries(&format!("Subject{}", i), "t", 1, 2));
        }
        assert_eq!(subject_skills(&all, 5).len(), 5);
    }
}
