// src/core/select.rs

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::question::Question;

/// Selects a balanced, randomized subset of questions across topics.
///
/// Partitions the pool by topic (or restricts to a single topic when the
/// `topic` filter is set), takes `limit / topic_count` per topic via a
/// uniform Fisher-Yates shuffle, then tops up the integer-division
/// remainder round-robin across topics so no topic exceeds its fair share
/// while supply lasts. The final selection is shuffled again.
///
/// If `limit` exceeds the available pool, all available questions are
/// returned. The RNG is injected so tests can seed it.
pub fn select_questions<R: Rng + ?Sized>(
    rng: &mut R,
    questions: Vec<Question>,
    topic: Option<&str>,
    limit: usize,
) -> Vec<Question> {
    let pool: Vec<Question> = match topic {
        Some(t) => questions.into_iter().filter(|q| q.topic == t).collect(),
        None => questions,
    };

    if limit == 0 || pool.is_empty() {
        return Vec::new();
    }

    // Partition by topic, preserving first-seen order.
    let mut groups: Vec<(String, Vec<Question>)> = Vec::new();
    for q in pool {
        match groups.iter_mut().find(|(t, _)| *t == q.topic) {
            Some((_, group)) => group.push(q),
            None => groups.push((q.topic.clone(), vec![q])),
        }
    }

    let per_topic = limit / groups.len();

    let mut selected = Vec::new();
    let mut leftovers: Vec<Vec<Question>> = Vec::new();
    for (_, mut group) in groups {
        group.shuffle(rng);
        let take = per_topic.min(group.len());
        let rest = group.split_off(take);
        selected.extend(group);
        leftovers.push(rest);
    }

    // Top up: one question per topic per round, in random topic order,
    // until the limit is reached or every leftover pile is empty.
    let mut order: Vec<usize> = (0..leftovers.len()).collect();
    order.shuffle(rng);
    while selected.len() < limit {
        let mut took_any = false;
        for &i in &order {
            if selected.len() >= limit {
                break;
            }
            if let Some(q) = leftovers[i].pop() {
                selected.push(q);
                took_any = true;
            }
        }
        if !took_any {
            break;
        }
    }

    selected.shuffle(rng);
    selected
}
