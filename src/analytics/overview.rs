use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::topics::topic_accuracy;
use crate::config;
use crate::domain::Item;

/// Dashboard totals for the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyOverview {
    pub total_items: usize,
    pub new_items: usize,
    pub attempted_items: usize,
    pub mastered_items: usize,
    pub due_now: usize,
    pub total_attempts: u64,
    pub overall_accuracy: Option<f64>,
    pub weak_topics: usize,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub next_review_at: Option<DateTime<Utc>>,
}

pub fn study_overview(items: &[Item], now: DateTime<Utc>) -> StudyOverview {
    let attempted: Vec<&Item> = items.iter().filter(|i| i.is_attempted()).collect();
    let total_attempts: u64 = attempted.iter().map(|i| i.times_attempted as u64).sum();
    let total_correct: u64 = attempted
        .iter()
        .map(|i| i.correct_attempts.min(i.times_attempted) as u64)
        .sum();

    StudyOverview {
        total_items: items.len(),
        new_items: items.len() - attempted.len(),
        attempted_items: attempted.len(),
        mastered_items: items
            .iter()
            .filter(|i| i.srs_level >= config::MASTERED_LEVEL)
            .count(),
        due_now: items.iter().filter(|i| i.is_due(now)).count(),
        total_attempts,
        overall_accuracy: (total_attempts > 0).then(|| total_correct as f64 / total_attempts as f64),
        weak_topics: topic_accuracy(items).iter().filter(|t| t.is_weak).count(),
        next_review_at: items
            .iter()
            .filter(|i| !i.is_due(now))
            .map(|i| i.srs_next_review_at)
            .min(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, ItemBuilder};
    use chrono::Duration;

    #[test]
    fn test_overview_counts() {
        let later = fixed_now() + Duration::days(3);
        let items = vec![
            ItemBuilder::new("a", "cardio").attempts(4, 4).level(3).due_at(later).build(),
            ItemBuilder::new("b", "neuro").attempts(4, 1).level(1).build(),
            ItemBuilder::new("c", "neuro").build(),
        ];

        let overview = study_overview(&items, fixed_now());
        assert_eq!(overview.total_items, 3);
        assert_eq!(overview.new_items, 1);
        assert_eq!(overview.attempted_items, 2);
        assert_eq!(overview.mastered_items, 1);
        assert_eq!(overview.due_now, 2);
        assert_eq!(overview.total_attempts, 8);
        assert!((overview.overall_accuracy.unwrap() - 0.625).abs() < 1e-9);
        assert_eq!(overview.weak_topics, 1);
        assert_eq!(overview.next_review_at, Some(later));
    }

    #[test]
    fn test_overview_empty() {
        let overview = study_overview(&[], fixed_now());
        assert_eq!(overview.total_items, 0);
        assert!(overview.overall_accuracy.is_none());
        assert!(overview.next_review_at.is_none());
    }
}
