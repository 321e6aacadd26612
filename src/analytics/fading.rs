//! Topic-level neglect detection.
//!
//! Separate from SRS due-ness: an item can be far from due and still belong
//! to a topic the learner has not touched in a week.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config;
use crate::domain::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadingTopic {
    pub topic: String,
    pub fading_items: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_attempted_at: DateTime<Utc>,
    pub days_since: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadingReport {
    /// Topics whose most recent attempt is at least the fading window old,
    /// most neglected first
    pub topics: Vec<FadingTopic>,
    pub fading_item_ids: Vec<String>,
}

/// Attempted items not seen for the fading window, sorted by id
pub fn fading_items(items: &[Item], now: DateTime<Utc>) -> Vec<&Item> {
    let mut fading: Vec<&Item> = items.iter().filter(|i| i.is_fading(now)).collect();
    fading.sort_by(|a, b| a.id.cmp(&b.id));
    fading
}

pub fn fading_report(items: &[Item], now: DateTime<Utc>) -> FadingReport {
    struct TopicState {
        latest: DateTime<Utc>,
        fading: usize,
    }

    let mut topics: BTreeMap<&str, TopicState> = BTreeMap::new();
    for item in items.iter().filter(|i| i.is_attempted()) {
        let Some(at) = item.last_attempted_at else {
            continue;
        };
        let state = topics.entry(item.topic.as_str()).or_insert(TopicState {
            latest: at,
            fading: 0,
        });
        state.latest = state.latest.max(at);
        if item.is_fading(now) {
            state.fading += 1;
        }
    }

    let mut fading_topics: Vec<FadingTopic> = topics
        .into_iter()
        .map(|(topic, state)| FadingTopic {
            topic: topic.to_string(),
            fading_items: state.fading,
            last_attempted_at: state.latest,
            days_since: (now - state.latest).num_days(),
        })
        .filter(|t| t.days_since >= config::FADING_DAYS)
        .collect();

    fading_topics.sort_by(|a, b| {
        a.last_attempted_at
            .cmp(&b.last_attempted_at)
            .then_with(|| a.topic.cmp(&b.topic))
    });

    FadingReport {
        topics: fading_topics,
        fading_item_ids: fading_items(items, now).into_iter().map(|i| i.id.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, ItemBuilder};
    use chrono::Duration;

    fn days_ago(n: i64) -> DateTime<Utc> {
        fixed_now() - Duration::days(n)
    }

    #[test]
    fn test_fading_items_threshold() {
        let items = vec![
            ItemBuilder::new("old", "t").last_attempted(days_ago(8)).attempts(1, 1).build(),
            ItemBuilder::new("edge", "t").last_attempted(days_ago(7)).attempts(1, 1).build(),
            ItemBuilder::new("fresh", "t").last_attempted(days_ago(2)).attempts(1, 1).build(),
            ItemBuilder::new("new", "t").build(),
        ];
        let ids: Vec<_> = fading_items(&items, fixed_now()).into_iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["edge", "old"]);
    }

    #[test]
    fn test_topic_fades_only_when_all_attempts_old() {
        let items = vec![
            ItemBuilder::new("a", "anatomy").last_attempted(days_ago(10)).attempts(1, 0).build(),
            ItemBuilder::new("b", "anatomy").last_attempted(days_ago(1)).attempts(1, 1).build(),
            ItemBuilder::new("c", "biochem").last_attempted(days_ago(9)).attempts(2, 1).build(),
            ItemBuilder::new("d", "biochem").last_attempted(days_ago(20)).attempts(1, 1).build(),
            ItemBuilder::new("e", "ethics").build(),
        ];

        let report = fading_report(&items, fixed_now());
        assert_eq!(report.topics.len(), 1);
        let biochem = &report.topics[0];
        assert_eq!(biochem.topic, "biochem");
        assert_eq!(biochem.fading_items, 2);
        assert_eq!(biochem.days_since, 9);
        // Item-level fading still reports the old anatomy item
        assert_eq!(report.fading_item_ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_most_neglected_first() {
        let items = vec![
            ItemBuilder::new("a", "alpha").last_attempted(days_ago(8)).attempts(1, 1).build(),
            ItemBuilder::new("b", "beta").last_attempted(days_ago(30)).attempts(1, 1).build(),
        ];
        let report = fading_report(&items, fixed_now());
        let topics: Vec<_> = report.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(topics, vec!["beta", "alpha"]);
    }
}
