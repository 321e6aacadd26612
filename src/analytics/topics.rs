//! Per-topic accuracy and weak/strong topic ranking

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config;
use crate::domain::Item;

/// Accuracy rollup for one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAccuracy {
    pub topic: String,
    pub item_count: usize,
    pub attempted_items: usize,
    pub attempts: u64,
    pub correct: u64,
    /// None when nothing in the topic was attempted (distinct from 0%)
    pub accuracy: Option<f64>,
    pub is_weak: bool,
}

impl TopicAccuracy {
    fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            item_count: 0,
            attempted_items: 0,
            attempts: 0,
            correct: 0,
            accuracy: None,
            is_weak: false,
        }
    }

    fn finish(mut self) -> Self {
        if self.attempts > 0 {
            let rate = self.correct as f64 / self.attempts as f64;
            self.accuracy = Some(rate);
            self.is_weak = rate < config::WEAK_TOPIC_THRESHOLD;
        }
        self
    }
}

/// Accuracy for every topic, sorted by topic name
pub fn topic_accuracy(items: &[Item]) -> Vec<TopicAccuracy> {
    let mut by_topic: BTreeMap<&str, TopicAccuracy> = BTreeMap::new();

    for item in items {
        let entry = by_topic
            .entry(item.topic.as_str())
            .or_insert_with(|| TopicAccuracy::new(&item.topic));
        entry.item_count += 1;
        if item.is_attempted() {
            entry.attempted_items += 1;
            entry.attempts += item.times_attempted as u64;
            entry.correct += item.correct_attempts.min(item.times_attempted) as u64;
        }
    }

    by_topic.into_values().map(TopicAccuracy::finish).collect()
}

/// Attempted topics, lowest accuracy first
pub fn weakest_topics(items: &[Item], limit: usize) -> Vec<TopicAccuracy> {
    let mut ranked = attempted_topics(items);
    ranked.sort_by(|a, b| {
        a.accuracy
            .partial_cmp(&b.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.topic.cmp(&b.topic))
    });
    ranked.truncate(limit);
    ranked
}

/// Attempted topics, highest accuracy first
pub fn strongest_topics(items: &[Item], limit: usize) -> Vec<TopicAccuracy> {
    let mut ranked = attempted_topics(items);
    ranked.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.topic.cmp(&b.topic))
    });
    ranked.truncate(limit);
    ranked
}

fn attempted_topics(items: &[Item]) -> Vec<TopicAccuracy> {
    topic_accuracy(items)
        .into_iter()
        .filter(|t| t.accuracy.is_some())
        .collect()
}
