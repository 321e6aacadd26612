//! Test utilities for building items with specific histories.

use chrono::{DateTime, Utc};

use crate::domain::{Item, ItemKind};

/// Reference clock shared by tests (2023-11-14T22:13:20Z)
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Fluent builder for items, created at [`fixed_now`]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new(id: &str, topic: &str) -> Self {
        Self {
            item: Item::new(id, topic, ItemKind::Question, fixed_now()),
        }
    }

    pub fn kind(mut self, kind: ItemKind) -> Self {
        self.item.kind = kind;
        self
    }

    /// Set counters; marks the item attempted at `fixed_now` unless a time was set
    pub fn attempts(mut self, total: u32, correct: u32) -> Self {
        self.item.times_attempted = total;
        self.item.correct_attempts = correct;
        if total > 0 && self.item.last_attempted_at.is_none() {
            self.item.last_attempted_at = Some(fixed_now());
        }
        self
    }

    pub fn last_attempted(mut self, at: DateTime<Utc>) -> Self {
        self.item.last_attempted_at = Some(at);
        self
    }

    pub fn due_at(mut self, at: DateTime<Utc>) -> Self {
        self.item.srs_next_review_at = at;
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.item.srs_level = level;
        self
    }

    pub fn interval(mut self, days: f64) -> Self {
        self.item.srs_interval = days;
        self
    }

    pub fn prompt(mut self, prompt: &str) -> Self {
        self.item.prompt = prompt.to_string();
        self
    }

    pub fn correct_option(mut self, option: &str) -> Self {
        self.item.correct_option = Some(option.to_string());
        self
    }

    pub fn wrong_options(mut self, options: &[&str]) -> Self {
        self.item.wrong_option_history = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn book(mut self, book_id: &str) -> Self {
        self.item.book_id = Some(book_id.to_string());
        self
    }

    pub fn avg_answer_time(mut self, ms: f64) -> Self {
        self.item.avg_answer_time_ms = ms;
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}
