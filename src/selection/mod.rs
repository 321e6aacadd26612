//! Session assembly.
//!
//! Given the whole store and a target count, each mode produces an ordered,
//! deduplicated list of at most `target` items. Nothing is padded: if the
//! pool is small the session is short and [`SessionPlan::shortfall`] says so.

pub mod balanced;
pub mod coverage;
pub mod due;
pub mod mixed;
pub mod ordering;
pub mod sprint;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::weakest_topics;
use crate::config;
use crate::domain::{Item, ItemKind};

pub use balanced::select_balanced;
pub use coverage::select_least_recent;
pub use due::{select_due, select_weak_topic};
pub use mixed::select_mixed;
pub use sprint::select_sprint;

/// How a session is assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionMode {
    /// Items past their review time, most overdue first
    #[default]
    Due,
    /// Least recently seen first ("random challenge")
    Coverage,
    /// Productive-struggle accuracy band
    Sprint,
    /// Long-form questions with a share of short-form flashcards
    Balanced {
        #[serde(default, rename = "shortFormRatio")]
        short_form_ratio: Option<f64>,
    },
    /// Due ordering within one topic
    WeakTopic { topic: String },
    /// Due, weak-topic, stale and fresh goals blended
    Mixed,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Coverage => "coverage",
            Self::Sprint => "sprint",
            Self::Balanced { .. } => "balanced",
            Self::WeakTopic { .. } => "weak_topic",
            Self::Mixed => "mixed",
        }
    }
}

/// Optional narrowing applied before any mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionFilter {
    pub topic: Option<String>,
    pub kind: Option<ItemKind>,
    pub book_id: Option<String>,
}

impl SessionFilter {
    pub fn matches(&self, item: &Item) -> bool {
        self.topic
            .as_deref()
            .is_none_or(|t| item.topic.eq_ignore_ascii_case(t))
            && self.kind.is_none_or(|k| item.kind == k)
            && self
                .book_id
                .as_deref()
                .is_none_or(|b| item.book_id.as_deref() == Some(b))
    }
}

/// Fewer candidates than requested; surfaced to the learner, not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientCandidates {
    pub requested: usize,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    pub mode: String,
    pub items: Vec<Item>,
    pub shortfall: Option<InsufficientCandidates>,
}

/// Assemble an ordered session of at most `target` distinct items
pub fn select_session(
    items: &[Item],
    target: usize,
    mode: &SessionMode,
    filter: &SessionFilter,
    now: DateTime<Utc>,
) -> Vec<Item> {
    if target == 0 || items.is_empty() {
        return Vec::new();
    }

    let candidates: Vec<&Item> = items.iter().filter(|i| filter.matches(i)).collect();

    let picked = match mode {
        SessionMode::Due => select_due(&candidates, target, now),
        SessionMode::Coverage => select_least_recent(&candidates, target),
        SessionMode::Sprint => select_sprint(&candidates, target, now),
        SessionMode::Balanced { short_form_ratio } => select_balanced(
            &candidates,
            target,
            short_form_ratio.unwrap_or(config::SHORT_FORM_RATIO),
            now,
        ),
        SessionMode::WeakTopic { topic } => select_weak_topic(&candidates, topic, target, now),
        SessionMode::Mixed => {
            let weak: Vec<String> = weakest_topics(items, config::MIX_WEAK_TOPICS)
                .into_iter()
                .filter(|t| t.is_weak)
                .map(|t| t.topic)
                .collect();
            select_mixed(&candidates, target, &weak, now)
        }
    };

    picked.into_iter().cloned().collect()
}

/// [`select_session`] plus the shortfall signal for the caller
pub fn plan_session(
    items: &[Item],
    target: usize,
    mode: &SessionMode,
    filter: &SessionFilter,
    now: DateTime<Utc>,
) -> SessionPlan {
    let selected = select_session(items, target, mode, filter, now);
    let shortfall = (selected.len() < target).then_some(InsufficientCandidates {
        requested: target,
        available: selected.len(),
    });

    SessionPlan {
        mode: mode.as_str().to_string(),
        items: selected,
        shortfall,
    }
}
