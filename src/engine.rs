//! Study engine: the single entry point the server talks to.
//!
//! Owns the item store, the stat caches and the sync handle. Every answer
//! goes through `commit`, which writes the store and drops the caches; the
//! new item state is queued for background sync on the way.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{
    self, Classifier, ConfusionPair, FadingReport, KeywordClassifier, OptionBias, SkillAccuracy,
    StudyOverview, TimeOfDayReport, TopicAccuracy,
};
use crate::cache::ResultCache;
use crate::config;
use crate::domain::{AttemptOutcome, Confidence, Item};
use crate::selection::{self, SessionFilter, SessionMode, SessionPlan};
use crate::srs::{self, ConfidenceAdjustment};
use crate::store::{self, ImportSummary, ItemStore};
use crate::sync::SyncHandle;

pub const BOOK_STATS_KEY: &str = "bookStats";
pub const SKILL_STATS_KEY: &str = "skillStats";

/// Store-wide dashboard stats, populated piecemeal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStats {
    pub overview: Option<StudyOverview>,
    pub topics: Option<TopicReport>,
    pub fading: Option<FadingReport>,
}

/// Per-skill and answer-pattern stats, populated piecemeal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStats {
    pub skills: Option<Vec<SkillAccuracy>>,
    pub confusions: Option<Vec<ConfusionPair>>,
    pub bias: Option<OptionBias>,
    pub time_of_day: Option<TimeOfDayReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicReport {
    /// Every topic, by name
    pub topics: Vec<TopicAccuracy>,
    pub weakest: Vec<TopicAccuracy>,
    pub strongest: Vec<TopicAccuracy>,
}

pub struct StudyEngine {
    store: Box<dyn ItemStore>,
    classifier: Box<dyn Classifier>,
    book_cache: ResultCache<BookStats>,
    skill_cache: ResultCache<SkillStats>,
    utc_offset: FixedOffset,
    sync: Option<SyncHandle>,
}

impl StudyEngine {
    pub fn new(store: impl ItemStore + 'static, cache_ttl_secs: u64) -> Self {
        Self {
            store: Box::new(store),
            classifier: Box::new(KeywordClassifier::default()),
            book_cache: ResultCache::with_ttl_secs(cache_ttl_secs),
            skill_cache: ResultCache::with_ttl_secs(cache_ttl_secs),
            utc_offset: Utc.fix(),
            sync: None,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_sync(mut self, sync: SyncHandle) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Learner's UTC offset, used for time-of-day bucketing
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn items(&self) -> &[Item] {
        self.store.all()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.store.get(id)
    }

    /// Drop every cached stat
    pub fn invalidate(&mut self) {
        self.book_cache.clear();
        self.skill_cache.clear();
    }

    fn commit(&mut self, item: Item) {
        if let Some(sync) = &self.sync {
            sync.mark_dirty(&item);
        }
        self.store.upsert(item);
        self.invalidate();
    }

    // ==== Items ====

    pub fn import_items(&mut self, items: Vec<Item>) -> ImportSummary {
        let ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        let summary = store::import_items(self.store.as_mut(), items);
        self.invalidate();

        if let Some(sync) = &self.sync {
            for id in &ids {
                if let Some(item) = self.store.get(id) {
                    sync.mark_dirty(item);
                }
            }
        }

        tracing::info!("Imported items: {} added, {} updated", summary.added, summary.updated);
        summary
    }

    /// Delete every item of a book, returning the removed ids
    pub fn remove_book(&mut self, book_id: &str) -> Vec<String> {
        let removed = store::remove_book(self.store.as_mut(), book_id);
        if !removed.is_empty() {
            self.invalidate();
            if let Some(sync) = &self.sync {
                sync.mark_removed(removed.clone());
            }
        }
        tracing::info!("Removed {} items of book {}", removed.len(), book_id);
        removed
    }

    /// Fold a remote snapshot in, latest attempt wins per item
    pub fn merge_remote_snapshot(&mut self, remote: Vec<Item>) -> usize {
        let changed = store::merge_snapshot(self.store.as_mut(), remote);
        if !changed.is_empty() {
            self.invalidate();
            if let Some(sync) = &self.sync {
                for id in &changed {
                    if let Some(item) = self.store.get(id) {
                        sync.mark_dirty(item);
                    }
                }
            }
        }
        changed.len()
    }

    // ==== Answers ====

    /// Record an answer and reschedule the item.
    ///
    /// Unknown ids are a no-op: the answer is dropped and None returned.
    pub fn submit_answer(&mut self, outcome: &AttemptOutcome, now: DateTime<Utc>) -> Option<Item> {
        let Some(item) = self.store.get(&outcome.item_id) else {
            tracing::warn!("Answer submitted for unknown item {}", outcome.item_id);
            return None;
        };

        let recorded = srs::record_attempt(item, outcome, now);
        let reviewed = srs::apply_review(&recorded, outcome.correct, outcome.confidence, now);
        tracing::debug!(
            "Item {} answered {}: level {}, next review in {:.2} days",
            reviewed.id,
            if outcome.correct { "correctly" } else { "incorrectly" },
            reviewed.srs_level,
            reviewed.srs_interval
        );

        self.commit(reviewed.clone());
        Some(reviewed)
    }

    /// Apply a confidence signal to the item's most recent answer
    pub fn submit_confidence(
        &mut self,
        item_id: &str,
        confidence: Confidence,
        now: DateTime<Utc>,
    ) -> Option<ConfidenceAdjustment> {
        let Some(item) = self.store.get(item_id) else {
            tracing::warn!("Confidence submitted for unknown item {}", item_id);
            return None;
        };

        let adjustment = srs::adjust_for_confidence(item, confidence, now);
        if &adjustment.item != item {
            self.commit(adjustment.item.clone());
        }
        Some(adjustment)
    }

    // ==== Sessions ====

    pub fn request_session(
        &self,
        target: usize,
        mode: &SessionMode,
        filter: &SessionFilter,
        now: DateTime<Utc>,
    ) -> SessionPlan {
        let plan = selection::plan_session(self.store.all(), target, mode, filter, now);
        if let Some(short) = plan.shortfall {
            tracing::debug!(
                "Session {} short: {} of {} requested",
                plan.mode,
                short.available,
                short.requested
            );
        }
        plan
    }

    // ==== Stats ====

    pub fn overview(&mut self, now: DateTime<Utc>) -> StudyOverview {
        let items = self.store.all();
        cached(
            &mut self.book_cache,
            BOOK_STATS_KEY,
            now,
            |s| s.overview.clone(),
            || analytics::study_overview(items, now),
            |s, v| s.overview = Some(v),
        )
    }

    pub fn topics(&mut self, now: DateTime<Utc>) -> TopicReport {
        let items = self.store.all();
        cached(
            &mut self.book_cache,
            BOOK_STATS_KEY,
            now,
            |s| s.topics.clone(),
            || TopicReport {
                topics: analytics::topic_accuracy(items),
                weakest: analytics::weakest_topics(items, config::DEFAULT_TOP_N),
                strongest: analytics::strongest_topics(items, config::DEFAULT_TOP_N),
            },
            |s, v| s.topics = Some(v),
        )
    }

    pub fn fading(&mut self, now: DateTime<Utc>) -> FadingReport {
        let items = self.store.all();
        cached(
            &mut self.book_cache,
            BOOK_STATS_KEY,
            now,
            |s| s.fading.clone(),
            || analytics::fading_report(items, now),
            |s, v| s.fading = Some(v),
        )
    }

    pub fn skills(&mut self, now: DateTime<Utc>) -> Vec<SkillAccuracy> {
        let items = self.store.all();
        let classifier = self.classifier.as_ref();
        cached(
            &mut self.skill_cache,
            SKILL_STATS_KEY,
            now,
            |s| s.skills.clone(),
            || analytics::skill_accuracy(items, classifier),
            |s, v| s.skills = Some(v),
        )
    }

    pub fn confusions(&mut self, now: DateTime<Utc>) -> Vec<ConfusionPair> {
        let items = self.store.all();
        cached(
            &mut self.skill_cache,
            SKILL_STATS_KEY,
            now,
            |s| s.confusions.clone(),
            || analytics::confusion_pairs(items, config::DEFAULT_TOP_N),
            |s, v| s.confusions = Some(v),
        )
    }

    pub fn option_bias(&mut self, now: DateTime<Utc>) -> OptionBias {
        let items = self.store.all();
        cached(
            &mut self.skill_cache,
            SKILL_STATS_KEY,
            now,
            |s| s.bias.clone(),
            || analytics::option_bias(items),
            |s, v| s.bias = Some(v),
        )
    }

    pub fn time_of_day(&mut self, now: DateTime<Utc>) -> TimeOfDayReport {
        let items = self.store.all();
        let offset = self.utc_offset;
        cached(
            &mut self.skill_cache,
            SKILL_STATS_KEY,
            now,
            |s| s.time_of_day.clone(),
            || analytics::time_of_day_performance(items, offset),
            |s, v| s.time_of_day = Some(v),
        )
    }
}

/// Serve one part of a composite cached payload, computing and merging it in
/// on miss without clobbering the parts already cached
fn cached<S, T>(
    cache: &mut ResultCache<S>,
    key: &str,
    now: DateTime<Utc>,
    read: impl Fn(&S) -> Option<T>,
    compute: impl FnOnce() -> T,
    write: impl FnOnce(&mut S, T),
) -> T
where
    S: Clone + Default,
    T: Clone,
{
    if let Some(hit) = cache.get_at(key, now).and_then(&read) {
        return hit;
    }

    tracing::debug!("Recomputing part of {}", key);
    let value = compute();
    let stored = value.clone();
    cache.merge_at(key, now, |existing| {
        let mut payload = existing.unwrap_or_default();
        write(&mut payload, stored);
        payload
    });
    value
}
