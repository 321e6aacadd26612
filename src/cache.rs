//! Time-boxed memoization for expensive aggregation passes.
//!
//! Entries older than the TTL read as misses; nothing is ever served stale.
//! Callers that populate one part of a composite payload use
//! [`ResultCache::merge_at`] so sibling parts already cached are kept.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
  pub payload: V,
  pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ResultCache<V> {
  ttl: Duration,
  entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> ResultCache<V> {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entries: HashMap::new(),
    }
  }

  pub fn with_ttl_secs(secs: u64) -> Self {
    Self::new(Duration::seconds(secs.min(i64::MAX as u64 / 1000) as i64))
  }

  fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
    now - entry.computed_at < self.ttl
  }

  /// Cached payload if present and within TTL
  pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<&V> {
    self.entries
      .get(key)
      .filter(|entry| self.is_fresh(entry, now))
      .map(|entry| &entry.payload)
  }

  pub fn has_valid_cache_at(&self, key: &str, now: DateTime<Utc>) -> bool {
    self.get_at(key, now).is_some()
  }

  pub fn set_at(&mut self, key: &str, payload: V, now: DateTime<Utc>) {
    self.entries.insert(
      key.to_string(),
      CacheEntry {
        payload,
        computed_at: now,
      },
    );
  }

  /// Read-merge-write.
  ///
  /// `merge` receives the current fresh payload (None on miss or expiry) and
  /// returns the new one. A fresh entry keeps its original timestamp, so the
  /// oldest part of a composite payload still bounds its age.
  pub fn merge_at(&mut self, key: &str, now: DateTime<Utc>, merge: impl FnOnce(Option<V>) -> V) -> V {
    let existing = self
      .entries
      .get(key)
      .filter(|entry| self.is_fresh(entry, now))
      .cloned();

    let computed_at = existing.as_ref().map_or(now, |e| e.computed_at);
    let payload = merge(existing.map(|e| e.payload));

    self.entries.insert(
      key.to_string(),
      CacheEntry {
        payload: payload.clone(),
        computed_at,
      },
    );
    payload
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
