//! Orderings shared by the selection modes.
//!
//! Every comparator ends on `id` so identical timestamps still produce a
//! stable, reproducible order.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::Item;

/// Most overdue first, then lowest level, then id
pub fn by_due(a: &Item, b: &Item, now: DateTime<Utc>) -> Ordering {
    b.overdue_ms(now)
        .cmp(&a.overdue_ms(now))
        .then_with(|| a.srs_level.cmp(&b.srs_level))
        .then_with(|| a.id.cmp(&b.id))
}

/// Least recently seen first; never-attempted items count as infinitely stale
pub fn by_staleness(a: &Item, b: &Item) -> Ordering {
    match (a.last_attempted_at, b.last_attempted_at) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
    .then_with(|| a.id.cmp(&b.id))
}

/// Due items in due order, followed by everything else least-recently-seen first
pub fn prioritized<'a>(items: &[&'a Item], now: DateTime<Utc>) -> Vec<&'a Item> {
    let (mut due, mut rest): (Vec<&Item>, Vec<&Item>) = items.iter().copied().partition(|i| i.is_due(now));
    due.sort_by(|a, b| by_due(a, b, now));
    rest.sort_by(|a, b| by_staleness(a, b));
    due.extend(rest);
    due
}

/// Keep the first occurrence of each id, preserving order
pub fn dedup_by_id<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<&'a Item> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.id.as_str()) {
            out.push(item);
        }
    }
    out
}
