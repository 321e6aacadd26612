//! Balanced sessions mixing long-form questions with short-form flashcards

use chrono::{DateTime, Utc};

use super::ordering::{dedup_by_id, prioritized};
use crate::domain::Item;

/// Reserve roughly `short_ratio` of the session for short-form items.
///
/// A small short-form pool shrinks its share instead of failing, and either
/// pool backfills the other when it runs dry. Short items are spread evenly
/// through the session.
pub fn select_balanced<'a>(
    items: &[&'a Item],
    target: usize,
    short_ratio: f64,
    now: DateTime<Utc>,
) -> Vec<&'a Item> {
    let ordered = dedup_by_id(prioritized(items, now));
    let (short, long): (Vec<&Item>, Vec<&Item>) = ordered.into_iter().partition(|i| i.kind.is_short_form());

    let ratio = if short_ratio.is_finite() {
        short_ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut short_quota = (target as f64 * ratio).round() as usize;
    // Never round a present minority pool away entirely
    if ratio > 0.0 && short_quota == 0 && target > 1 && !short.is_empty() {
        short_quota = 1;
    }
    let short_quota = short_quota.min(short.len()).min(target);

    let long_take = (target - short_quota).min(long.len());
    let short_take = (target - long_take).min(short.len());

    interleave(&long[..long_take], &short[..short_take])
}

/// Spread `minor` evenly through `major`
fn interleave<'a>(major: &[&'a Item], minor: &[&'a Item]) -> Vec<&'a Item> {
    let total = major.len() + minor.len();
    let mut out = Vec::with_capacity(total);
    let (mut mi, mut ni) = (0, 0);

    for slot in 0..total {
        let minor_due = (slot + 1) * minor.len() / total;
        if ni < minor_due || mi >= major.len() {
            out.push(minor[ni]);
            ni += 1;
        } else {
            out.push(major[mi]);
            mi += 1;
        }
    }
    out
}
