//! Mixed sessions blending four goals.
//!
//! Quotas: due reviews, weak-topic practice, stale items and fresh content.
//! Each pool fills its quota with ids not already taken; leftover slots are
//! backfilled from the pools in that same priority. The picks are then dealt
//! round-robin so the goals alternate through the session.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::ordering::{by_due, by_staleness, prioritized};
use crate::config;
use crate::domain::Item;

pub fn select_mixed<'a>(
    items: &[&'a Item],
    target: usize,
    weak_topics: &[String],
    now: DateTime<Utc>,
) -> Vec<&'a Item> {
    if target == 0 {
        return Vec::new();
    }

    let mut due: Vec<&Item> = items
        .iter()
        .copied()
        .filter(|i| i.is_attempted() && i.is_due(now))
        .collect();
    due.sort_by(|a, b| by_due(a, b, now));

    let in_weak: Vec<&Item> = items
        .iter()
        .copied()
        .filter(|i| weak_topics.iter().any(|t| t.eq_ignore_ascii_case(&i.topic)))
        .collect();
    let weak = prioritized(&in_weak, now);

    let mut stale: Vec<&Item> = items.iter().copied().filter(|i| i.is_attempted()).collect();
    stale.sort_by(|a, b| by_staleness(a, b));

    let mut fresh: Vec<&Item> = items.iter().copied().filter(|i| !i.is_attempted()).collect();
    fresh.sort_by(|a, b| a.id.cmp(&b.id));

    let due_quota = share(target, config::MIX_DUE_SHARE);
    let weak_quota = share(target, config::MIX_WEAK_SHARE);
    let stale_quota = share(target, config::MIX_STALE_SHARE);
    let fresh_quota = target.saturating_sub(due_quota + weak_quota + stale_quota);

    let pools = [
        (due, due_quota),
        (weak, weak_quota),
        (stale, stale_quota),
        (fresh, fresh_quota),
    ];

    let mut taken: HashSet<&str> = HashSet::new();
    let mut lanes: Vec<Vec<&Item>> = vec![Vec::new(); pools.len()];

    for (lane, (pool, quota)) in pools.iter().enumerate() {
        take_into(&mut lanes[lane], pool, *quota, &mut taken);
    }

    let mut picked: usize = lanes.iter().map(Vec::len).sum();
    for (lane, (pool, _)) in pools.iter().enumerate() {
        if picked >= target {
            break;
        }
        picked += take_into(&mut lanes[lane], pool, target - picked, &mut taken);
    }

    round_robin(lanes, target)
}

fn share(target: usize, fraction: f64) -> usize {
    (target as f64 * fraction).round() as usize
}

/// Move up to `limit` not-yet-taken items from `pool` into `lane`
fn take_into<'a>(
    lane: &mut Vec<&'a Item>,
    pool: &[&'a Item],
    limit: usize,
    taken: &mut HashSet<&'a str>,
) -> usize {
    let mut added = 0;
    for &item in pool {
        if added >= limit {
            break;
        }
        if taken.insert(item.id.as_str()) {
            lane.push(item);
            added += 1;
        }
    }
    added
}

fn round_robin<'a>(lanes: Vec<Vec<&'a Item>>, target: usize) -> Vec<&'a Item> {
    let longest = lanes.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = Vec::with_capacity(target);
    for round in 0..longest {
        for lane in &lanes {
            if let Some(item) = lane.get(round) {
                out.push(*item);
            }
        }
    }
    out.truncate(target);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, ItemBuilder};
    use chrono::Duration;
    use std::collections::HashSet;

    fn store() -> Vec<Item> {
        let mut items = Vec::new();
        // Due reviews
        for i in 0..6 {
            items.push(
                ItemBuilder::new(&format!("due{}", i), "cardio")
                    .last_attempted(fixed_now() - Duration::days(2))
                    .attempts(3, 3)
                    .due_at(fixed_now() - Duration::hours(i))
                    .build(),
            );
        }
        // Weak topic, not due
        for i in 0..6 {
            items.push(
                ItemBuilder::new(&format!("weak{}", i), "renal")
                    .last_attempted(fixed_now() - Duration::days(1))
                    .attempts(5, 1)
                    .due_at(fixed_now() + Duration::days(1))
                    .build(),
            );
        }
        // Stale, not due
        for i in 0..6 {
            items.push(
                ItemBuilder::new(&format!("stale{}", i), "neuro")
                    .last_attempted(fixed_now() - Duration::days(40 + i))
                    .attempts(2, 2)
                    .due_at(fixed_now() + Duration::days(3))
                    .build(),
            );
        }
        // Fresh
        for i in 0..6 {
            items.push(ItemBuilder::new(&format!("fresh{}", i), "derm").build());
        }
        items
    }

    #[test]
    fn test_quotas_for_ten() {
        let items = store();
        let refs: Vec<&Item> = items.iter().collect();
        let out = select_mixed(&refs, 10, &["renal".to_string()], fixed_now());

        assert_eq!(out.len(), 10);
        let count = |prefix: &str| out.iter().filter(|i| i.id.starts_with(prefix)).count();
        assert_eq!(count("due"), 4);
        assert_eq!(count("weak"), 3);
        assert_eq!(count("stale"), 2);
        assert_eq!(count("fresh"), 1);
        // Round-robin: first four picks come from four different goals
        let first: HashSet<_> = out[..4].iter().map(|i| &i.id[..3]).collect();
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_weak_topics_match_ignoring_case() {
        let items = store();
        let refs: Vec<&Item> = items.iter().collect();
        let out = select_mixed(&refs, 10, &["RENAL".to_string()], fixed_now());
        assert_eq!(out.iter().filter(|i| i.id.starts_with("weak")).count(), 3);
    }

    #[test]
    fn test_backfill_when_pool_empty() {
        let items: Vec<Item> = (0..8).map(|i| ItemBuilder::new(&format!("fresh{}", i), "t").build()).collect();
        let refs: Vec<&Item> = items.iter().collect();
        let out = select_mixed(&refs, 5, &[], fixed_now());
        assert_eq!(out.len(), 5);
        let ids: HashSet<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_no_duplicates_across_pools() {
        let items = store();
        let refs: Vec<&Item> = items.iter().collect();
        // "cardio" is both due and weak here
        let out = select_mixed(&refs, 24, &["cardio".to_string()], fixed_now());
        let ids: HashSet<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), out.len());
        assert_eq!(out.len(), 24);
    }

    #[test]
    fn test_deterministic() {
        let items = store();
        let refs: Vec<&Item> = items.iter().collect();
        let weak = vec!["renal".to_string()];
        let a: Vec<_> = select_mixed(&refs, 12, &weak, fixed_now()).iter().map(|i| i.id.clone()).collect();
        let b: Vec<_> = select_mixed(&refs, 12, &weak, fixed_now()).iter().map(|i| i.id.clone()).collect();
        assert_eq!(a, b);
    }
}
