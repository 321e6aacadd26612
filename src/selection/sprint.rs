//! Productive-struggle selection.
//!
//! Items the learner gets right most of the time but not always carry the
//! most learning signal per minute. When too few items sit in that band the
//! session is topped up with unattempted items.

use chrono::{DateTime, Utc};

use super::ordering::{by_due, by_staleness, dedup_by_id};
use crate::config;
use crate::domain::Item;

fn in_band(item: &Item) -> bool {
    item.accuracy()
        .is_some_and(|a| (config::STRUGGLE_BAND_LOW..=config::STRUGGLE_BAND_HIGH).contains(&a))
}

pub fn select_sprint<'a>(items: &[&'a Item], target: usize, now: DateTime<Utc>) -> Vec<&'a Item> {
    let mid = (config::STRUGGLE_BAND_LOW + config::STRUGGLE_BAND_HIGH) / 2.0;
    let distance = |item: &Item| item.accuracy().map_or(f64::MAX, |a| (a - mid).abs());

    let mut band: Vec<&Item> = items.iter().copied().filter(|i| in_band(i)).collect();
    band.sort_by(|a, b| {
        distance(a)
            .total_cmp(&distance(b))
            .then_with(|| by_due(a, b, now))
    });

    let mut fresh: Vec<&Item> = items.iter().copied().filter(|i| !i.is_attempted()).collect();
    fresh.sort_by(|a, b| by_staleness(a, b));

    let mut picked = dedup_by_id(band.into_iter().chain(fresh));
    picked.truncate(target);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, ItemBuilder};

    #[test]
    fn test_band_first_then_unattempted() {
        let items = vec![
            ItemBuilder::new("mastered", "t").attempts(10, 10).build(),
            ItemBuilder::new("hopeless", "t").attempts(10, 1).build(),
            ItemBuilder::new("edge", "t").attempts(10, 6).build(),
            ItemBuilder::new("sweet", "t").attempts(4, 3).build(),
            ItemBuilder::new("fresh", "t").build(),
        ];
        let refs: Vec<&Item> = items.iter().collect();

        let ids: Vec<_> = select_sprint(&refs, 10, fixed_now()).iter().map(|i| i.id.as_str()).collect();
        // 0.75 is closer to the band middle than 0.60
        assert_eq!(ids, vec!["sweet", "edge", "fresh"]);
    }

    #[test]
    fn test_truncates_to_target() {
        let items: Vec<Item> = (0..6)
            .map(|i| ItemBuilder::new(&format!("s{}", i), "t").attempts(10, 7).build())
            .collect();
        let refs: Vec<&Item> = items.iter().collect();
        let out = select_sprint(&refs, 4, fixed_now());
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["s0", "s1", "s2", "s3"]);
    }
}
