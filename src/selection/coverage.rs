//! Least-recently-seen selection for breadth over popularity

use super::ordering::{by_staleness, dedup_by_id};
use crate::domain::Item;

pub fn select_least_recent<'a>(items: &[&'a Item], target: usize) -> Vec<&'a Item> {
    let mut ordered = items.to_vec();
    ordered.sort_by(|a, b| by_staleness(a, b));
    let mut ordered = dedup_by_id(ordered);
    ordered.truncate(target);
    ordered
}
