//! Due-for-review and weak-topic selection

use chrono::{DateTime, Utc};

use super::ordering::{by_due, dedup_by_id};
use crate::domain::Item;

/// Items whose review time has passed, most overdue first
pub fn select_due<'a>(items: &[&'a Item], target: usize, now: DateTime<Utc>) -> Vec<&'a Item> {
    let mut due: Vec<&Item> = items.iter().copied().filter(|i| i.is_due(now)).collect();
    due.sort_by(|a, b| by_due(a, b, now));
    let mut due = dedup_by_id(due);
    due.truncate(target);
    due
}

/// Due items restricted to one topic (case-insensitive)
pub fn select_weak_topic<'a>(
    items: &[&'a Item],
    topic: &str,
    target: usize,
    now: DateTime<Utc>,
) -> Vec<&'a Item> {
    let in_topic: Vec<&Item> = items
        .iter()
        .copied()
        .filter(|i| i.topic.eq_ignore_ascii_case(topic))
        .collect();
    select_due(&in_topic, target, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, ItemBuilder};
    use chrono::Duration;

    fn refs(items: &[Item]) -> Vec<&Item> {
        items.iter().collect()
    }

    #[test]
    fn test_only_due_items_returned() {
        let items = vec![
            ItemBuilder::new("past", "t").due_at(fixed_now() - Duration::days(1)).build(),
            ItemBuilder::new("now", "t").due_at(fixed_now()).build(),
            ItemBuilder::new("future", "t").due_at(fixed_now() + Duration::seconds(1)).build(),
        ];
        let out = select_due(&refs(&items), 10, fixed_now());
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["past", "now"]);
        assert!(out.iter().all(|i| i.srs_next_review_at <= fixed_now()));
    }

    #[test]
    fn test_fifty_requested_twelve_due() {
        let mut items: Vec<Item> = (0..12)
            .map(|i| {
                ItemBuilder::new(&format!("due{:02}", i), "t")
                    .due_at(fixed_now() - Duration::hours(i))
                    .build()
            })
            .collect();
        items.extend((0..5).map(|i| {
            ItemBuilder::new(&format!("later{}", i), "t")
                .due_at(fixed_now() + Duration::days(2))
                .build()
        }));

        let out = select_due(&refs(&items), 50, fixed_now());
        assert_eq!(out.len(), 12);
        assert_eq!(out[0].id, "due11");
    }

    #[test]
    fn test_weak_topic_filters_then_orders() {
        let items = vec![
            ItemBuilder::new("a", "Renal").due_at(fixed_now() - Duration::hours(1)).build(),
            ItemBuilder::new("b", "renal").due_at(fixed_now() - Duration::hours(5)).build(),
            ItemBuilder::new("c", "cardio").due_at(fixed_now() - Duration::days(9)).build(),
            ItemBuilder::new("d", "renal").due_at(fixed_now() + Duration::hours(5)).build(),
        ];
        let out = select_weak_topic(&refs(&items), "renal", 10, fixed_now());
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_zero_target() {
        let items = vec![ItemBuilder::new("a", "t").build()];
        assert!(select_due(&refs(&items), 0, fixed_now()).is_empty());
    }
}
