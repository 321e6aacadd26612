//! Attempt bookkeeping: counters, bounded histories and answer timing.

use chrono::{DateTime, Utc};

use crate::config;
use crate::domain::item::trim_front;
use crate::domain::{AttemptOutcome, AttemptStamp, Item};

/// Record one answer on the item's counters and histories.
///
/// Does not touch SRS scheduling; pair with [`super::apply_review`].
pub fn record_attempt(item: &Item, outcome: &AttemptOutcome, now: DateTime<Utc>) -> Item {
  let mut next = item.clone();
  next.normalize();

  next.times_attempted = next.times_attempted.saturating_add(1);
  if outcome.correct {
    next.correct_attempts = next.correct_attempts.saturating_add(1);
  }
  next.last_attempted_at = Some(now);

  if !outcome.correct {
    if let Some(selected) = outcome.selected_option.as_ref() {
      next.wrong_option_history.push(selected.clone());
      trim_front(&mut next.wrong_option_history, config::WRONG_OPTION_HISTORY_CAP);
    }
  }

  let response_time_ms = (outcome.response_time_ms > 0).then_some(outcome.response_time_ms);
  if let Some(t) = response_time_ms {
    next.answer_times_ms.push(t);
    trim_front(&mut next.answer_times_ms, config::ANSWER_TIMES_CAP);

    // Running mean over timed attempts only
    next.timed_attempts = next.timed_attempts.saturating_add(1);
    let n = next.timed_attempts as f64;
    next.avg_answer_time_ms += (t as f64 - next.avg_answer_time_ms) / n;
  }

  next.attempt_log.push(AttemptStamp {
    at: now,
    correct: outcome.correct,
    response_time_ms,
  });
  trim_front(&mut next.attempt_log, config::ATTEMPT_LOG_CAP);

  next
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ItemKind;

  fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
  }

  fn item() -> Item {
    Item::new("q1", "pharmacology", ItemKind::Question, now())
  }

  #[test]
  fn test_counters_and_timestamp() {
    let after = record_attempt(&item(), &AttemptOutcome::new("q1", true, 3000), now());
    assert_eq!(after.times_attempted, 1);
    assert_eq!(after.correct_attempts, 1);
    assert_eq!(after.last_attempted_at, Some(now()));

    let after = record_attempt(&after, &AttemptOutcome::new("q1", false, 3000), now());
    assert_eq!(after.times_attempted, 2);
    assert_eq!(after.correct_attempts, 1);
    assert!(after.correct_attempts <= after.times_attempted);
  }

  #[test]
  fn test_wrong_history_only_on_wrong_and_capped() {
    let mut current = item();
    current = record_attempt(&current, &AttemptOutcome::new("q1", true, 0).with_selected("A"), now());
    assert!(current.wrong_option_history.is_empty());

    for i in 0..12 {
      let outcome = AttemptOutcome::new("q1", false, 0).with_selected(format!("opt{}", i));
      current = record_attempt(&current, &outcome, now());
    }

    assert_eq!(current.wrong_option_history.len(), 10);
    assert_eq!(current.wrong_option_history.last().map(String::as_str), Some("opt11"));
    assert_eq!(current.wrong_option_history.first().map(String::as_str), Some("opt2"));
  }

  #[test]
  fn test_wrong_without_selection_not_recorded() {
    let after = record_attempt(&item(), &AttemptOutcome::new("q1", false, 1000), now());
    assert!(after.wrong_option_history.is_empty());
  }

  #[test]
  fn test_answer_times_capped_and_mean() {
    let mut current = item();
    for t in [1000, 2000, 3000] {
      current = record_attempt(&current, &AttemptOutcome::new("q1", true, t), now());
    }
    assert!((current.avg_answer_time_ms - 2000.0).abs() < 1e-9);

    for _ in 0..4 {
      current = record_attempt(&current, &AttemptOutcome::new("q1", true, 500), now());
    }
    assert_eq!(current.answer_times_ms, vec![3000, 500, 500, 500, 500]);
  }

  #[test]
  fn test_zero_response_time_skips_timing() {
    let after = record_attempt(&item(), &AttemptOutcome::new("q1", true, 0), now());
    assert!(after.answer_times_ms.is_empty());
    assert_eq!(after.avg_answer_time_ms, 0.0);
    assert_eq!(after.timed_attempts, 0);
  }

  #[test]
  fn test_untimed_attempts_do_not_dilute_mean() {
    let mut current = record_attempt(&item(), &AttemptOutcome::new("q1", false, 0), now());
    current = record_attempt(&current, &AttemptOutcome::new("q1", true, 2000), now());
    assert_eq!(current.answer_times_ms, vec![2000]);
    assert!((current.avg_answer_time_ms - 2000.0).abs() < 1e-9);

    current = record_attempt(&current, &AttemptOutcome::new("q1", true, 0), now());
    current = record_attempt(&current, &AttemptOutcome::new("q1", true, 4000), now());
    assert_eq!(current.times_attempted, 4);
    assert_eq!(current.timed_attempts, 2);
    assert!((current.avg_answer_time_ms - 3000.0).abs() < 1e-9);
  }

  #[test]
  fn test_attempt_log_records_each_answer() {
    let later = now() + chrono::Duration::hours(3);
    let mut current = record_attempt(&item(), &AttemptOutcome::new("q1", false, 0), now());
    current = record_attempt(&current, &AttemptOutcome::new("q1", true, 1500), later);

    assert_eq!(
      current.attempt_log,
      vec![
        AttemptStamp { at: now(), correct: false, response_time_ms: None },
        AttemptStamp { at: later, correct: true, response_time_ms: Some(1500) },
      ]
    );

    for _ in 0..60 {
      current = record_attempt(&current, &AttemptOutcome::new("q1", true, 0), later);
    }
    assert_eq!(current.attempt_log.len(), config::ATTEMPT_LOG_CAP);
  }
}
