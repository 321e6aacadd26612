//! Review scheduling state machine.
//!
//! Items move through three phases keyed by `srs_level`:
//! - 0: new, never answered correctly
//! - 1: learning
//! - 2+: reviewing
//!
//! A correct answer advances one level and grows the interval by the ease
//! factor (the first success gets the fixed seed interval instead). A wrong
//! answer drops the item back to learning (reviewing items) or new (everything
//! else), cuts ease and resets the interval to the seed.
//!
//! All functions are pure: the caller supplies `now`, so replaying the same
//! attempt log reproduces the same schedule.

use chrono::{DateTime, Duration, Utc};

use crate::config;
use crate::domain::{Confidence, Item, LastReview};

/// Result of applying a confidence signal after the fact
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceAdjustment {
  pub item: Item,
  /// True when the schedule was changed
  pub applied: bool,
  /// Learner-facing note, set when the item will come back sooner
  pub message: Option<String>,
}

pub const GUESSED_MESSAGE: &str = "Marked as a guess: this will come back sooner";

/// Due timestamp for an interval given in (fractional) days.
///
/// Saturates at the latest representable instant instead of overflowing.
pub fn due_at(now: DateTime<Utc>, interval_days: f64) -> DateTime<Utc> {
  let days = interval_days.clamp(0.0, config::MAX_INTERVAL_DAYS);
  let ms = (days * config::MS_PER_DAY as f64).round() as i64;
  Duration::try_milliseconds(ms)
    .and_then(|delta| now.checked_add_signed(delta))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Interval kept when a correct answer was only a guess: half the growth
/// that was granted, never below the previous interval or the seed
fn discounted_interval(prior_interval: f64, granted_interval: f64) -> f64 {
  let grown = prior_interval + (granted_interval - prior_interval) * config::GUESSED_GROWTH_FACTOR;
  grown
    .max(prior_interval)
    .max(config::SEED_INTERVAL_DAYS)
    .min(config::MAX_INTERVAL_DAYS)
}

/// Apply one review outcome to an item and return the rescheduled item.
///
/// Malformed SRS fields are repaired to their defaults first, so the first
/// review of brand-new content never fails.
pub fn apply_review(
  item: &Item,
  correct: bool,
  confidence: Option<Confidence>,
  now: DateTime<Utc>,
) -> Item {
  let mut next = item.clone();
  next.normalize();

  let prior_interval = next.srs_interval;
  let prior_ease = next.srs_ease_factor;
  let prior_level = next.srs_level;

  if correct {
    let granted = if prior_level == 0 {
      config::SEED_INTERVAL_DAYS
    } else {
      prior_interval * prior_ease
    }
    .max(prior_interval)
    .min(config::MAX_INTERVAL_DAYS);

    let guessed = confidence.is_some_and(|c| c.is_guess());

    next.srs_level = prior_level.saturating_add(1);
    if prior_level >= config::REVIEWING_LEVEL && !guessed {
      next.srs_ease_factor = (prior_ease + config::EASE_BONUS).min(config::MAX_EASE_FACTOR);
    }
    next.srs_interval = if guessed {
      discounted_interval(prior_interval, granted)
    } else {
      granted
    };
    next.last_review = Some(LastReview {
      correct: true,
      prior_interval,
      prior_ease_factor: prior_ease,
      granted_interval: granted,
      reviewed_at: now,
      confidence,
    });
  } else {
    // Reviewing items fall back to learning, not all the way to new
    next.srs_level = if prior_level >= config::REVIEWING_LEVEL { 1 } else { 0 };
    next.srs_ease_factor = (prior_ease - config::EASE_PENALTY).max(config::MIN_EASE_FACTOR);
    next.srs_interval = config::SEED_INTERVAL_DAYS;
    next.last_review = Some(LastReview {
      correct: false,
      prior_interval,
      prior_ease_factor: prior_ease,
      granted_interval: config::SEED_INTERVAL_DAYS,
      reviewed_at: now,
      // Nothing to discount on a wrong answer
      confidence: None,
    });
  }

  next.srs_next_review_at = due_at(now, next.srs_interval);
  refresh_derived(&mut next);
  next
}

/// Fold a confidence signal submitted after the answer into the schedule.
///
/// Only the first signal after a correct answer counts. A guess shrinks the
/// growth that answer granted and holds ease at its prior value; `somewhat`
/// and `certain` are recorded without changing the schedule.
pub fn adjust_for_confidence(item: &Item, confidence: Confidence, now: DateTime<Utc>) -> ConfidenceAdjustment {
  let unchanged = |item: &Item| ConfidenceAdjustment {
    item: item.clone(),
    applied: false,
    message: None,
  };

  let Some(last) = item.last_review.as_ref() else {
    return unchanged(item);
  };
  if !last.correct || last.confidence.is_some() {
    return unchanged(item);
  }

  let mut next = item.clone();
  next.normalize();

  let mut snapshot = last.clone();
  snapshot.confidence = Some(confidence);

  if !confidence.is_guess() {
    next.last_review = Some(snapshot);
    return ConfidenceAdjustment {
      item: next,
      applied: false,
      message: None,
    };
  }

  next.srs_interval = discounted_interval(snapshot.prior_interval, snapshot.granted_interval);
  next.srs_ease_factor = snapshot
    .prior_ease_factor
    .clamp(config::MIN_EASE_FACTOR, config::MAX_EASE_FACTOR);
  next.srs_next_review_at = due_at(now, next.srs_interval);
  next.last_review = Some(snapshot);
  refresh_derived(&mut next);

  ConfidenceAdjustment {
    item: next,
    applied: true,
    message: Some(GUESSED_MESSAGE.to_string()),
  }
}

/// Recompute memory strength and difficulty from accuracy, interval and ease
pub fn refresh_derived(item: &mut Item) {
  let Some(accuracy) = item.accuracy() else {
    item.memory_strength = None;
    item.difficulty_score = None;
    return;
  };

  let horizon = config::FADING_DAYS as f64;
  item.memory_strength = Some(accuracy * item.srs_interval / (item.srs_interval + horizon));

  let ease_span = config::MAX_EASE_FACTOR - config::MIN_EASE_FACTOR;
  let ease_hardness = (config::MAX_EASE_FACTOR - item.srs_ease_factor) / ease_span;
  item.difficulty_score = Some((0.7 * (1.0 - accuracy) + 0.3 * ease_hardness).clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ItemKind;

  fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
  }

  fn new_item() -> Item {
    Item::new("q1", "cardiology", ItemKind::Question, now())
  }

  fn days(n: f64) -> DateTime<Utc> {
    due_at(now(), n)
  }

  #[test]
  fn test_first_review_correct_uses_seed() {
    let result = apply_review(&new_item(), true, None, now());
    assert_eq!(result.srs_level, 1);
    assert!((result.srs_interval - 1.0).abs() < f64::EPSILON);
    assert!((result.srs_ease_factor - 2.5).abs() < f64::EPSILON);
    assert_eq!(result.srs_next_review_at, days(1.0));
  }

  #[test]
  fn test_lifecycle_scenario() {
    let first = apply_review(&new_item(), true, None, now());

    let day_later = days(1.0);
    let second = apply_review(&first, true, None, day_later);
    assert_eq!(second.srs_level, 2);
    // seed * ease = 1 * 2.5
    assert!((second.srs_interval - 2.5).abs() < 1e-9);
    assert_eq!(second.srs_next_review_at, due_at(day_later, 2.5));

    let third = apply_review(&second, false, None, due_at(day_later, 2.5));
    assert!(third.srs_level <= 1);
    assert!((third.srs_interval - 1.0).abs() < f64::EPSILON);
    assert!((third.srs_ease_factor - 2.3).abs() < 1e-9);
  }

  #[test]
  fn test_reviewing_correct_bumps_ease() {
    let mut item = new_item();
    item.srs_level = 3;
    item.srs_interval = 6.0;

    let result = apply_review(&item, true, None, now());
    assert_eq!(result.srs_level, 4);
    assert!((result.srs_ease_factor - 2.55).abs() < 1e-9);
    // Growth uses the ease in effect before this review
    assert!((result.srs_interval - 15.0).abs() < 1e-9);
  }

  #[test]
  fn test_ease_capped() {
    let mut item = new_item();
    item.srs_level = 5;
    item.srs_ease_factor = 2.98;

    let result = apply_review(&item, true, None, now());
    assert!((result.srs_ease_factor - 3.0).abs() < 1e-9);
  }

  #[test]
  fn test_incorrect_floor_depends_on_phase() {
    let mut reviewing = new_item();
    reviewing.srs_level = 6;
    reviewing.srs_interval = 40.0;
    let result = apply_review(&reviewing, false, None, now());
    assert_eq!(result.srs_level, 1);
    assert!((result.srs_interval - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.srs_next_review_at, days(1.0));

    let mut learning = new_item();
    learning.srs_level = 1;
    let result = apply_review(&learning, false, None, now());
    assert_eq!(result.srs_level, 0);

    let result = apply_review(&new_item(), false, None, now());
    assert_eq!(result.srs_level, 0);
  }

  #[test]
  fn test_ease_factor_floor() {
    let mut item = new_item();
    for _ in 0..20 {
      item = apply_review(&item, false, None, now());
      assert!(item.srs_ease_factor >= config::MIN_EASE_FACTOR);
    }
    assert!((item.srs_ease_factor - config::MIN_EASE_FACTOR).abs() < 1e-9);
  }

  #[test]
  fn test_interval_never_shrinks_on_consecutive_correct() {
    let mut item = new_item();
    let mut at = now();
    let mut previous = item.srs_interval;

    for i in 0..8 {
      // Alternate guessed and confident answers
      let confidence = if i % 3 == 0 { Some(Confidence::Guessed) } else { None };
      item = apply_review(&item, true, confidence, at);
      assert!(item.srs_interval >= previous);
      previous = item.srs_interval;
      at = item.srs_next_review_at;
    }
    assert!(item.srs_interval > 10.0);
  }

  #[test]
  fn test_guessed_not_longer_than_unadjusted() {
    let mut item = new_item();
    item.srs_level = 3;
    item.srs_interval = 4.0;

    let plain = apply_review(&item, true, None, now());
    let guessed = apply_review(&item, true, Some(Confidence::Guessed), now());

    assert!(guessed.srs_interval <= plain.srs_interval);
    assert!(guessed.srs_interval >= item.srs_interval);
    // Ease held flat on a guess
    assert!((guessed.srs_ease_factor - 2.5).abs() < 1e-9);
    assert_eq!(guessed.srs_level, plain.srs_level);
  }

  #[test]
  fn test_certain_has_default_growth() {
    let mut item = new_item();
    item.srs_level = 2;
    item.srs_interval = 2.5;

    let plain = apply_review(&item, true, None, now());
    let certain = apply_review(&item, true, Some(Confidence::Certain), now());
    assert_eq!(plain.srs_interval, certain.srs_interval);
    assert_eq!(plain.srs_ease_factor, certain.srs_ease_factor);
  }

  #[test]
  fn test_deterministic() {
    let mut item = new_item();
    item.srs_level = 2;
    item.srs_interval = 3.3;
    let a = apply_review(&item, true, None, now());
    let b = apply_review(&item, true, None, now());
    assert_eq!(a, b);
  }

  #[test]
  fn test_malformed_item_gets_defaults() {
    let mut item = new_item();
    item.srs_interval = -3.0;
    item.srs_ease_factor = f64::NAN;

    let result = apply_review(&item, true, None, now());
    assert_eq!(result.srs_level, 1);
    assert!((result.srs_interval - 1.0).abs() < f64::EPSILON);
    assert!((result.srs_ease_factor - 2.5).abs() < f64::EPSILON);
  }

  #[test]
  fn test_long_correct_run_stays_bounded() {
    let mut item = new_item();
    let mut at = now();
    for _ in 0..40 {
      item = apply_review(&item, true, None, at);
      assert!(item.srs_interval <= config::MAX_INTERVAL_DAYS);
      assert!(item.srs_next_review_at > at);
      // Drilled ahead of schedule
      at += Duration::minutes(5);
    }
    assert!((item.srs_interval - config::MAX_INTERVAL_DAYS).abs() < f64::EPSILON);
    assert_eq!(item.srs_level, 40);
  }

  #[test]
  fn test_huge_imported_interval_is_clamped() {
    let mut item = new_item();
    item.srs_level = 3;
    item.srs_interval = 1e12;

    let result = apply_review(&item, true, None, now());
    assert!((result.srs_interval - config::MAX_INTERVAL_DAYS).abs() < f64::EPSILON);
    assert_eq!(result.srs_next_review_at, due_at(now(), config::MAX_INTERVAL_DAYS));

    let guessed = adjust_for_confidence(&result, Confidence::Guessed, now());
    assert!(guessed.item.srs_interval <= config::MAX_INTERVAL_DAYS);
  }

  #[test]
  fn test_due_at_saturates() {
    let far = DateTime::<Utc>::MAX_UTC - Duration::days(1);
    assert_eq!(due_at(far, 10.0), DateTime::<Utc>::MAX_UTC);
    assert_eq!(due_at(now(), f64::INFINITY), due_at(now(), config::MAX_INTERVAL_DAYS));
  }

  // Confidence adjustment tests

  #[test]
  fn test_adjust_guessed_shrinks_granted_growth() {
    let mut item = new_item();
    item.srs_level = 3;
    item.srs_interval = 4.0;
    let reviewed = apply_review(&item, true, None, now());

    let later = now() + Duration::seconds(5);
    let adjusted = adjust_for_confidence(&reviewed, Confidence::Guessed, later);

    assert!(adjusted.applied);
    assert_eq!(adjusted.message.as_deref(), Some(GUESSED_MESSAGE));
    assert!(adjusted.item.srs_interval < reviewed.srs_interval);
    assert!(adjusted.item.srs_interval >= 4.0);
    assert!((adjusted.item.srs_ease_factor - 2.5).abs() < 1e-9);
    assert_eq!(adjusted.item.srs_next_review_at, due_at(later, adjusted.item.srs_interval));
    // Same result as guessing up front
    let upfront = apply_review(&item, true, Some(Confidence::Guessed), now());
    assert!((adjusted.item.srs_interval - upfront.srs_interval).abs() < 1e-9);
  }

  #[test]
  fn test_adjust_applies_once() {
    let reviewed = apply_review(&new_item(), true, None, now());
    let first = adjust_for_confidence(&reviewed, Confidence::Guessed, now());
    let second = adjust_for_confidence(&first.item, Confidence::Guessed, now());
    assert!(!second.applied);
    assert_eq!(second.item, first.item);
  }

  #[test]
  fn test_adjust_ignored_after_incorrect() {
    let reviewed = apply_review(&new_item(), false, None, now());
    let adjusted = adjust_for_confidence(&reviewed, Confidence::Guessed, now());
    assert!(!adjusted.applied);
    assert!(adjusted.message.is_none());
    assert_eq!(adjusted.item, reviewed);
  }

  #[test]
  fn test_adjust_without_review_is_noop() {
    let item = new_item();
    let adjusted = adjust_for_confidence(&item, Confidence::Guessed, now());
    assert!(!adjusted.applied);
    assert_eq!(adjusted.item, item);
  }

  #[test]
  fn test_adjust_certain_records_only() {
    let reviewed = apply_review(&new_item(), true, None, now());
    let adjusted = adjust_for_confidence(&reviewed, Confidence::Certain, now());
    assert!(!adjusted.applied);
    assert_eq!(adjusted.item.srs_interval, reviewed.srs_interval);
    assert_eq!(
      adjusted.item.last_review.as_ref().and_then(|r| r.confidence),
      Some(Confidence::Certain)
    );
  }

  // Derived scalar tests

  #[test]
  fn test_refresh_derived_unattempted_is_none() {
    let mut item = new_item();
    refresh_derived(&mut item);
    assert!(item.memory_strength.is_none());
    assert!(item.difficulty_score.is_none());
  }

  #[test]
  fn test_refresh_derived_ranges() {
    let mut strong = new_item();
    strong.times_attempted = 10;
    strong.correct_attempts = 10;
    strong.srs_interval = 30.0;
    strong.srs_ease_factor = 3.0;
    refresh_derived(&mut strong);

    let mut weak = new_item();
    weak.times_attempted = 10;
    weak.correct_attempts = 2;
    weak.srs_ease_factor = 1.3;
    refresh_derived(&mut weak);

    assert!(strong.memory_strength.unwrap() > weak.memory_strength.unwrap());
    assert!(strong.difficulty_score.unwrap() < weak.difficulty_score.unwrap());
    assert!((0.0..=1.0).contains(&weak.difficulty_score.unwrap()));
  }
}
