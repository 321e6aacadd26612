use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::domain::Confidence;

/// Content type of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
  /// Multiple-choice exam question
  #[default]
  Question,
  /// Short-form flashcard
  Flashcard,
}

impl ItemKind {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "question" => Some(Self::Question),
      "flashcard" => Some(Self::Flashcard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Question => "question",
      Self::Flashcard => "flashcard",
    }
  }

  pub fn is_short_form(&self) -> bool {
    matches!(self, Self::Flashcard)
  }
}

/// Snapshot of the most recent scheduling update, kept so a confidence
/// signal submitted after the answer can be applied retroactively
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastReview {
  pub correct: bool,
  pub prior_interval: f64,
  pub prior_ease_factor: f64,
  pub granted_interval: f64,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub reviewed_at: DateTime<Utc>,
  /// Confidence already folded into the schedule, if any
  #[serde(default)]
  pub confidence: Option<Confidence>,
}

/// One answered attempt, kept so analytics can bin by when it happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStamp {
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub at: DateTime<Utc>,
  pub correct: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response_time_ms: Option<u64>,
}

/// A learnable item (question or flashcard) with its SRS state.
///
/// Every SRS field has an explicit serde default so records written by older
/// clients or the content pipeline load without shape checks downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub id: String,
  pub topic: String,
  #[serde(default)]
  pub kind: ItemKind,
  /// Source book, used for bulk removal
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub book_id: Option<String>,
  /// Question text or flashcard front, used by skill classification
  #[serde(default)]
  pub prompt: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub correct_option: Option<String>,

  // Counters
  #[serde(default)]
  pub times_attempted: u32,
  #[serde(default)]
  pub correct_attempts: u32,
  #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
  pub last_attempted_at: Option<DateTime<Utc>>,

  // SRS fields
  #[serde(default = "default_interval")]
  pub srs_interval: f64,
  #[serde(default = "default_ease_factor")]
  pub srs_ease_factor: f64,
  #[serde(default)]
  pub srs_level: u32,
  #[serde(default = "default_next_review", with = "chrono::serde::ts_milliseconds")]
  pub srs_next_review_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_review: Option<LastReview>,

  // Auxiliary signals
  #[serde(default)]
  pub wrong_option_history: Vec<String>,
  #[serde(default)]
  pub answer_times_ms: Vec<u64>,
  #[serde(default)]
  pub avg_answer_time_ms: f64,
  /// Attempts that carried a response time; the mean's denominator
  #[serde(default)]
  pub timed_attempts: u32,
  /// Most recent attempts, oldest first
  #[serde(default)]
  pub attempt_log: Vec<AttemptStamp>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub memory_strength: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub difficulty_score: Option<f64>,
}

fn default_interval() -> f64 {
  config::SEED_INTERVAL_DAYS
}

fn default_ease_factor() -> f64 {
  config::DEFAULT_EASE_FACTOR
}

fn default_next_review() -> DateTime<Utc> {
  DateTime::<Utc>::UNIX_EPOCH
}

impl Item {
  /// Fresh, never-attempted item as produced by the content pipeline
  pub fn new(id: impl Into<String>, topic: impl Into<String>, kind: ItemKind, now: DateTime<Utc>) -> Self {
    Self {
      id: id.into(),
      topic: topic.into(),
      kind,
      book_id: None,
      prompt: String::new(),
      correct_option: None,
      times_attempted: 0,
      correct_attempts: 0,
      last_attempted_at: None,
      srs_interval: config::SEED_INTERVAL_DAYS,
      srs_ease_factor: config::DEFAULT_EASE_FACTOR,
      srs_level: 0,
      srs_next_review_at: now,
      last_review: None,
      wrong_option_history: Vec::new(),
      answer_times_ms: Vec::new(),
      avg_answer_time_ms: 0.0,
      timed_attempts: 0,
      attempt_log: Vec::new(),
      memory_strength: None,
      difficulty_score: None,
    }
  }

  /// Repair malformed-but-present state in place.
  ///
  /// Non-finite or out-of-range SRS values fall back to the new-item
  /// defaults, counters are made consistent and bounded histories trimmed.
  pub fn normalize(&mut self) {
    if !self.srs_interval.is_finite() || self.srs_interval <= 0.0 {
      self.srs_interval = config::SEED_INTERVAL_DAYS;
    }
    self.srs_interval = self.srs_interval.min(config::MAX_INTERVAL_DAYS);
    if !self.srs_ease_factor.is_finite() {
      self.srs_ease_factor = config::DEFAULT_EASE_FACTOR;
    }
    self.srs_ease_factor = self
      .srs_ease_factor
      .clamp(config::MIN_EASE_FACTOR, config::MAX_EASE_FACTOR);
    if self.correct_attempts > self.times_attempted {
      self.correct_attempts = self.times_attempted;
    }
    if !self.avg_answer_time_ms.is_finite() || self.avg_answer_time_ms < 0.0 {
      self.avg_answer_time_ms = 0.0;
    }
    // Records written before timed attempts were counted
    if self.timed_attempts == 0 && self.avg_answer_time_ms > 0.0 {
      self.timed_attempts = (self.answer_times_ms.len() as u32).max(1);
    }
    let timed_cap = self.times_attempted.max(self.answer_times_ms.len() as u32);
    self.timed_attempts = self.timed_attempts.min(timed_cap);
    trim_front(&mut self.wrong_option_history, config::WRONG_OPTION_HISTORY_CAP);
    trim_front(&mut self.answer_times_ms, config::ANSWER_TIMES_CAP);
    trim_front(&mut self.attempt_log, config::ATTEMPT_LOG_CAP);
  }

  pub fn is_attempted(&self) -> bool {
    self.times_attempted > 0
  }

  /// Running accuracy, None when never attempted
  pub fn accuracy(&self) -> Option<f64> {
    if self.times_attempted > 0 {
      Some(self.correct_attempts as f64 / self.times_attempted as f64)
    } else {
      None
    }
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.srs_next_review_at <= now
  }

  /// Milliseconds past the due timestamp (negative when not yet due)
  pub fn overdue_ms(&self, now: DateTime<Utc>) -> i64 {
    (now - self.srs_next_review_at).num_milliseconds()
  }

  /// Time since the last attempt, None when never attempted
  pub fn since_last_attempt(&self, now: DateTime<Utc>) -> Option<Duration> {
    self.last_attempted_at.map(|at| now - at)
  }

  pub fn is_fading(&self, now: DateTime<Utc>) -> bool {
    self.is_attempted()
      && self
        .since_last_attempt(now)
        .is_some_and(|d| d >= Duration::days(config::FADING_DAYS))
  }
}

/// Drop the oldest entries so at most `cap` remain
pub(crate) fn trim_front<T>(values: &mut Vec<T>, cap: usize) {
  if values.len() > cap {
    let excess = values.len() - cap;
    values.drain(..excess);
  }
}
