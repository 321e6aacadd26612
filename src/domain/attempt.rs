use serde::{Deserialize, Serialize};

/// How sure the learner was about an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
  Guessed,
  Somewhat,
  Certain,
}

impl Confidence {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Guessed => "guessed",
      Self::Somewhat => "somewhat",
      Self::Certain => "certain",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "guessed" => Some(Self::Guessed),
      "somewhat" => Some(Self::Somewhat),
      "certain" => Some(Self::Certain),
      _ => None,
    }
  }

  pub fn is_guess(&self) -> bool {
    matches!(self, Self::Guessed)
  }
}

/// One answer submitted for an item. Never stored; it mutates the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
  pub item_id: String,
  pub correct: bool,
  #[serde(default)]
  pub response_time_ms: u64,
  #[serde(default)]
  pub selected_option: Option<String>,
  #[serde(default)]
  pub confidence: Option<Confidence>,
}

impl AttemptOutcome {
  pub fn new(item_id: impl Into<String>, correct: bool, response_time_ms: u64) -> Self {
    Self {
      item_id: item_id.into(),
      correct,
      response_time_ms,
      selected_option: None,
      confidence: None,
    }
  }

  pub fn with_selected(mut self, option: impl Into<String>) -> Self {
    self.selected_option = Some(option.into());
    self
  }

  pub fn with_confidence(mut self, confidence: Confidence) -> Self {
    self.confidence = Some(confidence);
    self
  }
}
