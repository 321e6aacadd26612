pub mod attempts;
pub mod scheduler;

pub use attempts::record_attempt;
pub use scheduler::{adjust_for_confidence, apply_review, due_at, ConfidenceAdjustment};
