pub mod attempt;
pub mod item;

pub use attempt::{AttemptOutcome, Confidence};
pub use item::{AttemptStamp, Item, ItemKind, LastReview};
