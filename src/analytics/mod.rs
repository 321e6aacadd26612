//! Read-only aggregations over an item snapshot.
//!
//! Every function here is pure and tolerates malformed-but-present data;
//! the engine puts them behind the result cache.

pub mod confusion;
pub mod fading;
pub mod overview;
pub mod skills;
pub mod timing;
pub mod topics;

pub use confusion::{confusion_pairs, option_bias, ConfusionPair, OptionBias};
pub use fading::{fading_items, fading_report, FadingReport, FadingTopic};
pub use overview::{study_overview, StudyOverview};
pub use skills::{skill_accuracy, Category, Classifier, KeywordClassifier, SkillAccuracy};
pub use timing::{time_of_day_performance, HourBucket, TimeOfDayReport};
pub use topics::{strongest_topics, topic_accuracy, weakest_topics, TopicAccuracy};
