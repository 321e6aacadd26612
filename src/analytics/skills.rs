//! Skill-category classification and per-category accuracy.
//!
//! Classification sits behind the [`Classifier`] trait so the keyword
//! matcher can be replaced by a better tagger without touching aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Item;

/// Skill category label
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub trait Classifier: Send + Sync {
    fn classify(&self, item: &Item) -> Category;
}

/// Case-insensitive keyword-substring classifier.
///
/// Rules are checked in order against the prompt, then the topic; the first
/// rule with a matching keyword wins.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<(Category, Vec<String>)>,
    fallback: Category,
}

impl KeywordClassifier {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Category::new(fallback),
        }
    }

    pub fn rule(mut self, category: impl Into<String>, keywords: &[&str]) -> Self {
        let keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        self.rules.push((Category::new(category), keywords));
        self
    }

    fn match_text(&self, text: &str) -> Option<&Category> {
        let text = text.to_lowercase();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|(category, _)| category)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new("recall")
            .rule(
                "calculation",
                &["calculate", "how many", "how much", "percent", "ratio", "dose", "formula"],
            )
            .rule("diagnosis", &["diagnos", "most likely", "presents with", "identify the"])
            .rule(
                "management",
                &["treatment", "manage", "next step", "first-line", "first line", "best initial"],
            )
            .rule(
                "mechanism",
                &["mechanism", "pathophysiology", "cause of", "why does", "because"],
            )
            .rule(
                "interpretation",
                &["graph", "table", "passage", "according to", "interpret", "data"],
            )
            .rule("definition", &["define", "definition", "what is meant", "term for"])
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, item: &Item) -> Category {
        self.match_text(&item.prompt)
            .or_else(|| self.match_text(&item.topic))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Accuracy rollup for one skill category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAccuracy {
    pub category: Category,
    pub item_count: usize,
    pub attempts: u64,
    pub correct: u64,
    pub accuracy: Option<f64>,
}

/// Accuracy per skill category, sorted by category name
pub fn skill_accuracy(items: &[Item], classifier: &dyn Classifier) -> Vec<SkillAccuracy> {
    let mut by_category: BTreeMap<Category, SkillAccuracy> = BTreeMap::new();

    for item in items {
        let category = classifier.classify(item);
        let entry = by_category
            .entry(category.clone())
            .or_insert_with(|| SkillAccuracy {
                category,
                item_count: 0,
                attempts: 0,
                correct: 0,
                accuracy: None,
            });
        entry.item_count += 1;
        entry.attempts += item.times_attempted as u64;
        entry.correct += item.correct_attempts.min(item.times_attempted) as u64;
    }

    by_category
        .into_values()
        .map(|mut s| {
            if s.attempts > 0 {
                s.accuracy = Some(s.correct as f64 / s.attempts as f64);
            }
            s
        })
        .collect()
}
