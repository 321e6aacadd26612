//! Confusion pairs and option-selection bias from wrong answers

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config;
use crate::domain::Item;

/// A (correct option, mistakenly chosen option) tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionPair {
    pub correct_option: String,
    pub selected_option: String,
    pub count: u32,
}

/// Histogram of options chosen when wrong
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionBias {
    pub histogram: BTreeMap<String, u32>,
    pub total_wrong: u32,
    /// Option picked in more than the bias threshold share of wrong answers
    pub biased_option: Option<String>,
    pub biased_share: Option<f64>,
}

/// Most frequent confusion pairs across all items' wrong-option history
pub fn confusion_pairs(items: &[Item], limit: usize) -> Vec<ConfusionPair> {
    let mut tally: HashMap<(&str, &str), u32> = HashMap::new();

    for item in items {
        let Some(correct) = item.correct_option.as_deref() else {
            continue;
        };
        for selected in &item.wrong_option_history {
            if selected == correct {
                continue;
            }
            *tally.entry((correct, selected.as_str())).or_insert(0) += 1;
        }
    }

    let mut pairs: Vec<ConfusionPair> = tally
        .into_iter()
        .map(|((correct, selected), count)| ConfusionPair {
            correct_option: correct.to_string(),
            selected_option: selected.to_string(),
            count,
        })
        .collect();

    pairs.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.correct_option.cmp(&b.correct_option))
            .then_with(|| a.selected_option.cmp(&b.selected_option))
    });
    pairs.truncate(limit);
    pairs
}

/// Which options the learner gravitates to when wrong.
///
/// A bias is only flagged once there are enough wrong picks to mean
/// anything (the same minimum used for time-of-day buckets).
pub fn option_bias(items: &[Item]) -> OptionBias {
    let mut histogram: BTreeMap<String, u32> = BTreeMap::new();
    for item in items {
        for selected in &item.wrong_option_history {
            *histogram.entry(selected.trim().to_string()).or_insert(0) += 1;
        }
    }

    let total_wrong: u32 = histogram.values().sum();

    let top = histogram
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(option, count)| (option.clone(), *count as f64 / total_wrong as f64));

    let (biased_option, biased_share) = match top {
        Some((option, share))
            if total_wrong as usize >= config::MIN_BUCKET_SAMPLES
                && share > config::OPTION_BIAS_THRESHOLD =>
        {
            (Some(option), Some(share))
        }
        _ => (None, None),
    };

    OptionBias {
        histogram,
        total_wrong,
        biased_option,
        biased_share,
    }
}
