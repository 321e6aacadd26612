//! Time-of-day performance buckets

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::domain::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourBucket {
    pub hour: u32,
    /// Attempts answered in this hour
    pub attempts: u64,
    pub correct: u64,
    pub accuracy: Option<f64>,
    pub avg_answer_time_ms: Option<f64>,
    /// Enough samples to surface to the learner
    pub meaningful: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDayReport {
    /// Non-empty buckets in hour order
    pub buckets: Vec<HourBucket>,
    pub best_hour: Option<u32>,
    pub worst_hour: Option<u32>,
}

#[derive(Default)]
struct Accumulator {
    attempts: u64,
    correct: u64,
    timed: u64,
    time_sum: f64,
}

fn hour_of(at: DateTime<Utc>, offset: &FixedOffset) -> usize {
    at.with_timezone(offset).hour() as usize
}

/// Bin attempts by the local hour they were answered in.
///
/// `offset` is the learner's UTC offset. Items carry a bounded log of their
/// recent attempts, and each logged attempt lands in its own hour. Records
/// without a log (written before attempts were logged) only know their last
/// attempt, so their lifetime counters are credited to that hour.
pub fn time_of_day_performance(items: &[Item], offset: FixedOffset) -> TimeOfDayReport {
    let mut hours: [Accumulator; 24] = std::array::from_fn(|_| Accumulator::default());

    for item in items.iter().filter(|i| i.is_attempted()) {
        if !item.attempt_log.is_empty() {
            for stamp in &item.attempt_log {
                let acc = &mut hours[hour_of(stamp.at, &offset)];
                acc.attempts += 1;
                if stamp.correct {
                    acc.correct += 1;
                }
                if let Some(t) = stamp.response_time_ms {
                    acc.timed += 1;
                    acc.time_sum += t as f64;
                }
            }
            continue;
        }

        let Some(at) = item.last_attempted_at else {
            continue;
        };
        let acc = &mut hours[hour_of(at, &offset)];
        acc.attempts += item.times_attempted as u64;
        acc.correct += item.correct_attempts.min(item.times_attempted) as u64;
        if item.avg_answer_time_ms > 0.0 {
            let timed = item.timed_attempts.max(1) as u64;
            acc.timed += timed;
            acc.time_sum += item.avg_answer_time_ms * timed as f64;
        }
    }

    let buckets: Vec<HourBucket> = hours
        .iter()
        .enumerate()
        .filter(|(_, acc)| acc.attempts > 0)
        .map(|(hour, acc)| HourBucket {
            hour: hour as u32,
            attempts: acc.attempts,
            correct: acc.correct,
            accuracy: Some(acc.correct as f64 / acc.attempts as f64),
            avg_answer_time_ms: (acc.timed > 0).then(|| acc.time_sum / acc.timed as f64),
            meaningful: acc.attempts >= config::MIN_BUCKET_SAMPLES as u64,
        })
        .collect();

    let ranked = || {
        buckets
            .iter()
            .filter(|b| b.meaningful)
            .filter_map(|b| b.accuracy.map(|a| (b.hour, a)))
    };

    // Earliest hour wins ties
    let best_hour = ranked()
        .fold(None, |best: Option<(u32, f64)>, (h, a)| match best {
            Some((_, ba)) if ba >= a => best,
            _ => Some((h, a)),
        })
        .map(|(h, _)| h);
    let worst_hour = ranked()
        .fold(None, |worst: Option<(u32, f64)>, (h, a)| match worst {
            Some((_, wa)) if wa <= a => worst,
            _ => Some((h, a)),
        })
        .map(|(h, _)| h);

    TimeOfDayReport {
        buckets,
        best_hour,
        worst_hour,
    }
}
