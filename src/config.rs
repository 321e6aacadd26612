//! Engine configuration constants.
//!
//! Scheduling constants are fixed; runtime settings (database path, port,
//! cache TTL, sync debounce, learner UTC offset) are loaded from config.toml, then the
//! environment, then defaults.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::PathBuf;

// ==================== SRS Configuration ====================

/// Interval (days) granted on the first success and after any failure
pub const SEED_INTERVAL_DAYS: f64 = 1.0;

/// Ease factor given to brand-new items
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Ease factor never drops below this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor never grows above this
pub const MAX_EASE_FACTOR: f64 = 3.0;

/// Ease gained on a confident correct review of a reviewing item
pub const EASE_BONUS: f64 = 0.05;

/// Ease lost on an incorrect review
pub const EASE_PENALTY: f64 = 0.2;

/// Level at which an item counts as "reviewing" rather than learning
pub const REVIEWING_LEVEL: u32 = 2;

/// Level at which an item counts as mastered on dashboards
pub const MASTERED_LEVEL: u32 = 3;

/// Share of the granted interval growth kept when the learner guessed
pub const GUESSED_GROWTH_FACTOR: f64 = 0.5;

/// Interval ceiling (days); keeps due timestamps representable
pub const MAX_INTERVAL_DAYS: f64 = 36_500.0;

pub const MS_PER_DAY: i64 = 86_400_000;

// ==================== Attempt History ====================

/// Most recent wrong picks kept per item
pub const WRONG_OPTION_HISTORY_CAP: usize = 10;

/// Most recent answer times kept per item
pub const ANSWER_TIMES_CAP: usize = 5;

/// Most recent timestamped attempts kept per item for hour-of-day stats
pub const ATTEMPT_LOG_CAP: usize = 50;

// ==================== Selection Configuration ====================

/// Productive-struggle accuracy band used by sprint sessions
pub const STRUGGLE_BAND_LOW: f64 = 0.60;
pub const STRUGGLE_BAND_HIGH: f64 = 0.85;

/// Share of a balanced session reserved for short-form items (flashcards)
pub const SHORT_FORM_RATIO: f64 = 0.30;

/// Mixed session quotas: due, weak topic, stale. Fresh items get the rest.
pub const MIX_DUE_SHARE: f64 = 0.40;
pub const MIX_WEAK_SHARE: f64 = 0.30;
pub const MIX_STALE_SHARE: f64 = 0.20;

/// Number of weakest topics mixed sessions draw from
pub const MIX_WEAK_TOPICS: usize = 3;

// ==================== Analytics Configuration ====================

/// Topic accuracy below this is flagged weak
pub const WEAK_TOPIC_THRESHOLD: f64 = 0.60;

/// An option picked in more than this share of wrong answers is a bias
pub const OPTION_BIAS_THRESHOLD: f64 = 0.30;

/// Minimum items in an hour bucket before it is surfaced
pub const MIN_BUCKET_SAMPLES: usize = 5;

/// Days without an attempt before an attempted item counts as fading
pub const FADING_DAYS: i64 = 7;

/// Default limit for top-N analytics queries
pub const DEFAULT_TOP_N: usize = 5;

// ==================== Cache / Sync Defaults ====================

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

pub const DEFAULT_SYNC_DEBOUNCE_SECS: u64 = 10;

// ==================== Server Configuration ====================

pub const SERVER_ADDR: &str = "0.0.0.0";

pub const DEFAULT_SERVER_PORT: u16 = 3000;

pub const DEFAULT_DATABASE_PATH: &str = "data/items.db";

/// Runtime settings for the engine and server
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub cache_ttl_secs: u64,
    pub sync_debounce_secs: u64,
    /// Learner's offset from UTC, used for time-of-day buckets
    pub utc_offset_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            port: DEFAULT_SERVER_PORT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            sync_debounce_secs: DEFAULT_SYNC_DEBOUNCE_SECS,
            utc_offset_minutes: 0,
        }
    }
}

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database: Option<DatabaseSection>,
    server: Option<ServerSection>,
    engine: Option<EngineSection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct EngineSection {
    cache_ttl_secs: Option<u64>,
    sync_debounce_secs: Option<u64>,
    utc_offset_minutes: Option<i32>,
}

impl EngineConfig {
    /// Load settings with priority: config.toml > environment (.env) > default
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let file = std::fs::read_to_string("config.toml")
            .ok()
            .and_then(|contents| match toml::from_str::<FileConfig>(&contents) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring malformed config.toml: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let database_path = file
            .database
            .and_then(|d| d.path)
            .or_else(|| env("DATABASE_PATH"))
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let port = file
            .server
            .and_then(|s| s.port)
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(defaults.port);

        let (file_ttl, file_debounce, file_offset) = file
            .engine
            .map(|e| (e.cache_ttl_secs, e.sync_debounce_secs, e.utc_offset_minutes))
            .unwrap_or((None, None, None));

        let cache_ttl_secs = file_ttl
            .or_else(|| env("CACHE_TTL_SECS").and_then(|v| v.parse().ok()))
            .unwrap_or(defaults.cache_ttl_secs);

        let sync_debounce_secs = file_debounce
            .or_else(|| env("SYNC_DEBOUNCE_SECS").and_then(|v| v.parse().ok()))
            .unwrap_or(defaults.sync_debounce_secs);

        let utc_offset_minutes = file_offset
            .or_else(|| env("UTC_OFFSET_MINUTES").and_then(|v| v.parse().ok()))
            .unwrap_or(defaults.utc_offset_minutes);

        Self {
            database_path,
            port,
            cache_ttl_secs,
            sync_debounce_secs,
            utc_offset_minutes,
        }
    }

    /// Learner offset; out-of-range values (beyond +/-24h) fall back to UTC
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!("Ignoring invalid UTC offset of {} minutes", self.utc_offset_minutes);
                Utc.fix()
            })
    }

    /// Full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", SERVER_ADDR, self.port)
    }
}
