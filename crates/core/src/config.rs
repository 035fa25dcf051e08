//! Engine configuration
//!
//! Persisted as JSON in the `settings` table; any missing field falls back
//! to its default.

use crate::errors::{Error, Result};
use crate::models::{RewardTable, TimeFrame};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of events kept in a ledger's recent-activity list
pub const DEFAULT_RETENTION_CAP: usize = 20;
/// Points needed to advance one level
pub const DEFAULT_POINTS_PER_LEVEL: u64 = 100;
/// Size of the ranked leaderboard window
pub const DEFAULT_LEADERBOARD_TOP_N: usize = 50;

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Scale-down factors approximating recent activity from lifetime totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeFrameFactors {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

impl TimeFrameFactors {
    pub fn factor(&self, time_frame: TimeFrame) -> f64 {
        match time_frame {
            TimeFrame::Daily => self.daily,
            TimeFrame::Weekly => self.weekly,
            TimeFrame::Monthly => self.monthly,
            TimeFrame::AllTime => 1.0,
        }
    }
}

impl Default for TimeFrameFactors {
    fn default() -> Self {
        Self {
            daily: 0.10,
            weekly: 0.40,
            monthly: 1.0,
        }
    }
}

/// Tunables for the points engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub retention_cap: usize,
    pub points_per_level: u64,
    pub leaderboard_top_n: usize,
    /// Offset of the user's local calendar from UTC, used for streak days
    pub utc_offset_minutes: i32,
    pub offer_cache_ttl_secs: u64,
    pub time_frame_factors: TimeFrameFactors,
    pub reward_table: RewardTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention_cap: DEFAULT_RETENTION_CAP,
            points_per_level: DEFAULT_POINTS_PER_LEVEL,
            leaderboard_top_n: DEFAULT_LEADERBOARD_TOP_N,
            utc_offset_minutes: 0,
            offer_cache_ttl_secs: 60,
            time_frame_factors: TimeFrameFactors::default(),
            reward_table: RewardTable::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retention_cap == 0 {
            return Err(Error::ConfigError("retentionCap must be positive".into()));
        }
        if self.points_per_level == 0 {
            return Err(Error::ConfigError("pointsPerLevel must be positive".into()));
        }
        if self.leaderboard_top_n == 0 {
            return Err(Error::ConfigError("leaderboardTopN must be positive".into()));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(Error::ConfigError(format!(
                "utcOffsetMinutes {} is outside +/-14h",
                self.utc_offset_minutes
            )));
        }

        let f = &self.time_frame_factors;
        for (name, value) in [("daily", f.daily), ("weekly", f.weekly), ("monthly", f.monthly)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::ConfigError(format!(
                    "{} factor {} must be in (0, 1]",
                    name, value
                )));
            }
        }

        if self.reward_table.rewards().is_empty() {
            return Err(Error::ConfigError("reward table is empty".into()));
        }
        RewardTable::new(self.reward_table.rewards().to_vec())?;
        for reward in self.reward_table.rewards() {
            if reward.points == 0 || reward.co2_saved.as_f64() < 0.0 {
                return Err(Error::ConfigError(format!(
                    "reward for {} must award points and non-negative CO2",
                    reward.item_type
                )));
            }
        }
        Ok(())
    }

    /// Local calendar offset; falls back to UTC if out of range
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn offer_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.offer_cache_ttl_secs)
    }
}
