//! Leaderboard-related models

use crate::errors::{Error, Result};
use crate::types::Co2Kg;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reporting window for a leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFrame {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Daily => "daily",
            TimeFrame::Weekly => "weekly",
            TimeFrame::Monthly => "monthly",
            TimeFrame::AllTime => "allTime",
        }
    }
}

impl FromStr for TimeFrame {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(TimeFrame::Daily),
            "weekly" => Ok(TimeFrame::Weekly),
            "monthly" => Ok(TimeFrame::Monthly),
            "allTime" | "all_time" => Ok(TimeFrame::AllTime),
            other => Err(Error::InvalidData(format!("unknown time frame: {}", other))),
        }
    }
}

/// Value a leaderboard is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaderboardMetric {
    #[default]
    Points,
    ItemsRecycled,
    Co2Saved,
}

/// One ranked row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub items_recycled: u64,
    pub points: u64,
    pub co2_saved: Co2Kg,
    pub level: u64,
    /// 1-based position in the ordered list
    pub rank: u32,
}

/// Ordered leaderboard for one time frame and metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub time_frame: TimeFrame,
    pub metric: LeaderboardMetric,
    /// True when figures are scaled from lifetime totals rather than
    /// aggregated over the actual window
    pub is_estimate: bool,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Rank of a user, or `None` when they fall outside the ranked window
    pub fn rank_of(&self, user_id: &str) -> Option<u32> {
        self.entry_for(user_id).map(|e| e.rank)
    }

    pub fn entry_for(&self, user_id: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Population-wide totals for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityStats {
    pub total_users: u64,
    /// Points currently held across all ledgers
    pub total_points_outstanding: u64,
    pub total_items_processed: u64,
    pub total_co2_saved: Co2Kg,
}
