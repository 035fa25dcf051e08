//! Per-user points ledger

use super::RecyclingEvent;
use crate::types::Co2Kg;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate recycling totals and point balance for one user
///
/// Mutated only by the activity recorder and the redemption processor,
/// both of which return a new value rather than editing in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLedger {
    pub user_id: String,
    pub display_name: String,
    /// Monotonically non-decreasing
    pub total_items_recycled: u64,
    /// Current spendable balance
    pub total_points: u64,
    /// Monotonically non-decreasing
    pub co2_saved: Co2Kg,
    pub streak_days: u32,
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Most recent first; display cache only, never used for totals
    #[serde(default)]
    pub recent_activity: Vec<RecyclingEvent>,
    /// Bumped on every committed mutation, used for compare-and-swap saves
    #[serde(default)]
    pub version: u64,
}

impl UserLedger {
    /// Fresh ledger for a user with no activity
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            total_items_recycled: 0,
            total_points: 0,
            co2_saved: Co2Kg::ZERO,
            streak_days: 0,
            last_activity_at: None,
            recent_activity: Vec::new(),
            version: 0,
        }
    }

    pub fn has_activity(&self) -> bool {
        self.last_activity_at.is_some()
    }

    /// Read-only view used for ranking
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            items_recycled: self.total_items_recycled,
            points: self.total_points,
            co2_saved: self.co2_saved,
        }
    }
}

/// Immutable copy of the ranking-relevant ledger totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub user_id: String,
    pub display_name: String,
    pub items_recycled: u64,
    pub points: u64,
    pub co2_saved: Co2Kg,
}
