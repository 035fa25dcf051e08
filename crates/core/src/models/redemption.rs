//! Redemption records

use super::PartnerOffer;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fulfillment state of a redemption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Fulfilled => "fulfilled",
            RedemptionStatus::Cancelled => "cancelled",
        }
    }

    /// Only pending redemptions move, and only to a terminal state
    pub fn transition(self, next: RedemptionStatus) -> Result<RedemptionStatus> {
        match (self, next) {
            (RedemptionStatus::Pending, RedemptionStatus::Fulfilled)
            | (RedemptionStatus::Pending, RedemptionStatus::Cancelled) => Ok(next),
            (from, to) => Err(Error::InvalidStatusTransition { from, to }),
        }
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(RedemptionStatus::Pending),
            "fulfilled" => Ok(RedemptionStatus::Fulfilled),
            "cancelled" => Ok(RedemptionStatus::Cancelled),
            other => Err(Error::InvalidData(format!(
                "unknown redemption status: {}",
                other
            ))),
        }
    }
}

/// An exchange of points for an offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    pub user_id: String,
    pub offer_id: String,
    pub points_used: u64,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

impl Redemption {
    /// New pending redemption for the offer's current cost
    pub fn pending(user_id: &str, offer: &PartnerOffer, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            offer_id: offer.id.clone(),
            points_used: offer.points_cost,
            status: RedemptionStatus::Pending,
            created_at,
        }
    }
}
