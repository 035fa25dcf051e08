//! Recycling activity models and the item reward table

use crate::errors::{Error, Result};
use crate::types::Co2Kg;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of item dropped into a recycling machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Bottle,
    Can,
}

impl ItemType {
    pub const ALL: [ItemType; 2] = [ItemType::Bottle, ItemType::Can];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Bottle => "bottle",
            ItemType::Can => "can",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottle" => Ok(ItemType::Bottle),
            "can" => Ok(ItemType::Can),
            _ => Err(Error::InvalidItemType(s.to_string())),
        }
    }
}

/// Points and CO2 credited for one item of a given type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReward {
    pub item_type: ItemType,
    pub points: u64,
    pub co2_saved: Co2Kg,
}

/// Closed mapping from item type to reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    rewards: Vec<ItemReward>,
}

impl RewardTable {
    /// Build a table; later entries for the same item type are rejected
    pub fn new(rewards: Vec<ItemReward>) -> Result<Self> {
        for (i, reward) in rewards.iter().enumerate() {
            if rewards[..i].iter().any(|r| r.item_type == reward.item_type) {
                return Err(Error::ConfigError(format!(
                    "duplicate reward entry for {}",
                    reward.item_type
                )));
            }
        }
        Ok(Self { rewards })
    }

    /// Look up the reward for an item type
    pub fn lookup(&self, item_type: ItemType) -> Result<&ItemReward> {
        self.rewards
            .iter()
            .find(|r| r.item_type == item_type)
            .ok_or_else(|| Error::InvalidItemType(item_type.to_string()))
    }

    pub fn rewards(&self) -> &[ItemReward] {
        &self.rewards
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            rewards: vec![
                ItemReward {
                    item_type: ItemType::Bottle,
                    points: 5,
                    co2_saved: Co2Kg(0.15),
                },
                ItemReward {
                    item_type: ItemType::Can,
                    points: 1,
                    co2_saved: Co2Kg(0.12),
                },
            ],
        }
    }
}

/// A single recorded recycling event; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecyclingEvent {
    pub id: String,
    pub item_type: ItemType,
    /// Points credited at creation time, never recomputed
    pub points_awarded: u64,
    pub co2_saved: Co2Kg,
    pub timestamp: DateTime<Utc>,
}

impl RecyclingEvent {
    /// Create an event from the reward in effect at `timestamp`
    pub fn new(reward: &ItemReward, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_type: reward.item_type,
            points_awarded: reward.points,
            co2_saved: reward.co2_saved,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_type() {
        assert_eq!("bottle".parse::<ItemType>().unwrap(), ItemType::Bottle);
        assert_eq!(" CAN ".parse::<ItemType>().unwrap(), ItemType::Can);
        assert!(matches!(
            "glass".parse::<ItemType>(),
            Err(Error::InvalidItemType(t)) if t == "glass"
        ));
    }

    #[test]
    fn test_reference_rewards() {
        let table = RewardTable::default();
        let bottle = table.lookup(ItemType::Bottle).unwrap();
        assert_eq!(bottle.points, 5);
        assert_eq!(bottle.co2_saved, Co2Kg(0.15));
        let can = table.lookup(ItemType::Can).unwrap();
        assert_eq!(can.points, 1);
        assert_eq!(can.co2_saved, Co2Kg(0.12));
    }

    #[test]
    fn test_missing_reward_is_invalid_item() {
        let table = RewardTable::new(vec![ItemReward {
            item_type: ItemType::Bottle,
            points: 5,
            co2_saved: Co2Kg(0.15),
        }])
        .unwrap();
        assert!(matches!(
            table.lookup(ItemType::Can),
            Err(Error::InvalidItemType(_))
        ));
    }

    #[test]
    fn test_duplicate_reward_rejected() {
        let reward = ItemReward {
            item_type: ItemType::Can,
            points: 1,
            co2_saved: Co2Kg(0.12),
        };
        assert!(RewardTable::new(vec![reward, reward]).is_err());
    }

    #[test]
    fn test_event_ids_are_unique() {
        let table = RewardTable::default();
        let reward = table.lookup(ItemType::Bottle).unwrap();
        let now = Utc::now();
        let a = RecyclingEvent::new(reward, now);
        let b = RecyclingEvent::new(reward, now);
        assert_ne!(a.id, b.id);
        assert_eq!(a.points_awarded, 5);
    }
}
