//! Activity recorder - turns a recycled item into ledger totals

use super::streak::streak_after;
use chrono::{DateTime, FixedOffset, Utc};
use greenpoints_core::{EngineConfig, ItemType, RecyclingEvent, Result, UserLedger};

/// A ledger after one recorded item, plus the event to append to history
#[derive(Debug, Clone)]
pub struct RecordedActivity {
    pub ledger: UserLedger,
    pub event: RecyclingEvent,
}

/// Record one recycled item against a ledger
///
/// Works on a copy: on error the caller's ledger is untouched, on success
/// every total moves together in the returned value.
pub fn record_activity(
    ledger: &UserLedger,
    item_type: ItemType,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<RecordedActivity> {
    let reward = config.reward_table.lookup(item_type)?;
    let event = RecyclingEvent::new(reward, now);

    let mut next = ledger.clone();
    apply_event(&mut next, &event, config.utc_offset(), config.retention_cap);

    Ok(RecordedActivity { ledger: next, event })
}

/// Same as `record_activity`, parsing the item type first
pub fn record_named_activity(
    ledger: &UserLedger,
    item_type: &str,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<RecordedActivity> {
    let item_type: ItemType = item_type.parse()?;
    record_activity(ledger, item_type, now, config)
}

/// Fold an already-created event into a ledger.
/// Uses the event's own points and CO2, never the current reward table.
pub(crate) fn apply_event(
    ledger: &mut UserLedger,
    event: &RecyclingEvent,
    offset: FixedOffset,
    retention_cap: usize,
) {
    ledger.streak_days = streak_after(
        ledger.streak_days,
        ledger.last_activity_at,
        event.timestamp,
        offset,
    );
    ledger.total_items_recycled = ledger.total_items_recycled.saturating_add(1);
    ledger.total_points = ledger.total_points.saturating_add(event.points_awarded);
    ledger.co2_saved += event.co2_saved;
    ledger.recent_activity.insert(0, event.clone());
    ledger.recent_activity.truncate(retention_cap);
    ledger.last_activity_at = Some(event.timestamp);
    ledger.version += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use greenpoints_core::{Co2Kg, Error};

    fn morning(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_each_type_adds_one_item_and_its_co2() {
        let config = EngineConfig::default();
        for item in ItemType::ALL {
            let reward = *config.reward_table.lookup(item).unwrap();
            let before = UserLedger::new("u1", "EcoEmily");
            let after = record_activity(&before, item, morning(1), &config)
                .unwrap()
                .ledger;

            assert_eq!(after.total_items_recycled, before.total_items_recycled + 1);
            assert_eq!(after.total_points, reward.points);
            assert_eq!(after.co2_saved, before.co2_saved + reward.co2_saved);
            assert_eq!(after.version, 1);
        }
    }

    #[test]
    fn test_bottle_then_can() {
        let config = EngineConfig::default();
        let ledger = UserLedger::new("u1", "EcoEmily");
        let ledger = record_activity(&ledger, ItemType::Bottle, morning(1), &config)
            .unwrap()
            .ledger;
        let recorded = record_activity(&ledger, ItemType::Can, morning(1), &config).unwrap();

        assert_eq!(recorded.ledger.total_points, 6);
        assert_eq!(recorded.ledger.total_items_recycled, 2);
        assert_eq!(recorded.ledger.co2_saved, Co2Kg(0.15) + Co2Kg(0.12));
        assert_eq!(recorded.ledger.recent_activity[0].id, recorded.event.id);
        assert_eq!(recorded.ledger.recent_activity[0].item_type, ItemType::Can);
        assert_eq!(recorded.ledger.last_activity_at, Some(morning(1)));
    }

    #[test]
    fn test_unknown_type_leaves_ledger_alone() {
        let config = EngineConfig::default();
        let ledger = UserLedger::new("u1", "EcoEmily");
        let result = record_named_activity(&ledger, "styrofoam", morning(1), &config);
        assert!(matches!(result, Err(Error::InvalidItemType(_))));
        assert_eq!(ledger, UserLedger::new("u1", "EcoEmily"));
    }

    #[test]
    fn test_streak_rules() {
        let config = EngineConfig::default();
        let ledger = UserLedger::new("u1", "EcoEmily");
        let ledger = record_activity(&ledger, ItemType::Can, morning(1), &config)
            .unwrap()
            .ledger;
        assert_eq!(ledger.streak_days, 1);

        // Same day
        let same_day = morning(1) + Duration::hours(8);
        let ledger = record_activity(&ledger, ItemType::Can, same_day, &config)
            .unwrap()
            .ledger;
        assert_eq!(ledger.streak_days, 1);

        // Next day
        let ledger = record_activity(&ledger, ItemType::Can, morning(2), &config)
            .unwrap()
            .ledger;
        assert_eq!(ledger.streak_days, 2);

        // Two-day gap
        let ledger = record_activity(&ledger, ItemType::Can, morning(5), &config)
            .unwrap()
            .ledger;
        assert_eq!(ledger.streak_days, 1);
    }

    #[test]
    fn test_recent_activity_is_capped_most_recent_first() {
        let config = EngineConfig::default();
        let mut ledger = UserLedger::new("u1", "EcoEmily");
        let mut last_id = String::new();
        for i in 0..25 {
            let recorded = record_activity(
                &ledger,
                ItemType::Bottle,
                morning(1) + Duration::minutes(i),
                &config,
            )
            .unwrap();
            last_id = recorded.event.id.clone();
            ledger = recorded.ledger;
        }

        assert_eq!(ledger.recent_activity.len(), config.retention_cap);
        assert_eq!(ledger.recent_activity[0].id, last_id);
        // Totals keep counting past the display window
        assert_eq!(ledger.total_items_recycled, 25);
        assert_eq!(ledger.total_points, 125);
    }

    #[test]
    fn test_points_fixed_at_creation() {
        let mut config = EngineConfig::default();
        let ledger = UserLedger::new("u1", "EcoEmily");
        let recorded = record_activity(&ledger, ItemType::Bottle, morning(1), &config).unwrap();

        config.reward_table = greenpoints_core::RewardTable::new(vec![
            greenpoints_core::ItemReward {
                item_type: ItemType::Bottle,
                points: 50,
                co2_saved: Co2Kg(0.15),
            },
        ])
        .unwrap();
        let next = record_activity(&recorded.ledger, ItemType::Bottle, morning(1), &config)
            .unwrap()
            .ledger;

        assert_eq!(next.recent_activity[1].points_awarded, 5);
        assert_eq!(next.total_points, 55);
    }
}
