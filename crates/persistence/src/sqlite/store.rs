//! `LedgerStore` and `Catalog` backed by SQLite

use super::connection::Database;
use super::{events, ledgers, offers, redemptions};
use crate::store::{Catalog, LedgerStore};
use greenpoints_core::{
    Error, LedgerSnapshot, PartnerOffer, RecyclingEvent, Redemption, RedemptionStatus, Result,
    UserLedger,
};
use tracing::{debug, warn};

impl LedgerStore for Database {
    fn retention_cap(&self) -> usize {
        self.retention_cap
    }

    async fn load(&self, user_id: &str) -> Result<Option<UserLedger>> {
        let Some(row) = ledgers::get_ledger_row(self.pool(), user_id).await? else {
            return Ok(None);
        };
        let recent = events::recent_events(self.pool(), user_id, self.retention_cap()).await?;
        row.into_ledger(recent).map(Some)
    }

    async fn create(&self, ledger: &UserLedger) -> Result<()> {
        ledgers::insert_ledger(self.pool(), ledger).await?;
        debug!("Created ledger for {}", ledger.user_id);
        Ok(())
    }

    async fn save(
        &self,
        ledger: &UserLedger,
        expected_version: u64,
        new_event: Option<&RecyclingEvent>,
    ) -> Result<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        if !ledgers::update_ledger_if_version(&mut tx, ledger, expected_version).await? {
            warn!(
                "Stale ledger save for {} (expected version {})",
                ledger.user_id, expected_version
            );
            return Err(Error::ConcurrentLedgerUpdate(ledger.user_id.clone()));
        }
        if let Some(event) = new_event {
            events::insert_event(&mut tx, &ledger.user_id, event).await?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn commit_redemption(
        &self,
        ledger: &UserLedger,
        expected_version: u64,
        redemption: &Redemption,
    ) -> Result<()> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        if !ledgers::update_ledger_if_version(&mut tx, ledger, expected_version).await? {
            warn!(
                "Redemption lost the race for {} (expected version {})",
                ledger.user_id, expected_version
            );
            return Err(Error::ConcurrentRedemptionConflict);
        }
        // Dropping `tx` on error rolls the debit back
        redemptions::insert_redemption(&mut tx, redemption).await?;

        tx.commit()
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;
        debug!(
            "Committed redemption {} for {} ({} pts)",
            redemption.id, ledger.user_id, redemption.points_used
        );
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<RecyclingEvent>> {
        events::all_events(self.pool(), user_id).await
    }

    async fn redemptions(&self, user_id: &str) -> Result<Vec<Redemption>> {
        redemptions::list_redemptions(self.pool(), user_id).await
    }

    async fn set_redemption_status(
        &self,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<Redemption> {
        let mut redemption = redemptions::get_redemption(self.pool(), redemption_id)
            .await?
            .ok_or_else(|| Error::RedemptionNotFound(redemption_id.to_string()))?;
        let from = redemption.status;
        let to = from.transition(status)?;

        if !redemptions::update_redemption_status(self.pool(), redemption_id, from, to).await? {
            // Someone else moved it first
            return Err(Error::InvalidStatusTransition { from, to });
        }
        redemption.status = to;
        Ok(redemption)
    }

    async fn snapshots(&self) -> Result<Vec<LedgerSnapshot>> {
        ledgers::list_snapshots(self.pool()).await
    }
}

impl Catalog for Database {
    async fn list_active_offers(&self) -> Result<Vec<PartnerOffer>> {
        offers::list_active_offers(self.pool()).await
    }

    async fn get_offer(&self, offer_id: &str) -> Result<Option<PartnerOffer>> {
        offers::get_offer(self.pool(), offer_id).await
    }

    async fn create_offer(&self, offer: &PartnerOffer) -> Result<()> {
        offers::insert_offer(self.pool(), offer).await
    }

    async fn set_offer_active(&self, offer_id: &str, active: bool) -> Result<()> {
        offers::set_offer_active(self.pool(), offer_id, active).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use greenpoints_core::{EngineConfig, ItemType, OfferCategory, RewardTable};

    async fn db_with_ledger(points: u64) -> Database {
        let db = Database::connect_in_memory().await.unwrap();
        let mut ledger = UserLedger::new("u1", "EcoEmily");
        ledger.total_points = points;
        db.create(&ledger).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_save_appends_history_and_caps_recent() {
        let db = db_with_ledger(0).await.with_retention_cap(3);
        let reward = *RewardTable::default().lookup(ItemType::Bottle).unwrap();
        let mut ledger = db.load("u1").await.unwrap().unwrap();

        for i in 0..5 {
            let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, i, 0).unwrap();
            let event = RecyclingEvent::new(&reward, ts);
            let expected = ledger.version;
            ledger.total_items_recycled += 1;
            ledger.total_points += event.points_awarded;
            ledger.last_activity_at = Some(ts);
            ledger.version += 1;
            db.save(&ledger, expected, Some(&event)).await.unwrap();
        }

        let loaded = db.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded.total_points, 25);
        assert_eq!(loaded.version, 5);
        assert_eq!(loaded.recent_activity.len(), 3);
        assert!(loaded.recent_activity[0].timestamp > loaded.recent_activity[1].timestamp);
        assert_eq!(db.history("u1").await.unwrap().len(), 5);
        assert_eq!(events::count_events(db.pool(), "u1").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_stale_version_rejected_without_event() {
        let db = db_with_ledger(0).await;
        let reward = *RewardTable::default().lookup(ItemType::Can).unwrap();
        let event = RecyclingEvent::new(&reward, Utc::now());
        let mut ledger = db.load("u1").await.unwrap().unwrap();
        ledger.version = 1;

        let result = db.save(&ledger, 3, Some(&event)).await;
        assert!(matches!(result, Err(Error::ConcurrentLedgerUpdate(_))));
        assert!(db.history("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redemption_rolls_back_when_record_insert_fails() {
        let db = db_with_ledger(300).await;
        let offer = PartnerOffer::new("o1", "Solar Power Bank", 100, OfferCategory::Product);
        let redemption = Redemption::pending("u1", &offer, Utc::now());

        let mut debited = db.load("u1").await.unwrap().unwrap();
        debited.total_points = 200;
        debited.version = 1;
        db.commit_redemption(&debited, 0, &redemption).await.unwrap();

        // Same redemption id violates the unique constraint
        let mut again = debited.clone();
        again.total_points = 100;
        again.version = 2;
        let result = db.commit_redemption(&again, 1, &redemption).await;
        assert!(matches!(result, Err(Error::DatabaseError(_))));

        let stored = db.load("u1").await.unwrap().unwrap();
        assert_eq!(stored.total_points, 200);
        assert_eq!(stored.version, 1);
        assert_eq!(db.redemptions("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_redemption_is_conflict() {
        let db = db_with_ledger(150).await;
        let offer = PartnerOffer::new("o1", "Coffee Voucher", 75, OfferCategory::Voucher);
        let mut debited = db.load("u1").await.unwrap().unwrap();
        debited.total_points = 75;
        debited.version = 1;

        let result = db
            .commit_redemption(&debited, 4, &Redemption::pending("u1", &offer, Utc::now()))
            .await;
        assert!(matches!(result, Err(Error::ConcurrentRedemptionConflict)));
        assert_eq!(db.load("u1").await.unwrap().unwrap().total_points, 150);
    }

    #[tokio::test]
    async fn test_redemption_status_transitions() {
        let db = db_with_ledger(100).await;
        let offer = PartnerOffer::new("o1", "Seed Starter Kit", 90, OfferCategory::Product);
        let redemption = Redemption::pending("u1", &offer, Utc::now());
        let mut debited = db.load("u1").await.unwrap().unwrap();
        debited.total_points = 10;
        debited.version = 1;
        db.commit_redemption(&debited, 0, &redemption).await.unwrap();

        let fulfilled = db
            .set_redemption_status(&redemption.id, RedemptionStatus::Fulfilled)
            .await
            .unwrap();
        assert_eq!(fulfilled.status, RedemptionStatus::Fulfilled);

        let result = db
            .set_redemption_status(&redemption.id, RedemptionStatus::Cancelled)
            .await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));
        assert!(matches!(
            db.set_redemption_status("nope", RedemptionStatus::Fulfilled).await,
            Err(Error::RedemptionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_orders_and_filters() {
        let db = Database::connect_in_memory().await.unwrap();
        for (id, cost) in [("bottle", 150), ("ten-off", 50), ("coffee", 75)] {
            db.create_offer(&PartnerOffer::new(id, id, cost, OfferCategory::Discount))
                .await
                .unwrap();
        }
        db.set_offer_active("coffee", false).await.unwrap();

        let active = db.list_active_offers().await.unwrap();
        let ids: Vec<&str> = active.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["ten-off", "bottle"]);

        let inactive = db.get_offer("coffee").await.unwrap().unwrap();
        assert!(!inactive.is_active);
        assert!(db
            .create_offer(&PartnerOffer::new("free", "free", 0, OfferCategory::Other))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_snapshots_and_duplicate_ledger() {
        let db = db_with_ledger(300).await;
        db.create(&UserLedger::new("u2", "GreenGary")).await.unwrap();
        assert!(matches!(
            db.create(&UserLedger::new("u2", "GreenGary")).await,
            Err(Error::LedgerExists(_))
        ));

        let snapshots = db.snapshots().await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].user_id, "u1");
        assert_eq!(snapshots[0].points, 300);
    }

    #[tokio::test]
    async fn test_config_persists_in_settings() {
        let db = Database::connect_in_memory().await.unwrap();
        assert_eq!(db.load_config().await.unwrap(), EngineConfig::default());

        let config = EngineConfig {
            retention_cap: 10,
            utc_offset_minutes: -300,
            ..EngineConfig::default()
        };
        db.save_config(&config).await.unwrap();
        assert_eq!(db.load_config().await.unwrap(), config);

        let invalid = EngineConfig {
            points_per_level: 0,
            ..EngineConfig::default()
        };
        assert!(db.save_config(&invalid).await.is_err());
    }
}
