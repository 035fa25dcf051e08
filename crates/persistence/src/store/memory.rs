//! In-process store for tests and embedded use

use super::{Catalog, LedgerStore};
use greenpoints_core::{
    Error, LedgerSnapshot, PartnerOffer, RecyclingEvent, Redemption, RedemptionStatus, Result,
    UserLedger, DEFAULT_RETENTION_CAP,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    ledgers: HashMap<String, UserLedger>,
    events: HashMap<String, Vec<RecyclingEvent>>,
    redemptions: Vec<Redemption>,
    offers: Vec<PartnerOffer>,
}

/// Thread-safe store keeping everything in memory
///
/// Every operation runs under a single lock, so the ledger write and the
/// history/redemption write of one call are never observed separately.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    retention_cap: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_retention_cap(DEFAULT_RETENTION_CAP)
    }

    pub fn with_retention_cap(retention_cap: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            retention_cap,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::DatabaseError("memory store lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryStore {
    fn retention_cap(&self) -> usize {
        self.retention_cap
    }

    async fn load(&self, user_id: &str) -> Result<Option<UserLedger>> {
        let state = self.lock()?;
        Ok(state.ledgers.get(user_id).map(|ledger| {
            let mut ledger = ledger.clone();
            ledger.recent_activity.truncate(self.retention_cap);
            ledger
        }))
    }

    async fn create(&self, ledger: &UserLedger) -> Result<()> {
        let mut state = self.lock()?;
        if state.ledgers.contains_key(&ledger.user_id) {
            return Err(Error::LedgerExists(ledger.user_id.clone()));
        }
        state
            .ledgers
            .insert(ledger.user_id.clone(), ledger.clone());
        Ok(())
    }

    async fn save(
        &self,
        ledger: &UserLedger,
        expected_version: u64,
        new_event: Option<&RecyclingEvent>,
    ) -> Result<()> {
        let mut state = self.lock()?;
        let stored_version = state
            .ledgers
            .get(&ledger.user_id)
            .map(|l| l.version)
            .ok_or_else(|| Error::LedgerNotFound(ledger.user_id.clone()))?;
        if stored_version != expected_version {
            return Err(Error::ConcurrentLedgerUpdate(ledger.user_id.clone()));
        }

        if let Some(event) = new_event {
            let history = state.events.entry(ledger.user_id.clone()).or_default();
            if history.iter().any(|e| e.id == event.id) {
                return Err(Error::DatabaseError(format!(
                    "duplicate event id {}",
                    event.id
                )));
            }
            history.push(event.clone());
        }

        state
            .ledgers
            .insert(ledger.user_id.clone(), ledger.clone());
        Ok(())
    }

    async fn commit_redemption(
        &self,
        ledger: &UserLedger,
        expected_version: u64,
        redemption: &Redemption,
    ) -> Result<()> {
        let mut state = self.lock()?;
        let stored_version = state
            .ledgers
            .get(&ledger.user_id)
            .map(|l| l.version)
            .ok_or_else(|| Error::LedgerNotFound(ledger.user_id.clone()))?;
        if stored_version != expected_version {
            return Err(Error::ConcurrentRedemptionConflict);
        }
        if state.redemptions.iter().any(|r| r.id == redemption.id) {
            return Err(Error::DatabaseError(format!(
                "duplicate redemption id {}",
                redemption.id
            )));
        }

        state.redemptions.push(redemption.clone());
        state
            .ledgers
            .insert(ledger.user_id.clone(), ledger.clone());
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<RecyclingEvent>> {
        let state = self.lock()?;
        Ok(state.events.get(user_id).cloned().unwrap_or_default())
    }

    async fn redemptions(&self, user_id: &str) -> Result<Vec<Redemption>> {
        let state = self.lock()?;
        Ok(state
            .redemptions
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_redemption_status(
        &self,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<Redemption> {
        let mut state = self.lock()?;
        let redemption = state
            .redemptions
            .iter_mut()
            .find(|r| r.id == redemption_id)
            .ok_or_else(|| Error::RedemptionNotFound(redemption_id.to_string()))?;
        redemption.status = redemption.status.transition(status)?;
        Ok(redemption.clone())
    }

    async fn snapshots(&self) -> Result<Vec<LedgerSnapshot>> {
        let state = self.lock()?;
        Ok(state.ledgers.values().map(UserLedger::snapshot).collect())
    }
}

impl Catalog for MemoryStore {
    async fn list_active_offers(&self) -> Result<Vec<PartnerOffer>> {
        let state = self.lock()?;
        let mut offers: Vec<PartnerOffer> =
            state.offers.iter().filter(|o| o.is_active).cloned().collect();
        offers.sort_by(|a, b| a.points_cost.cmp(&b.points_cost).then_with(|| a.id.cmp(&b.id)));
        Ok(offers)
    }

    async fn get_offer(&self, offer_id: &str) -> Result<Option<PartnerOffer>> {
        let state = self.lock()?;
        Ok(state.offers.iter().find(|o| o.id == offer_id).cloned())
    }

    async fn create_offer(&self, offer: &PartnerOffer) -> Result<()> {
        offer.validate()?;
        let mut state = self.lock()?;
        if state.offers.iter().any(|o| o.id == offer.id) {
            return Err(Error::InvalidData(format!("offer {} already exists", offer.id)));
        }
        state.offers.push(offer.clone());
        Ok(())
    }

    async fn set_offer_active(&self, offer_id: &str, active: bool) -> Result<()> {
        let mut state = self.lock()?;
        let offer = state
            .offers
            .iter_mut()
            .find(|o| o.id == offer_id)
            .ok_or_else(|| Error::OfferNotFound(offer_id.to_string()))?;
        offer.is_active = active;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use greenpoints_core::{ItemType, OfferCategory, RewardTable};

    fn funded_ledger(points: u64) -> UserLedger {
        let mut ledger = UserLedger::new("u1", "EcoEmily");
        ledger.total_points = points;
        ledger
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let store = MemoryStore::new();
        store.create(&UserLedger::new("u1", "EcoEmily")).await.unwrap();
        let loaded = store.load("u1").await.unwrap().unwrap();
        assert_eq!(loaded.display_name, "EcoEmily");
        assert!(store.load("missing").await.unwrap().is_none());
        assert!(matches!(
            store.create(&UserLedger::new("u1", "Again")).await,
            Err(Error::LedgerExists(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_save_rejected() {
        let store = MemoryStore::new();
        let ledger = UserLedger::new("u1", "EcoEmily");
        store.create(&ledger).await.unwrap();

        let reward = *RewardTable::default().lookup(ItemType::Can).unwrap();
        let event = RecyclingEvent::new(&reward, Utc::now());
        let mut next = ledger.clone();
        next.version = 1;
        store.save(&next, 0, Some(&event)).await.unwrap();

        let result = store.save(&next, 0, None).await;
        assert!(matches!(result, Err(Error::ConcurrentLedgerUpdate(_))));
        assert_eq!(store.history("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_redemption_insert_keeps_balance() {
        let store = MemoryStore::new();
        let ledger = funded_ledger(150);
        store.create(&ledger).await.unwrap();
        let offer = PartnerOffer::new("o1", "Bamboo Bottle", 100, OfferCategory::Product);

        let first = Redemption::pending("u1", &offer, Utc::now());
        let mut debited = ledger.clone();
        debited.total_points = 50;
        debited.version = 1;
        store.commit_redemption(&debited, 0, &first).await.unwrap();

        // Reusing the record id makes the insert fail
        let mut twice = debited.clone();
        twice.total_points = 0;
        twice.version = 2;
        let result = store.commit_redemption(&twice, 1, &first).await;
        assert!(matches!(result, Err(Error::DatabaseError(_))));

        let stored = store.load("u1").await.unwrap().unwrap();
        assert_eq!(stored.total_points, 50);
        assert_eq!(store.redemptions("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_redemption_is_conflict() {
        let store = MemoryStore::new();
        store.create(&funded_ledger(300)).await.unwrap();
        let offer = PartnerOffer::new("o1", "Coffee Voucher", 75, OfferCategory::Voucher);
        let mut debited = funded_ledger(225);
        debited.version = 1;
        let redemption = Redemption::pending("u1", &offer, Utc::now());

        let result = store.commit_redemption(&debited, 7, &redemption).await;
        assert!(matches!(result, Err(Error::ConcurrentRedemptionConflict)));
        assert!(store.redemptions("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_offers_sorted_by_cost() {
        let store = MemoryStore::new();
        for (id, cost) in [("a", 200), ("b", 50), ("c", 120)] {
            store
                .create_offer(&PartnerOffer::new(id, id, cost, OfferCategory::Product))
                .await
                .unwrap();
        }
        store.set_offer_active("c", false).await.unwrap();

        let offers = store.list_active_offers().await.unwrap();
        let ids: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(matches!(
            store.set_offer_active("zzz", true).await,
            Err(Error::OfferNotFound(_))
        ));
    }
}
