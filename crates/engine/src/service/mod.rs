//! Points service - the entry point tying the calculators to a store

mod locks;

pub use locks::LedgerLocks;

use crate::activity::{self, replay_ledger, StreakStatus};
use crate::clock::{Clock, SystemClock};
use crate::leaderboard::{community_stats, LeaderboardRanker};
use crate::progression::Progression;
use crate::redemption::{self, RedemptionOutcome};
use greenpoints_core::{
    CommunityStats, EngineConfig, Error, ItemType, Leaderboard, LeaderboardMetric, PartnerOffer,
    RecyclingEvent, Redemption, RedemptionStatus, Result, TimeFrame, UserLedger,
};
use greenpoints_persistence::{Catalog, Database, LedgerStore, OfferCache};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attempts for a ledger write that keeps losing to another writer
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Records activity, answers progression and ranking queries, and
/// processes redemptions against one store
///
/// Every write for a user runs under that user's lock and commits with a
/// version check, so a ledger never moves two ways at once.
pub struct PointsService<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
    config: EngineConfig,
    ranker: LeaderboardRanker,
    locks: LedgerLocks,
    offer_cache: OfferCache,
}

impl PointsService<Database, SystemClock> {
    /// Open the SQLite store at `path` using the config saved in it
    pub async fn open(path: &Path) -> Result<Self> {
        let db = Database::connect(path).await?;
        let config = db.load_config().await?;
        let db = db.with_retention_cap(config.retention_cap);
        Self::new(Arc::new(db), SystemClock, config)
    }
}

impl<S, C> PointsService<S, C>
where
    S: LedgerStore + Catalog,
    C: Clock,
{
    pub fn new(store: Arc<S>, clock: C, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        if store.retention_cap() != config.retention_cap {
            return Err(Error::ConfigError(format!(
                "store keeps {} recent events but config asks for {}",
                store.retention_cap(),
                config.retention_cap
            )));
        }
        Ok(Self {
            store,
            clock,
            ranker: LeaderboardRanker::new(&config),
            locks: LedgerLocks::new(),
            offer_cache: OfferCache::new(config.offer_cache_ttl()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ---- ledgers ----

    /// Get a user's ledger, creating an empty one on first sight
    pub async fn open_ledger(&self, user_id: &str, display_name: &str) -> Result<UserLedger> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidData("user id cannot be empty".into()));
        }
        if let Some(ledger) = self.store.load(user_id).await? {
            return Ok(ledger);
        }

        let ledger = UserLedger::new(user_id, display_name);
        match self.store.create(&ledger).await {
            Ok(()) => {
                info!("Opened ledger for {} ({})", user_id, display_name);
                Ok(ledger)
            }
            // Another caller created it between load and create
            Err(Error::LedgerExists(_)) => self.ledger(user_id).await,
            Err(e) => Err(e),
        }
    }

    pub async fn ledger(&self, user_id: &str) -> Result<UserLedger> {
        self.store
            .load(user_id)
            .await?
            .ok_or_else(|| Error::LedgerNotFound(user_id.to_string()))
    }

    /// Record one recycled item and return the updated ledger
    pub async fn record_activity(&self, user_id: &str, item_type: &str) -> Result<UserLedger> {
        let item_type: ItemType = item_type.parse()?;
        let lock = self.locks.lock_for(user_id);
        let _guard = lock.lock().await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let ledger = self.ledger(user_id).await?;
            let recorded =
                activity::record_activity(&ledger, item_type, self.clock.now(), &self.config)?;

            match self
                .store
                .save(&recorded.ledger, ledger.version, Some(&recorded.event))
                .await
            {
                Ok(()) => {
                    debug!(
                        "{} recycled a {} (+{} pts, streak {})",
                        user_id,
                        item_type,
                        recorded.event.points_awarded,
                        recorded.ledger.streak_days
                    );
                    return Ok(recorded.ledger);
                }
                Err(e) if e.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!("Retrying activity for {} after: {}", user_id, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Full event history, oldest first
    pub async fn history(&self, user_id: &str) -> Result<Vec<RecyclingEvent>> {
        self.store.history(user_id).await
    }

    /// Rebuild a ledger from its history and redemptions
    pub async fn reconstruct_ledger(&self, user_id: &str) -> Result<UserLedger> {
        let current = self.ledger(user_id).await?;
        let events = self.store.history(user_id).await?;
        let redemptions = self.store.redemptions(user_id).await?;
        let rebuilt = replay_ledger(
            user_id,
            &current.display_name,
            &events,
            &redemptions,
            &self.config,
        )?;

        if rebuilt.total_points != current.total_points
            || rebuilt.total_items_recycled != current.total_items_recycled
        {
            warn!(
                "Ledger for {} drifted from its history ({} pts stored, {} replayed)",
                user_id, current.total_points, rebuilt.total_points
            );
        }
        Ok(rebuilt)
    }

    // ---- progression ----

    pub async fn progression(&self, user_id: &str) -> Result<Progression> {
        let ledger = self.ledger(user_id).await?;
        Ok(Progression::for_ledger(&ledger, self.config.points_per_level))
    }

    /// Stored streak plus whether a skipped day has broken it
    pub async fn streak_status(&self, user_id: &str) -> Result<StreakStatus> {
        let ledger = self.ledger(user_id).await?;
        Ok(activity::streak_status(
            &ledger,
            self.clock.now(),
            self.config.utc_offset(),
        ))
    }

    // ---- leaderboard ----

    pub async fn leaderboard(
        &self,
        time_frame: TimeFrame,
        metric: LeaderboardMetric,
    ) -> Result<Leaderboard> {
        let snapshots = self.store.snapshots().await?;
        Ok(self.ranker.rank(&snapshots, time_frame, metric))
    }

    /// Position of a user on the board, `None` when outside the top N
    pub async fn rank_of(
        &self,
        user_id: &str,
        time_frame: TimeFrame,
        metric: LeaderboardMetric,
    ) -> Result<Option<u32>> {
        Ok(self.leaderboard(time_frame, metric).await?.rank_of(user_id))
    }

    pub async fn community_stats(&self) -> Result<CommunityStats> {
        let snapshots = self.store.snapshots().await?;
        Ok(community_stats(&snapshots))
    }

    // ---- catalog ----

    /// Active offers, cheapest first, served from cache while fresh
    pub async fn active_offers(&self) -> Result<Vec<PartnerOffer>> {
        if let Some(offers) = self.offer_cache.active_listing() {
            return Ok(offers);
        }
        let offers = self.store.list_active_offers().await?;
        self.offer_cache.replace_listing(&offers);
        Ok(offers)
    }

    pub async fn offer(&self, offer_id: &str) -> Result<PartnerOffer> {
        if let Some(offer) = self.offer_cache.get(offer_id) {
            return Ok(offer);
        }
        let offer = self
            .store
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| Error::OfferNotFound(offer_id.to_string()))?;
        self.offer_cache.insert(offer.clone());
        Ok(offer)
    }

    pub async fn create_offer(&self, offer: PartnerOffer) -> Result<PartnerOffer> {
        self.store.create_offer(&offer).await?;
        self.offer_cache.invalidate(&offer.id);
        info!("Added offer {} ({} pts)", offer.id, offer.points_cost);
        Ok(offer)
    }

    pub async fn deactivate_offer(&self, offer_id: &str) -> Result<()> {
        self.store.set_offer_active(offer_id, false).await?;
        self.offer_cache.invalidate(offer_id);
        info!("Deactivated offer {}", offer_id);
        Ok(())
    }

    // ---- redemptions ----

    /// Spend points on an offer
    ///
    /// The offer is read from the catalog, not the cache, and the balance is
    /// checked against the ledger as stored when the write lock is held.
    pub async fn redeem(&self, user_id: &str, offer_id: &str) -> Result<RedemptionOutcome> {
        let lock = self.locks.lock_for(user_id);
        let _guard = lock.lock().await;

        let offer = self
            .store
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| Error::OfferNotFound(offer_id.to_string()))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let ledger = self.ledger(user_id).await?;
            let outcome = match redemption::redeem(&ledger, &offer, self.clock.now()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!("Redemption of {} by {} rejected: {}", offer_id, user_id, e);
                    return Err(e);
                }
            };

            match self
                .store
                .commit_redemption(&outcome.ledger, ledger.version, &outcome.redemption)
                .await
            {
                Ok(()) => {
                    info!(
                        "{} redeemed {} for {} pts ({} left)",
                        user_id, offer.title, offer.points_cost, outcome.ledger.total_points
                    );
                    return Ok(outcome);
                }
                Err(e) if e.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!("Retrying redemption for {} after: {}", user_id, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Redemptions for a user, newest first
    pub async fn redemptions(&self, user_id: &str) -> Result<Vec<Redemption>> {
        self.store.redemptions(user_id).await
    }

    /// Fulfil or cancel a pending redemption. Points are not refunded.
    pub async fn set_redemption_status(
        &self,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<Redemption> {
        let redemption = self
            .store
            .set_redemption_status(redemption_id, status)
            .await?;
        info!("Redemption {} is now {}", redemption_id, redemption.status);
        Ok(redemption)
    }
}
