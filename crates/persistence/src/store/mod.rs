//! Durable store and catalog boundaries
//!
//! Failures are reported as-is; retry policy belongs to the caller.

mod memory;

pub use memory::MemoryStore;

use greenpoints_core::{
    LedgerSnapshot, PartnerOffer, RecyclingEvent, Redemption, RedemptionStatus, Result,
    UserLedger,
};
use std::future::Future;

/// Durable storage for user ledgers, their full event history, and
/// redemption records
pub trait LedgerStore: Send + Sync {
    /// Number of newest events `load` keeps in `recent_activity`
    fn retention_cap(&self) -> usize;

    /// Load a ledger with its recent-activity window populated
    fn load(&self, user_id: &str) -> impl Future<Output = Result<Option<UserLedger>>> + Send;

    /// Insert a brand-new ledger
    fn create(&self, ledger: &UserLedger) -> impl Future<Output = Result<()>> + Send;

    /// Replace a ledger if its stored version still equals
    /// `expected_version`, appending `new_event` to the history in the
    /// same transaction
    fn save(
        &self,
        ledger: &UserLedger,
        expected_version: u64,
        new_event: Option<&RecyclingEvent>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Write the debited ledger and its redemption record together, or
    /// neither. A stale `expected_version` yields
    /// `ConcurrentRedemptionConflict`.
    fn commit_redemption(
        &self,
        ledger: &UserLedger,
        expected_version: u64,
        redemption: &Redemption,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Every recorded event for a user, oldest first
    fn history(&self, user_id: &str) -> impl Future<Output = Result<Vec<RecyclingEvent>>> + Send;

    /// Every redemption for a user, newest first
    fn redemptions(&self, user_id: &str) -> impl Future<Output = Result<Vec<Redemption>>> + Send;

    /// Move a redemption to a new status (fulfillment side)
    fn set_redemption_status(
        &self,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> impl Future<Output = Result<Redemption>> + Send;

    /// Ranking view of every ledger
    fn snapshots(&self) -> impl Future<Output = Result<Vec<LedgerSnapshot>>> + Send;
}

/// Source of partner offers
pub trait Catalog: Send + Sync {
    /// Active offers ordered by ascending points cost
    fn list_active_offers(&self) -> impl Future<Output = Result<Vec<PartnerOffer>>> + Send;

    fn get_offer(&self, offer_id: &str) -> impl Future<Output = Result<Option<PartnerOffer>>> + Send;

    fn create_offer(&self, offer: &PartnerOffer) -> impl Future<Output = Result<()>> + Send;

    fn set_offer_active(
        &self,
        offer_id: &str,
        active: bool,
    ) -> impl Future<Output = Result<()>> + Send;
}
