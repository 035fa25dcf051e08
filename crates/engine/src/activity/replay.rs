//! Rebuild a ledger from its full history

use super::recorder::apply_event;
use greenpoints_core::{EngineConfig, Error, RecyclingEvent, Redemption, Result, UserLedger};

/// Reconstruct a ledger from every recorded event (oldest first) and every
/// redemption. Redemptions debit points when created and no status change
/// refunds them, so all of them count regardless of status.
pub fn replay_ledger(
    user_id: &str,
    display_name: &str,
    events: &[RecyclingEvent],
    redemptions: &[Redemption],
    config: &EngineConfig,
) -> Result<UserLedger> {
    let offset = config.utc_offset();
    let mut ledger = UserLedger::new(user_id, display_name);
    for event in events {
        apply_event(&mut ledger, event, offset, config.retention_cap);
    }

    let debits = redemptions
        .iter()
        .filter(|r| r.user_id == user_id)
        .try_fold(0u64, |acc, r| acc.checked_add(r.points_used))
        .ok_or_else(|| Error::InvalidData(format!("redemption total overflows for {}", user_id)))?;
    ledger.total_points = ledger.total_points.checked_sub(debits).ok_or_else(|| {
        Error::InvalidData(format!(
            "redemptions for {} exceed points ever earned",
            user_id
        ))
    })?;
    ledger.version += redemptions.iter().filter(|r| r.user_id == user_id).count() as u64;

    Ok(ledger)
}
