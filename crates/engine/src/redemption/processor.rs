//! Redemption processor - debits a ledger and creates the pending record

use super::limits::check_redemption_allowed;
use chrono::{DateTime, Utc};
use greenpoints_core::{Error, PartnerOffer, Redemption, Result, UserLedger};

/// Debited ledger and the redemption record that must be committed with it
#[derive(Debug, Clone)]
pub struct RedemptionOutcome {
    pub ledger: UserLedger,
    pub redemption: Redemption,
}

/// Exchange points for an offer
///
/// The balance is never clamped: an offer the ledger cannot afford is
/// rejected and the input ledger is left as it was.
pub fn redeem(
    ledger: &UserLedger,
    offer: &PartnerOffer,
    now: DateTime<Utc>,
) -> Result<RedemptionOutcome> {
    check_redemption_allowed(ledger, offer)?;

    let mut next = ledger.clone();
    next.total_points = ledger
        .total_points
        .checked_sub(offer.points_cost)
        .ok_or(Error::InsufficientPoints {
            needed: offer.points_cost - ledger.total_points,
        })?;
    next.version += 1;

    Ok(RedemptionOutcome {
        ledger: next,
        redemption: Redemption::pending(&ledger.user_id, offer, now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenpoints_core::{OfferCategory, RedemptionStatus};

    fn ledger_with(points: u64) -> UserLedger {
        let mut ledger = UserLedger::new("u1", "EcoEmily");
        ledger.total_points = points;
        ledger
    }

    #[test]
    fn test_insufficient_points_leaves_ledger() {
        let ledger = ledger_with(100);
        let offer = PartnerOffer::new("o1", "Bamboo Bottle", 150, OfferCategory::Product);
        let result = redeem(&ledger, &offer, Utc::now());
        assert!(matches!(result, Err(Error::InsufficientPoints { needed: 50 })));
        assert_eq!(ledger, ledger_with(100));
    }

    #[test]
    fn test_exact_balance_succeeds() {
        let ledger = ledger_with(150);
        let offer = PartnerOffer::new("o1", "Bamboo Bottle", 150, OfferCategory::Product);
        let now = Utc::now();
        let outcome = redeem(&ledger, &offer, now).unwrap();

        assert_eq!(outcome.ledger.total_points, 0);
        assert_eq!(outcome.ledger.version, ledger.version + 1);
        assert_eq!(outcome.redemption.status, RedemptionStatus::Pending);
        assert_eq!(outcome.redemption.points_used, 150);
        assert_eq!(outcome.redemption.offer_id, "o1");
        assert_eq!(outcome.redemption.user_id, "u1");
        assert_eq!(outcome.redemption.created_at, now);
    }

    #[test]
    fn test_inactive_offer_rejected() {
        let mut offer = PartnerOffer::new("o1", "Old Deal", 10, OfferCategory::Discount);
        offer.is_active = false;
        let result = redeem(&ledger_with(500), &offer, Utc::now());
        assert!(matches!(result, Err(Error::OfferInactive(id)) if id == "o1"));
    }
}
