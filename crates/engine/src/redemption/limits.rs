//! Redemption preconditions

use greenpoints_core::{Error, PartnerOffer, UserLedger};

/// Check if a ledger may redeem an offer right now
pub fn check_redemption_allowed(
    ledger: &UserLedger,
    offer: &PartnerOffer,
) -> Result<(), RedemptionViolation> {
    if !offer.is_active {
        return Err(RedemptionViolation::OfferInactive {
            offer_id: offer.id.clone(),
        });
    }

    if offer.points_cost == 0 {
        return Err(RedemptionViolation::InvalidCost {
            offer_id: offer.id.clone(),
        });
    }

    if ledger.total_points < offer.points_cost {
        return Err(RedemptionViolation::InsufficientPoints {
            required: offer.points_cost,
            available: ledger.total_points,
        });
    }

    Ok(())
}

/// Affordability flag for catalog screens
pub fn can_redeem(ledger: &UserLedger, offer: &PartnerOffer) -> bool {
    check_redemption_allowed(ledger, offer).is_ok()
}

/// Redemption precondition violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionViolation {
    OfferInactive { offer_id: String },
    InvalidCost { offer_id: String },
    InsufficientPoints { required: u64, available: u64 },
}

impl RedemptionViolation {
    /// Points still missing, if that is the reason
    pub fn shortfall(&self) -> Option<u64> {
        match self {
            RedemptionViolation::InsufficientPoints { required, available } => {
                Some(required.saturating_sub(*available))
            }
            _ => None,
        }
    }
}

impl From<RedemptionViolation> for Error {
    fn from(violation: RedemptionViolation) -> Self {
        match violation {
            RedemptionViolation::OfferInactive { offer_id } => Error::OfferInactive(offer_id),
            RedemptionViolation::InvalidCost { offer_id } => {
                Error::InvalidData(format!("offer {} has no points cost", offer_id))
            }
            RedemptionViolation::InsufficientPoints { required, available } => {
                Error::InsufficientPoints {
                    needed: required.saturating_sub(available),
                }
            }
        }
    }
}
