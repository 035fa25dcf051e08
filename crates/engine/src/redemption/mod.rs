//! Redemption of points against catalog offers

mod limits;
mod processor;

pub use limits::{can_redeem, check_redemption_allowed, RedemptionViolation};
pub use processor::{redeem, RedemptionOutcome};
