//! Data models for ledgers, activity, offers, and rankings

mod activity;
mod leaderboard;
mod ledger;
mod offer;
mod redemption;

pub use activity::*;
pub use leaderboard::*;
pub use ledger::*;
pub use offer::*;
pub use redemption::*;
