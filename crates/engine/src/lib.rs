//! GreenPoints Engine - Activity recording, progression, rankings, and redemptions

pub mod activity;
pub mod clock;
pub mod leaderboard;
pub mod logging;
pub mod progression;
pub mod redemption;
pub mod service;

pub use activity::{record_activity, replay_ledger, RecordedActivity};
pub use clock::{Clock, FixedClock, SystemClock};
pub use leaderboard::{community_stats, LeaderboardRanker};
pub use progression::{Badge, Progression};
pub use redemption::{redeem, RedemptionOutcome};
pub use service::PointsService;
