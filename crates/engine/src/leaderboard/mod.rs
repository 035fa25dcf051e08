//! Leaderboard ranking and community totals

mod ranker;
mod stats;

pub use ranker::LeaderboardRanker;
pub use stats::community_stats;
