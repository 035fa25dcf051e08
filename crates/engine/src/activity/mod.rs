//! Activity recording, streaks, and ledger reconstruction

mod recorder;
mod replay;
pub mod streak;

pub use recorder::{record_activity, record_named_activity, RecordedActivity};
pub use replay::replay_ledger;
pub use streak::{next_streak, streak_after, streak_status, StreakStatus};
