//! Consecutive-day streak calculation
//!
//! Pure functions of their inputs; callers supply `now` from a `Clock`.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use greenpoints_core::UserLedger;
use serde::{Deserialize, Serialize};

/// Calendar day of an instant in the user's local offset
pub fn local_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Streak after recording activity on `today`
///
/// Same day keeps the streak, the day after extends it, anything else
/// (a gap, or no prior activity) starts over at 1. A last day in the
/// future (clock moved backwards) counts as the same day.
pub fn next_streak(previous: u32, last_day: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(last_day) = last_day else {
        return 1;
    };

    match today.signed_duration_since(last_day).num_days() {
        days if days <= 0 => previous.max(1),
        1 => previous.saturating_add(1),
        _ => 1,
    }
}

/// `next_streak` over instants
pub fn streak_after(
    previous: u32,
    last_activity_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> u32 {
    next_streak(
        previous,
        last_activity_at.map(|ts| local_day(ts, offset)),
        local_day(now, offset),
    )
}

/// Streak as shown on the profile
///
/// `streak_days` is always the stored value, so it is never 0 once any
/// activity exists. `lapsed` is set when a full local day has been skipped
/// and the next activity will restart the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStatus {
    pub streak_days: u32,
    pub lapsed: bool,
}

pub fn streak_status(
    ledger: &UserLedger,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> StreakStatus {
    let lapsed = ledger.last_activity_at.is_some_and(|ts| {
        local_day(now, offset)
            .signed_duration_since(local_day(ts, offset))
            .num_days()
            > 1
    });
    StreakStatus {
        streak_days: ledger.streak_days,
        lapsed,
    }
}
