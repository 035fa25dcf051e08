//! Levels, progress, and badges
//!
//! Everything here is derived from ledger totals on demand. Badges are not
//! stored, so a badge disappears if the totals behind it ever drop.

use greenpoints_core::{Fraction, UserLedger, DEFAULT_POINTS_PER_LEVEL};
use serde::{Deserialize, Serialize};

/// Achievement shown on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Badge {
    EcoWarrior,
    Champion,
    Legend,
    Redeemer,
}

impl Badge {
    pub const ALL: [Badge; 4] = [
        Badge::EcoWarrior,
        Badge::Champion,
        Badge::Legend,
        Badge::Redeemer,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Badge::EcoWarrior => "Eco Warrior",
            Badge::Champion => "Champion",
            Badge::Legend => "Legend",
            Badge::Redeemer => "Redeemer",
        }
    }

    /// Threshold check; each badge is evaluated on its own
    pub fn is_earned(&self, items_recycled: u64, total_points: u64) -> bool {
        match self {
            Badge::EcoWarrior => items_recycled >= 10,
            Badge::Champion => items_recycled >= 50,
            Badge::Legend => items_recycled >= 100,
            Badge::Redeemer => total_points >= 200,
        }
    }
}

/// Level starts at 1 and rises every `points_per_level` points
pub fn level_for(total_points: u64, points_per_level: u64) -> u64 {
    total_points / points_per_level.max(1) + 1
}

/// Share of the current level already earned, in `[0, 1]`
pub fn progress_to_next_level(total_points: u64, points_per_level: u64) -> Fraction {
    let step = points_per_level.max(1);
    let level_floor = (level_for(total_points, step) - 1) * step;
    Fraction::clamped((total_points - level_floor) as f64 / step as f64)
}

/// All badges the totals currently qualify for
pub fn badges(items_recycled: u64, total_points: u64) -> Vec<Badge> {
    Badge::ALL
        .into_iter()
        .filter(|b| b.is_earned(items_recycled, total_points))
        .collect()
}

/// Read-only progression view of a ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub level: u64,
    pub progress: Fraction,
    pub points_into_level: u64,
    pub points_to_next_level: u64,
    pub badges: Vec<Badge>,
}

impl Progression {
    pub fn for_ledger(ledger: &UserLedger, points_per_level: u64) -> Self {
        let step = points_per_level.max(1);
        let points_into_level = ledger.total_points % step;
        Self {
            level: level_for(ledger.total_points, step),
            progress: progress_to_next_level(ledger.total_points, step),
            points_into_level,
            points_to_next_level: step - points_into_level,
            badges: badges(ledger.total_items_recycled, ledger.total_points),
        }
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::for_ledger(&UserLedger::new("", ""), DEFAULT_POINTS_PER_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_and_progress() {
        assert_eq!(level_for(0, 100), 1);
        assert_eq!(progress_to_next_level(0, 100).as_f64(), 0.0);

        assert_eq!(level_for(250, 100), 3);
        assert_eq!(progress_to_next_level(250, 100).as_f64(), 0.5);

        assert_eq!(level_for(99, 100), 1);
        assert_eq!(level_for(100, 100), 2);
        assert_eq!(progress_to_next_level(100, 100).as_f64(), 0.0);
    }

    #[test]
    fn test_badge_thresholds() {
        assert!(badges(9, 199).is_empty());
        assert_eq!(badges(10, 0), vec![Badge::EcoWarrior]);
        assert_eq!(
            badges(100, 200),
            vec![Badge::EcoWarrior, Badge::Champion, Badge::Legend, Badge::Redeemer]
        );
        // Points-only badge without any item badge
        assert_eq!(badges(0, 250), vec![Badge::Redeemer]);
    }

    #[test]
    fn test_badge_lost_when_points_drop() {
        let mut ledger = UserLedger::new("u1", "EcoEmily");
        ledger.total_items_recycled = 60;
        ledger.total_points = 210;
        let before = Progression::for_ledger(&ledger, 100);
        assert!(before.badges.contains(&Badge::Redeemer));

        ledger.total_points = 60;
        let after = Progression::for_ledger(&ledger, 100);
        assert!(!after.badges.contains(&Badge::Redeemer));
        assert!(after.badges.contains(&Badge::Champion));
    }

    #[test]
    fn test_progression_view() {
        let mut ledger = UserLedger::new("u1", "EcoEmily");
        ledger.total_points = 250;
        let view = Progression::for_ledger(&ledger, 100);
        assert_eq!(view.level, 3);
        assert_eq!(view.points_into_level, 50);
        assert_eq!(view.points_to_next_level, 50);

        let fresh = Progression::default();
        assert_eq!(fresh.level, 1);
        assert_eq!(fresh.points_to_next_level, 100);
        assert!(fresh.badges.is_empty());
    }
}
