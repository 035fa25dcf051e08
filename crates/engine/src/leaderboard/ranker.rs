//! Leaderboard ranker
//!
//! Ranks snapshots of many ledgers. Shorter time frames scale lifetime
//! totals down by a fixed factor; such boards are flagged `is_estimate`
//! because they are not a real per-period aggregate.

use crate::progression::level_for;
use greenpoints_core::{
    Co2Kg, EngineConfig, Leaderboard, LeaderboardEntry, LeaderboardMetric, LedgerSnapshot,
    TimeFrame, TimeFrameFactors,
};
use std::cmp::Ordering;

/// Orders a population of users for a time frame and metric
#[derive(Debug, Clone)]
pub struct LeaderboardRanker {
    factors: TimeFrameFactors,
    top_n: usize,
    points_per_level: u64,
}

impl LeaderboardRanker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            factors: config.time_frame_factors,
            top_n: config.leaderboard_top_n,
            points_per_level: config.points_per_level,
        }
    }

    /// Limit the ranked window to the first `top_n` users
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Rank snapshots: metric descending, then user id ascending
    pub fn rank(
        &self,
        snapshots: &[LedgerSnapshot],
        time_frame: TimeFrame,
        metric: LeaderboardMetric,
    ) -> Leaderboard {
        let mut entries: Vec<LeaderboardEntry> = snapshots
            .iter()
            .map(|s| self.scaled_entry(s, time_frame))
            .collect();

        entries.sort_by(|a, b| {
            compare_metric(b, a, metric).then_with(|| a.user_id.cmp(&b.user_id))
        });
        entries.truncate(self.top_n);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }

        Leaderboard {
            time_frame,
            metric,
            is_estimate: time_frame != TimeFrame::AllTime,
            entries,
        }
    }

    fn scaled_entry(&self, snapshot: &LedgerSnapshot, time_frame: TimeFrame) -> LeaderboardEntry {
        let (items, points, co2) = match time_frame {
            TimeFrame::AllTime => (snapshot.items_recycled, snapshot.points, snapshot.co2_saved),
            _ => {
                let factor = self.factors.factor(time_frame);
                (
                    scale_count(snapshot.items_recycled, factor),
                    scale_count(snapshot.points, factor),
                    snapshot.co2_saved.scaled(factor),
                )
            }
        };

        LeaderboardEntry {
            user_id: snapshot.user_id.clone(),
            display_name: snapshot.display_name.clone(),
            items_recycled: items,
            points,
            co2_saved: co2,
            level: level_for(points, self.points_per_level),
            rank: 0,
        }
    }
}

fn scale_count(value: u64, factor: f64) -> u64 {
    (value as f64 * factor).floor() as u64
}

fn compare_metric(a: &LeaderboardEntry, b: &LeaderboardEntry, metric: LeaderboardMetric) -> Ordering {
    match metric {
        LeaderboardMetric::Points => a.points.cmp(&b.points),
        LeaderboardMetric::ItemsRecycled => a.items_recycled.cmp(&b.items_recycled),
        LeaderboardMetric::Co2Saved => compare_co2(a.co2_saved, b.co2_saved),
    }
}

fn compare_co2(a: Co2Kg, b: Co2Kg) -> Ordering {
    a.as_f64().total_cmp(&b.as_f64())
}
