//! Community-wide totals for the admin dashboard

use greenpoints_core::{CommunityStats, LedgerSnapshot};

/// Sum totals across every ledger snapshot
pub fn community_stats(snapshots: &[LedgerSnapshot]) -> CommunityStats {
    snapshots
        .iter()
        .fold(CommunityStats::default(), |mut stats, s| {
            stats.total_users += 1;
            stats.total_points_outstanding = stats.total_points_outstanding.saturating_add(s.points);
            stats.total_items_processed = stats.total_items_processed.saturating_add(s.items_recycled);
            stats.total_co2_saved += s.co2_saved;
            stats
        })
}
