//! Recycling event history
//!
//! The full history is the source of truth for totals; ledgers only carry
//! the most recent events for display.

use super::connection::{from_db_int, to_db_int};
use chrono::{DateTime, Utc};
use greenpoints_core::{Co2Kg, Error, ItemType, RecyclingEvent, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// Event record stored in database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: String,
    pub item_type: String,
    pub points_awarded: i64,
    pub co2_saved_kg: f64,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for RecyclingEvent {
    type Error = Error;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(RecyclingEvent {
            item_type: row.item_type.parse::<ItemType>()?,
            points_awarded: from_db_int(row.points_awarded, "points_awarded")?,
            co2_saved: Co2Kg(row.co2_saved_kg),
            timestamp: row.recorded_at,
            id: row.id,
        })
    }
}

/// Append an event to a user's history
pub async fn insert_event(
    conn: &mut SqliteConnection,
    user_id: &str,
    event: &RecyclingEvent,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recycling_events (id, user_id, item_type, points_awarded, co2_saved_kg, recorded_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&event.id)
    .bind(user_id)
    .bind(event.item_type.as_str())
    .bind(to_db_int(event.points_awarded)?)
    .bind(event.co2_saved.as_f64())
    .bind(event.timestamp)
    .execute(&mut *conn)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Most recent events first, at most `limit`
pub async fn recent_events(
    pool: &SqlitePool,
    user_id: &str,
    limit: usize,
) -> Result<Vec<RecyclingEvent>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT id, item_type, points_awarded, co2_saved_kg, recorded_at
        FROM recycling_events
        WHERE user_id = ?
        ORDER BY seq DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter().map(RecyclingEvent::try_from).collect()
}

/// Whole history, oldest first
pub async fn all_events(pool: &SqlitePool, user_id: &str) -> Result<Vec<RecyclingEvent>> {
    let rows = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT id, item_type, points_awarded, co2_saved_kg, recorded_at
        FROM recycling_events
        WHERE user_id = ?
        ORDER BY seq ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter().map(RecyclingEvent::try_from).collect()
}

/// Get event count for a user
pub async fn count_events(pool: &SqlitePool, user_id: &str) -> Result<u64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recycling_events WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    from_db_int(row.0, "count")
}
