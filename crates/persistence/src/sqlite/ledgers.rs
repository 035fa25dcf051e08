//! Ledger persistence operations

use super::connection::{from_db_int, to_db_int};
use chrono::{DateTime, Utc};
use greenpoints_core::{
    Co2Kg, Error, LedgerSnapshot, RecyclingEvent, Result, UserLedger,
};
use sqlx::{SqliteConnection, SqlitePool};

/// Database row for a ledger
#[derive(Debug, sqlx::FromRow)]
pub struct LedgerRow {
    pub user_id: String,
    pub display_name: String,
    pub total_items_recycled: i64,
    pub total_points: i64,
    pub co2_saved_kg: f64,
    pub streak_days: i64,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl LedgerRow {
    /// Rebuild the domain ledger, attaching its recent-activity window
    pub fn into_ledger(self, recent_activity: Vec<RecyclingEvent>) -> Result<UserLedger> {
        let streak_days = u32::try_from(self.streak_days).map_err(|_| {
            Error::InvalidData(format!("invalid streak {} for {}", self.streak_days, self.user_id))
        })?;
        Ok(UserLedger {
            total_items_recycled: from_db_int(self.total_items_recycled, "total_items_recycled")?,
            total_points: from_db_int(self.total_points, "total_points")?,
            co2_saved: Co2Kg(self.co2_saved_kg),
            streak_days,
            last_activity_at: self.last_activity_at,
            recent_activity,
            version: from_db_int(self.version, "version")?,
            user_id: self.user_id,
            display_name: self.display_name,
        })
    }
}

/// Insert a new ledger row
pub async fn insert_ledger(pool: &SqlitePool, ledger: &UserLedger) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ledgers (user_id, display_name, total_items_recycled, total_points,
                             co2_saved_kg, streak_days, last_activity_at, version)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&ledger.user_id)
    .bind(&ledger.display_name)
    .bind(to_db_int(ledger.total_items_recycled)?)
    .bind(to_db_int(ledger.total_points)?)
    .bind(ledger.co2_saved.as_f64())
    .bind(i64::from(ledger.streak_days))
    .bind(ledger.last_activity_at)
    .bind(to_db_int(ledger.version)?)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::LedgerExists(ledger.user_id.clone())
        }
        other => Error::DatabaseError(other.to_string()),
    })?;

    Ok(())
}

/// Get a ledger row by user id
pub async fn get_ledger_row(pool: &SqlitePool, user_id: &str) -> Result<Option<LedgerRow>> {
    let row = sqlx::query_as::<_, LedgerRow>(
        r#"
        SELECT user_id, display_name, total_items_recycled, total_points,
               co2_saved_kg, streak_days, last_activity_at, version
        FROM ledgers
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(row)
}

/// Overwrite a ledger only if its stored version matches.
/// Returns false when the row was missing or had moved on.
pub async fn update_ledger_if_version(
    conn: &mut SqliteConnection,
    ledger: &UserLedger,
    expected_version: u64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE ledgers
        SET display_name = ?,
            total_items_recycled = ?,
            total_points = ?,
            co2_saved_kg = ?,
            streak_days = ?,
            last_activity_at = ?,
            version = ?
        WHERE user_id = ? AND version = ?
        "#,
    )
    .bind(&ledger.display_name)
    .bind(to_db_int(ledger.total_items_recycled)?)
    .bind(to_db_int(ledger.total_points)?)
    .bind(ledger.co2_saved.as_f64())
    .bind(i64::from(ledger.streak_days))
    .bind(ledger.last_activity_at)
    .bind(to_db_int(ledger.version)?)
    .bind(&ledger.user_id)
    .bind(to_db_int(expected_version)?)
    .execute(&mut *conn)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected() == 1)
}

/// Ranking view of every ledger
pub async fn list_snapshots(pool: &SqlitePool) -> Result<Vec<LedgerSnapshot>> {
    let rows: Vec<(String, String, i64, i64, f64)> = sqlx::query_as(
        r#"
        SELECT user_id, display_name, total_items_recycled, total_points, co2_saved_kg
        FROM ledgers
        ORDER BY user_id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter()
        .map(|(user_id, display_name, items, points, co2)| {
            Ok(LedgerSnapshot {
                user_id,
                display_name,
                items_recycled: from_db_int(items, "total_items_recycled")?,
                points: from_db_int(points, "total_points")?,
                co2_saved: Co2Kg(co2),
            })
        })
        .collect()
}
