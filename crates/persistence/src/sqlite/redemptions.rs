//! Redemption record operations

use super::connection::{from_db_int, to_db_int};
use chrono::{DateTime, Utc};
use greenpoints_core::{Error, Redemption, RedemptionStatus, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// Redemption record stored in database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RedemptionRow {
    pub id: String,
    pub user_id: String,
    pub offer_id: String,
    pub points_used: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RedemptionRow> for Redemption {
    type Error = Error;

    fn try_from(row: RedemptionRow) -> Result<Self> {
        Ok(Redemption {
            points_used: from_db_int(row.points_used, "points_used")?,
            status: row.status.parse::<RedemptionStatus>()?,
            id: row.id,
            user_id: row.user_id,
            offer_id: row.offer_id,
            created_at: row.created_at,
        })
    }
}

/// Insert a redemption record
pub async fn insert_redemption(
    conn: &mut SqliteConnection,
    redemption: &Redemption,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO redemptions (id, user_id, offer_id, points_used, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&redemption.id)
    .bind(&redemption.user_id)
    .bind(&redemption.offer_id)
    .bind(to_db_int(redemption.points_used)?)
    .bind(redemption.status.as_str())
    .bind(redemption.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Redemptions for a user, newest first
pub async fn list_redemptions(pool: &SqlitePool, user_id: &str) -> Result<Vec<Redemption>> {
    let rows = sqlx::query_as::<_, RedemptionRow>(
        r#"
        SELECT id, user_id, offer_id, points_used, status, created_at
        FROM redemptions
        WHERE user_id = ?
        ORDER BY seq DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter().map(Redemption::try_from).collect()
}

/// Get a single redemption by id
pub async fn get_redemption(pool: &SqlitePool, redemption_id: &str) -> Result<Option<Redemption>> {
    let row = sqlx::query_as::<_, RedemptionRow>(
        "SELECT id, user_id, offer_id, points_used, status, created_at FROM redemptions WHERE id = ?",
    )
    .bind(redemption_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(Redemption::try_from).transpose()
}

/// Compare-and-swap a redemption's status. Returns false if the stored
/// status was no longer `from`.
pub async fn update_redemption_status(
    pool: &SqlitePool,
    redemption_id: &str,
    from: RedemptionStatus,
    to: RedemptionStatus,
) -> Result<bool> {
    let result = sqlx::query("UPDATE redemptions SET status = ? WHERE id = ? AND status = ?")
        .bind(to.as_str())
        .bind(redemption_id)
        .bind(from.as_str())
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected() == 1)
}
