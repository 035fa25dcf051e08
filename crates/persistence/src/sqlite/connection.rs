//! Database connection and initialization

use greenpoints_core::{Error, Result, DEFAULT_RETENTION_CAP};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Database wrapper for SQLite operations
pub struct Database {
    pool: SqlitePool,
    pub(crate) retention_cap: usize,
}

impl Database {
    /// Connect to database at the given path, creating if necessary
    pub async fn connect(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::DatabaseError(e.to_string()))?;
        }

        let path_str = path.to_string_lossy();
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path_str))
            .map_err(|e| Error::DatabaseError(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let db = Self {
            pool,
            retention_cap: DEFAULT_RETENTION_CAP,
        };
        db.run_migrations().await?;
        info!("Opened points database at {}", path_str);
        Ok(db)
    }

    /// Connect to in-memory database (for testing)
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let db = Self {
            pool,
            retention_cap: DEFAULT_RETENTION_CAP,
        };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Number of events loaded into a ledger's recent-activity list
    pub fn with_retention_cap(mut self, retention_cap: usize) -> Self {
        self.retention_cap = retention_cap;
        self
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledgers (
                user_id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                total_items_recycled INTEGER NOT NULL DEFAULT 0,
                total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
                co2_saved_kg REAL NOT NULL DEFAULT 0.0,
                streak_days INTEGER NOT NULL DEFAULT 0,
                last_activity_at TIMESTAMP,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS recycling_events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                item_type TEXT NOT NULL,
                points_awarded INTEGER NOT NULL,
                co2_saved_kg REAL NOT NULL,
                recorded_at TIMESTAMP NOT NULL,
                FOREIGN KEY (user_id) REFERENCES ledgers(user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_events_user
                ON recycling_events (user_id, seq);

            CREATE TABLE IF NOT EXISTS partner_offers (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL,
                points_cost INTEGER NOT NULL CHECK (points_cost > 0),
                is_active INTEGER NOT NULL DEFAULT 1,
                discount_percent REAL,
                original_price REAL,
                address TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS redemptions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                offer_id TEXT NOT NULL,
                points_used INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TIMESTAMP NOT NULL,
                FOREIGN KEY (user_id) REFERENCES ledgers(user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_redemptions_user
                ON redemptions (user_id, seq);

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Convert a counter to SQLite's signed integer
pub(crate) fn to_db_int(value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| Error::InvalidData(format!("{} does not fit in an INTEGER column", value)))
}

/// Convert a stored integer back to a counter
pub(crate) fn from_db_int(value: i64, column: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| Error::InvalidData(format!("negative value {} in {}", value, column)))
}
