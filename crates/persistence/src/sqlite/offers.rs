//! Partner offer catalog operations

use super::connection::{from_db_int, to_db_int};
use greenpoints_core::{Error, OfferCategory, PartnerOffer, Result};
use sqlx::SqlitePool;

/// Database row for an offer
#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    id: String,
    title: String,
    description: String,
    category: String,
    points_cost: i64,
    is_active: bool,
    discount_percent: Option<f64>,
    original_price: Option<f64>,
    address: Option<String>,
}

impl TryFrom<OfferRow> for PartnerOffer {
    type Error = Error;

    fn try_from(row: OfferRow) -> Result<Self> {
        Ok(PartnerOffer {
            category: row.category.parse::<OfferCategory>()?,
            points_cost: from_db_int(row.points_cost, "points_cost")?,
            id: row.id,
            title: row.title,
            description: row.description,
            is_active: row.is_active,
            discount_percent: row.discount_percent,
            original_price: row.original_price,
            address: row.address,
        })
    }
}

const OFFER_COLUMNS: &str = "id, title, description, category, points_cost, is_active, \
                             discount_percent, original_price, address";

/// Active offers, cheapest first
pub async fn list_active_offers(pool: &SqlitePool) -> Result<Vec<PartnerOffer>> {
    let query = format!(
        "SELECT {} FROM partner_offers WHERE is_active = 1 ORDER BY points_cost ASC, id ASC",
        OFFER_COLUMNS
    );
    let rows = sqlx::query_as::<_, OfferRow>(&query)
        .fetch_all(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    rows.into_iter().map(PartnerOffer::try_from).collect()
}

/// Get a specific offer by ID, active or not
pub async fn get_offer(pool: &SqlitePool, offer_id: &str) -> Result<Option<PartnerOffer>> {
    let query = format!("SELECT {} FROM partner_offers WHERE id = ?", OFFER_COLUMNS);
    let row = sqlx::query_as::<_, OfferRow>(&query)
        .bind(offer_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    row.map(PartnerOffer::try_from).transpose()
}

/// Add an offer to the catalog
pub async fn insert_offer(pool: &SqlitePool, offer: &PartnerOffer) -> Result<()> {
    offer.validate()?;
    sqlx::query(
        r#"
        INSERT INTO partner_offers (id, title, description, category, points_cost, is_active,
                                    discount_percent, original_price, address)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&offer.id)
    .bind(&offer.title)
    .bind(&offer.description)
    .bind(offer.category.as_str())
    .bind(to_db_int(offer.points_cost)?)
    .bind(offer.is_active)
    .bind(offer.discount_percent)
    .bind(offer.original_price)
    .bind(&offer.address)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::InvalidData(format!("offer {} already exists", offer.id))
        }
        other => Error::DatabaseError(other.to_string()),
    })?;

    Ok(())
}

/// Activate or deactivate an offer
pub async fn set_offer_active(pool: &SqlitePool, offer_id: &str, active: bool) -> Result<()> {
    let result = sqlx::query("UPDATE partner_offers SET is_active = ? WHERE id = ?")
        .bind(active)
        .bind(offer_id)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(Error::OfferNotFound(offer_id.to_string()));
    }
    Ok(())
}
