//! Partner-store offers and reward catalog entries

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog category of an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferCategory {
    Discount,
    Product,
    Voucher,
    Food,
    Retail,
    Services,
    Other,
}

impl OfferCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferCategory::Discount => "discount",
            OfferCategory::Product => "product",
            OfferCategory::Voucher => "voucher",
            OfferCategory::Food => "food",
            OfferCategory::Retail => "retail",
            OfferCategory::Services => "services",
            OfferCategory::Other => "other",
        }
    }
}

impl fmt::Display for OfferCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discount" => Ok(OfferCategory::Discount),
            "product" => Ok(OfferCategory::Product),
            "voucher" => Ok(OfferCategory::Voucher),
            "food" => Ok(OfferCategory::Food),
            "retail" => Ok(OfferCategory::Retail),
            "services" => Ok(OfferCategory::Services),
            "other" => Ok(OfferCategory::Other),
            other => Err(Error::InvalidData(format!("unknown offer category: {}", other))),
        }
    }
}

/// A partner-store offer or catalog reward that can be bought with points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerOffer {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Always positive
    pub points_cost: u64,
    pub category: OfferCategory,
    pub is_active: bool,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

impl PartnerOffer {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        points_cost: u64,
        category: OfferCategory,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            points_cost,
            category,
            is_active: true,
            discount_percent: None,
            original_price: None,
            address: None,
        }
    }

    /// Check the fields an administrator is allowed to set
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidData("offer id is empty".into()));
        }
        if self.points_cost == 0 {
            return Err(Error::InvalidData(format!(
                "offer {} must cost at least one point",
                self.id
            )));
        }
        if let Some(pct) = self.discount_percent {
            if !(0.0..=100.0).contains(&pct) {
                return Err(Error::InvalidData(format!(
                    "offer {} discount {} is outside 0-100",
                    self.id, pct
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cost_rejected() {
        let offer = PartnerOffer::new("o1", "Free lunch", 0, OfferCategory::Food);
        assert!(offer.validate().is_err());
    }

    #[test]
    fn test_discount_range() {
        let mut offer = PartnerOffer::new("o1", "10% off", 50, OfferCategory::Discount);
        offer.discount_percent = Some(10.0);
        assert!(offer.validate().is_ok());
        offer.discount_percent = Some(120.0);
        assert!(offer.validate().is_err());
    }

    #[test]
    fn test_category_round_trip_through_str() {
        assert_eq!("Voucher".parse::<OfferCategory>().unwrap(), OfferCategory::Voucher);
        assert!("lottery".parse::<OfferCategory>().is_err());
    }
}
