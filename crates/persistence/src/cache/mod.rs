//! In-memory caching layer for the offer catalog

use greenpoints_core::PartnerOffer;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// One offer and the instant it stops being served
struct Cached {
    offer: PartnerOffer,
    expires_at: Instant,
}

impl Cached {
    fn is_live(&self) -> bool {
        Instant::now() <= self.expires_at
    }
}

/// Thread-safe cache of the active-offer listing with a TTL
///
/// Only serves reads for catalog screens; redemption always re-reads the
/// authoritative catalog so a stale `is_active` flag is never trusted.
pub struct OfferCache {
    offers: RwLock<HashMap<String, Cached>>,
    /// Set when the whole active listing was loaded at once
    listing_loaded_at: RwLock<Option<Instant>>,
    default_ttl: Duration,
}

impl OfferCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            offers: RwLock::new(HashMap::new()),
            listing_loaded_at: RwLock::new(None),
            default_ttl,
        }
    }

    /// A live cached offer, if any
    pub fn get(&self, offer_id: &str) -> Option<PartnerOffer> {
        let cache = self.offers.read().ok()?;
        cache
            .get(offer_id)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.offer.clone())
    }

    /// Cache one offer, sweeping dead entries first
    pub fn insert(&self, offer: PartnerOffer) {
        if let Ok(mut cache) = self.offers.write() {
            cache.retain(|_, entry| entry.is_live());
            let expires_at = Instant::now() + self.default_ttl;
            cache.insert(offer.id.clone(), Cached { offer, expires_at });
        }
    }

    /// Replace the cached listing with a freshly loaded one
    pub fn replace_listing(&self, offers: &[PartnerOffer]) {
        let now = Instant::now();
        if let Ok(mut cache) = self.offers.write() {
            cache.clear();
            for offer in offers {
                cache.insert(
                    offer.id.clone(),
                    Cached {
                        offer: offer.clone(),
                        expires_at: now + self.default_ttl,
                    },
                );
            }
        }
        if let Ok(mut loaded) = self.listing_loaded_at.write() {
            *loaded = Some(now);
        }
    }

    /// The cached active listing, cheapest first, if it is still fresh
    pub fn active_listing(&self) -> Option<Vec<PartnerOffer>> {
        let loaded_at = (*self.listing_loaded_at.read().ok()?)?;
        if loaded_at.elapsed() > self.default_ttl {
            return None;
        }

        let cache = self.offers.read().ok()?;
        let mut offers: Vec<PartnerOffer> = cache
            .values()
            .filter(|entry| entry.is_live() && entry.offer.is_active)
            .map(|entry| entry.offer.clone())
            .collect();
        offers.sort_by(|a, b| a.points_cost.cmp(&b.points_cost).then_with(|| a.id.cmp(&b.id)));
        Some(offers)
    }

    /// Remove an offer and drop the listing (e.g., after an admin edit)
    pub fn invalidate(&self, offer_id: &str) {
        if let Ok(mut cache) = self.offers.write() {
            cache.remove(offer_id);
        }
        if let Ok(mut loaded) = self.listing_loaded_at.write() {
            *loaded = None;
        }
    }

    /// Forget every offer and the listing
    pub fn clear(&self) {
        if let Ok(mut cache) = self.offers.write() {
            cache.clear();
        }
        if let Ok(mut loaded) = self.listing_loaded_at.write() {
            *loaded = None;
        }
    }

    /// Offers held, live or not yet swept
    pub fn len(&self) -> usize {
        self.offers.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OfferCache {
    fn default() -> Self {
        // Catalog changes rarely; one minute is fresh enough
        Self::new(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenpoints_core::OfferCategory;

    fn offer(id: &str, cost: u64) -> PartnerOffer {
        PartnerOffer::new(id, id, cost, OfferCategory::Voucher)
    }

    #[test]
    fn test_listing_sorted_and_invalidated() {
        let cache = OfferCache::default();
        assert!(cache.active_listing().is_none());

        cache.replace_listing(&[offer("b", 120), offer("a", 50)]);
        let listing = cache.active_listing().unwrap();
        assert_eq!(listing[0].id, "a");
        assert_eq!(listing[1].id, "b");

        cache.invalidate("a");
        assert!(cache.active_listing().is_none());
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_expired_entries_not_served() {
        let cache = OfferCache::new(Duration::ZERO);
        cache.replace_listing(&[offer("a", 50)]);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.active_listing().is_none());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_clear_drops_offers_and_listing() {
        let cache = OfferCache::default();
        cache.replace_listing(&[offer("a", 50)]);
        cache.insert(offer("b", 80));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.active_listing().is_none());
    }
}
