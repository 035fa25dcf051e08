//! GreenPoints Persistence - Ledger stores, catalog, and caching layer

pub mod cache;
pub mod sqlite;
pub mod store;

pub use cache::OfferCache;
pub use sqlite::Database;
pub use store::{Catalog, LedgerStore, MemoryStore};
