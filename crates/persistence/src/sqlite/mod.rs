//! SQLite database management

mod connection;
mod events;
mod ledgers;
mod offers;
mod redemptions;
mod settings;
mod store;

pub use connection::Database;
pub use events::*;
pub use ledgers::*;
pub use offers::*;
pub use redemptions::*;
pub use settings::*;
