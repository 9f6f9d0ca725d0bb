//! Store module.
//!
//! This module exposes the local event store trait, holding the
//! cached events of every account, and its sqlite implementation.

mod error;
pub use error::{Error, Result};

pub mod store;
pub use store::EventStore;

#[cfg(feature = "sqlite-store")]
pub mod sqlite;
#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteEventStore;
