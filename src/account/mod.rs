//! Account module.
//!
//! This module contains everything related to external calendar
//! accounts: their configuration documents and the store they are
//! persisted in.

mod error;
pub use error::{Error, Result};

pub mod account;
pub use account::Account;

pub mod config;
pub use config::{
    CachedFolder, ConfigDelta, FolderCacheSnapshot, InternalConfig, StoredError, UserConfig,
};

pub mod store;
pub use store::{AccountStore, UpdateOutcome};

pub mod memory;
pub use memory::MemoryAccountStore;
