//! Rust library for caching external calendars.
//!
//! The cache sits between clients reading events and providers
//! fetching them from remote sources (ICS feeds, birthday
//! calendars…). Every read reconciles the folders remembered by the
//! cache with the ones visible upstream, refreshes stale folders
//! under an account-wide update lease, then serves the events from
//! the local event store.

pub mod config;
pub use config::{CacheConfig, DEFAULT_CALENDAR_NAME, DEFAULT_LEASE_TTL, DEFAULT_REFRESH_INTERVAL};

pub mod account;
pub use account::{
    Account, AccountStore, CachedFolder, ConfigDelta, FolderCacheSnapshot, InternalConfig,
    MemoryAccountStore, StoredError, UpdateOutcome, UserConfig,
};

pub mod domain;
pub use domain::{Event, Events, Folder, Folders};

pub mod provider;
pub use provider::{
    CalendarProvider, ExternalCalendarResult, SingleFolder, SingleFolderProvider, Warning,
    SINGLE_FOLDER_ID,
};

pub mod store;
#[cfg(feature = "sqlite-store")]
pub use store::SqliteEventStore;
pub use store::EventStore;

pub mod sync;
pub use sync::{
    CachingCalendarAccess, EventsResponse, ExecutionList, ExecutionReport, FolderEntry,
    Instruction, RefreshExecutor, StoreRefreshExecutor, UpdateLease,
};

pub mod lifecycle;
pub use lifecycle::{AccountLifecycle, ProviderHooks};

pub mod settings;
pub use settings::{CalendarSettings, ExtendedProperties, Transparency, UsedForSync};
