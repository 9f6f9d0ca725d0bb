//! Event store module.
//!
//! This module exposes the event store trait. Events are keyed by
//! account and folder.

use crate::{Account, Events};

use super::Result;

pub trait EventStore: Send + Sync {
    fn list_events(&self, account: &Account, folder_id: &str) -> Result<Events>;

    /// Adds the given events to the folder, replacing the ones
    /// sharing the same id.
    fn insert_events(&self, account: &Account, folder_id: &str, events: &Events) -> Result<()>;

    /// Replaces all events of the folder by the given ones.
    fn replace_events(&self, account: &Account, folder_id: &str, events: &Events) -> Result<()>;

    fn purge_folder(&self, account: &Account, folder_id: &str) -> Result<()>;

    /// Removes every cached event of the account. Either everything
    /// goes or nothing does.
    fn purge_all(&self, account: &Account) -> Result<()>;
}
