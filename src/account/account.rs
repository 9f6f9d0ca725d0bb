//! Account module.
//!
//! This module contains the representation of an external calendar
//! account as persisted by the account store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{InternalConfig, UserConfig};

/// Represents a configured connection to an external calendar.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Represents the account identifier.
    pub id: i32,
    /// Represents the identifier of the provider serving the account.
    pub provider_id: String,
    /// Represents the context the owning user belongs to.
    pub context_id: i32,
    /// Represents the owning user.
    pub user_id: i32,
    /// Represents the configuration hidden from the end user
    /// (caching metadata and provider-private settings).
    pub internal_config: InternalConfig,
    /// Represents the configuration visible to the client.
    pub user_config: UserConfig,
    /// Represents the last modification time in epoch millis, used
    /// for optimistic concurrency.
    pub last_modified: i64,
}

impl Account {
    pub fn new<P>(context_id: i32, user_id: i32, id: i32, provider_id: P) -> Self
    where
        P: ToString,
    {
        Self {
            id,
            provider_id: provider_id.to_string(),
            context_id,
            user_id,
            ..Self::default()
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} ({})",
            self.context_id, self.user_id, self.id, self.provider_id
        )
    }
}
