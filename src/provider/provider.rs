//! Provider module.
//!
//! This module exposes the provider trait, which can be used to plug
//! any upstream calendar source into the cache.

use serde::Serialize;
use std::fmt;

use crate::{Account, Events, Folders};

use super::{Error, Result};

/// Represents a non-fatal problem met while serving a request.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub code: String,
    pub message: String,
}

impl Warning {
    pub fn new<C, M>(code: C, message: M) -> Self
    where
        C: ToString,
        M: ToString,
    {
        Self {
            folder_id: None,
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn folder_id<F: ToString>(mut self, folder_id: F) -> Self {
        self.folder_id = Some(folder_id.to_string());
        self
    }

    pub fn from_error(folder_id: &str, err: &Error) -> Self {
        Self::new(err.code(), err).folder_id(folder_id)
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.folder_id {
            Some(folder_id) => write!(f, "[{}] folder {}: {}", self.code, folder_id, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Represents the outcome of an upstream fetch for one folder.
///
/// When the upstream reports no change, the events are meaningless
/// and the local cache stays authoritative.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExternalCalendarResult {
    updated: bool,
    events: Events,
    warnings: Vec<Warning>,
}

impl ExternalCalendarResult {
    pub fn updated(events: Events) -> Self {
        Self {
            updated: true,
            events,
            warnings: Vec::new(),
        }
    }

    pub fn not_modified() -> Self {
        Self::default()
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Gets the fetched events, only if the upstream data changed.
    pub fn events(&self) -> Option<&Events> {
        self.updated.then_some(&self.events)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Option<Events>, Vec<Warning>) {
        let events = self.updated.then_some(self.events);
        (events, self.warnings)
    }
}

pub trait CalendarProvider: Send + Sync {
    /// Lists the folders currently visible upstream.
    fn list_folders(&self, account: &Account) -> Result<Folders>;

    /// Fetches the events of the given folder.
    fn fetch_events(&self, account: &Account, folder_id: &str) -> Result<ExternalCalendarResult>;

    /// Gets the refresh interval of the given folder, in minutes. A
    /// value lower or equal to zero means no preference.
    fn refresh_interval(&self, _account: &Account, _folder_id: &str) -> Result<i64> {
        Ok(0)
    }

    /// Turns a fetch failure into a warning of the response.
    fn handle_fetch_error(&self, _account: &Account, folder_id: &str, err: &Error) -> Warning {
        Warning::from_error(folder_id, err)
    }

    /// Tells if the account can be used for synchronization.
    fn supports_sync(&self, _account: &Account) -> bool {
        false
    }
}
