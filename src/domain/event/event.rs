//! Event module.
//!
//! This module contains the representation of a calendar event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the event.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Represents the event identifier given by the provider.
    pub id: String,
    /// Represents the identifier of the folder holding the event.
    pub folder_id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Represents the last modification made upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Event {
    pub fn new<I, S>(id: I, summary: S, start: DateTime<Utc>) -> Self
    where
        I: ToString,
        S: ToString,
    {
        Self {
            id: id.to_string(),
            summary: summary.to_string(),
            start,
            ..Self::default()
        }
    }

    pub fn with_folder_id<F: ToString>(mut self, folder_id: F) -> Self {
        self.folder_id = folder_id.to_string();
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.summary, self.start.to_rfc3339())
    }
}
