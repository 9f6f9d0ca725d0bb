//! Folder module.
//!
//! This module contains the representation of a calendar folder as
//! exposed by the upstream provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the folder.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Represents the folder identifier, unique per account.
    pub id: String,
    /// Represents the folder name.
    pub name: String,
    /// Represents the folder color, if the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Folder {
    pub fn new<I, N>(id: I, name: N) -> Self
    where
        I: ToString,
        N: ToString,
    {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: None,
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
