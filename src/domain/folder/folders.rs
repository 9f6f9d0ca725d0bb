//! Folders module.
//!
//! This module contains the representation of the calendar folders.

use std::{collections::HashSet, ops};

use serde::{Deserialize, Serialize};

use super::Folder;

/// Represents the list of folders.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folders(pub Vec<Folder>);

impl Folders {
    pub fn ids(&self) -> HashSet<&str> {
        self.iter().map(|folder| folder.id.as_str()).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Folder> {
        self.iter().find(|folder| folder.id == id)
    }
}

impl ops::Deref for Folders {
    type Target = Vec<Folder>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Folders {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<Folder> for Folders {
    fn from_iter<T: IntoIterator<Item = Folder>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
