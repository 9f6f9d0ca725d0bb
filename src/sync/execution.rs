//! Execution list module.
//!
//! This module contains the per-folder processing instructions
//! computed for one request.

use std::{collections::BTreeMap, fmt, ops};

/// Represents what a request has to do with one folder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
    /// The folder was never cached: fetch and store it.
    InitialInsert,
    /// The cached folder is stale: fetch it and overwrite the cache.
    Update,
    /// Serve the cached folder as it is.
    ReadDb,
    /// The folder disappeared upstream: purge its cached data.
    Delete,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialInsert => write!(f, "initial insert"),
            Self::Update => write!(f, "update"),
            Self::ReadDb => write!(f, "read cache"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FolderEntry {
    pub folder_id: String,
    /// Represents the last time the folder was cached, in epoch millis.
    pub last_update: Option<i64>,
    /// Represents the refresh interval of the folder, in minutes.
    pub refresh_interval: i64,
    pub instruction: Instruction,
}

impl FolderEntry {
    pub fn new<F>(folder_id: F, instruction: Instruction) -> Self
    where
        F: ToString,
    {
        Self {
            folder_id: folder_id.to_string(),
            last_update: None,
            refresh_interval: 0,
            instruction,
        }
    }

    pub fn last_update(mut self, last_update: Option<i64>) -> Self {
        self.last_update = last_update;
        self
    }

    pub fn refresh_interval(mut self, refresh_interval: i64) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.instruction = instruction;
        self
    }
}

impl fmt::Display for FolderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} folder {}", self.instruction, self.folder_id)
    }
}

/// Represents the execution list, keyed by folder id. Each folder
/// appears at most once.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ExecutionList(BTreeMap<String, FolderEntry>);

impl ExecutionList {
    /// Adds the entry, replacing any previous entry of the same
    /// folder.
    pub fn insert(&mut self, entry: FolderEntry) -> Option<FolderEntry> {
        self.0.insert(entry.folder_id.clone(), entry)
    }

    pub fn remove(&mut self, folder_id: &str) -> Option<FolderEntry> {
        self.0.remove(folder_id)
    }

    pub fn instruction(&self, folder_id: &str) -> Option<Instruction> {
        self.0.get(folder_id).map(|entry| entry.instruction)
    }

    pub fn entries(&self) -> impl Iterator<Item = &FolderEntry> {
        self.0.values()
    }

    pub fn count(&self, instruction: Instruction) -> usize {
        self.entries()
            .filter(|entry| entry.instruction == instruction)
            .count()
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&FolderEntry) -> bool,
    {
        self.0.retain(|_, entry| f(entry))
    }
}

impl ops::Deref for ExecutionList {
    type Target = BTreeMap<String, FolderEntry>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<FolderEntry> for ExecutionList {
    fn from_iter<T: IntoIterator<Item = FolderEntry>>(iter: T) -> Self {
        let mut list = Self::default();
        for entry in iter {
            list.insert(entry);
        }
        list
    }
}

impl IntoIterator for ExecutionList {
    type Item = FolderEntry;
    type IntoIter = std::collections::btree_map::IntoValues<String, FolderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}
