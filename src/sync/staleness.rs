//! Staleness module.
//!
//! This module classifies cached folders according to their last
//! update and refresh interval. Refreshing work needs the account
//! update lease: a folder that should be refreshed while the lease
//! is not held is served from the cache instead.

use chrono::Duration;
use log::{debug, trace};

use crate::{Account, CalendarProvider, FolderCacheSnapshot};

use super::{ExecutionList, FolderEntry, Instruction, Result};

/// Tells whether the current process may perform refreshing work.
pub trait LeaseCheck {
    fn is_held(&mut self) -> Result<bool>;
}

impl LeaseCheck for bool {
    fn is_held(&mut self) -> Result<bool> {
        Ok(*self)
    }
}

/// Attempts to acquire the lease the first time it is needed, then
/// keeps answering with the same outcome. The lease is account-wide,
/// so one attempt per request is enough.
pub struct LeaseGate<F> {
    acquire: F,
    outcome: Option<bool>,
}

impl<F> LeaseGate<F>
where
    F: FnMut() -> Result<bool>,
{
    pub fn new(acquire: F) -> Self {
        Self {
            acquire,
            outcome: None,
        }
    }

    /// Gets the outcome of the acquisition, if it was attempted.
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }
}

impl<F> LeaseCheck for LeaseGate<F>
where
    F: FnMut() -> Result<bool>,
{
    fn is_held(&mut self) -> Result<bool> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }

        let outcome = (self.acquire)()?;
        self.outcome = Some(outcome);
        Ok(outcome)
    }
}

/// Classifies one folder. The lease is only consulted when the folder
/// actually needs refreshing.
pub fn classify<L>(
    last_update: Option<i64>,
    refresh_interval: i64,
    now: i64,
    lease: &mut L,
) -> Result<Instruction>
where
    L: LeaseCheck + ?Sized,
{
    let instruction = match last_update {
        None => {
            if lease.is_held()? {
                Instruction::InitialInsert
            } else {
                Instruction::ReadDb
            }
        }
        Some(last_update) if last_update < 0 => {
            if lease.is_held()? {
                Instruction::InitialInsert
            } else {
                Instruction::ReadDb
            }
        }
        Some(last_update)
            if Duration::milliseconds(now - last_update).num_minutes() > refresh_interval =>
        {
            if lease.is_held()? {
                Instruction::Update
            } else {
                Instruction::ReadDb
            }
        }
        Some(_) => Instruction::ReadDb,
    };

    Ok(instruction)
}

/// Builds one entry per folder known by the cache.
pub fn evaluate<I, L>(
    snapshot: &FolderCacheSnapshot,
    refresh_interval: I,
    now: i64,
    lease: &mut L,
) -> Result<ExecutionList>
where
    I: Fn(&str) -> i64,
    L: LeaseCheck + ?Sized,
{
    let mut list = ExecutionList::default();

    for (folder_id, last_update) in snapshot.folders() {
        let interval = refresh_interval(folder_id);
        let instruction = classify(last_update, interval, now, lease)?;
        trace!("cached folder {folder_id} classified as {instruction}");

        list.insert(
            FolderEntry::new(folder_id, instruction)
                .last_update(last_update)
                .refresh_interval(interval),
        );
    }

    Ok(list)
}

/// Resolves the refresh interval of a folder: the one given by the
/// provider when strictly positive, the default one otherwise.
pub fn resolve_refresh_interval(
    provider: &dyn CalendarProvider,
    account: &Account,
    folder_id: &str,
    default: i64,
) -> i64 {
    match provider.refresh_interval(account, folder_id) {
        Ok(interval) if interval > 0 => interval,
        Ok(_) => default,
        Err(err) => {
            debug!("cannot get refresh interval of folder {folder_id}, using default: {err}");
            default
        }
    }
}
