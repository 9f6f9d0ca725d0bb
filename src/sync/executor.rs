//! Refresh executor module.
//!
//! This module turns an execution list into event store mutations.
//! Failures never abort the whole list: they end up as warnings of
//! the response, and the last fetch failure is remembered in the
//! internal config of the account.

use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use rayon::prelude::*;

use crate::{Account, CalendarProvider, ConfigDelta, EventStore, StoredError, Warning};

use super::{ExecutionList, FolderEntry, Instruction};

/// Represents what the execution of a list produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExecutionReport {
    pub warnings: Vec<Warning>,
    /// Represents the config changes to persist once the request is
    /// served.
    pub delta: ConfigDelta,
}

pub trait RefreshExecutor: Send + Sync {
    fn apply(&self, account: &Account, list: &ExecutionList, now: DateTime<Utc>) -> ExecutionReport;
}

#[derive(Debug, Default)]
struct FolderOutcome {
    warnings: Vec<Warning>,
    delta: ConfigDelta,
    error: Option<StoredError>,
    fetched: bool,
}

/// Executes lists by fetching from the provider and writing into the
/// event store.
pub struct StoreRefreshExecutor<'a> {
    provider: &'a dyn CalendarProvider,
    store: &'a dyn EventStore,
}

impl<'a> StoreRefreshExecutor<'a> {
    const CHUNK_SIZE: usize = 10;

    pub fn new(provider: &'a dyn CalendarProvider, store: &'a dyn EventStore) -> Self {
        Self { provider, store }
    }

    fn process(&self, account: &Account, entry: &FolderEntry, now: DateTime<Utc>) -> FolderOutcome {
        let mut outcome = FolderOutcome::default();
        let folder_id = entry.folder_id.as_str();

        match entry.instruction {
            Instruction::ReadDb => {
                if entry.last_update.is_none() {
                    outcome.delta.observe_folder(folder_id);
                }
            }
            Instruction::Delete => match self.store.purge_folder(account, folder_id) {
                Ok(()) => {
                    outcome.delta.remove_folder(folder_id);
                }
                Err(err) => {
                    warn!("cannot purge cached folder {folder_id}, skipping it: {err}");
                    outcome
                        .warnings
                        .push(Warning::new("PURGE_FOLDER", err).folder_id(folder_id));
                }
            },
            Instruction::InitialInsert | Instruction::Update => {
                match self.provider.fetch_events(account, folder_id) {
                    Ok(result) => {
                        let (events, warnings) = result.into_parts();
                        outcome.warnings.extend(warnings);

                        let stored = match events {
                            Some(events) if entry.instruction == Instruction::InitialInsert => {
                                self.store.insert_events(account, folder_id, &events)
                            }
                            Some(events) => self.store.replace_events(account, folder_id, &events),
                            None => {
                                trace!("folder {folder_id} not modified upstream");
                                Ok(())
                            }
                        };

                        match stored {
                            Ok(()) => {
                                outcome.delta.set_last_update(folder_id, now.timestamp_millis());
                                outcome.fetched = true;
                            }
                            Err(err) => {
                                warn!("cannot cache events of folder {folder_id}: {err}");
                                outcome
                                    .warnings
                                    .push(Warning::new("STORE_EVENTS", err).folder_id(folder_id));
                            }
                        }
                    }
                    Err(err) => {
                        warn!("cannot fetch events of folder {folder_id}: {err}");
                        outcome
                            .warnings
                            .push(self.provider.handle_fetch_error(account, folder_id, &err));
                        outcome.error = Some(
                            StoredError::new(err.code(), &err, now.timestamp_millis())
                                .folder_id(folder_id),
                        );
                    }
                }
            }
        }

        outcome
    }
}

impl RefreshExecutor for StoreRefreshExecutor<'_> {
    fn apply(
        &self,
        account: &Account,
        list: &ExecutionList,
        now: DateTime<Utc>,
    ) -> ExecutionReport {
        let entries: Vec<&FolderEntry> = list
            .entries()
            .filter(|entry| entry.instruction != Instruction::ReadDb || entry.last_update.is_none())
            .collect();

        info!(
            "executing {} of {} folder entries for account {}",
            entries.len(),
            list.len(),
            account
        );

        let mut outcomes = Vec::with_capacity(entries.len());
        let chunks = entries.chunks(Self::CHUNK_SIZE);
        let chunks_len = chunks.len();

        for (chunk_num, chunk) in chunks.enumerate() {
            debug!("processing folder entries, batch {}/{}", chunk_num + 1, chunks_len);
            outcomes.extend(
                chunk
                    .par_iter()
                    .map(|entry| self.process(account, entry, now))
                    .collect::<Vec<_>>(),
            );
        }

        let mut report = ExecutionReport::default();
        let mut last_error = None;
        let mut fetched = false;

        for outcome in outcomes {
            report.warnings.extend(outcome.warnings);
            report.delta.merge(outcome.delta);
            fetched |= outcome.fetched;
            if outcome.error.is_some() {
                last_error = outcome.error;
            }
        }

        match last_error {
            Some(err) => {
                report.delta.set_last_error(err);
            }
            None if fetched => {
                report.delta.clear_last_error();
            }
            None => (),
        }

        report
    }
}
