//! Caching calendar access module.
//!
//! This module contains the entry point of a read request. For every
//! call it reconciles the cache with the folders visible upstream,
//! lets the executor refresh what needs to be, reads the events from
//! the local store and finally persists the config changes.

use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    Account, AccountStore, CacheConfig, CalendarProvider, CalendarSettings, ConfigDelta,
    EventStore, Events, FolderCacheSnapshot, Folders, UpdateOutcome, Warning,
};

use super::{
    reconcile, staleness, Error, ExecutionList, LeaseGate, RefreshExecutor, Result,
    StoreRefreshExecutor, UpdateLease,
};

/// Represents the response of a read request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventsResponse {
    /// Represents the events, by folder id.
    pub events: BTreeMap<String, Events>,
    pub warnings: Vec<Warning>,
}

pub struct CachingCalendarAccess<'a> {
    config: &'a CacheConfig,
    account: Account,
    accounts: &'a dyn AccountStore,
    provider: &'a dyn CalendarProvider,
    events: &'a dyn EventStore,
    executor: Box<dyn RefreshExecutor + 'a>,
    clock: Box<dyn Fn() -> DateTime<Utc> + Send + Sync + 'a>,
}

impl<'a> CachingCalendarAccess<'a> {
    pub fn new(
        config: &'a CacheConfig,
        account: Account,
        accounts: &'a dyn AccountStore,
        provider: &'a dyn CalendarProvider,
        events: &'a dyn EventStore,
    ) -> Self {
        Self {
            config,
            account,
            accounts,
            provider,
            events,
            executor: Box::new(StoreRefreshExecutor::new(provider, events)),
            clock: Box::new(Utc::now),
        }
    }

    pub fn executor<E>(mut self, executor: E) -> Self
    where
        E: RefreshExecutor + 'a,
    {
        self.executor = Box::new(executor);
        self
    }

    pub fn clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'a,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Gets the current account snapshot.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn into_account(self) -> Account {
        self.account
    }

    /// Lists the folders currently visible upstream.
    pub fn list_folders(&self) -> Result<Folders> {
        self.provider
            .list_folders(&self.account)
            .map_err(|err| Error::ListFoldersError(err, self.account.to_string()))
    }

    /// Builds the settings view of the current account snapshot.
    pub fn settings(&self) -> CalendarSettings {
        CalendarSettings::build(&self.account, self.provider, self.config)
    }

    pub fn get_folder_events(&mut self, folder_id: &str) -> Result<Events> {
        let mut res = self.get_events(&[folder_id])?;
        for warning in &res.warnings {
            warn!("{warning}");
        }
        Ok(res.events.remove(folder_id).unwrap_or_default())
    }

    /// Gets the events of every folder visible upstream.
    pub fn get_all_events(&mut self) -> Result<EventsResponse> {
        let folders = self.list_folders()?;
        let requested: Vec<&str> = folders.iter().map(|folder| folder.id.as_str()).collect();
        self.serve(&folders, &requested)
    }

    /// Gets the events of the given folders. Unknown folders are
    /// reported as not found.
    pub fn get_events<F>(&mut self, folder_ids: &[F]) -> Result<EventsResponse>
    where
        F: AsRef<str>,
    {
        let folders = self.list_folders()?;
        let requested: Vec<&str> = folder_ids.iter().map(|id| id.as_ref()).collect();
        self.serve(&folders, &requested)
    }

    fn serve(&mut self, folders: &Folders, requested: &[&str]) -> Result<EventsResponse> {
        let now = (self.clock)();

        let visible = folders.ids();
        if let Some(folder_id) = requested.iter().find(|id| !visible.contains(*id)) {
            return Err(Error::FindFolderError(folder_id.to_string()));
        }
        let requested: HashSet<&str> = requested.iter().copied().collect();

        info!(
            "serving {} folders of account {}",
            requested.len(),
            self.account
        );

        let list = self.prepare(folders, &requested, now)?;
        debug!("execution list: {:#?}", list);

        let report = self.executor.apply(&self.account, &list, now);

        let mut res = EventsResponse {
            warnings: report.warnings,
            ..EventsResponse::default()
        };

        for folder_id in &requested {
            let events = match self.events.list_events(&self.account, folder_id) {
                Ok(events) => events,
                Err(err) => {
                    warn!("cannot read cached events of folder {folder_id}: {err}");
                    res.warnings
                        .push(Warning::new("READ_CACHE", err).folder_id(folder_id));
                    Events::default()
                }
            };
            res.events.insert(folder_id.to_string(), events);
        }

        self.save(report.delta);

        Ok(res)
    }

    /// Computes the execution list. The update lease is attempted at
    /// most once, the first time a folder needs refreshing.
    fn prepare(
        &mut self,
        folders: &Folders,
        requested: &HashSet<&str>,
        now: DateTime<Utc>,
    ) -> Result<ExecutionList> {
        let snapshot = FolderCacheSnapshot::from(&self.account.internal_config);
        trace!("folder cache snapshot: {:#?}", snapshot);

        let default_interval = self.config.default_refresh_interval();
        let intervals: HashMap<String, i64> = snapshot
            .folders()
            .map(|(id, _)| id)
            .chain(folders.iter().map(|folder| folder.id.as_str()))
            .map(|id| {
                let interval = staleness::resolve_refresh_interval(
                    self.provider,
                    &self.account,
                    id,
                    default_interval,
                );
                (id.to_owned(), interval)
            })
            .collect();
        let interval = |id: &str| intervals.get(id).copied().unwrap_or(default_interval);

        let lease = UpdateLease::from_config(self.config);
        let accounts = self.accounts;
        let account = &mut self.account;
        let mut gate = LeaseGate::new(|| lease.try_acquire(account, accounts, now));

        let persisted =
            staleness::evaluate(&snapshot, interval, now.timestamp_millis(), &mut gate)?;
        let list = reconcile::build_execution_list(
            persisted,
            folders.iter().map(|folder| folder.id.as_str()),
            requested,
            interval,
            &mut gate,
        )?;

        if let Some(held) = gate.outcome() {
            debug!("update lease acquired: {held}");
        }

        Ok(list)
    }

    /// Persists the config changes, unless they change nothing.
    /// Failures are logged only: the request has been served anyway.
    fn save(&mut self, delta: ConfigDelta) {
        if delta.is_empty() {
            return;
        }

        let config = delta.apply(&self.account.internal_config);
        if config == self.account.internal_config {
            trace!("config of account {} unchanged, skipping save", self.account);
            return;
        }

        match self.accounts.update_internal_config(&self.account, &config) {
            UpdateOutcome::Updated(account) => {
                debug!("config of account {} saved", account);
                self.account = account;
            }
            UpdateOutcome::Conflict => {
                warn!(
                    "account {} modified concurrently, dropping config changes",
                    self.account
                );
                match self.accounts.reload(&self.account) {
                    Ok(account) => self.account = account,
                    Err(err) => error!("cannot reload account {}: {}", self.account, err),
                }
            }
            UpdateOutcome::Fatal(err) => {
                error!("cannot save config of account {}: {}", self.account, err);
            }
        }
    }
}
