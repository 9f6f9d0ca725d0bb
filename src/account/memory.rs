//! In-memory account store module.
//!
//! This module contains an account store keeping accounts in a
//! process-local map. Useful for embedding and testing.

use chrono::Utc;
use log::trace;
use std::{collections::HashMap, sync::Mutex};

use super::{Account, AccountStore, Error, InternalConfig, Result, UpdateOutcome, UserConfig};

type Key = (i32, i32, i32);

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Key, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the given account, stamping it with a new
    /// last modification. Returns the stored account.
    pub fn insert(&self, mut account: Account) -> Result<Account> {
        let mut accounts = self.accounts.lock().map_err(|_| Error::LockStoreError)?;
        let key = (account.context_id, account.user_id, account.id);
        let previous = accounts.get(&key).map(|account| account.last_modified);
        account.last_modified = next_last_modified(previous);
        accounts.insert(key, account.clone());
        Ok(account)
    }

    pub fn remove(
        &self,
        context_id: i32,
        user_id: i32,
        account_id: i32,
    ) -> Result<Option<Account>> {
        let mut accounts = self.accounts.lock().map_err(|_| Error::LockStoreError)?;
        Ok(accounts.remove(&(context_id, user_id, account_id)))
    }
}

impl AccountStore for MemoryAccountStore {
    fn get_account(&self, context_id: i32, user_id: i32, account_id: i32) -> Result<Account> {
        let accounts = self.accounts.lock().map_err(|_| Error::LockStoreError)?;
        accounts
            .get(&(context_id, user_id, account_id))
            .cloned()
            .ok_or(Error::FindAccountError(account_id))
    }

    fn update_account(
        &self,
        context_id: i32,
        user_id: i32,
        account_id: i32,
        internal_config: Option<&InternalConfig>,
        user_config: Option<&UserConfig>,
        expected_last_modified: i64,
    ) -> UpdateOutcome {
        let mut accounts = match self.accounts.lock() {
            Ok(accounts) => accounts,
            Err(_) => return UpdateOutcome::Fatal(Error::LockStoreError),
        };

        let account = match accounts.get_mut(&(context_id, user_id, account_id)) {
            Some(account) => account,
            None => return UpdateOutcome::Fatal(Error::FindAccountError(account_id)),
        };

        if account.last_modified != expected_last_modified {
            trace!(
                "account {} modified at {}, expected {}",
                account,
                account.last_modified,
                expected_last_modified
            );
            return UpdateOutcome::Conflict;
        }

        if let Some(config) = internal_config {
            account.internal_config = config.clone();
        }
        if let Some(config) = user_config {
            account.user_config = config.clone();
        }
        account.last_modified = next_last_modified(Some(account.last_modified));

        UpdateOutcome::Updated(account.clone())
    }
}

// Strictly increasing, even when two writes land in the same millisecond.
fn next_last_modified(previous: Option<i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match previous {
        Some(previous) if previous >= now => previous + 1,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_stale_last_modified_conflicts() {
        let store = MemoryAccountStore::new();
        let account = store.insert(Account::new(1, 2, 3, "ical")).unwrap();

        let mut config = InternalConfig::default();
        config.name = Some("first".into());

        let updated = match store.update_internal_config(&account, &config) {
            UpdateOutcome::Updated(account) => account,
            outcome => panic!("unexpected outcome {:?}", outcome),
        };
        assert!(updated.last_modified > account.last_modified);
        assert_eq!(updated.internal_config.name.as_deref(), Some("first"));

        config.name = Some("second".into());
        assert!(matches!(
            store.update_internal_config(&account, &config),
            UpdateOutcome::Conflict
        ));
        assert_eq!(store.reload(&account).unwrap(), updated);
    }

    #[test]
    fn update_unknown_account_fails() {
        let store = MemoryAccountStore::new();
        let account = Account::new(1, 2, 3, "ical");
        assert!(matches!(
            store.update_internal_config(&account, &InternalConfig::default()),
            UpdateOutcome::Fatal(Error::FindAccountError(3))
        ));
        assert!(store.reload(&account).is_err());
    }
}
