//! Account store module.
//!
//! This module exposes the account store trait, which persists
//! accounts and guards their updates with optimistic concurrency.

use super::{Account, Error, InternalConfig, Result, UserConfig};

/// Represents the outcome of an optimistic update.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The update went through. Holds the account as stored.
    Updated(Account),
    /// The account changed since the expected last modification.
    Conflict,
    /// The update failed for another reason.
    Fatal(Error),
}

impl UpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

pub trait AccountStore: Send + Sync {
    fn get_account(&self, context_id: i32, user_id: i32, account_id: i32) -> Result<Account>;

    /// Updates the given configuration documents of the account, as
    /// long as its last modification still matches
    /// `expected_last_modified`. Documents given as `None` are kept
    /// untouched.
    fn update_account(
        &self,
        context_id: i32,
        user_id: i32,
        account_id: i32,
        internal_config: Option<&InternalConfig>,
        user_config: Option<&UserConfig>,
        expected_last_modified: i64,
    ) -> UpdateOutcome;

    /// Reloads the given account snapshot.
    fn reload(&self, account: &Account) -> Result<Account> {
        self.get_account(account.context_id, account.user_id, account.id)
    }

    /// Writes the internal config of the given account snapshot.
    fn update_internal_config(&self, account: &Account, config: &InternalConfig) -> UpdateOutcome {
        self.update_account(
            account.context_id,
            account.user_id,
            account.id,
            Some(config),
            None,
            account.last_modified,
        )
    }
}
