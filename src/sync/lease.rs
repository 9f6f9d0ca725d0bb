//! Update lease module.
//!
//! The update lease is a timestamp stored in the internal config of
//! the account. A process holds it right after extending it with a
//! successful optimistic update. It is not a lock: there is no
//! heartbeat nor fencing, it simply expires once its timestamp is in
//! the past.

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, warn};

use crate::{Account, AccountStore, CacheConfig, ConfigDelta, UpdateOutcome};

use super::{Error, Result};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UpdateLease {
    ttl: Duration,
}

impl Default for UpdateLease {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl UpdateLease {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.lease_ttl())
    }

    /// Tells if another process currently holds the lease.
    pub fn is_locked(account: &Account, now: DateTime<Utc>) -> bool {
        matches!(
            account.internal_config.locked_for_update_until,
            Some(until) if until > now.timestamp_millis()
        )
    }

    /// Tries to acquire the lease of the account.
    ///
    /// On success the account snapshot is replaced by the stored
    /// one. On conflict the snapshot is reloaded from the store and
    /// the acquisition fails, without retrying. Only other store
    /// failures are returned as errors.
    pub fn try_acquire(
        &self,
        account: &mut Account,
        store: &dyn AccountStore,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if Self::is_locked(account, now) {
            debug!("account {} is being refreshed by another process", account);
            return Ok(false);
        }

        let mut delta = ConfigDelta::default();
        delta.lock_until((now + self.ttl).timestamp_millis());
        self.write(account, store, delta)
    }

    /// Releases the lease of the account. Returns `false` when the
    /// account was not locked or changed concurrently.
    pub fn release(&self, account: &mut Account, store: &dyn AccountStore) -> Result<bool> {
        if account.internal_config.locked_for_update_until.is_none() {
            return Ok(false);
        }

        let mut delta = ConfigDelta::default();
        delta.unlock();
        self.write(account, store, delta)
    }

    fn write(
        &self,
        account: &mut Account,
        store: &dyn AccountStore,
        delta: ConfigDelta,
    ) -> Result<bool> {
        let config = delta.apply(&account.internal_config);

        match store.update_internal_config(account, &config) {
            UpdateOutcome::Updated(updated) => {
                debug!(
                    "update lease of account {} set to {:?}",
                    updated, updated.internal_config.locked_for_update_until
                );
                *account = updated;
                Ok(true)
            }
            UpdateOutcome::Conflict => {
                warn!("account {} modified concurrently, cannot write update lease", account);
                let reloaded = store
                    .reload(account)
                    .map_err(|err| Error::AcquireLeaseError(err, account.to_string()))?;
                *account = reloaded;
                Ok(false)
            }
            UpdateOutcome::Fatal(err) => {
                error!("cannot write update lease of account {}: {}", account, err);
                Err(Error::AcquireLeaseError(err, account.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::{Account, AccountStore, MemoryAccountStore, UpdateOutcome};

    use super::*;

    fn setup() -> (MemoryAccountStore, Account) {
        let store = MemoryAccountStore::new();
        let account = store.insert(Account::new(1, 1, 1, "ical")).unwrap();
        (store, account)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 10, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn acquire_free_lease() {
        let (store, mut account) = setup();
        let lease = UpdateLease::default();

        assert!(lease.try_acquire(&mut account, &store, now()).unwrap());
        assert_eq!(
            account.internal_config.locked_for_update_until,
            Some((now() + Duration::minutes(10)).timestamp_millis())
        );
        assert_eq!(store.reload(&account).unwrap(), account);
    }

    #[test]
    fn held_lease_cannot_be_acquired() {
        let (store, mut account) = setup();
        let lease = UpdateLease::default();

        assert!(lease.try_acquire(&mut account, &store, now()).unwrap());

        let mut other = store.reload(&account).unwrap();
        assert!(!lease
            .try_acquire(&mut other, &store, now() + Duration::minutes(9))
            .unwrap());

        // expired
        assert!(lease
            .try_acquire(&mut other, &store, now() + Duration::minutes(11))
            .unwrap());
    }

    #[test]
    fn conflict_reloads_snapshot() {
        let (store, mut account) = setup();
        let lease = UpdateLease::default();

        let mut config = account.internal_config.clone();
        config.name = Some("renamed".into());
        let current = match store.update_internal_config(&account, &config) {
            UpdateOutcome::Updated(account) => account,
            outcome => panic!("unexpected outcome {:?}", outcome),
        };

        assert!(!lease.try_acquire(&mut account, &store, now()).unwrap());
        assert_eq!(account, current);
        assert_eq!(account.internal_config.locked_for_update_until, None);
    }

    #[test]
    fn fatal_error_is_returned() {
        let store = MemoryAccountStore::new();
        let mut account = Account::new(1, 1, 1, "ical");
        let lease = UpdateLease::default();

        assert!(matches!(
            lease.try_acquire(&mut account, &store, now()),
            Err(Error::AcquireLeaseError(..))
        ));
    }

    #[test]
    fn release_lease() {
        let (store, mut account) = setup();
        let lease = UpdateLease::new(Duration::minutes(5));

        assert!(!lease.release(&mut account, &store).unwrap());
        assert!(lease.try_acquire(&mut account, &store, now()).unwrap());
        assert!(UpdateLease::is_locked(&account, now()));
        assert!(lease.release(&mut account, &store).unwrap());
        assert!(!UpdateLease::is_locked(&account, now()));
    }
}
