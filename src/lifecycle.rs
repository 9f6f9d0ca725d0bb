//! Account lifecycle module.
//!
//! This module wraps the provider callbacks of an account life
//! (creation, updates, reconfigurations and deletion) with the work
//! the cache needs to stay consistent: invalidating cached folders
//! when a reconfiguration asks for it, and purging cached events
//! before an account goes away.

use log::{debug, info};
use std::{error, result};
use thiserror::Error;

use crate::{provider, store, Account, ConfigDelta, EventStore, InternalConfig, UserConfig};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot reconfigure account: {0}")]
    DenyReconfigurationError(String),
    #[error("cannot purge cached events of account {1}")]
    PurgeCacheError(#[source] store::Error, String),

    #[error(transparent)]
    HookError(#[from] Box<dyn error::Error + Send + Sync>),
    #[error(transparent)]
    ProviderError(#[from] provider::Error),
}

pub type Result<T> = result::Result<T, Error>;

type AccountHook<'a> = Box<dyn Fn(&Account) -> Result<()> + Send + Sync + 'a>;

/// Represents the provider callbacks of an account life. Every
/// callback defaults to a no-op.
pub struct ProviderHooks<'a> {
    on_create: AccountHook<'a>,
    on_update: AccountHook<'a>,
    on_delete: AccountHook<'a>,
    check_reconfigure: Box<dyn Fn(&Account, &UserConfig) -> Result<()> + Send + Sync + 'a>,
    invalidates_cache: Box<dyn Fn(&Account, &UserConfig) -> bool + Send + Sync + 'a>,
    on_reconfigure: Box<
        dyn Fn(&Account, &InternalConfig, &UserConfig) -> Result<Option<InternalConfig>>
            + Send
            + Sync
            + 'a,
    >,
}

impl Default for ProviderHooks<'_> {
    fn default() -> Self {
        Self {
            on_create: Box::new(|_| Ok(())),
            on_update: Box::new(|_| Ok(())),
            on_delete: Box::new(|_| Ok(())),
            check_reconfigure: Box::new(|_, _| Ok(())),
            invalidates_cache: Box::new(|_, _| false),
            on_reconfigure: Box::new(|_, _, _| Ok(None)),
        }
    }
}

impl<'a> ProviderHooks<'a> {
    pub fn on_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&Account) -> Result<()> + Send + Sync + 'a,
    {
        self.on_create = Box::new(f);
        self
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Account) -> Result<()> + Send + Sync + 'a,
    {
        self.on_update = Box::new(f);
        self
    }

    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&Account) -> Result<()> + Send + Sync + 'a,
    {
        self.on_delete = Box::new(f);
        self
    }

    /// Sets the check rejecting disallowed user config changes.
    pub fn check_reconfigure<F>(mut self, f: F) -> Self
    where
        F: Fn(&Account, &UserConfig) -> Result<()> + Send + Sync + 'a,
    {
        self.check_reconfigure = Box::new(f);
        self
    }

    /// Sets the predicate telling whether a reconfiguration makes all
    /// cached folders stale.
    pub fn invalidates_cache<F>(mut self, f: F) -> Self
    where
        F: Fn(&Account, &UserConfig) -> bool + Send + Sync + 'a,
    {
        self.invalidates_cache = Box::new(f);
        self
    }

    /// Sets the provider reconfiguration step. It receives the
    /// internal config adjusted by the cache and may return another
    /// one to persist instead.
    pub fn on_reconfigure<F>(mut self, f: F) -> Self
    where
        F: Fn(&Account, &InternalConfig, &UserConfig) -> Result<Option<InternalConfig>>
            + Send
            + Sync
            + 'a,
    {
        self.on_reconfigure = Box::new(f);
        self
    }
}

pub struct AccountLifecycle<'a> {
    hooks: ProviderHooks<'a>,
    events: &'a dyn EventStore,
}

impl<'a> AccountLifecycle<'a> {
    pub fn new(hooks: ProviderHooks<'a>, events: &'a dyn EventStore) -> Self {
        Self { hooks, events }
    }

    pub fn create(&self, account: &Account) -> Result<()> {
        info!("creating account {}", account);
        (self.hooks.on_create)(account)
    }

    pub fn update(&self, account: &Account) -> Result<()> {
        info!("updating account {}", account);
        (self.hooks.on_update)(account)
    }

    /// Reconfigures the account with the given user config and
    /// returns the internal config to persist.
    pub fn reconfigure(
        &self,
        account: &Account,
        user_config: &UserConfig,
    ) -> Result<InternalConfig> {
        info!("reconfiguring account {}", account);

        (self.hooks.check_reconfigure)(account, user_config)?;

        let mut config = account.internal_config.clone();

        if (self.hooks.invalidates_cache)(account, user_config) {
            debug!("invalidating cached folders of account {}", account);
            let mut delta = ConfigDelta::default();
            delta.invalidate_all();
            config = delta.apply(&config);
        }

        match (self.hooks.on_reconfigure)(account, &config, user_config)? {
            Some(config) => {
                debug!("provider overrode internal config of account {}", account);
                Ok(config)
            }
            None => Ok(config),
        }
    }

    /// Deletes the account. Its cached events are purged first: when
    /// the purge fails the provider is not notified.
    pub fn delete(&self, account: &Account) -> Result<()> {
        info!("deleting account {}", account);

        self.events
            .purge_all(account)
            .map_err(|err| Error::PurgeCacheError(err, account.to_string()))?;
        debug!("cached events of account {} purged", account);

        (self.hooks.on_delete)(account)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};
    use std::sync::Mutex;

    use crate::{store, Events};

    use super::*;

    #[derive(Default)]
    struct Store {
        fail: bool,
        purged: Mutex<Vec<i32>>,
    }

    impl EventStore for Store {
        fn list_events(&self, _: &Account, _: &str) -> store::Result<Events> {
            Ok(Events::default())
        }

        fn insert_events(&self, _: &Account, _: &str, _: &Events) -> store::Result<()> {
            Ok(())
        }

        fn replace_events(&self, _: &Account, _: &str, _: &Events) -> store::Result<()> {
            Ok(())
        }

        fn purge_folder(&self, _: &Account, _: &str) -> store::Result<()> {
            Ok(())
        }

        fn purge_all(&self, account: &Account) -> store::Result<()> {
            if self.fail {
                return Err(store::Error::Other("disk full".into()));
            }
            self.purged.lock().unwrap().push(account.id);
            Ok(())
        }
    }

    fn account() -> Account {
        let mut account = Account::new(1, 1, 1, "ical");
        account.internal_config.caching.entry("a".into()).or_default().last_update = Some(1000);
        account.internal_config.caching.entry("b".into()).or_default().last_update = Some(2000);
        account
    }

    fn user_config(url: &str) -> UserConfig {
        let mut config = Map::new();
        config.insert("url".into(), json!(url));
        config
    }

    #[test]
    fn reconfigure_without_invalidation() {
        let store = Store::default();
        let lifecycle = AccountLifecycle::new(ProviderHooks::default(), &store);
        let account = account();

        let config = lifecycle.reconfigure(&account, &user_config("x")).unwrap();
        assert_eq!(config, account.internal_config);
    }

    #[test]
    fn reconfigure_with_invalidation() {
        let store = Store::default();
        let hooks = ProviderHooks::default().invalidates_cache(|account, user_config| {
            account.user_config.get("url") != user_config.get("url")
        });
        let lifecycle = AccountLifecycle::new(hooks, &store);
        let mut account = account();
        account.user_config = user_config("old");

        let config = lifecycle.reconfigure(&account, &user_config("new")).unwrap();
        assert_eq!(config.caching["a"].last_update, Some(0));
        assert_eq!(config.caching["b"].last_update, Some(0));

        let config = lifecycle.reconfigure(&account, &user_config("old")).unwrap();
        assert_eq!(config.caching["a"].last_update, Some(1000));
    }

    #[test]
    fn provider_override_wins() {
        let store = Store::default();
        let hooks = ProviderHooks::default()
            .invalidates_cache(|_, _| true)
            .on_reconfigure(|_, config, _| {
                assert_eq!(config.caching["a"].last_update, Some(0));
                let mut config = config.clone();
                config.name = Some("renamed".into());
                Ok(Some(config))
            });
        let lifecycle = AccountLifecycle::new(hooks, &store);

        let config = lifecycle.reconfigure(&account(), &user_config("x")).unwrap();
        assert_eq!(config.name.as_deref(), Some("renamed"));
        assert_eq!(config.caching["b"].last_update, Some(0));
    }

    #[test]
    fn denied_reconfiguration() {
        let store = Store::default();
        let hooks = ProviderHooks::default()
            .check_reconfigure(|_, _| {
                Err(Error::DenyReconfigurationError("url is read-only".into()))
            })
            .on_reconfigure(|_, _, _| panic!("should not reconfigure"));
        let lifecycle = AccountLifecycle::new(hooks, &store);

        assert!(matches!(
            lifecycle.reconfigure(&account(), &user_config("x")),
            Err(Error::DenyReconfigurationError(_))
        ));
    }

    #[test]
    fn delete_purges_before_provider_hook() {
        let store = Store::default();
        let hooks = ProviderHooks::default().on_delete(|account| {
            assert_eq!(*store.purged.lock().unwrap(), vec![account.id]);
            Ok(())
        });
        let lifecycle = AccountLifecycle::new(hooks, &store);

        lifecycle.delete(&account()).unwrap();
    }

    #[test]
    fn failed_purge_skips_provider_hook() {
        let store = Store {
            fail: true,
            ..Store::default()
        };
        let deleted = Mutex::new(false);
        let hooks = ProviderHooks::default().on_delete(|_| {
            *deleted.lock().unwrap() = true;
            Ok(())
        });
        let lifecycle = AccountLifecycle::new(hooks, &store);

        assert!(matches!(
            lifecycle.delete(&account()),
            Err(Error::PurgeCacheError(..))
        ));
        assert!(!*deleted.lock().unwrap());
    }
}
