//! Settings module.
//!
//! This module derives the outward settings of a calendar account
//! from its internal config. Nothing here writes anything back.

use log::warn;
use serde::Serialize;
use std::fmt;

use crate::{Account, CacheConfig, CalendarProvider, FolderCacheSnapshot, StoredError};

/// Represents the sync state exposed to clients.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsedForSync {
    Activated,
    Deactivated,
}

impl UsedForSync {
    pub fn is_activated(&self) -> bool {
        matches!(self, Self::Activated)
    }
}

impl From<bool> for UsedForSync {
    fn from(activated: bool) -> Self {
        if activated {
            Self::Activated
        } else {
            Self::Deactivated
        }
    }
}

impl fmt::Display for UsedForSync {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Activated => write!(f, "activated"),
            Self::Deactivated => write!(f, "deactivated"),
        }
    }
}

/// Represents the time transparency of the events of a calendar.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    #[default]
    Opaque,
    Transparent,
}

impl Transparency {
    const KEY: &'static str = "transp";

    fn parse(transp: &str) -> Option<Self> {
        match transp.to_lowercase().as_str() {
            "opaque" => Some(Self::Opaque),
            "transparent" => Some(Self::Transparent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedProperties {
    pub transparency: Transparency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Represents the most recent fetch among all folders, in epoch
    /// millis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cache_update: Option<i64>,
    pub used_for_sync: UsedForSync,
}

/// Represents the settings of a calendar account, as seen by clients.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    pub name: String,
    pub subscribed: bool,
    pub used_for_sync: UsedForSync,
    pub last_modified: i64,
    pub extended: ExtendedProperties,
    /// Represents the last fetch error recorded for the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StoredError>,
}

impl CalendarSettings {
    pub fn build(account: &Account, provider: &dyn CalendarProvider, config: &CacheConfig) -> Self {
        let internal = &account.internal_config;

        let used_for_sync = UsedForSync::from(
            internal.used_for_sync.unwrap_or(true) && provider.supports_sync(account),
        );

        let transparency = internal
            .extra
            .get(Transparency::KEY)
            .and_then(|transp| transp.as_str())
            .and_then(Transparency::parse)
            .unwrap_or_default();

        let error = internal
            .last_error
            .as_ref()
            .and_then(|value| match StoredError::from_value(value) {
                Ok(err) => Some(err),
                Err(err) => {
                    warn!("cannot parse last error of account {}, ignoring it: {}", account, err);
                    None
                }
            });

        Self {
            name: internal
                .name
                .clone()
                .unwrap_or_else(|| config.default_name().to_owned()),
            subscribed: internal.subscribed.unwrap_or(true),
            used_for_sync,
            last_modified: account.last_modified,
            extended: ExtendedProperties {
                transparency,
                description: internal.description.clone(),
                color: internal.color.clone(),
                last_cache_update: FolderCacheSnapshot::from(internal).last_cache_update(),
                used_for_sync,
            },
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{provider, Events, ExternalCalendarResult, Folders, InternalConfig};

    use super::*;

    struct Provider {
        sync: bool,
    }

    impl CalendarProvider for Provider {
        fn list_folders(&self, _account: &Account) -> provider::Result<Folders> {
            Ok(Folders::default())
        }

        fn fetch_events(&self, _: &Account, _: &str) -> provider::Result<ExternalCalendarResult> {
            Ok(ExternalCalendarResult::updated(Events::default()))
        }

        fn supports_sync(&self, _account: &Account) -> bool {
            self.sync
        }
    }

    #[test]
    fn defaults() {
        let account = Account::new(1, 1, 1, "ical");
        let settings = CalendarSettings::build(
            &account,
            &Provider { sync: false },
            &CacheConfig::default(),
        );

        assert_eq!(settings.name, "Calendar");
        assert!(settings.subscribed);
        assert_eq!(settings.used_for_sync, UsedForSync::Deactivated);
        assert_eq!(settings.extended.transparency, Transparency::Opaque);
        assert_eq!(settings.extended.last_cache_update, None);
        assert_eq!(settings.error, None);
    }

    #[test]
    fn used_for_sync_needs_provider_support() {
        let mut account = Account::new(1, 1, 1, "ical");
        let config = CacheConfig::default();

        account.internal_config.used_for_sync = Some(true);
        let settings = CalendarSettings::build(&account, &Provider { sync: false }, &config);
        assert_eq!(settings.used_for_sync, UsedForSync::Deactivated);

        let settings = CalendarSettings::build(&account, &Provider { sync: true }, &config);
        assert_eq!(settings.used_for_sync, UsedForSync::Activated);
        assert_eq!(settings.extended.used_for_sync, UsedForSync::Activated);

        account.internal_config.used_for_sync = Some(false);
        let settings = CalendarSettings::build(&account, &Provider { sync: true }, &config);
        assert_eq!(settings.used_for_sync, UsedForSync::Deactivated);
    }

    #[test]
    fn stored_values() {
        let mut account = Account::new(1, 1, 1, "ical");
        account.last_modified = 42;
        account.internal_config = InternalConfig::from_value(json!({
            "caching": {
                "a": { "lastUpdate": 1000 },
                "b": { "lastUpdate": 3000 },
                "c": {}
            },
            "name": "Holidays",
            "subscribed": false,
            "color": "#ff0000",
            "description": "Public holidays",
            "transp": "TRANSPARENT",
            "lastError": {
                "code": "FETCH_EVENTS",
                "message": "unreachable",
                "folderId": "a",
                "timestamp": 2000
            }
        }))
        .unwrap();

        let settings = CalendarSettings::build(
            &account,
            &Provider { sync: true },
            &CacheConfig::default(),
        );

        assert_eq!(settings.name, "Holidays");
        assert!(!settings.subscribed);
        assert_eq!(settings.last_modified, 42);
        assert_eq!(settings.extended.transparency, Transparency::Transparent);
        assert_eq!(settings.extended.color.as_deref(), Some("#ff0000"));
        assert_eq!(settings.extended.description.as_deref(), Some("Public holidays"));
        assert_eq!(settings.extended.last_cache_update, Some(3000));
        assert_eq!(
            settings.error,
            Some(StoredError::new("FETCH_EVENTS", "unreachable", 2000).folder_id("a"))
        );
    }

    #[test]
    fn malformed_last_error_is_ignored() {
        let mut account = Account::new(1, 1, 1, "ical");
        account.internal_config.last_error = Some(json!("boom"));

        let settings = CalendarSettings::build(
            &account,
            &Provider { sync: false },
            &CacheConfig::default(),
        );

        assert_eq!(settings.error, None);
    }
}
