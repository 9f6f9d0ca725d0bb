//! Single folder provider module.
//!
//! Some providers only ever expose one calendar per account (a
//! subscribed feed, for instance). This module lets them implement a
//! folder-agnostic trait and adapts it to [`CalendarProvider`] using a
//! fixed synthetic folder id.

use log::trace;

use crate::{Account, CacheConfig, Folder, Folders, DEFAULT_CALENDAR_NAME};

use super::{CalendarProvider, Error, ExternalCalendarResult, Result, Warning};

/// The id of the only folder of a single folder account.
pub const SINGLE_FOLDER_ID: &str = "0";

pub trait SingleFolderProvider: Send + Sync {
    /// Fetches the events of the account. The events do not need to
    /// carry any folder id.
    fn fetch_events(&self, account: &Account) -> Result<ExternalCalendarResult>;

    /// Builds the folder exposed for the account. Its id is always
    /// replaced by [`SINGLE_FOLDER_ID`].
    fn folder(&self, account: &Account, default_name: &str) -> Result<Folder> {
        let name = account
            .internal_config
            .name
            .as_deref()
            .unwrap_or(default_name);
        let mut folder = Folder::new(SINGLE_FOLDER_ID, name);
        folder.color = account.internal_config.color.clone();
        Ok(folder)
    }

    fn refresh_interval(&self, _account: &Account) -> Result<i64> {
        Ok(0)
    }

    fn handle_fetch_error(&self, _account: &Account, err: &Error) -> Warning {
        Warning::from_error(SINGLE_FOLDER_ID, err)
    }

    fn supports_sync(&self, _account: &Account) -> bool {
        false
    }
}

/// Adapts a [`SingleFolderProvider`] into a [`CalendarProvider`].
#[derive(Debug, Clone)]
pub struct SingleFolder<P> {
    provider: P,
    default_name: String,
}

impl<P> SingleFolder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            default_name: DEFAULT_CALENDAR_NAME.to_owned(),
        }
    }

    /// Builds the adapter using the display name fallback of the
    /// given config, the same one the settings view uses.
    pub fn from_config(provider: P, config: &CacheConfig) -> Self {
        Self {
            provider,
            default_name: config.default_name().to_owned(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn check_folder_id(folder_id: &str) -> Result<()> {
        if folder_id == SINGLE_FOLDER_ID {
            Ok(())
        } else {
            Err(Error::FindFolderError(folder_id.to_owned()))
        }
    }
}

impl<P: SingleFolderProvider> CalendarProvider for SingleFolder<P> {
    fn list_folders(&self, account: &Account) -> Result<Folders> {
        let mut folder = self.provider.folder(account, &self.default_name)?;
        folder.id = SINGLE_FOLDER_ID.to_owned();
        Ok(Folders(vec![folder]))
    }

    fn fetch_events(&self, account: &Account, folder_id: &str) -> Result<ExternalCalendarResult> {
        Self::check_folder_id(folder_id)?;

        let result = self.provider.fetch_events(account)?;
        let warnings = result.warnings().to_vec();

        match result.into_parts() {
            (Some(events), _) => {
                trace!("stamping {} events with folder id", events.len());
                Ok(ExternalCalendarResult::updated(events.with_folder_id(SINGLE_FOLDER_ID))
                    .with_warnings(warnings))
            }
            (None, _) => Ok(ExternalCalendarResult::not_modified().with_warnings(warnings)),
        }
    }

    fn refresh_interval(&self, account: &Account, folder_id: &str) -> Result<i64> {
        Self::check_folder_id(folder_id)?;
        self.provider.refresh_interval(account)
    }

    fn handle_fetch_error(&self, account: &Account, _folder_id: &str, err: &Error) -> Warning {
        self.provider.handle_fetch_error(account, err)
    }

    fn supports_sync(&self, account: &Account) -> bool {
        self.provider.supports_sync(account)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::{CalendarSettings, Event, Events};

    use super::*;

    struct Feed;

    impl SingleFolderProvider for Feed {
        fn fetch_events(&self, _account: &Account) -> Result<ExternalCalendarResult> {
            let start = Utc.with_ymd_and_hms(2022, 12, 25, 0, 0, 0).unwrap();
            Ok(ExternalCalendarResult::updated(Events::from_iter([
                Event::new("xmas", "Christmas", start),
                Event::new("boxing", "Boxing day", start),
            ])))
        }

        fn refresh_interval(&self, _account: &Account) -> Result<i64> {
            Ok(60)
        }
    }

    #[test]
    fn list_single_folder() {
        let mut account = Account::new(1, 1, 1, "feed");
        account.internal_config.name = Some("Holidays".into());

        let folders = SingleFolder::new(Feed).list_folders(&account).unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id, SINGLE_FOLDER_ID);
        assert_eq!(folders[0].name, "Holidays");
    }

    #[test]
    fn folder_name_follows_configured_default() {
        let account = Account::new(1, 1, 1, "feed");
        let config = CacheConfig {
            default_name: Some("Agenda".into()),
            ..CacheConfig::default()
        };
        let provider = SingleFolder::from_config(Feed, &config);

        let folders = provider.list_folders(&account).unwrap();
        assert_eq!(folders[0].name, "Agenda");
        assert_eq!(
            CalendarSettings::build(&account, &provider, &config).name,
            folders[0].name
        );

        let folders = SingleFolder::new(Feed).list_folders(&account).unwrap();
        assert_eq!(folders[0].name, DEFAULT_CALENDAR_NAME);
    }

    #[test]
    fn fetch_stamps_folder_id() {
        let account = Account::new(1, 1, 1, "feed");
        let result = SingleFolder::new(Feed)
            .fetch_events(&account, SINGLE_FOLDER_ID)
            .unwrap();

        let events = result.events().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .all(|event| event.folder_id == SINGLE_FOLDER_ID));
    }

    #[test]
    fn unknown_folder_id_is_not_found() {
        let account = Account::new(1, 1, 1, "feed");
        let provider = SingleFolder::new(Feed);

        assert!(matches!(
            provider.fetch_events(&account, "1"),
            Err(Error::FindFolderError(id)) if id == "1"
        ));
        assert!(matches!(
            provider.refresh_interval(&account, "other"),
            Err(Error::FindFolderError(_))
        ));
        assert_eq!(provider.refresh_interval(&account, "0").unwrap(), 60);
    }
}
