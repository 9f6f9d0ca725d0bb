//! Sqlite event store module.
//!
//! This module contains the event store backed by a sqlite database.
//! A connection is opened for each operation, so the store can be
//! shared between threads.

use chrono::{DateTime, Utc};
use log::{debug, trace};
use rusqlite::{params, Connection, Row};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Account, CacheConfig, Event, Events};

use super::{Error, EventStore, Result};

const CREATE_EVENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS events (
        context_id    INTEGER  NOT NULL,
        account_id    INTEGER  NOT NULL,
        folder        TEXT     NOT NULL,
        id            TEXT     NOT NULL,
        summary       TEXT     NOT NULL,
        description   TEXT,
        location      TEXT,
        start_at      DATETIME NOT NULL,
        end_at        DATETIME,
        last_modified DATETIME,
        UNIQUE(context_id, account_id, folder, id)
    )
";

const INSERT_EVENT: &str = "
    INSERT OR REPLACE INTO events
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const DELETE_FOLDER_EVENTS: &str = "
    DELETE FROM events
    WHERE context_id = ?
    AND account_id = ?
    AND folder = ?
";

const DELETE_ACCOUNT_EVENTS: &str = "
    DELETE FROM events
    WHERE context_id = ?
    AND account_id = ?
";

const SELECT_EVENTS: &str = "
    SELECT id, folder, summary, description, location, start_at, end_at, last_modified
    FROM events
    WHERE context_id = ?
    AND account_id = ?
    AND folder = ?
    ORDER BY start_at ASC
";

#[derive(Debug, Clone)]
pub struct SqliteEventStore {
    db_path: PathBuf,
}

impl SqliteEventStore {
    pub fn new<P>(db_path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let db_path = db_path.as_ref().to_owned();

        if let Some(dir) = db_path.parent() {
            fs::create_dir_all(dir).map_err(|err| Error::CreateDirError(err, dir.to_owned()))?;
        }

        let store = Self { db_path };
        store.db()?;
        Ok(store)
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.database_path())
    }

    fn db(&self) -> Result<Connection> {
        let db = Connection::open(&self.db_path)?;
        db.execute(CREATE_EVENTS_TABLE, [])?;
        Ok(db)
    }

    fn insert_all(
        db: &Connection,
        account: &Account,
        folder_id: &str,
        events: &Events,
    ) -> Result<()> {
        let mut stmt = db.prepare(INSERT_EVENT)?;
        for event in events.iter() {
            stmt.execute(params![
                account.context_id,
                account.id,
                folder_id,
                event.id,
                event.summary,
                event.description,
                event.location,
                event.start.to_rfc3339(),
                event.end.map(|date| date.to_rfc3339()),
                event.last_modified.map(|date| date.to_rfc3339()),
            ])?;
        }
        Ok(())
    }
}

impl EventStore for SqliteEventStore {
    fn list_events(&self, account: &Account, folder_id: &str) -> Result<Events> {
        let db = self.db()?;
        let mut stmt = db.prepare(SELECT_EVENTS)?;
        let rows = stmt
            .query_map(params![account.context_id, account.id, folder_id], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let events = rows
            .into_iter()
            .map(EventRow::into_event)
            .collect::<Result<Events>>()?;

        trace!("{} cached events in folder {}", events.len(), folder_id);
        Ok(events)
    }

    fn insert_events(&self, account: &Account, folder_id: &str, events: &Events) -> Result<()> {
        let mut db = self.db()?;
        let tx = db.transaction()?;
        Self::insert_all(&tx, account, folder_id, events)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_events(&self, account: &Account, folder_id: &str, events: &Events) -> Result<()> {
        let mut db = self.db()?;
        let tx = db.transaction()?;
        tx.execute(
            DELETE_FOLDER_EVENTS,
            params![account.context_id, account.id, folder_id],
        )?;
        Self::insert_all(&tx, account, folder_id, events)?;
        tx.commit()?;
        debug!("replaced events of folder {} by {}", folder_id, events.len());
        Ok(())
    }

    fn purge_folder(&self, account: &Account, folder_id: &str) -> Result<()> {
        self.db()?.execute(
            DELETE_FOLDER_EVENTS,
            params![account.context_id, account.id, folder_id],
        )?;
        Ok(())
    }

    fn purge_all(&self, account: &Account) -> Result<()> {
        let mut db = self.db()?;
        let tx = db.transaction()?;
        let count = tx.execute(DELETE_ACCOUNT_EVENTS, params![account.context_id, account.id])?;
        tx.commit()?;
        debug!("purged {} cached events of account {}", count, account);
        Ok(())
    }
}

struct EventRow {
    id: String,
    folder_id: String,
    summary: String,
    description: Option<String>,
    location: Option<String>,
    start: String,
    end: Option<String>,
    last_modified: Option<String>,
}

fn read_row(row: &Row) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        folder_id: row.get(1)?,
        summary: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        start: row.get(5)?,
        end: row.get(6)?,
        last_modified: row.get(7)?,
    })
}

impl EventRow {
    fn into_event(self) -> Result<Event> {
        Ok(Event {
            id: self.id,
            folder_id: self.folder_id,
            summary: self.summary,
            description: self.description,
            location: self.location,
            start: parse_date(&self.start)?,
            end: self.end.as_deref().map(parse_date).transpose()?,
            last_modified: self.last_modified.as_deref().map(parse_date).transpose()?,
        })
    }
}

fn parse_date(date: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|err| Error::ParseDateError(err, date.to_owned()))
}
