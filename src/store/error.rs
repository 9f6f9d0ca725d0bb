use std::{error, io, path::PathBuf, result};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot create event store directory {1}")]
    CreateDirError(#[source] io::Error, PathBuf),
    #[error("cannot parse event date {1}")]
    ParseDateError(#[source] chrono::ParseError, String),

    #[cfg(feature = "sqlite-store")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),
    #[error(transparent)]
    Other(#[from] Box<dyn error::Error + Send + Sync>),
}

pub type Result<T> = result::Result<T, Error>;
