use std::{error, result};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find folder {0}")]
    FindFolderError(String),
    #[error("cannot list folders: {0}")]
    ListFoldersError(String),
    #[error("cannot fetch events of folder {0}: {1}")]
    FetchEventsError(String, String),
    #[error("cannot get refresh interval of folder {0}")]
    GetRefreshIntervalError(String),

    #[error(transparent)]
    Other(#[from] Box<dyn error::Error + Send + Sync>),
}

impl Error {
    /// Gets a short machine-readable code, used when the error gets
    /// persisted or reported as a warning.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FindFolderError(_) => "FOLDER_NOT_FOUND",
            Self::ListFoldersError(_) => "LIST_FOLDERS",
            Self::FetchEventsError(..) => "FETCH_EVENTS",
            Self::GetRefreshIntervalError(_) => "REFRESH_INTERVAL",
            Self::Other(_) => "PROVIDER",
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
