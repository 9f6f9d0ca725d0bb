use std::result;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find account {0}")]
    FindAccountError(i32),
    #[error("cannot update account {0}: {1}")]
    UpdateAccountError(i32, String),
    #[error("cannot lock account store")]
    LockStoreError,
    #[error("cannot parse account config")]
    ParseConfigError(#[source] serde_json::Error),
}

pub type Result<T> = result::Result<T, Error>;
