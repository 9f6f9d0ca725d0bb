use std::result;
use thiserror::Error;

use crate::{account, provider, store};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find folder {0}")]
    FindFolderError(String),
    #[error("cannot acquire update lease of account {1}")]
    AcquireLeaseError(#[source] account::Error, String),
    #[error("cannot list folders of account {1}")]
    ListFoldersError(#[source] provider::Error, String),

    #[error(transparent)]
    AccountError(#[from] account::Error),
    #[error(transparent)]
    ProviderError(#[from] provider::Error),
    #[error(transparent)]
    StoreError(#[from] store::Error),
}

pub type Result<T> = result::Result<T, Error>;
