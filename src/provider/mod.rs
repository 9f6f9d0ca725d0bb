//! Provider module.
//!
//! This module exposes the calendar provider trait, implemented by
//! every upstream calendar source, and its single folder variant.

mod error;
pub use error::{Error, Result};

pub mod provider;
pub use provider::{CalendarProvider, ExternalCalendarResult, Warning};

pub mod single_folder;
pub use single_folder::{SingleFolder, SingleFolderProvider, SINGLE_FOLDER_ID};
