//! Sync module.
//!
//! This module contains the refresh orchestration: the staleness
//! tracker deciding what each cached folder needs, the
//! reconciliation with the folders visible upstream, the account
//! update lease serializing refreshes, and the executor applying the
//! resulting execution list.

mod error;
pub use error::{Error, Result};

pub mod execution;
pub use execution::{ExecutionList, FolderEntry, Instruction};

pub mod staleness;
pub use staleness::{LeaseCheck, LeaseGate};

pub mod reconcile;
pub use reconcile::build_execution_list;

pub mod lease;
pub use lease::UpdateLease;

pub mod executor;
pub use executor::{ExecutionReport, RefreshExecutor, StoreRefreshExecutor};

pub mod access;
pub use access::{CachingCalendarAccess, EventsResponse};
