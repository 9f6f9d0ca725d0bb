//! Event module.
//!
//! This module contains everything related to calendar events.

pub mod event;
pub use event::*;

pub mod events;
pub use events::*;
