//! Folder module.
//!
//! This module contains everything related to calendar folders.

pub mod folder;
pub use folder::*;

pub mod folders;
pub use folders::*;
