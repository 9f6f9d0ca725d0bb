pub mod event;
pub use event::{Event, Events};

pub mod folder;
pub use folder::{Folder, Folders};
