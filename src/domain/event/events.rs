use serde::{Deserialize, Serialize};
use std::ops;

use super::Event;

/// Represents the list of events.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Events(pub Vec<Event>);

impl Events {
    /// Sets the folder of every event.
    pub fn with_folder_id(self, folder_id: &str) -> Self {
        self.into_iter()
            .map(|event| event.with_folder_id(folder_id))
            .collect()
    }
}

impl ops::Deref for Events {
    type Target = Vec<Event>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Events {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for Events {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Event> for Events {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
