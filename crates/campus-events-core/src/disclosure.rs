//! Expand/collapse state of event descriptions.
//!
//! At most one event description is open at a time. Opening another event
//! closes the previous one; toggling the open event closes it.

use serde::{Deserialize, Serialize};

/// Which event description is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum Disclosure {
    #[default]
    Closed,
    Open(String),
}

impl Disclosure {
    /// Toggles the event with the given id.
    pub fn toggle(&mut self, id: &str) {
        *self = match self {
            Self::Open(current) if current == id => Self::Closed,
            _ => Self::Open(id.to_string()),
        };
    }

    /// Closes any open description.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    /// Returns true if the event with the given id is expanded.
    pub fn is_open(&self, id: &str) -> bool {
        matches!(self, Self::Open(current) if current == id)
    }

    /// Returns the id of the expanded event.
    pub fn open_id(&self) -> Option<&str> {
        match self {
            Self::Open(id) => Some(id),
            Self::Closed => None,
        }
    }
}
