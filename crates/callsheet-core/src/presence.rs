//! Presence state for soft-deletable entities.
//!
//! Entity classes that are never hard-deleted carry a single tagged state
//! instead of a visibility flag plus a nullable timestamp. The flat column
//! pair only exists at the storage boundary, via [`Presence::to_columns`] and
//! [`Presence::from_columns`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an entity is currently visible in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Presence {
    /// The entity is visible.
    Active,
    /// The entity was withdrawn or vanished from its source.
    Removed {
        /// Observation timestamp of the pass that removed it.
        at: DateTime<Utc>,
    },
}

impl Presence {
    /// Whether the entity is visible.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The removal timestamp, if removed.
    #[must_use]
    pub fn removed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Removed { at } => Some(*at),
        }
    }

    /// Marks the entity removed at `at`. Returns whether the state actually
    /// transitioned; an already-removed entity keeps its original timestamp.
    pub fn remove(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_active() {
            *self = Self::Removed { at };
            true
        } else {
            false
        }
    }

    /// Restores the entity to visibility. Returns whether the state actually
    /// transitioned.
    pub fn restore(&mut self) -> bool {
        if self.is_active() {
            false
        } else {
            *self = Self::Active;
            true
        }
    }

    /// Rebuilds the state from flat storage columns. Invisible rows without a
    /// removal timestamp (legacy data) sort before any real observation.
    #[must_use]
    pub fn from_columns(is_visible: bool, removed_at: Option<DateTime<Utc>>) -> Self {
        match (is_visible, removed_at) {
            (true, _) => Self::Active,
            (false, Some(at)) => Self::Removed { at },
            (false, None) => Self::Removed {
                at: DateTime::<Utc>::MIN_UTC,
            },
        }
    }

    /// Projects the state to flat `(is_visible, removed_at)` columns.
    #[must_use]
    pub fn to_columns(&self) -> (bool, Option<DateTime<Utc>>) {
        (self.is_active(), self.removed_at())
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::Active
    }
}
