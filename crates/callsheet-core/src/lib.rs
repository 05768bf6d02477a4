//! Core types shared across the callsheet workspace.
//!
//! This crate holds the value types every other crate agrees on:
//!
//! - [`EntityId`] / [`ScopeId`] - typed surrogate identifiers
//! - [`NaturalKey`] - normalized, case-insensitive published keys
//! - [`Presence`] - the soft-delete state machine
//!
//! # Example
//!
//! ```
//! use callsheet_core::{NaturalKey, Presence};
//! use chrono::Utc;
//!
//! let key = NaturalKey::new("  Ada-Lovelace ").unwrap();
//! assert_eq!(key.as_str(), "ada-lovelace");
//!
//! let mut presence = Presence::Active;
//! assert!(presence.remove(Utc::now()));
//! assert!(!presence.is_active());
//! ```

pub mod ids;
pub mod key;
pub mod presence;

pub use ids::{EntityId, ScopeId};
pub use key::NaturalKey;
pub use presence::Presence;
