//! Snapshot reconciliation for published rosters.
//!
//! Periodically fetched snapshots of externally published rosters (bundle
//! listings, convention people, roster guests) reconcile into a persisted
//! catalog: match by natural key, diff scalar fields, synchronize child
//! collections, soft-delete what vanished, report what happened.
//!
//! ```text
//!   Snapshot --> KeyIndex --> per-record reconcile --> sweep --> IngestResult
//!                                |           |           |
//!                             differ    collections   Presence
//! ```
//!
//! A [`Reconciler`] drives one entity class; the [`Reconcilable`] trait binds
//! a persisted entity to its record shape, [`EntityStore`] is the persistence
//! seam (with [`MemoryStore`] shipping for tests and embedded use), and
//! [`SuppressionPolicy`] lets a class withdraw entities whose key is still
//! published. The concrete classes live under [`domain`].

pub mod collections;
pub mod config;
pub mod differ;
pub mod domain;
pub mod engine;
pub mod entity;
pub mod error;
pub mod key_index;
pub mod outcome;
pub mod report;
pub mod scope;
pub mod store;
pub mod suppress;

pub use config::{IngestConfig, IngestMode};
pub use engine::Reconciler;
pub use entity::Reconcilable;
pub use error::{ReconcileError, ReconcileResult};
pub use key_index::KeyIndex;
pub use outcome::{IngestResult, Outcome};
pub use report::IngestReport;
pub use scope::ScopeLocks;
pub use store::{EntityStore, MemoryStore, StoreError, StoreResult};
pub use suppress::{NoSuppression, SuppressionPolicy};
