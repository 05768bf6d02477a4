//! Roster guests: the per-event guest list with social links.
//!
//! Guests soft-delete on key absence and restore with identity intact when a
//! roster republishes them. [`sync_roster`] wraps the generic pass in the
//! roster-flavored result the call sites expect, including the visible-guest
//! count after the pass.

use crate::collections::{merge_keyed, KeyedChild};
use crate::differ::{copy_trimmed, copy_trimmed_opt};
use crate::engine::Reconciler;
use crate::entity::Reconcilable;
use crate::error::ReconcileResult;
use crate::store::EntityStore;
use callsheet_core::{EntityId, NaturalKey, Presence, ScopeId};
use callsheet_feed::{Snapshot, SourceRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A guest as published on an event roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRecord {
    /// Published guest identifier (slug).
    pub key: String,
    /// Display name.
    pub name: String,
    /// What the guest is known for.
    pub known_for: Option<String>,
    /// Portrait URL.
    pub photo_url: Option<String>,
    /// Social links, keyed by platform.
    pub links: Vec<LinkRecord>,
    /// When the fetcher observed this record.
    pub observed_at: DateTime<Utc>,
}

impl GuestRecord {
    /// New record observed now.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            known_for: None,
            photo_url: None,
            links: Vec::new(),
            observed_at: Utc::now(),
        }
    }

    /// Sets the known-for line.
    #[must_use]
    pub fn with_known_for(mut self, known_for: impl Into<String>) -> Self {
        self.known_for = Some(known_for.into());
        self
    }

    /// Sets the portrait URL.
    #[must_use]
    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Appends a social link.
    #[must_use]
    pub fn with_link(mut self, platform: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.push(LinkRecord {
            platform: platform.into(),
            url: url.into(),
        });
        self
    }

    /// Overrides the observation timestamp.
    #[must_use]
    pub fn observed(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = at;
        self
    }
}

impl SourceRecord for GuestRecord {
    fn natural_key(&self) -> &str {
        &self.key
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// A social link on a guest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Platform name; doubles as the child key.
    pub platform: String,
    /// Profile URL.
    pub url: String,
}

/// A persisted roster guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    /// Surrogate identity.
    pub id: EntityId,
    /// Natural key; `None` for orphan rows.
    pub key: Option<NaturalKey>,
    /// Display name.
    pub name: String,
    /// What the guest is known for.
    pub known_for: Option<String>,
    /// Portrait URL.
    pub photo_url: Option<String>,
    /// Owned social links, keyed by platform.
    pub links: Vec<SocialLink>,
    /// Soft-delete state.
    pub presence: Presence,
    /// First observation, immutable after creation.
    pub first_seen_at: DateTime<Utc>,
    /// Latest pass that visited this guest.
    pub last_seen_at: DateTime<Utc>,
    /// Latest pass that actually changed something.
    pub last_changed_at: DateTime<Utc>,
}

/// A persisted social link, keyed by platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Platform key.
    pub platform: NaturalKey,
    /// Profile URL.
    pub url: String,
}

impl KeyedChild for SocialLink {
    type Record = LinkRecord;

    fn key(&self) -> &NaturalKey {
        &self.platform
    }

    fn record_key(record: &LinkRecord) -> Option<NaturalKey> {
        NaturalKey::new(&record.platform)
    }

    fn create(key: NaturalKey, record: &LinkRecord) -> Self {
        let mut link = Self {
            platform: key,
            url: String::new(),
        };
        link.apply(record);
        link
    }

    fn apply(&mut self, record: &LinkRecord) -> bool {
        copy_trimmed(&mut self.url, &record.url)
    }
}

impl Reconcilable for Guest {
    type Record = GuestRecord;

    fn natural_key(&self) -> Option<&NaturalKey> {
        self.key.as_ref()
    }

    fn create(key: NaturalKey, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(),
            key: Some(key),
            name: String::new(),
            known_for: None,
            photo_url: None,
            links: Vec::new(),
            presence: Presence::Active,
            first_seen_at: observed_at,
            last_seen_at: observed_at,
            last_changed_at: observed_at,
        }
    }

    fn apply_fields(&mut self, record: &Self::Record) -> bool {
        let mut changed = copy_trimmed(&mut self.name, &record.name);
        changed |= copy_trimmed_opt(&mut self.known_for, record.known_for.as_deref());
        changed |= copy_trimmed_opt(&mut self.photo_url, record.photo_url.as_deref());
        changed
    }

    fn sync_children(&mut self, record: &Self::Record) -> bool {
        merge_keyed(&mut self.links, &record.links)
    }

    fn record_seen(&mut self, observed_at: DateTime<Utc>) {
        if observed_at > self.last_seen_at {
            self.last_seen_at = observed_at;
        }
    }

    fn record_changed(&mut self, observed_at: DateTime<Utc>) {
        if observed_at > self.last_changed_at {
            self.last_changed_at = observed_at;
        }
    }

    fn presence(&self) -> Option<Presence> {
        Some(self.presence)
    }

    fn set_presence(&mut self, presence: Presence) {
        self.presence = presence;
    }
}

/// Terminal status of a roster sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSyncStatus {
    /// The pass ran to completion.
    Completed,
    /// The event scope does not exist; nothing ran.
    ScopeNotFound,
}

impl RosterSyncStatus {
    /// String representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::ScopeNotFound => "scope_not_found",
        }
    }
}

impl fmt::Display for RosterSyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RosterSyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "scope_not_found" => Ok(Self::ScopeNotFound),
            _ => Err(format!("Invalid roster sync status: {s}")),
        }
    }
}

/// Roster-flavored result of one guest pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSyncResult {
    /// Terminal status.
    pub status: RosterSyncStatus,
    /// Guests added to the roster.
    pub added: u32,
    /// Guests with at least one change.
    pub updated: u32,
    /// Guests soft-deleted by the pass.
    pub removed: u32,
    /// Visible guests on the roster after the pass.
    pub total_active: u32,
    /// Batch observation timestamp.
    pub synced_at: DateTime<Utc>,
}

/// Reconciles an event's guest roster and reports the roster-flavored result.
///
/// `total_active` comes from a fresh read after the pass; on a dry run that
/// is the still-uncommitted roster, so the count reflects the state on disk,
/// not the hypothetical outcome.
pub async fn sync_roster<S>(
    engine: &Reconciler<Guest>,
    store: &S,
    scope: ScopeId,
    snapshot: &Snapshot<GuestRecord>,
) -> ReconcileResult<RosterSyncResult>
where
    S: EntityStore<Guest>,
{
    let result = engine.reconcile(store, scope, snapshot).await?;

    let Some(entities) = store.load_scope(scope).await? else {
        return Ok(RosterSyncResult {
            status: RosterSyncStatus::ScopeNotFound,
            added: 0,
            updated: 0,
            removed: 0,
            total_active: 0,
            synced_at: result.observed_at,
        });
    };

    let total_active = entities
        .iter()
        .filter(|guest| guest.presence.is_active())
        .count() as u32;

    Ok(RosterSyncResult {
        status: RosterSyncStatus::Completed,
        added: result.created,
        updated: result.updated,
        removed: result.removed,
        total_active,
        synced_at: result.observed_at,
    })
}
