//! Convention people: featured guests with schedules, categories, and
//! appearance days.
//!
//! People are scoped per event and soft-delete. Categories are many-to-many
//! links held as category keys on the person; the category master entities
//! reconcile separately through the same engine (see [`category_snapshot`]).
//! A person whose published categories include the sentinel cancelled marker
//! is withdrawn from display while the key survives;
//! [`CancelledCategoryPolicy`] implements that through the engine's
//! suppression seam.

use crate::collections::{merge_keyed, merge_unkeyed, sync_links, KeyedChild, UnkeyedChild};
use crate::differ::{copy_if_changed, copy_trimmed, copy_trimmed_opt};
use crate::entity::Reconcilable;
use crate::suppress::SuppressionPolicy;
use callsheet_core::{EntityId, NaturalKey, Presence};
use callsheet_feed::{Snapshot, SourceRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default sentinel category marking a withdrawn person.
pub const CANCELLED_MARKER: &str = "cancelled";

/// A person as published on an event's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Published person identifier (machine name).
    pub key: String,
    /// Display name.
    pub name: String,
    /// Short biography.
    pub bio: Option<String>,
    /// Portrait URL.
    pub photo_url: Option<String>,
    /// Category names as published; matching is case-insensitive.
    pub categories: Vec<String>,
    /// Scheduled sessions, keyed by published slot identifier.
    pub schedules: Vec<ScheduleRecord>,
    /// Appearance days; the source publishes no stable key for these.
    pub appearances: Vec<AppearanceRecord>,
    /// When the fetcher observed this record.
    pub observed_at: DateTime<Utc>,
}

impl PersonRecord {
    /// New record observed now.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            bio: None,
            photo_url: None,
            categories: Vec::new(),
            schedules: Vec::new(),
            appearances: Vec::new(),
            observed_at: Utc::now(),
        }
    }

    /// Sets the biography.
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Sets the portrait URL.
    #[must_use]
    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Appends a published category name.
    #[must_use]
    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.categories.push(name.into());
        self
    }

    /// Appends a scheduled session.
    #[must_use]
    pub fn with_schedule(mut self, schedule: ScheduleRecord) -> Self {
        self.schedules.push(schedule);
        self
    }

    /// Appends an appearance day.
    #[must_use]
    pub fn with_appearance(mut self, day: NaiveDate) -> Self {
        self.appearances.push(AppearanceRecord { day, note: None });
        self
    }

    /// Overrides the observation timestamp.
    #[must_use]
    pub fn observed(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = at;
        self
    }
}

impl SourceRecord for PersonRecord {
    fn natural_key(&self) -> &str {
        &self.key
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// A scheduled session on a person record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// Published slot identifier.
    pub slot: String,
    /// Session title.
    pub title: String,
    /// Session start.
    pub starts_at: DateTime<Utc>,
    /// Session end, when published.
    pub ends_at: Option<DateTime<Utc>>,
    /// Venue or hall name.
    pub venue: Option<String>,
}

impl ScheduleRecord {
    /// New session record.
    #[must_use]
    pub fn new(slot: impl Into<String>, title: impl Into<String>, starts_at: DateTime<Utc>) -> Self {
        Self {
            slot: slot.into(),
            title: title.into(),
            starts_at,
            ends_at: None,
            venue: None,
        }
    }

    /// Sets the venue name.
    #[must_use]
    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Sets the session end.
    #[must_use]
    pub fn with_end(mut self, ends_at: DateTime<Utc>) -> Self {
        self.ends_at = Some(ends_at);
        self
    }
}

/// An appearance day on a person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceRecord {
    /// Calendar day of the appearance.
    pub day: NaiveDate,
    /// Optional note ("afternoon only").
    pub note: Option<String>,
}

/// A persisted convention person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Surrogate identity.
    pub id: EntityId,
    /// Natural key; `None` for orphan rows.
    pub key: Option<NaturalKey>,
    /// Display name.
    pub name: String,
    /// Short biography.
    pub bio: Option<String>,
    /// Portrait URL.
    pub photo_url: Option<String>,
    /// Linked category keys, kept sorted and deduplicated.
    pub categories: Vec<NaturalKey>,
    /// Owned schedule entries, keyed by slot.
    pub schedules: Vec<ScheduleEntry>,
    /// Owned appearance days.
    pub appearances: Vec<Appearance>,
    /// Soft-delete state.
    pub presence: Presence,
    /// First observation, immutable after creation.
    pub first_seen_at: DateTime<Utc>,
    /// Latest pass that visited this person.
    pub last_seen_at: DateTime<Utc>,
    /// Latest pass that actually changed something.
    pub last_changed_at: DateTime<Utc>,
}

/// A persisted schedule entry owned by a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Slot key.
    pub slot: NaturalKey,
    /// Session title.
    pub title: String,
    /// Session start.
    pub starts_at: DateTime<Utc>,
    /// Session end, when published.
    pub ends_at: Option<DateTime<Utc>>,
    /// Venue or hall name.
    pub venue: Option<String>,
}

impl KeyedChild for ScheduleEntry {
    type Record = ScheduleRecord;

    fn key(&self) -> &NaturalKey {
        &self.slot
    }

    fn record_key(record: &ScheduleRecord) -> Option<NaturalKey> {
        NaturalKey::new(&record.slot)
    }

    fn create(key: NaturalKey, record: &ScheduleRecord) -> Self {
        let mut entry = Self {
            slot: key,
            title: String::new(),
            starts_at: record.starts_at,
            ends_at: None,
            venue: None,
        };
        entry.apply(record);
        entry
    }

    fn apply(&mut self, record: &ScheduleRecord) -> bool {
        let mut changed = copy_trimmed(&mut self.title, &record.title);
        changed |= copy_if_changed(&mut self.starts_at, &record.starts_at);
        changed |= copy_if_changed(&mut self.ends_at, &record.ends_at);
        changed |= copy_trimmed_opt(&mut self.venue, record.venue.as_deref());
        changed
    }
}

/// A persisted appearance day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Calendar day of the appearance.
    pub day: NaiveDate,
    /// Optional note.
    pub note: Option<String>,
}

impl UnkeyedChild for Appearance {
    type Record = AppearanceRecord;

    fn matches(&self, record: &AppearanceRecord) -> bool {
        self.day == record.day && self.note.as_deref() == record.note.as_deref()
    }

    fn create(record: &AppearanceRecord) -> Self {
        Self {
            day: record.day,
            note: record.note.clone(),
        }
    }
}

impl Reconcilable for Person {
    type Record = PersonRecord;

    fn natural_key(&self) -> Option<&NaturalKey> {
        self.key.as_ref()
    }

    fn create(key: NaturalKey, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(),
            key: Some(key),
            name: String::new(),
            bio: None,
            photo_url: None,
            categories: Vec::new(),
            schedules: Vec::new(),
            appearances: Vec::new(),
            presence: Presence::Active,
            first_seen_at: observed_at,
            last_seen_at: observed_at,
            last_changed_at: observed_at,
        }
    }

    fn apply_fields(&mut self, record: &Self::Record) -> bool {
        let mut changed = copy_trimmed(&mut self.name, &record.name);
        changed |= copy_trimmed_opt(&mut self.bio, record.bio.as_deref());
        changed |= copy_trimmed_opt(&mut self.photo_url, record.photo_url.as_deref());
        changed
    }

    fn sync_children(&mut self, record: &Self::Record) -> bool {
        let mut changed = merge_keyed(&mut self.schedules, &record.schedules);
        changed |= sync_links(&mut self.categories, &link_keys(&record.categories));
        changed |= merge_unkeyed(&mut self.appearances, &record.appearances);
        changed
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

/// Normalizes published category names into link keys, dropping blanks.
fn link_keys(names: &[String]) -> Vec<NaturalKey> {
    names.iter().filter_map(|name| NaturalKey::new(name)).collect()
}

/// Suppression policy: a person whose categories carry the sentinel marker is
/// withdrawn while the key stays published.
#[derive(Debug, Clone)]
pub struct CancelledCategoryPolicy {
    marker: String,
}

impl CancelledCategoryPolicy {
    /// Policy with the default [`CANCELLED_MARKER`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            marker: CANCELLED_MARKER.to_owned(),
        }
    }

    /// Policy with a source-specific marker name.
    #[must_use]
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for CancelledCategoryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl SuppressionPolicy<PersonRecord> for CancelledCategoryPolicy {
    fn is_suppressed(&self, record: &PersonRecord) -> bool {
        record
            .categories
            .iter()
            .any(|category| category.trim().eq_ignore_ascii_case(&self.marker))
    }
}

/// A category master record derived from person records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Published category name; doubles as the natural key.
    pub name: String,
    /// When the deriving person record was observed.
    pub observed_at: DateTime<Utc>,
}

impl SourceRecord for CategoryRecord {
    fn natural_key(&self) -> &str {
        &self.name
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// A persisted category master entity.
///
/// Masters are looked up and created by their own key, independently of the
/// link sets that reference them. They carry no presence state: an unused
/// category simply stops being linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Surrogate identity, the target of stored link rows.
    pub id: EntityId,
    /// Natural key; `None` for orphan rows.
    pub key: Option<NaturalKey>,
    /// Display name as most recently published.
    pub name: String,
    /// First observation, immutable after creation.
    pub first_seen_at: DateTime<Utc>,
    /// Latest pass that visited this category.
    pub last_seen_at: DateTime<Utc>,
    /// Latest pass that actually changed something.
    pub last_changed_at: DateTime<Utc>,
}

impl Reconcilable for Category {
    type Record = CategoryRecord;

    fn natural_key(&self) -> Option<&NaturalKey> {
        self.key.as_ref()
    }

    fn create(key: NaturalKey, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(),
            key: Some(key),
            name: String::new(),
            first_seen_at: observed_at,
            last_seen_at: observed_at,
            last_changed_at: observed_at,
        }
    }

    fn apply_fields(&mut self, record: &Self::Record) -> bool {
        copy_trimmed(&mut self.name, &record.name)
    }

    fn sync_children(&mut self, _record: &Self::Record) -> bool {
        false
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
}

/// Derives the deduplicated category snapshot for a batch of person records,
/// so the masters can reconcile ahead of the person pass.
#[must_use]
pub fn category_snapshot(snapshot: &Snapshot<PersonRecord>) -> Snapshot<CategoryRecord> {
    let mut seen: HashSet<NaturalKey> = HashSet::new();
    let mut records = Vec::new();
    for person in &snapshot.records {
        for name in &person.categories {
            let Some(key) = NaturalKey::new(name) else {
                continue;
            };
            if seen.insert(key) {
                records.push(CategoryRecord {
                    name: name.trim().to_owned(),
                    observed_at: person.observed_at,
                });
            }
        }
    }
    Snapshot::with_fetched_at(records, snapshot.fetched_at)
}
