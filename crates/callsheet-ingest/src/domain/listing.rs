//! Product bundle listings.
//!
//! Bundles are a flat entity class reconciled under [`ScopeId::global`].
//! Delisting is an explicit upstream operation rather than a key
//! disappearance, so listings carry no presence state and the absence sweep
//! ignores them. Gallery images are owned rows rebuilt wholesale from each
//! record.
//!
//! [`ScopeId::global`]: callsheet_core::ScopeId::global

use crate::collections::replace_all;
use crate::differ::{copy_if_changed, copy_trimmed, copy_trimmed_opt};
use crate::entity::Reconcilable;
use callsheet_core::{EntityId, NaturalKey};
use callsheet_feed::SourceRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bundle listing as published by the storefront feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Published bundle identifier (slug).
    pub key: String,
    /// Display title.
    pub title: String,
    /// Storefront URL.
    pub url: Option<String>,
    /// Price in minor currency units.
    pub price_cents: Option<i64>,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Gallery images in display order.
    pub images: Vec<ImageRecord>,
    /// When the fetcher observed this record.
    pub observed_at: DateTime<Utc>,
}

impl ListingRecord {
    /// New record observed now.
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            url: None,
            price_cents: None,
            currency: None,
            images: Vec::new(),
            observed_at: Utc::now(),
        }
    }

    /// Sets the storefront URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the price in minor units plus its currency code.
    #[must_use]
    pub fn with_price(mut self, cents: i64, currency: impl Into<String>) -> Self {
        self.price_cents = Some(cents);
        self.currency = Some(currency.into());
        self
    }

    /// Appends a gallery image.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(ImageRecord {
            url: url.into(),
            caption: None,
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

impl SourceRecord for ListingRecord {
    fn natural_key(&self) -> &str {
        &self.key
    }

    fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// One gallery image on a listing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Image URL.
    pub url: String,
    /// Optional caption.
    pub caption: Option<String>,
}

/// A persisted bundle listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Surrogate identity.
    pub id: EntityId,
    /// Natural key; `None` for orphan rows that predate key tracking.
    pub key: Option<NaturalKey>,
    /// Display title.
    pub title: String,
    /// Storefront URL.
    pub url: Option<String>,
    /// Price in minor currency units.
    pub price_cents: Option<i64>,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Owned gallery rows in display order.
    pub images: Vec<ListingImage>,
    /// First observation, immutable after creation.
    pub first_seen_at: DateTime<Utc>,
    /// Latest pass that visited this listing.
    pub last_seen_at: DateTime<Utc>,
    /// Latest pass that actually changed something.
    pub last_changed_at: DateTime<Utc>,
}

/// An owned gallery image row, rebuilt wholesale from the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    /// Image URL.
    pub url: String,
    /// Optional caption.
    pub caption: Option<String>,
}

impl From<&ImageRecord> for ListingImage {
    fn from(record: &ImageRecord) -> Self {
        Self {
            url: record.url.clone(),
            caption: record.caption.clone(),
        }
    }
}

impl Reconcilable for Listing {
    type Record = ListingRecord;

    fn natural_key(&self) -> Option<&NaturalKey> {
        self.key.as_ref()
    }

    fn create(key: NaturalKey, observed_at: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(),
            key: Some(key),
            title: String::new(),
            url: None,
            price_cents: None,
            currency: None,
            images: Vec::new(),
            first_seen_at: observed_at,
            last_seen_at: observed_at,
            last_changed_at: observed_at,
        }
    }

    fn apply_fields(&mut self, record: &Self::Record) -> bool {
        let mut changed = copy_trimmed(&mut self.title, &record.title);
        changed |= copy_trimmed_opt(&mut self.url, record.url.as_deref());
        changed |= copy_if_changed(&mut self.price_cents, &record.price_cents);
        changed |= copy_trimmed_opt(&mut self.currency, record.currency.as_deref());
        changed
    }

    fn sync_children(&mut self, record: &Self::Record) -> bool {
        replace_all(&mut self.images, &record.images)
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn fresh(record: &ListingRecord) -> Listing {
        let key = NaturalKey::new(&record.key).unwrap();
        let mut listing = Listing::create(key, ts(1));
        listing.apply_fields(record);
        listing.sync_children(record);
        listing
    }

    #[test]
    fn test_apply_fields_reports_changes() {
        let record = ListingRecord::new("comics-mega", "Comics Mega Bundle").with_price(2500, "USD");
        let mut listing = fresh(&record);

        assert!(!listing.apply_fields(&record));

        let repriced = record.clone().with_price(1999, "USD");
        assert!(listing.apply_fields(&repriced));
        assert_eq!(listing.price_cents, Some(1999));
    }

    #[test]
    fn test_fields_trim_source_padding() {
        let record = ListingRecord::new("comics-mega", "  Comics Mega Bundle ");
        let listing = fresh(&record);
        assert_eq!(listing.title, "Comics Mega Bundle");

        // Re-applying the padded record is not a change.
        let mut listing = listing;
        assert!(!listing.apply_fields(&record));
    }

    #[test]
    fn test_images_rebuild_quietly_when_identical() {
        let record = ListingRecord::new("comics-mega", "Bundle")
            .with_image("a.jpg")
            .with_image("b.jpg");
        let mut listing = fresh(&record);

        assert!(!listing.sync_children(&record));

        let reordered = ListingRecord::new("comics-mega", "Bundle")
            .with_image("b.jpg")
            .with_image("a.jpg");
        assert!(listing.sync_children(&reordered));
        assert_eq!(listing.images[0].url, "b.jpg");
    }

    #[test]
    fn test_timestamps_stamp_forward_only() {
        let mut listing = fresh(&ListingRecord::new("comics-mega", "Bundle"));
        listing.record_seen(ts(50));
        listing.record_changed(ts(50));

        // A replayed older batch leaves both stamps where they are.
        listing.record_seen(ts(20));
        listing.record_changed(ts(20));
        assert_eq!(listing.last_seen_at, ts(50));
        assert_eq!(listing.last_changed_at, ts(50));
    }

    #[test]
    fn test_listings_have_no_presence() {
        let listing = fresh(&ListingRecord::new("comics-mega", "Bundle"));
        assert!(listing.presence().is_none());
    }
}
