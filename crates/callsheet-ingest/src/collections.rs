//! Child-collection synchronization strategies.
//!
//! Four strategies cover every nested shape the sources publish:
//!
//! - [`replace_all`] - owned rows rebuilt verbatim (listing images)
//! - [`merge_keyed`] - children with their own natural key merged in place
//!   (schedule entries, social links)
//! - [`sync_links`] - many-to-many link keys held as a canonical set (person
//!   categories)
//! - [`merge_unkeyed`] - keyless children matched by value (appearance days)
//!
//! Every strategy reports whether the collection changed, so a pass that
//! reapplies an identical snapshot stays quiet.

use callsheet_core::NaturalKey;

/// Rebuilds `children` from `records` wholesale.
///
/// The rebuilt set is equality-compared against the current one first and the
/// collection only swaps (and reports a change) when they differ.
pub fn replace_all<C, S>(children: &mut Vec<C>, records: &[S]) -> bool
where
    C: PartialEq + for<'a> From<&'a S>,
{
    let rebuilt: Vec<C> = records.iter().map(C::from).collect();
    if *children == rebuilt {
        false
    } else {
        *children = rebuilt;
        true
    }
}

/// A child row carrying its own natural key.
pub trait KeyedChild: Sized {
    /// Source shape for this child.
    type Record;

    /// The stored child's key.
    fn key(&self) -> &NaturalKey;

    /// Key of a source child record. `None` for blank keys; such records are
    /// skipped as defects.
    fn record_key(record: &Self::Record) -> Option<NaturalKey>;

    /// Builds a new child from a record.
    fn create(key: NaturalKey, record: &Self::Record) -> Self;

    /// Copies differing fields from `record`. Returns whether any changed.
    fn apply(&mut self, record: &Self::Record) -> bool;
}

/// Merges keyed child records into `children`: matched children update in
/// place, unmatched records create children, children whose key the record
/// set no longer carries are dropped. Duplicate record keys apply in order,
/// so the last record wins.
pub fn merge_keyed<C: KeyedChild>(children: &mut Vec<C>, records: &[C::Record]) -> bool {
    let mut changed = false;
    let mut seen: Vec<NaturalKey> = Vec::with_capacity(records.len());

    for record in records {
        let Some(key) = C::record_key(record) else {
            continue;
        };
        match children.iter_mut().find(|child| *child.key() == key) {
            Some(child) => {
                changed |= child.apply(record);
            }
            None => {
                children.push(C::create(key.clone(), record));
                changed = true;
            }
        }
        if !seen.contains(&key) {
            seen.push(key);
        }
    }

    let before = children.len();
    children.retain(|child| seen.contains(child.key()));
    if children.len() != before {
        changed = true;
    }
    changed
}

/// Synchronizes a many-to-many link set to exactly `wanted`.
///
/// Links are child natural keys held on the parent; surrogate link rows are a
/// storage-boundary concern. The set stays sorted and deduplicated so
/// equality is canonical and a reordered source does not register as a
/// change.
pub fn sync_links(links: &mut Vec<NaturalKey>, wanted: &[NaturalKey]) -> bool {
    let mut target = wanted.to_vec();
    target.sort();
    target.dedup();
    if *links == target {
        false
    } else {
        *links = target;
        true
    }
}

/// A keyless child matched by value.
pub trait UnkeyedChild: Sized {
    /// Source shape for this child.
    type Record;

    /// Whether this stored child matches `record` by value.
    fn matches(&self, record: &Self::Record) -> bool;

    /// Builds a new child from a record.
    fn create(record: &Self::Record) -> Self;
}

/// Merges keyless child records by value identity.
///
/// Each record claims the most recently stored unclaimed child it matches;
/// leftover records create children and unclaimed children are dropped.
/// Identical duplicates are claimed by count, newest first, which is the best
/// a keyless source allows.
pub fn merge_unkeyed<C: UnkeyedChild>(children: &mut Vec<C>, records: &[C::Record]) -> bool {
    let mut claimed = vec![false; children.len()];
    let mut fresh: Vec<C> = Vec::new();

    for record in records {
        let slot = children
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, child)| (!claimed[i] && child.matches(record)).then_some(i));
        match slot {
            Some(i) => claimed[i] = true,
            None => fresh.push(C::create(record)),
        }
    }

    let dropped = claimed.iter().filter(|c| !**c).count();
    let changed = dropped > 0 || !fresh.is_empty();

    if changed {
        let mut kept: Vec<C> = Vec::with_capacity(children.len() - dropped + fresh.len());
        for (i, child) in children.drain(..).enumerate() {
            if claimed[i] {
                kept.push(child);
            }
        }
        kept.extend(fresh);
        *children = kept;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Image {
        url: String,
    }

    impl From<&String> for Image {
        fn from(url: &String) -> Self {
            Self { url: url.clone() }
        }
    }

    #[test]
    fn test_replace_all_swaps_on_difference() {
        let mut images = vec![Image {
            url: "a.jpg".into(),
        }];
        let records = vec![String::from("a.jpg"), String::from("b.jpg")];
        assert!(replace_all(&mut images, &records));
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_replace_all_is_quiet_on_identical_set() {
        let mut images = vec![
            Image {
                url: "a.jpg".into(),
            },
            Image {
                url: "b.jpg".into(),
            },
        ];
        let records = vec![String::from("a.jpg"), String::from("b.jpg")];
        assert!(!replace_all(&mut images, &records));
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        slot: NaturalKey,
        title: String,
    }

    struct EntryRecord {
        slot: String,
        title: String,
    }

    fn entry_record(slot: &str, title: &str) -> EntryRecord {
        EntryRecord {
            slot: slot.into(),
            title: title.into(),
        }
    }

    impl KeyedChild for Entry {
        type Record = EntryRecord;

        fn key(&self) -> &NaturalKey {
            &self.slot
        }

        fn record_key(record: &EntryRecord) -> Option<NaturalKey> {
            NaturalKey::new(&record.slot)
        }

        fn create(key: NaturalKey, record: &EntryRecord) -> Self {
            Self {
                slot: key,
                title: record.title.clone(),
            }
        }

        fn apply(&mut self, record: &EntryRecord) -> bool {
            if self.title == record.title {
                false
            } else {
                self.title = record.title.clone();
                true
            }
        }
    }

    #[test]
    fn test_merge_keyed_update_create_remove_in_one_pass() {
        let mut entries = vec![
            Entry {
                slot: NaturalKey::new("sat-10").unwrap(),
                title: "Panel".into(),
            },
            Entry {
                slot: NaturalKey::new("sat-14").unwrap(),
                title: "Signing".into(),
            },
        ];
        let records = vec![entry_record("sat-10", "Opening Panel"), entry_record("sun-11", "Q&A")];

        assert!(merge_keyed(&mut entries, &records));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Opening Panel");
        assert_eq!(entries[1].slot.as_str(), "sun-11");
    }

    #[test]
    fn test_merge_keyed_identical_records_are_quiet() {
        let mut entries = vec![Entry {
            slot: NaturalKey::new("sat-10").unwrap(),
            title: "Panel".into(),
        }];
        let records = vec![entry_record("SAT-10", "Panel")];
        assert!(!merge_keyed(&mut entries, &records));
    }

    #[test]
    fn test_merge_keyed_skips_blank_child_keys() {
        let mut entries: Vec<Entry> = Vec::new();
        let records = vec![entry_record("  ", "Ghost"), entry_record("sat-10", "Panel")];
        assert!(merge_keyed(&mut entries, &records));
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_merge_keyed_duplicate_keys_last_write_wins() {
        let mut entries: Vec<Entry> = Vec::new();
        let records = vec![entry_record("sat-10", "First"), entry_record("sat-10", "Second")];
        assert!(merge_keyed(&mut entries, &records));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Second");
    }

    fn keys(raw: &[&str]) -> Vec<NaturalKey> {
        raw.iter().filter_map(|k| NaturalKey::new(k)).collect()
    }

    #[test]
    fn test_sync_links_adds_and_removes() {
        let mut links = keys(&["artist"]);
        assert!(sync_links(&mut links, &keys(&["author", "artist"])));
        assert_eq!(links, keys(&["artist", "author"]));

        assert!(sync_links(&mut links, &keys(&["author"])));
        assert_eq!(links, keys(&["author"]));
    }

    #[test]
    fn test_sync_links_ignores_order_and_duplicates() {
        let mut links = keys(&["artist", "author"]);
        assert!(!sync_links(&mut links, &keys(&["author", "artist", "author"])));
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Day {
        date: String,
    }

    struct DayRecord {
        date: String,
    }

    impl UnkeyedChild for Day {
        type Record = DayRecord;

        fn matches(&self, record: &DayRecord) -> bool {
            self.date == record.date
        }

        fn create(record: &DayRecord) -> Self {
            Self {
                date: record.date.clone(),
            }
        }
    }

    #[test]
    fn test_merge_unkeyed_creates_and_drops_by_value() {
        let mut days = vec![
            Day {
                date: "sat".into(),
            },
            Day {
                date: "sun".into(),
            },
        ];
        let records = vec![
            DayRecord {
                date: "sun".into(),
            },
            DayRecord {
                date: "mon".into(),
            },
        ];

        assert!(merge_unkeyed(&mut days, &records));
        assert_eq!(days.len(), 2);
        assert!(days.iter().any(|d| d.date == "sun"));
        assert!(days.iter().any(|d| d.date == "mon"));
    }

    #[test]
    fn test_merge_unkeyed_identical_set_is_quiet() {
        let mut days = vec![Day {
            date: "sat".into(),
        }];
        let records = vec![DayRecord {
            date: "sat".into(),
        }];
        assert!(!merge_unkeyed(&mut days, &records));
    }

    #[test]
    fn test_merge_unkeyed_duplicates_claim_by_count() {
        let mut days = vec![
            Day {
                date: "sat".into(),
            },
            Day {
                date: "sat".into(),
            },
        ];
        let records = vec![DayRecord {
            date: "sat".into(),
        }];
        assert!(merge_unkeyed(&mut days, &records));
        assert_eq!(days.len(), 1);
    }
}
