//! Case-insensitive natural-key index over one scope's entities.

use crate::entity::Reconcilable;
use callsheet_core::NaturalKey;
use std::collections::HashMap;

/// Maps natural keys to slots in a scope's entity vec.
///
/// Built once at pass start. Entities created mid-pass are inserted
/// immediately, so duplicate keys inside one batch resolve to the same entity
/// (last-write-wins). Keys are canonical [`NaturalKey`] values, which makes
/// the lookup case-insensitive by construction.
#[derive(Debug, Default)]
pub struct KeyIndex {
    slots: HashMap<NaturalKey, usize>,
    orphans: usize,
}

impl KeyIndex {
    /// Indexes `entities` by natural key. Entities without a key count as
    /// orphans and stay out of the index.
    pub fn build<E: Reconcilable>(entities: &[E]) -> Self {
        let mut slots = HashMap::with_capacity(entities.len());
        let mut orphans = 0;
        for (slot, entity) in entities.iter().enumerate() {
            match entity.natural_key() {
                Some(key) => {
                    slots.insert(key.clone(), slot);
                }
                None => orphans += 1,
            }
        }
        Self { slots, orphans }
    }

    /// Slot of the entity holding `key`, if indexed.
    #[must_use]
    pub fn get(&self, key: &NaturalKey) -> Option<usize> {
        self.slots.get(key).copied()
    }

    /// Registers a freshly created entity under `key`.
    pub fn insert(&mut self, key: NaturalKey, slot: usize) {
        self.slots.insert(key, slot);
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the index holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of keyless entities excluded from the index.
    #[must_use]
    pub fn orphans(&self) -> usize {
        self.orphans
    }

    /// Iterates indexed `(key, slot)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaturalKey, usize)> {
        self.slots.iter().map(|(key, &slot)| (key, slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::Listing;
    use chrono::Utc;

    fn listing(key: Option<&str>) -> Listing {
        let now = Utc::now();
        let mut entity = Listing::create(NaturalKey::new("placeholder").unwrap(), now);
        entity.key = key.and_then(NaturalKey::new);
        entity
    }

    #[test]
    fn test_build_indexes_keyed_entities() {
        let entities = vec![listing(Some("alpha")), listing(Some("beta"))];
        let index = KeyIndex::build(&entities);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&NaturalKey::new("alpha").unwrap()), Some(0));
        assert_eq!(index.get(&NaturalKey::new("BETA").unwrap()), Some(1));
        assert_eq!(index.orphans(), 0);
    }

    #[test]
    fn test_orphans_stay_out_of_index() {
        let entities = vec![listing(Some("alpha")), listing(None)];
        let index = KeyIndex::build(&entities);
        assert_eq!(index.len(), 1);
        assert_eq!(index.orphans(), 1);
    }

    #[test]
    fn test_insert_registers_new_slot() {
        let entities = vec![listing(Some("alpha"))];
        let mut index = KeyIndex::build(&entities);
        index.insert(NaturalKey::new("gamma").unwrap(), 1);
        assert_eq!(index.get(&NaturalKey::new("gamma").unwrap()), Some(1));
    }

    #[test]
    fn test_empty_index() {
        let index = KeyIndex::build::<Listing>(&[]);
        assert!(index.is_empty());
        assert_eq!(index.orphans(), 0);
    }
}
