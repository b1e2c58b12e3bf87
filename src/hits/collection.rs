//! Keyed hit store with at most one record per host key.

use rustc_hash::FxHashMap;

use super::record::{FlatHit, HitRecord};

/// A named collection of hit records, one per host key.
///
/// Records are kept in creation order; the key index maps each host key to its
/// slot. Not safe for concurrent find-or-create: each readout region owns its
/// own collections.
#[derive(Debug, Clone)]
pub struct HitCollection<H> {
    name: String,
    hits: Vec<H>,
    index: FxHashMap<i32, usize>,
}

impl<H: HitRecord> HitCollection<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hits: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record for `key`, created with `make` if absent.
    ///
    /// `make` runs at most once per key for the lifetime of the collection
    /// (until [`clear`](Self::clear) or [`take`](Self::take)).
    pub fn find_or_insert_with<F>(&mut self, key: i32, make: F) -> &mut H
    where
        F: FnOnce() -> H,
    {
        let hits = &mut self.hits;
        let slot = *self.index.entry(key).or_insert_with(|| {
            hits.push(make());
            hits.len() - 1
        });
        &mut self.hits[slot]
    }

    pub fn get(&self, key: i32) -> Option<&H> {
        self.index.get(&key).map(|&slot| &self.hits[slot])
    }

    #[inline]
    pub fn contains(&self, key: i32) -> bool {
        self.index.contains_key(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Host keys in creation order.
    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.hits.iter().map(HitRecord::host_key)
    }

    /// `(key, record)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &H)> + '_ {
        self.hits.iter().map(|h| (h.host_key(), h))
    }

    /// `(key, record)` pairs ordered by key.
    pub fn iter_sorted(&self) -> Vec<(i32, &H)> {
        let mut pairs: Vec<(i32, &H)> = self.iter().collect();
        pairs.sort_unstable_by_key(|&(k, _)| k);
        pairs
    }

    pub fn to_flat(&self) -> Vec<FlatHit> {
        self.hits.iter().map(HitRecord::flatten).collect()
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.index.clear();
    }

    /// Move all records out, leaving an empty collection with the same name.
    pub fn take(&mut self) -> Self {
        Self {
            name: self.name.clone(),
            hits: std::mem::take(&mut self.hits),
            index: std::mem::take(&mut self.index),
        }
    }

    /// Consume the collection, yielding records in creation order.
    pub fn into_records(self) -> Vec<H> {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hits::EnergyHit;
    use crate::types::CellPosition;

    fn make(key: i32) -> EnergyHit {
        EnergyHit::create(key, CellPosition::new(key as f64, 0.0, 0.0))
    }

    #[test]
    fn test_find_or_insert_creates_once() {
        let mut coll: HitCollection<EnergyHit> = HitCollection::new("hits");
        let mut created = 0;

        for _ in 0..3 {
            let hit = coll.find_or_insert_with(4, || {
                created += 1;
                make(4)
            });
            hit.energy_deposit += 1.0;
        }

        assert_eq!(created, 1);
        assert_eq!(coll.len(), 1);
        assert_eq!(coll.get(4).unwrap().energy_deposit, 3.0);
    }

    #[test]
    fn test_creation_order_and_sorted_iteration() {
        let mut coll: HitCollection<EnergyHit> = HitCollection::new("hits");
        for key in [9, -1, 4, 9, -1] {
            coll.find_or_insert_with(key, || make(key));
        }
        assert_eq!(coll.keys().collect::<Vec<_>>(), vec![9, -1, 4]);

        let sorted: Vec<i32> = coll.iter_sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(sorted, vec![-1, 4, 9]);
        assert_eq!(coll.to_flat().len(), 3);
    }

    #[test]
    fn test_take_leaves_empty_named_collection() {
        let mut coll: HitCollection<EnergyHit> = HitCollection::new("ToyCalorimeterHits");
        coll.find_or_insert_with(1, || make(1));
        coll.find_or_insert_with(2, || make(2));

        let taken = coll.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.name(), "ToyCalorimeterHits");
        assert!(taken.contains(2));

        assert!(coll.is_empty());
        assert!(!coll.contains(1));
        assert_eq!(coll.name(), "ToyCalorimeterHits");

        // Keys are free again after take.
        coll.find_or_insert_with(1, || make(1));
        assert_eq!(coll.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut coll: HitCollection<EnergyHit> = HitCollection::new("hits");
        coll.find_or_insert_with(1, || make(1));
        coll.clear();
        assert!(coll.is_empty());
        assert!(coll.get(1).is_none());
        assert!(coll.into_records().is_empty());
    }
}
