//! Merge rules applied to one step for one collection.
//!
//! Both rules share find-or-create: the first step for a key creates the
//! record at the cached position, whatever its energy. They differ only in the
//! update that follows.

use super::collection::HitCollection;
use super::record::{CountingHit, EnergyHit, HitRecord};
use crate::segmentation::PositionLookup;

/// Energy channel: add `energy_deposit` only when it is strictly above
/// `threshold_mev`.
///
/// A negative threshold acts as zero, so the accumulated energy never
/// decreases.
pub fn record_energy<'a, L>(
    collection: &'a mut HitCollection<EnergyHit>,
    key: i32,
    lookup: &L,
    energy_deposit: f64,
    threshold_mev: f64,
) -> &'a mut EnergyHit
where
    L: PositionLookup + ?Sized,
{
    let hit = collection.find_or_insert_with(key, || EnergyHit::create(key, lookup.position(key)));
    if energy_deposit > threshold_mev.max(0.0) {
        hit.energy_deposit += energy_deposit;
    }
    hit
}

/// Counting channel: bump the counter on every step, ignoring energy.
pub fn record_count<'a, L>(
    collection: &'a mut HitCollection<CountingHit>,
    key: i32,
    lookup: &L,
) -> &'a mut CountingHit
where
    L: PositionLookup + ?Sized,
{
    let hit =
        collection.find_or_insert_with(key, || CountingHit::create(key, lookup.position(key)));
    hit.count += 1;
    hit
}
