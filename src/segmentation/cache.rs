//! Cell position lookup table keyed by the 32-bit host key.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::types::CellPosition;

/// Anything that can resolve a host key to a cell position.
///
/// Lookups never fail: unknown keys resolve to [`CellPosition::ORIGIN`].
pub trait PositionLookup {
    fn position(&self, key: i32) -> CellPosition;
}

impl<T: PositionLookup + ?Sized> PositionLookup for &T {
    #[inline]
    fn position(&self, key: i32) -> CellPosition {
        (**self).position(key)
    }
}

impl<T: PositionLookup + ?Sized> PositionLookup for Arc<T> {
    #[inline]
    fn position(&self, key: i32) -> CellPosition {
        (**self).position(key)
    }
}

/// Adapts a plain function or closure into a [`PositionLookup`].
#[derive(Debug, Clone, Copy)]
pub struct LookupFn<F>(pub F);

impl<F: Fn(i32) -> CellPosition> PositionLookup for LookupFn<F> {
    #[inline]
    fn position(&self, key: i32) -> CellPosition {
        (self.0)(key)
    }
}

/// Positions recorded once per cell during geometry construction.
///
/// Filled by a single writer before any event is processed, then read
/// concurrently; it carries no interior mutability, so `&PositionCache` is
/// freely shareable between threads.
#[derive(Debug, Clone, Default)]
pub struct PositionCache {
    positions: FxHashMap<i32, CellPosition>,
}

impl PositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Insert or overwrite the position for `key`.
    #[inline]
    pub fn record(&mut self, key: i32, position: CellPosition) {
        self.positions.insert(key, position);
    }

    /// Recorded position for `key`, or the origin if it was never recorded.
    #[inline]
    pub fn lookup(&self, key: i32) -> CellPosition {
        match self.positions.get(&key) {
            Some(&p) => p,
            None => {
                log::trace!("position cache miss for key {:#x}", key);
                CellPosition::ORIGIN
            }
        }
    }

    #[inline]
    pub fn contains(&self, key: i32) -> bool {
        self.positions.contains_key(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Entries sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (i32, CellPosition)> + '_ {
        let mut entries: Vec<(i32, CellPosition)> =
            self.positions.iter().map(|(&k, &p)| (k, p)).collect();
        entries.sort_unstable_by_key(|&(k, _)| k);
        entries.into_iter()
    }
}

impl PositionLookup for PositionCache {
    #[inline]
    fn position(&self, key: i32) -> CellPosition {
        self.lookup(key)
    }
}
