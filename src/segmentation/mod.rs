//! Cell segmentation: the bit-field codec paired with the position cache.
//!
//! Geometry construction encodes each cell's [`Coordinate`] into a
//! [`CellId`], splits off the 32-bit low half the host will hand back as a
//! copy number, and records the cell position under that half. At run time the
//! hit accumulator resolves host keys through [`PositionLookup`].
//!
//! [`CellSegmentation`] is the capability interface consumers program against,
//! so nothing needs to recover the concrete type from a generic handle.

mod bitfield;
mod cache;
mod codec;
pub mod halves;

pub use bitfield::{BitField, BitFieldCodec, FieldSpec};
pub use cache::{LookupFn, PositionCache, PositionLookup};
pub use codec::{CellCodec, FieldNames, DEFAULT_DESCRIPTOR};

use std::sync::Arc;

use crate::error::CaloError;
use crate::types::{CellId, CellPosition, Coordinate};
use halves::{from_low32, split_low};

/// Operations the geometry builder and the readout need from a segmentation.
pub trait CellSegmentation: PositionLookup {
    fn encode(&self, coordinate: Coordinate) -> CellId;

    fn try_encode(&self, coordinate: Coordinate) -> Result<CellId, CaloError>;

    fn decode(&self, cell_id: CellId) -> Coordinate;

    /// True when host 32-bit keys can address every cell of the layout.
    fn fits_low_half(&self) -> bool;

    fn record_position(&mut self, key: i32, position: CellPosition);
}

/// Result of checking a host key against the construction-time key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostKeyCheck {
    /// Widening the key and re-encoding its decoded coordinate gives it back.
    pub round_trips: bool,
    /// A position was recorded for the key during construction.
    pub has_position: bool,
}

impl HostKeyCheck {
    #[inline]
    pub fn is_compatible(&self) -> bool {
        self.round_trips && self.has_position
    }
}

/// Segmentation for the toy calorimeter: four fields plus a position table.
#[derive(Debug, Clone, Default)]
pub struct ToySegmentation {
    codec: CellCodec,
    positions: PositionCache,
}

impl ToySegmentation {
    pub fn new(codec: CellCodec) -> Self {
        Self {
            codec,
            positions: PositionCache::new(),
        }
    }

    pub fn from_descriptor(descriptor: &str) -> Result<Self, CaloError> {
        Ok(Self::new(CellCodec::from_descriptor(descriptor)?))
    }

    #[inline]
    pub fn codec(&self) -> &CellCodec {
        &self.codec
    }

    #[inline]
    pub fn positions(&self) -> &PositionCache {
        &self.positions
    }

    /// Freeze the segmentation for sharing between readout regions.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Decode a host 32-bit key through the low-half convention.
    #[inline]
    pub fn decode_low32(&self, key: i32) -> Coordinate {
        self.codec.decode(from_low32(key))
    }

    /// Encode a coordinate straight to its 32-bit host key.
    #[inline]
    pub fn host_key(&self, coordinate: Coordinate) -> i32 {
        split_low(self.codec.encode(coordinate))
    }

    pub fn check_host_key(&self, key: i32) -> HostKeyCheck {
        let widened = from_low32(key);
        let reencoded = self.codec.encode(self.codec.decode(widened));
        HostKeyCheck {
            round_trips: reencoded == widened,
            has_position: self.positions.contains(key),
        }
    }
}

impl PositionLookup for ToySegmentation {
    #[inline]
    fn position(&self, key: i32) -> CellPosition {
        self.positions.lookup(key)
    }
}

impl CellSegmentation for ToySegmentation {
    #[inline]
    fn encode(&self, coordinate: Coordinate) -> CellId {
        self.codec.encode(coordinate)
    }

    #[inline]
    fn try_encode(&self, coordinate: Coordinate) -> Result<CellId, CaloError> {
        self.codec.try_encode(coordinate)
    }

    #[inline]
    fn decode(&self, cell_id: CellId) -> Coordinate {
        self.codec.decode(cell_id)
    }

    fn fits_low_half(&self) -> bool {
        self.codec.layout().fits_low_half()
    }

    #[inline]
    fn record_position(&mut self, key: i32, position: CellPosition) {
        self.positions.record(key, position);
    }
}
