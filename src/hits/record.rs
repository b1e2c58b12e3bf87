//! Per-cell hit records and their flat export form.

use bytemuck::{Pod, Zeroable};

use crate::segmentation::halves::from_low32;
use crate::types::{CellId, CellPosition};

/// Monte-Carlo truth for one step that touched a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub track_id: i32,
    pub pdg: i32,
    /// Energy deposited by this step, in MeV.
    pub deposit: f64,
    /// Global time of the step, in ns.
    pub time: f64,
}

/// Common interface of records stored in a [`HitCollection`](super::HitCollection).
pub trait HitRecord {
    /// Fresh record for `host_key`, placed at `position`.
    fn create(host_key: i32, position: CellPosition) -> Self;

    fn host_key(&self) -> i32;

    fn cell_id(&self) -> CellId;

    fn position(&self) -> CellPosition;

    fn truth(&self) -> &[Contribution];

    fn push_truth(&mut self, contribution: Contribution);

    fn flatten(&self) -> FlatHit;
}

/// Threshold-gated energy sum for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyHit {
    pub host_key: i32,
    /// 64-bit id widened from the host key.
    pub cell_id: CellId,
    pub position: CellPosition,
    /// Accumulated deposit above threshold, in MeV. Never decreases.
    pub energy_deposit: f64,
    pub truth: Vec<Contribution>,
}

impl HitRecord for EnergyHit {
    fn create(host_key: i32, position: CellPosition) -> Self {
        Self {
            host_key,
            cell_id: from_low32(host_key),
            position,
            energy_deposit: 0.0,
            truth: Vec::new(),
        }
    }

    #[inline]
    fn host_key(&self) -> i32 {
        self.host_key
    }

    #[inline]
    fn cell_id(&self) -> CellId {
        self.cell_id
    }

    #[inline]
    fn position(&self) -> CellPosition {
        self.position
    }

    fn truth(&self) -> &[Contribution] {
        &self.truth
    }

    fn push_truth(&mut self, contribution: Contribution) {
        self.truth.push(contribution);
    }

    fn flatten(&self) -> FlatHit {
        FlatHit {
            cell_id: self.cell_id,
            host_key: self.host_key,
            kind: FlatHit::KIND_ENERGY,
            energy_deposit: self.energy_deposit,
            count: 0,
            position: self.position,
        }
    }
}

/// Unconditional step counter for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingHit {
    pub host_key: i32,
    pub cell_id: CellId,
    pub position: CellPosition,
    /// Number of steps offered for this cell, regardless of their energy.
    pub count: u64,
    pub truth: Vec<Contribution>,
}

impl HitRecord for CountingHit {
    fn create(host_key: i32, position: CellPosition) -> Self {
        Self {
            host_key,
            cell_id: from_low32(host_key),
            position,
            count: 0,
            truth: Vec::new(),
        }
    }

    #[inline]
    fn host_key(&self) -> i32 {
        self.host_key
    }

    #[inline]
    fn cell_id(&self) -> CellId {
        self.cell_id
    }

    #[inline]
    fn position(&self) -> CellPosition {
        self.position
    }

    fn truth(&self) -> &[Contribution] {
        &self.truth
    }

    fn push_truth(&mut self, contribution: Contribution) {
        self.truth.push(contribution);
    }

    fn flatten(&self) -> FlatHit {
        FlatHit {
            cell_id: self.cell_id,
            host_key: self.host_key,
            kind: FlatHit::KIND_COUNTING,
            energy_deposit: 0.0,
            count: self.count,
            position: self.position,
        }
    }
}

/// Fixed-layout hit row for handing a collection to a downstream writer.
///
/// Truth contributions are not included.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FlatHit {
    pub cell_id: CellId,
    pub host_key: i32,
    /// [`FlatHit::KIND_ENERGY`] or [`FlatHit::KIND_COUNTING`].
    pub kind: u32,
    pub energy_deposit: f64,
    pub count: u64,
    pub position: CellPosition,
}

impl FlatHit {
    pub const KIND_ENERGY: u32 = 0;
    pub const KIND_COUNTING: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_widens_key() {
        let hit = EnergyHit::create(0x0503, CellPosition::new(1.0, 2.0, 3.0));
        assert_eq!(hit.cell_id.as_u64(), 0x0503);
        assert_eq!(hit.energy_deposit, 0.0);
        assert!(hit.truth.is_empty());

        let hit = CountingHit::create(-2, CellPosition::ORIGIN);
        assert_eq!(hit.cell_id.as_u64(), u64::MAX - 1);
        assert_eq!(hit.count, 0);
    }

    #[test]
    fn test_flat_row_layout() {
        assert_eq!(std::mem::size_of::<FlatHit>(), 56);

        let mut hit = CountingHit::create(9, CellPosition::new(0.0, 1.0, 0.0));
        hit.count = 4;
        let row = hit.flatten();
        assert_eq!(row.kind, FlatHit::KIND_COUNTING);
        assert_eq!(row.count, 4);
        assert_eq!(row.position.y, 1.0);

        let rows = [row, EnergyHit::create(9, CellPosition::ORIGIN).flatten()];
        let bytes: &[u8] = bytemuck::cast_slice(&rows);
        assert_eq!(bytes.len(), 2 * 56);
    }
}
