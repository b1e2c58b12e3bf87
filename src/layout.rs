//! Barrel cell layout: walks the azimuthal segments of a single-layer barrel
//! and registers each cell's position with the segmentation.
//!
//! Only cell centres are computed here. Shapes, materials and placement
//! transforms belong to the host geometry toolkit.

use std::f64::consts::TAU;

use glam::DVec3;
use rustc_hash::FxHashMap;

use crate::error::CaloError;
use crate::segmentation::halves::{split_high, split_low};
use crate::segmentation::CellSegmentation;
use crate::types::{CellId, CellPosition, Coordinate};

/// A cell registered during layout construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCell {
    pub coordinate: Coordinate,
    pub cell_id: CellId,
    /// Host copy number for the cell (low half of `cell_id`).
    pub low: i32,
    pub high: i32,
    pub position: CellPosition,
}

/// Single ring of cells at fixed radius, one per azimuthal segment.
///
/// Lengths are in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct BarrelLayout {
    /// Detector system id written into every cell.
    pub system: u32,
    pub phi_segments: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Default for BarrelLayout {
    fn default() -> Self {
        Self {
            system: 1,
            phi_segments: 12,
            inner_radius: 1000.0,
            outer_radius: 1200.0,
        }
    }
}

impl BarrelLayout {
    pub fn validate(&self) -> Result<(), CaloError> {
        if self.phi_segments == 0 {
            return Err(CaloError::InvalidLayout(
                "phi_segments must be positive".to_string(),
            ));
        }
        if !(self.inner_radius.is_finite() && self.outer_radius.is_finite()) {
            return Err(CaloError::InvalidLayout("radii must be finite".to_string()));
        }
        if self.inner_radius <= 0.0 || self.outer_radius <= self.inner_radius {
            return Err(CaloError::InvalidLayout(format!(
                "need 0 < inner_radius < outer_radius, got {} and {}",
                self.inner_radius, self.outer_radius
            )));
        }
        Ok(())
    }

    /// Radius of the cell centres.
    #[inline]
    pub fn mid_radius(&self) -> f64 {
        self.inner_radius + 0.5 * (self.outer_radius - self.inner_radius)
    }

    /// Centre of segment `index`.
    pub fn cell_center(&self, index: u32) -> DVec3 {
        let phi = index as f64 * (TAU / self.phi_segments as f64);
        let r = self.mid_radius();
        DVec3::new(r * phi.cos(), r * phi.sin(), 0.0)
    }

    /// Encode every cell and record its position under the host key.
    ///
    /// Fails before touching the segmentation if the layout is invalid, a
    /// coordinate does not fit the segmentation's fields, or two cells map to
    /// the same host key.
    pub fn build<S>(&self, segmentation: &mut S) -> Result<Vec<PlacedCell>, CaloError>
    where
        S: CellSegmentation + ?Sized,
    {
        self.validate()?;

        let mut cells = Vec::with_capacity(self.phi_segments as usize);
        for i in 0..self.phi_segments {
            let coordinate = Coordinate::new(self.system, i, 0, 0);
            let cell_id = segmentation.try_encode(coordinate)?;
            cells.push(PlacedCell {
                coordinate,
                cell_id,
                low: split_low(cell_id),
                high: split_high(cell_id),
                position: CellPosition::from_dvec3(self.cell_center(i)),
            });
        }

        let mut seen: FxHashMap<i32, Coordinate> = FxHashMap::default();
        for cell in &cells {
            if let Some(&first) = seen.get(&cell.low) {
                return Err(CaloError::HostKeyCollision {
                    key: cell.low,
                    first,
                    second: cell.coordinate,
                });
            }
            seen.insert(cell.low, cell.coordinate);
        }

        for cell in &cells {
            segmentation.record_position(cell.low, cell.position);
        }

        log::debug!(
            "barrel layout: {} cells for system {} at r={:.1} mm",
            cells.len(),
            self.system,
            self.mid_radius()
        );
        Ok(cells)
    }
}
