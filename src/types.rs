//! Core value types: packed cell ids, coordinates, and cell positions.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;

/// A packed 64-bit cell identifier.
///
/// Only meaningful together with the layout that produced it; ids from codecs
/// with different layouts must never be mixed.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable)]
pub struct CellId(u64);

impl CellId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for CellId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<CellId> for u64 {
    fn from(value: CellId) -> Self {
        value.0
    }
}

impl std::fmt::LowerHex for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Discrete cell address in the calorimeter's angular/radial layout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Coordinate {
    pub system: u32,
    pub phi: u32,
    pub theta: u32,
    pub depth: u32,
}

impl Coordinate {
    #[inline]
    pub const fn new(system: u32, phi: u32, theta: u32, depth: u32) -> Self {
        Self {
            system,
            phi,
            theta,
            depth,
        }
    }

    /// Fields in codec order: system, phi, theta, depth.
    #[inline]
    pub const fn to_array(self) -> [u32; 4] {
        [self.system, self.phi, self.theta, self.depth]
    }

    #[inline]
    pub const fn from_array([system, phi, theta, depth]: [u32; 4]) -> Self {
        Self::new(system, phi, theta, depth)
    }
}

impl From<(u32, u32, u32, u32)> for Coordinate {
    #[inline]
    fn from((system, phi, theta, depth): (u32, u32, u32, u32)) -> Self {
        Self::new(system, phi, theta, depth)
    }
}

/// Position of a calorimeter cell centre, in mm.
///
/// `#[repr(C)]` with a stable layout so exported hit rows can embed it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CellPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CellPosition {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    /// Euclidean distance from the beam axis origin.
    #[inline]
    pub fn length(self) -> f64 {
        self.to_dvec3().length()
    }

    #[inline]
    pub(crate) fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub(crate) fn from_dvec3(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<[f64; 3]> for CellPosition {
    #[inline]
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<CellPosition> for [f64; 3] {
    #[inline]
    fn from(p: CellPosition) -> Self {
        [p.x, p.y, p.z]
    }
}

#[cfg(feature = "glam")]
impl From<glam::DVec3> for CellPosition {
    #[inline]
    fn from(v: glam::DVec3) -> Self {
        Self::from_dvec3(v)
    }
}

#[cfg(feature = "glam")]
impl From<CellPosition> for glam::DVec3 {
    #[inline]
    fn from(p: CellPosition) -> glam::DVec3 {
        p.to_dvec3()
    }
}
