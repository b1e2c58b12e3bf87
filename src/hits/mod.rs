//! Per-event hit accumulation.
//!
//! A [`CalorimeterAction`] owns the collections of one sensitive region and
//! turns a stream of [`Step`]s into at most one record per cell per
//! collection. Records are keyed by the raw 32-bit host key.

mod accumulate;
mod action;
mod collection;
mod record;

pub use accumulate::{record_count, record_energy};
pub use action::{check_key_space, CalorimeterAction, EventHits};
pub use collection::HitCollection;
pub use record::{Contribution, CountingHit, EnergyHit, FlatHit, HitRecord};

use std::fmt;
use std::str::FromStr;

use crate::error::CaloError;

/// Name of the threshold-gated energy collection.
pub const ENERGY_COLLECTION: &str = "ToyCalorimeterHits";

/// Name of the step-counting collection.
pub const INTERESTING_COLLECTION: &str = "ToyCalorimeterHitsInteresting";

/// Which collections a [`CalorimeterAction`] drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadoutMode {
    /// Energy collection only.
    #[default]
    Standard,
    /// Energy collection plus the counting collection, kept in lock-step.
    WithInteresting,
}

impl fmt::Display for ReadoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadoutMode::Standard => write!(f, "standard"),
            ReadoutMode::WithInteresting => write!(f, "with-interesting"),
        }
    }
}

impl FromStr for ReadoutMode {
    type Err = CaloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ReadoutMode::Standard),
            "with-interesting" | "interesting" | "custom" => Ok(ReadoutMode::WithInteresting),
            other => Err(CaloError::UnknownReadoutMode(other.to_string())),
        }
    }
}

/// One energy-deposit step reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// 32-bit copy number of the cell the step occurred in.
    pub host_key: i32,
    /// Total deposit of the step, in MeV.
    pub energy_deposit: f64,
    pub track_id: i32,
    pub pdg: i32,
    /// Global time, in ns.
    pub time: f64,
}

impl Step {
    /// Step with no truth information attached.
    pub fn new(host_key: i32, energy_deposit: f64) -> Self {
        Self {
            host_key,
            energy_deposit,
            track_id: 0,
            pdg: 0,
            time: 0.0,
        }
    }

    #[inline]
    pub fn contribution(&self) -> Contribution {
        Contribution {
            track_id: self.track_id,
            pdg: self.pdg,
            deposit: self.energy_deposit,
            time: self.time,
        }
    }
}
