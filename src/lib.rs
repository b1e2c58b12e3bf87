//! Cell identification and hit accumulation for a toy calorimeter readout.
//!
//! Three pieces work together:
//! - a bit-field codec packing `(system, phi, theta, depth)` into a 64-bit
//!   [`CellId`], split into 32-bit halves for hosts that only carry 32-bit
//!   copy numbers;
//! - a position cache filled once while the geometry is laid out;
//! - a per-event accumulator keeping at most one hit per cell in each
//!   collection, with a threshold-gated energy channel and an unconditional
//!   counting channel driven in lock-step.
//!
//! # Example
//!
//! ```
//! use toycalo::{BarrelLayout, CalorimeterAction, ReadoutConfig, ReadoutMode, Step, ToySegmentation};
//!
//! let mut segmentation = ToySegmentation::default();
//! let cells = BarrelLayout::default().build(&mut segmentation).unwrap();
//!
//! let config = ReadoutConfig { mode: ReadoutMode::WithInteresting, ..ReadoutConfig::default() };
//! let mut action = CalorimeterAction::for_segmentation(&segmentation, config).unwrap();
//! let key = cells[0].low;
//! for edep in [0.05, 0.2, 0.3] {
//!     action.process(&Step::new(key, edep));
//! }
//!
//! let hits = action.end_event();
//! assert_eq!(hits.energy.len(), 1);
//! assert!((hits.energy.get(key).unwrap().energy_deposit - 0.5).abs() < 1e-12);
//! assert_eq!(hits.interesting.unwrap().get(key).unwrap().count, 3);
//! ```

mod error;
pub mod hits;
pub mod layout;
pub mod regions;
pub mod segmentation;
mod types;
pub mod validation;

pub use error::CaloError;
pub use hits::{
    CalorimeterAction, Contribution, CountingHit, EnergyHit, EventHits, FlatHit, HitCollection,
    HitRecord, ReadoutMode, Step,
};
pub use layout::{BarrelLayout, PlacedCell};
pub use regions::process_regions;
pub use segmentation::{
    BitFieldCodec, CellCodec, CellSegmentation, FieldSpec, PositionCache, PositionLookup,
    ToySegmentation,
};
pub use types::{CellId, CellPosition, Coordinate};
pub use validation::{validate_event, ConsistencyReport};

/// Default energy threshold for the energy channel, in MeV.
pub const DEFAULT_THRESHOLD_MEV: f64 = 0.1;

/// Environment variable overriding [`ReadoutConfig::threshold_mev`].
pub const ENV_THRESHOLD: &str = "TOYCALO_THRESHOLD_MEV";
/// Environment variable overriding [`ReadoutConfig::mode`].
pub const ENV_READOUT_MODE: &str = "TOYCALO_READOUT_MODE";
/// Environment variable overriding [`ReadoutConfig::keep_contributions`].
pub const ENV_KEEP_TRUTH: &str = "TOYCALO_KEEP_TRUTH";

/// Configuration for hit accumulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadoutConfig {
    pub mode: ReadoutMode,

    /// Deposits must be strictly above this value (MeV) to add energy.
    /// Steps at or below it still create the hit.
    pub threshold_mev: f64,

    /// Attach per-step Monte-Carlo truth to every hit.
    ///
    /// Grows memory with the number of steps rather than the number of cells;
    /// leave disabled for large runs.
    pub keep_contributions: bool,
}

impl Default for ReadoutConfig {
    fn default() -> Self {
        Self {
            mode: ReadoutMode::Standard,
            threshold_mev: DEFAULT_THRESHOLD_MEV,
            keep_contributions: false,
        }
    }
}

impl ReadoutConfig {
    /// Defaults overridden by `TOYCALO_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `get` returns for each variable name.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = get(ENV_THRESHOLD) {
            match raw.trim().parse::<f64>() {
                Ok(t) => config.threshold_mev = t,
                Err(_) => log::warn!("ignoring {}={:?}: not a number", ENV_THRESHOLD, raw),
            }
        }
        if let Some(raw) = get(ENV_READOUT_MODE) {
            match raw.parse::<ReadoutMode>() {
                Ok(mode) => config.mode = mode,
                Err(e) => log::warn!("ignoring {}: {}", ENV_READOUT_MODE, e),
            }
        }
        if let Some(raw) = get(ENV_KEEP_TRUTH) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.keep_contributions = true,
                "0" | "false" | "no" | "off" => config.keep_contributions = false,
                _ => log::warn!("ignoring {}={:?}: not a boolean", ENV_KEEP_TRUTH, raw),
            }
        }

        config
    }

    pub fn validate(&self) -> Result<(), CaloError> {
        if !self.threshold_mev.is_finite() || self.threshold_mev < 0.0 {
            return Err(CaloError::InvalidThreshold(self.threshold_mev));
        }
        Ok(())
    }
}
