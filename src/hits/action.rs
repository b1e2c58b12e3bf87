//! Per-region sensitive action: feeds every step to the event's collections.

use super::accumulate::{record_count, record_energy};
use super::collection::HitCollection;
use super::record::{CountingHit, EnergyHit, FlatHit, HitRecord};
use super::{ReadoutMode, Step, ENERGY_COLLECTION, INTERESTING_COLLECTION};
use crate::error::CaloError;
use crate::segmentation::{CellSegmentation, PositionLookup};
use crate::ReadoutConfig;

/// Collections produced by one event.
#[derive(Debug, Clone)]
pub struct EventHits {
    pub energy: HitCollection<EnergyHit>,
    /// Present only in [`ReadoutMode::WithInteresting`].
    pub interesting: Option<HitCollection<CountingHit>>,
}

impl EventHits {
    pub fn total_energy(&self) -> f64 {
        self.energy.iter().map(|(_, h)| h.energy_deposit).sum()
    }

    pub fn total_count(&self) -> u64 {
        self.interesting
            .as_ref()
            .map(|c| c.iter().map(|(_, h)| h.count).sum())
            .unwrap_or(0)
    }

    /// Energy rows followed by counting rows.
    pub fn to_flat(&self) -> Vec<FlatHit> {
        let mut rows = self.energy.to_flat();
        if let Some(interesting) = &self.interesting {
            rows.extend(interesting.to_flat());
        }
        rows
    }
}

/// Hit accumulation for one sensitive region.
///
/// Each step is offered to the energy collection and, in
/// [`ReadoutMode::WithInteresting`], to the counting collection too, so both
/// always hold the same set of keys.
#[derive(Debug)]
pub struct CalorimeterAction<L> {
    lookup: L,
    config: ReadoutConfig,
    energy: HitCollection<EnergyHit>,
    interesting: Option<HitCollection<CountingHit>>,
    steps_in_event: u64,
    events: u64,
}

impl<L: PositionLookup> CalorimeterAction<L> {
    pub fn new(lookup: L, config: ReadoutConfig) -> Result<Self, CaloError> {
        config.validate()?;
        Ok(Self::new_unchecked(lookup, config))
    }

    pub(crate) fn new_unchecked(lookup: L, config: ReadoutConfig) -> Self {
        let interesting = match config.mode {
            ReadoutMode::Standard => None,
            ReadoutMode::WithInteresting => Some(HitCollection::new(INTERESTING_COLLECTION)),
        };
        Self {
            lookup,
            config,
            energy: HitCollection::new(ENERGY_COLLECTION),
            interesting,
            steps_in_event: 0,
            events: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &ReadoutConfig {
        &self.config
    }

    #[inline]
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn process(&mut self, step: &Step) {
        let keep_truth = self.config.keep_contributions;

        let hit = record_energy(
            &mut self.energy,
            step.host_key,
            &self.lookup,
            step.energy_deposit,
            self.config.threshold_mev,
        );
        if keep_truth {
            hit.push_truth(step.contribution());
        }

        if let Some(interesting) = self.interesting.as_mut() {
            let hit = record_count(interesting, step.host_key, &self.lookup);
            if keep_truth {
                hit.push_truth(step.contribution());
            }
        }

        self.steps_in_event += 1;
    }

    pub fn process_all<'s, I>(&mut self, steps: I)
    where
        I: IntoIterator<Item = &'s Step>,
    {
        for step in steps {
            self.process(step);
        }
    }

    #[inline]
    pub fn energy_hits(&self) -> &HitCollection<EnergyHit> {
        &self.energy
    }

    #[inline]
    pub fn interesting_hits(&self) -> Option<&HitCollection<CountingHit>> {
        self.interesting.as_ref()
    }

    /// Hand over this event's collections and start the next event empty.
    pub fn end_event(&mut self) -> EventHits {
        let hits = EventHits {
            energy: self.energy.take(),
            interesting: self.interesting.as_mut().map(HitCollection::take),
        };
        log::debug!(
            "event {}: {} steps, {} energy hits, {:.3} MeV",
            self.events,
            self.steps_in_event,
            hits.energy.len(),
            hits.total_energy()
        );
        self.events += 1;
        self.steps_in_event = 0;
        hits
    }

    #[inline]
    pub fn events_processed(&self) -> u64 {
        self.events
    }
}

impl<'a, S> CalorimeterAction<&'a S>
where
    S: CellSegmentation + ?Sized,
{
    /// Action reading positions from `segmentation`, after checking that host
    /// keys can address its whole layout.
    pub fn for_segmentation(segmentation: &'a S, config: ReadoutConfig) -> Result<Self, CaloError> {
        check_key_space(segmentation);
        Self::new(segmentation, config)
    }
}

/// Warn when the layout uses bits a 32-bit host key cannot carry.
///
/// Returns whether the key spaces are compatible.
pub fn check_key_space<S: CellSegmentation + ?Sized>(segmentation: &S) -> bool {
    let fits = segmentation.fits_low_half();
    if !fits {
        log::warn!(
            "segmentation layout extends past bit 31; host copy numbers cannot address every cell"
        );
    }
    fits
}
