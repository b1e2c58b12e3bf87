//! Consistency checks for the collections of one event.
//!
//! The energy and counting collections are fed from the same steps, so their
//! key sets must match exactly even though their contents differ. Hits at the
//! origin indicate host keys with no recorded cell position.

use rustc_hash::FxHashSet;

use crate::hits::EventHits;

/// Report produced by [`validate_event`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    /// Records in the energy collection.
    pub energy_hits: usize,
    /// Records in the counting collection, if the event has one.
    pub counting_hits: Option<usize>,
    /// Keys present only in the energy collection (sorted).
    pub only_in_energy: Vec<i32>,
    /// Keys present only in the counting collection (sorted).
    pub only_in_counting: Vec<i32>,
    /// Energy hits placed at the origin, i.e. created from a cache miss.
    pub origin_hits: usize,
    /// Sum of accumulated energy, in MeV.
    pub total_energy: f64,
    /// Sum of step counts.
    pub total_count: u64,
}

impl ConsistencyReport {
    /// True when both collections hold the same keys (trivially true when
    /// there is no counting collection).
    pub fn is_consistent(&self) -> bool {
        self.only_in_energy.is_empty() && self.only_in_counting.is_empty()
    }

    /// Consistent and every hit resolved to a recorded position.
    pub fn is_clean(&self) -> bool {
        self.is_consistent() && self.origin_hits == 0
    }

    pub fn summary(&self) -> String {
        if self.is_clean() {
            return "Consistent".to_string();
        }

        let mut issues = Vec::new();
        if !self.only_in_energy.is_empty() {
            issues.push(format!(
                "{} keys only in energy collection",
                self.only_in_energy.len()
            ));
        }
        if !self.only_in_counting.is_empty() {
            issues.push(format!(
                "{} keys only in counting collection",
                self.only_in_counting.len()
            ));
        }
        if self.origin_hits > 0 {
            issues.push(format!("{} hits without cell position", self.origin_hits));
        }
        issues.join(", ")
    }
}

impl std::fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.counting_hits {
            Some(n) => write!(
                f,
                "ConsistencyReport {{ energy={}, counting={}, E={:.3} MeV, steps={}, {} }}",
                self.energy_hits,
                n,
                self.total_energy,
                self.total_count,
                self.summary()
            ),
            None => write!(
                f,
                "ConsistencyReport {{ energy={}, E={:.3} MeV, {} }}",
                self.energy_hits,
                self.total_energy,
                self.summary()
            ),
        }
    }
}

/// Compare the key sets of an event's collections.
pub fn validate_event(hits: &EventHits) -> ConsistencyReport {
    let energy_keys: FxHashSet<i32> = hits.energy.keys().collect();
    let origin_hits = hits
        .energy
        .iter()
        .filter(|(_, h)| h.position.is_origin())
        .count();

    let (counting_hits, only_in_energy, only_in_counting) = match &hits.interesting {
        Some(counting) => {
            let counting_keys: FxHashSet<i32> = counting.keys().collect();
            let mut only_e: Vec<i32> = energy_keys.difference(&counting_keys).copied().collect();
            let mut only_c: Vec<i32> = counting_keys.difference(&energy_keys).copied().collect();
            only_e.sort_unstable();
            only_c.sort_unstable();
            (Some(counting.len()), only_e, only_c)
        }
        None => (None, Vec::new(), Vec::new()),
    };

    ConsistencyReport {
        energy_hits: hits.energy.len(),
        counting_hits,
        only_in_energy,
        only_in_counting,
        origin_hits,
        total_energy: hits.total_energy(),
        total_count: hits.total_count(),
    }
}
