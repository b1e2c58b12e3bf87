#![allow(dead_code)]

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use toycalo::{BarrelLayout, PlacedCell, Step, ToySegmentation};

/// Default segmentation with a default barrel laid out into it.
pub fn built_segmentation() -> (ToySegmentation, Vec<PlacedCell>) {
    let mut segmentation = ToySegmentation::default();
    let cells = BarrelLayout::default()
        .build(&mut segmentation)
        .expect("default layout should build");
    (segmentation, cells)
}

/// Steps over `keys` with deposits uniform in `[0, max_deposit)`.
pub fn random_steps(keys: &[i32], n: usize, max_deposit: f64, seed: u64) -> Vec<Step> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_steps_with_rng(keys, n, max_deposit, &mut rng)
}

pub fn random_steps_with_rng<R: Rng>(
    keys: &[i32],
    n: usize,
    max_deposit: f64,
    rng: &mut R,
) -> Vec<Step> {
    (0..n)
        .map(|i| Step {
            host_key: keys[rng.gen_range(0..keys.len())],
            energy_deposit: rng.gen_range(0.0..max_deposit),
            track_id: i as i32,
            pdg: 11,
            time: rng.gen_range(0.0..10.0),
        })
        .collect()
}

/// Expected per-key energy sums under a strict threshold.
pub fn expected_energy(steps: &[Step], threshold: f64) -> std::collections::BTreeMap<i32, f64> {
    let mut sums = std::collections::BTreeMap::new();
    for step in steps {
        let entry = sums.entry(step.host_key).or_insert(0.0);
        if step.energy_deposit > threshold {
            *entry += step.energy_deposit;
        }
    }
    sums
}

/// Per-key step counts.
pub fn expected_counts(steps: &[Step]) -> std::collections::BTreeMap<i32, u64> {
    let mut counts = std::collections::BTreeMap::new();
    for step in steps {
        *counts.entry(step.host_key).or_insert(0) += 1;
    }
    counts
}
