//! Drive the toy calorimeter readout with a synthetic step stream.
//!
//! Run with: cargo run --release --bin toycalo_sim
//!
//! Usage:
//!   toycalo_sim                         5 events, standard readout
//!   toycalo_sim -n 100 --mode custom    100 events with the counting collection
//!   toycalo_sim --regions 4             4 independent regions per event
//!   toycalo_sim --output hits.bin       also dump flat hit rows as raw bytes
//!
//! Set RUST_LOG=debug for per-event accumulation logs.

use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use toycalo::{
    process_regions, validate_event, BarrelLayout, PlacedCell, ReadoutConfig, ReadoutMode, Step,
    ToySegmentation,
};

#[derive(Parser, Debug)]
#[command(name = "toycalo_sim")]
#[command(about = "Accumulate synthetic calorimeter steps into hit collections")]
struct Args {
    /// Number of events
    #[arg(short = 'n', long, default_value_t = 5)]
    events: usize,

    /// Steps per region per event
    #[arg(long, default_value_t = 200)]
    steps: usize,

    /// Independent sensitive regions per event
    #[arg(long, default_value_t = 1)]
    regions: usize,

    /// Cell id layout descriptor
    #[arg(long, default_value = toycalo::segmentation::DEFAULT_DESCRIPTOR)]
    descriptor: String,

    /// Detector system id
    #[arg(long, default_value_t = 1)]
    system: u32,

    /// Azimuthal segments in the barrel
    #[arg(long, default_value_t = 12)]
    phi_segments: u32,

    /// Barrel inner radius (mm)
    #[arg(long, default_value_t = 1000.0)]
    inner_radius: f64,

    /// Barrel outer radius (mm)
    #[arg(long, default_value_t = 1200.0)]
    outer_radius: f64,

    /// Energy threshold (MeV); defaults to $TOYCALO_THRESHOLD_MEV or 0.1
    #[arg(long)]
    threshold: Option<f64>,

    /// Readout mode: standard or with-interesting
    #[arg(long)]
    mode: Option<ReadoutMode>,

    /// Keep per-step truth contributions
    #[arg(long)]
    truth: bool,

    /// Mean step deposit (MeV)
    #[arg(long, default_value_t = 0.3)]
    mean_deposit: f64,

    /// RNG seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Write flat hit rows of every event to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Steps clustered around a random shower axis in phi.
fn shower_steps<R: Rng>(
    cells: &[PlacedCell],
    n: usize,
    mean_deposit: f64,
    rng: &mut R,
) -> Vec<Step> {
    let n_cells = cells.len();
    let axis = rng.gen_range(0..n_cells);

    (0..n)
        .map(|i| {
            let spread: isize = rng.gen_range(-1..=1);
            let idx = (axis as isize + spread).rem_euclid(n_cells as isize) as usize;
            // Exponential deposit spectrum.
            let u: f64 = rng.gen_range(f64::EPSILON..1.0);
            Step {
                host_key: cells[idx].low,
                energy_deposit: -mean_deposit * u.ln(),
                track_id: 1 + (i % 7) as i32,
                pdg: if i % 3 == 0 { 22 } else { 11 },
                time: rng.gen_range(0.0..5.0),
            }
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ReadoutConfig::from_env();
    if let Some(t) = args.threshold {
        config.threshold_mev = t;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    config.keep_contributions |= args.truth;
    config.validate()?;

    let mut segmentation = ToySegmentation::from_descriptor(&args.descriptor)?;
    let layout = BarrelLayout {
        system: args.system,
        phi_segments: args.phi_segments,
        inner_radius: args.inner_radius,
        outer_radius: args.outer_radius,
    };
    let cells = layout.build(&mut segmentation)?;
    let segmentation = segmentation.into_shared();

    if !toycalo::hits::check_key_space(&*segmentation) {
        eprintln!("warning: layout does not fit in 32-bit host keys");
    }

    println!(
        "toycalo: {} cells, layout {}, readout {}, threshold {} MeV",
        cells.len(),
        segmentation.codec().layout().descriptor(),
        config.mode,
        config.threshold_mev
    );

    let mut writer = match &args.output {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut rows_written = 0usize;
    let mut inconsistent = 0usize;

    for event in 0..args.events {
        let regions: Vec<Vec<Step>> = (0..args.regions.max(1))
            .map(|_| shower_steps(&cells, args.steps, args.mean_deposit, &mut rng))
            .collect();

        let results = process_regions(&*segmentation, &config, &regions)?;

        for (region, hits) in results.iter().enumerate() {
            let report = validate_event(hits);
            if !report.is_consistent() {
                inconsistent += 1;
            }
            println!("event {:4} region {:2}: {}", event, region, report);

            if let Some(w) = writer.as_mut() {
                let rows = hits.to_flat();
                w.write_all(bytemuck::cast_slice(&rows))?;
                rows_written += rows.len();
            }
        }
    }

    if let Some(mut w) = writer {
        w.flush()?;
        if let Some(path) = &args.output {
            println!("wrote {} hit rows to {}", rows_written, path.display());
        }
    }

    if inconsistent > 0 {
        return Err(format!("{} inconsistent region(s)", inconsistent).into());
    }
    Ok(())
}
