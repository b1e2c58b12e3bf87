//! Independent processing of several sensitive regions.
//!
//! Every region gets its own [`CalorimeterAction`] and collections; only the
//! read-only position lookup is shared. With the `parallel` feature the
//! regions run on the rayon pool, otherwise one after another.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::CaloError;
use crate::hits::{CalorimeterAction, EventHits, Step};
use crate::segmentation::PositionLookup;
use crate::ReadoutConfig;

/// Conditionally parallel iterator over a slice.
macro_rules! maybe_par_iter {
    ($slice:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $slice.par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter()
        }
    }};
}

/// Accumulate one event per region. Output order matches `regions`.
pub fn process_regions<L>(
    lookup: &L,
    config: &ReadoutConfig,
    regions: &[Vec<Step>],
) -> Result<Vec<EventHits>, CaloError>
where
    L: PositionLookup + Sync + ?Sized,
{
    config.validate()?;

    let events = maybe_par_iter!(regions)
        .map(|steps| {
            let mut action = CalorimeterAction::new_unchecked(lookup, config.clone());
            action.process_all(steps);
            action.end_event()
        })
        .collect();
    Ok(events)
}
