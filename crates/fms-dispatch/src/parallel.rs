//! Batch execution of independent dispatchers.
//!
//! Each dispatcher is self-contained (own network copy, fleet, stations and
//! RNG streams), so a batch parallelises trivially.  A single dispatcher is
//! always stepped sequentially.

use fms_spatial::Router;

use crate::observer::NoopObserver;
use crate::policy::DispatchPolicy;
use crate::stats::FleetStats;
use crate::Dispatcher;

/// Advance every dispatcher by `ticks` ticks and return their final stats in
/// input order.
///
/// With the `parallel` feature the batch runs on Rayon's thread pool;
/// results are identical either way.
pub fn run_independent<R: Router, P: DispatchPolicy>(
    dispatchers: &mut [Dispatcher<R, P>],
    ticks:       u64,
) -> Vec<FleetStats> {
    let run = |d: &mut Dispatcher<R, P>| {
        d.run_ticks(ticks, &mut NoopObserver);
        d.stats()
    };

    #[cfg(not(feature = "parallel"))]
    {
        dispatchers.iter_mut().map(run).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        dispatchers.par_iter_mut().map(run).collect()
    }
}
