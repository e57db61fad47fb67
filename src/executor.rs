//! Implements the backends that drive per-slice reductions
//!
//! Every backend reduces a given slice with the same sequential fold (see
//! [`fill_slice_accum_state`]), so all backends produce bitwise identical
//! results. The backends only differ in how slices are distributed.

use crate::Error;
use ndarray::Axis;
use ndarray::parallel::prelude::*;
use slicestat_nostd_internal::{
    AccumStateViewMut, SliceReduction, StatePackViewMut, fill_slice_accum_state,
    fill_statepack_serial,
};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Drives a [`SliceReduction`], filling a statepack with shape
/// `[accum_state_size, n_slices]`
pub trait Executor {
    fn drive_reduce(
        &self,
        out: &mut StatePackViewMut,
        spec: &(impl SliceReduction + Sync),
    ) -> Result<(), Error>;
}

fn check_out_shape(out: &StatePackViewMut, spec: &impl SliceReduction) -> Result<(), Error> {
    let [accum_state_size, n_slices] = spec.statepack_shape();
    if out.state_size() != accum_state_size {
        Err(Error::shape_mismatch(
            "each accum_state in the output statepack",
            accum_state_size,
            out.state_size(),
        ))
    } else if out.n_states() != n_slices {
        Err(Error::shape_mismatch(
            "the output statepack",
            n_slices,
            out.n_states(),
        ))
    } else {
        Ok(())
    }
}

/// Reduces one slice after another on the calling thread
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialExecutor;

impl Executor for SerialExecutor {
    fn drive_reduce(
        &self,
        out: &mut StatePackViewMut,
        spec: &(impl SliceReduction + Sync),
    ) -> Result<(), Error> {
        check_out_shape(out, spec)?;
        fill_statepack_serial(spec, out).map_err(Error::internal_legacy_adhoc)
    }
}

/// Distributes slices among the threads of a rayon thread pool
///
/// When no dedicated pool is provided, the global pool is used.
#[derive(Clone, Debug, Default)]
pub struct RayonExecutor {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonExecutor {
    /// Use rayon's global thread pool
    pub fn global() -> Self {
        RayonExecutor { pool: None }
    }

    /// Build a dedicated thread pool with `n_threads` threads
    pub fn with_threads(n_threads: NonZeroUsize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads.get())
            .thread_name(|i| format!("slicestat-{i}"))
            .build()
            .map_err(Error::thread_pool)?;
        log::debug!("built a dedicated pool with {} threads", n_threads);
        Ok(RayonExecutor {
            pool: Some(Arc::new(pool)),
        })
    }

    pub fn n_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Execute `f` inside of the pool used by this executor
    pub(crate) fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl Executor for RayonExecutor {
    fn drive_reduce(
        &self,
        out: &mut StatePackViewMut,
        spec: &(impl SliceReduction + Sync),
    ) -> Result<(), Error> {
        check_out_shape(out, spec)?;
        // each slice owns a column of the statepack, so the columns can be
        // handed out to separate threads
        self.install(|| {
            out.as_array_view_mut()
                .axis_iter_mut(Axis(1))
                .into_par_iter()
                .enumerate()
                .for_each(|(slice_index, column)| {
                    let mut accum_state = AccumStateViewMut::from_array_view(column);
                    fill_slice_accum_state(spec, &mut accum_state, slice_index);
                })
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slicestat_nostd_internal::{Normalization, SliceBoundsView, SlicedComoment, SlicedMean};

    #[test]
    fn serial_and_rayon_agree() {
        let lower = [0, 3, 3, 7];
        let upper = [3, 3, 7, 9];
        let u = [1.0, 2.5, -3.0, 4.0, 0.5, 6.0, 7.25, 8.0, -9.0];
        let v = [0.5, 1.0, 2.0, -4.0, 3.5, 1.5, 0.0, 2.0, 1.0];
        let bounds = SliceBoundsView::new(&lower, &upper, u.len()).unwrap();
        let spec = SlicedComoment::new(bounds, &u, &v, Normalization::ShiftedCount).unwrap();

        let mut serial_buf = [0.0; 8];
        let mut serial_out = StatePackViewMut::from_contiguous_slice(&mut serial_buf, 2, 4).unwrap();
        SerialExecutor.drive_reduce(&mut serial_out, &spec).unwrap();

        let executor = RayonExecutor::with_threads(NonZeroUsize::new(3).unwrap()).unwrap();
        assert_eq!(executor.n_threads(), 3);
        let mut rayon_buf = [0.0; 8];
        let mut rayon_out = StatePackViewMut::from_contiguous_slice(&mut rayon_buf, 2, 4).unwrap();
        executor.drive_reduce(&mut rayon_out, &spec).unwrap();

        assert_eq!(serial_buf, rayon_buf);
    }

    #[test]
    fn rayon_fills_statepack_in_place() {
        let lower = [0, 2, 2];
        let upper = [2, 2, 5];
        let u = [1.0, 3.0, 2.0, 4.0, 6.0];
        let bounds = SliceBoundsView::new(&lower, &upper, u.len()).unwrap();
        let spec = SlicedMean::new(bounds, &u).unwrap();

        // stale values must be overwritten, including for the empty slice
        let mut buf = [f64::NAN; 6];
        let mut out = StatePackViewMut::from_contiguous_slice(&mut buf, 2, 3).unwrap();
        RayonExecutor::with_threads(NonZeroUsize::new(2).unwrap())
            .unwrap()
            .drive_reduce(&mut out, &spec)
            .unwrap();
        // layout is [accum_state_size, n_slices]: totals, then weights
        assert_eq!(buf, [4.0, 0.0, 12.0, 2.0, 0.0, 3.0]);
    }

    #[test]
    fn wrong_out_shape() {
        let lower = [0];
        let upper = [2];
        let u = [1.0, 2.0];
        let bounds = SliceBoundsView::new(&lower, &upper, 2).unwrap();
        let spec = SlicedComoment::new(bounds, &u, &u, Normalization::Population).unwrap();

        let mut buf = [0.0; 4];
        let mut out = StatePackViewMut::from_contiguous_slice(&mut buf, 2, 2).unwrap();
        assert!(
            SerialExecutor
                .drive_reduce(&mut out, &spec)
                .unwrap_err()
                .is_shape_mismatch()
        );
        assert!(
            RayonExecutor::global()
                .drive_reduce(&mut out, &spec)
                .unwrap_err()
                .is_shape_mismatch()
        );
    }
}
