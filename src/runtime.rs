//! Runtime configuration
//!
//! A [`RuntimeSpec`] holds runtime-parameters that don't have any impact on
//! the output (serial and threaded runs are bitwise identical), but impact
//! performance. It's passed as the final argument to every statistics
//! function.

use crate::{
    Error,
    executor::{Executor, RayonExecutor, SerialExecutor},
};
use slicestat_nostd_internal::{SliceReduction, StatePackViewMut};
use std::num::NonZeroUsize;

#[derive(Clone, Debug)]
enum Backend {
    Serial(SerialExecutor),
    Threads(RayonExecutor),
}

/// Specifies how calculations are carried out
///
/// The default is serial execution on the calling thread.
#[derive(Clone, Debug)]
pub struct RuntimeSpec {
    backend: Backend,
}

impl Default for RuntimeSpec {
    fn default() -> Self {
        RuntimeSpec::serial()
    }
}

impl RuntimeSpec {
    /// Reduce every slice on the calling thread
    pub fn serial() -> Self {
        RuntimeSpec {
            backend: Backend::Serial(SerialExecutor),
        }
    }

    /// Distribute slices (and independent reductions) over rayon's global
    /// thread pool
    pub fn global_threads() -> Self {
        RuntimeSpec {
            backend: Backend::Threads(RayonExecutor::global()),
        }
    }

    /// Distribute slices (and independent reductions) over a dedicated pool
    /// of `n_threads` threads
    pub fn threads(n_threads: NonZeroUsize) -> Result<Self, Error> {
        Ok(RuntimeSpec {
            backend: Backend::Threads(RayonExecutor::with_threads(n_threads)?),
        })
    }

    pub fn is_serial(&self) -> bool {
        matches!(self.backend, Backend::Serial(_))
    }

    /// the number of threads that may participate in a calculation
    pub fn n_threads(&self) -> usize {
        match &self.backend {
            Backend::Serial(_) => 1,
            Backend::Threads(executor) => executor.n_threads(),
        }
    }

    /// Run 2 independent tasks and wait for both to finish.
    ///
    /// The tasks run one after the other in serial mode and may run
    /// concurrently otherwise.
    pub(crate) fn join<A, B, RA, RB>(&self, task_a: A, task_b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        match &self.backend {
            Backend::Serial(_) => (task_a(), task_b()),
            Backend::Threads(executor) => executor.install(|| rayon::join(task_a, task_b)),
        }
    }

    /// Run 3 independent tasks and wait for all of them to finish.
    pub(crate) fn join3<A, B, C, RA, RB, RC>(
        &self,
        task_a: A,
        task_b: B,
        task_c: C,
    ) -> (RA, RB, RC)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        C: FnOnce() -> RC + Send,
        RA: Send,
        RB: Send,
        RC: Send,
    {
        let (ra, (rb, rc)) = self.join(task_a, || self.join(task_b, task_c));
        (ra, rb, rc)
    }
}

impl Executor for RuntimeSpec {
    fn drive_reduce(
        &self,
        out: &mut StatePackViewMut,
        spec: &(impl SliceReduction + Sync),
    ) -> Result<(), Error> {
        log::trace!("driving a reduction over {} slices", spec.n_slices());
        match &self.backend {
            Backend::Serial(executor) => executor.drive_reduce(out, spec),
            Backend::Threads(executor) => executor.drive_reduce(out, spec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let runtime = RuntimeSpec::default();
        assert!(runtime.is_serial());
        assert_eq!(runtime.n_threads(), 1);
    }

    #[test]
    fn dedicated_pool() {
        let runtime = RuntimeSpec::threads(NonZeroUsize::new(2).unwrap()).unwrap();
        assert!(!runtime.is_serial());
        assert_eq!(runtime.n_threads(), 2);
    }

    #[test]
    fn join_order() {
        for runtime in [RuntimeSpec::serial(), RuntimeSpec::global_threads()] {
            let (a, b, c) = runtime.join3(|| 1, || "two", || 3.0);
            assert_eq!((a, b, c), (1, "two", 3.0));
        }
    }
}
