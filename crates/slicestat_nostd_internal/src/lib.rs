/*!
The `no_std` machinery behind the `slicestat` crate.

This crate holds everything needed to reduce particle data slice-by-slice
without relying upon the standard library (the hope is that this makes it
easier to eventually drive the same logic from GPU kernels):
- [`bounds`]: resolving the range of a sorted particle array that each slice
  occupies
- [`Reducer`] and friends: the accumulation logic for a single slice
- [`SliceReduction`]: describes a full per-slice reduction so that external
  code (an executor) can carry it out
- [`CovarianceSet`]: the arithmetic that composes covariances into an
  emittance

Errors are currently reported as `&'static str`. The `slicestat` crate wraps
them in a proper error type.
*/
#![no_std]

pub mod bounds;
mod emittance;
mod reducer;
mod sliced;
mod state;

pub use bounds::{BoundSearch, bounds_are_consistent, lower_bound, upper_bound};
pub use emittance::CovarianceSet;
pub use reducer::{Comoment, Datum, Mean, Normalization, OutputDescr, Reducer};
pub use sliced::{
    SliceBoundsView, SliceReduction, SlicedComoment, SlicedMean, fill_slice_accum_state,
    fill_statepack_serial, mean_of,
};
pub use state::{AccumStateView, AccumStateViewMut, StatePackViewMut};
