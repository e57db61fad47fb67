/*!
Computes per-slice statistics of particle beams.

A beam is described by per-particle value arrays (positions, momenta, ...).
Slicing partitions the particles into longitudinal slices: each particle is
tagged with the index of its slice and the particles are sorted by that index
(so that each slice occupies a contiguous range of every value array).

# Overview

- A [`SliceSet`] describes the slicing. It lazily resolves (and caches) the
  [`SliceBounds`] of every slice the first time that a statistic is requested.
- [`mean_per_slice`], [`std_per_slice`], [`cov_per_slice`] and
  [`emittance_per_slice`] compute statistics for each slice. [`mean`],
  [`std`], [`covariance`] and [`emittance`] are the whole-beam counterparts.
- [`argsort`], [`apply_permutation`] and [`invert_permutation`] help to bring
  unsorted particle data into slice order.
- A [`RuntimeSpec`] selects between serial and threaded execution. The choice
  never changes the results.

Value arrays are passed as [`ValueArrayView`]s. The statistics only support
`f64` and `i32` data, other element types produce an error.

# Developer Guide

See the crate-level documentation for [`slicestat_nostd_internal`].

*/

#![deny(rustdoc::broken_intra_doc_links)]

// modules in this package
mod error;
mod executor;
mod permutation;
mod reducers;
mod runtime;
mod slicing;
mod stats;
mod values;

// symbols visible outside of the package
pub use error::Error;
pub use executor::{Executor, RayonExecutor, SerialExecutor};
pub use permutation::{apply_permutation, argsort, invert_permutation};
pub use reducers::{get_output, get_output_from_statepack_array};
pub use runtime::RuntimeSpec;
pub use slicestat_nostd_internal::{
    Comoment, CovarianceSet, Mean, Normalization, OutputDescr, Reducer, SliceReduction,
    SlicedComoment, SlicedMean, StatePackViewMut,
};
pub use slicing::{SliceBounds, SliceSet};
pub use stats::{
    cov_per_slice, covariance, emittance, emittance_from_cov, emittance_per_slice, mean,
    mean_per_slice, std, std_per_slice,
};
pub use values::{DType, ValueArray, ValueArrayView};
