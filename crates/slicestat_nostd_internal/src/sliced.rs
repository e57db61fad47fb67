//! This implements per-slice reductions over particle data that has already
//! been sorted by slice index.
//!
//! The slicing is described by a [`SliceBoundsView`]. Each slice occupies a
//! contiguous range of the particle arrays, so a slice can be reduced with a
//! sequential fold over its range without touching any other slice. There is
//! no data dependency between slices: they may be processed in any order or
//! concurrently (that's the job of an executor in the `slicestat` crate).
//!
//! The reductions are described by types implementing [`SliceReduction`].

use crate::bounds::bounds_are_consistent;
use crate::reducer::{Comoment, Datum, Mean, Normalization, Reducer};
use crate::state::{AccumStateViewMut, StatePackViewMut};
use core::ops::Range;

/// A read-only view of resolved slice bounds
#[derive(Clone, Copy)]
pub struct SliceBoundsView<'a> {
    lower: &'a [usize],
    upper: &'a [usize],
    n_particles: usize,
}

impl<'a> SliceBoundsView<'a> {
    pub fn new(
        lower: &'a [usize],
        upper: &'a [usize],
        n_particles: usize,
    ) -> Result<Self, &'static str> {
        if lower.len() != upper.len() {
            Err("lower and upper bounds must have the same length")
        } else if lower.is_empty() {
            Err("there must be at least 1 slice")
        } else if upper.iter().any(|&up| up > n_particles) {
            Err("a slice bound exceeds the number of particles")
        } else {
            debug_assert!(bounds_are_consistent(lower, upper, n_particles));
            Ok(Self {
                lower,
                upper,
                n_particles,
            })
        }
    }

    #[inline]
    pub fn n_slices(&self) -> usize {
        self.lower.len()
    }

    #[inline]
    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    #[inline]
    pub fn range(&self, slice_index: usize) -> Range<usize> {
        self.lower[slice_index]..self.upper[slice_index]
    }

    pub fn lower(&self) -> &'a [usize] {
        self.lower
    }

    pub fn upper(&self) -> &'a [usize] {
        self.upper
    }
}

/// Used for specifying the details of a per-slice reduction, providing an
/// interface for external code to carry it out, potentially in parallel.
///
/// At a high-level, types implementing this trait:
/// 1. own a [`Reducer`] and the per-particle data
/// 2. know how to fold the particles of a single slice into a freshly
///    initialized `accum_state`
///
/// A single slice's contributions are never split between workers, so each
/// `accum_state` is filled by exactly 1 sequential fold.
pub trait SliceReduction {
    type ReducerType: Reducer;

    /// return a reference to the reducer
    fn get_reducer(&self) -> &Self::ReducerType;

    /// the number of slices (and accum_states) in the reduction
    fn n_slices(&self) -> usize;

    /// Fold every particle of the slice `slice_index` into `accum_state`.
    ///
    /// `accum_state` must already be initialized.
    fn add_slice_contributions(&self, accum_state: &mut AccumStateViewMut, slice_index: usize);

    /// the shape of the statepack used to hold the outputs
    fn statepack_shape(&self) -> [usize; 2] {
        [self.get_reducer().accum_state_size(), self.n_slices()]
    }
}

/// Initialize `accum_state` and fill it with the contributions of a single
/// slice.
pub fn fill_slice_accum_state(
    spec: &impl SliceReduction,
    accum_state: &mut AccumStateViewMut,
    slice_index: usize,
) {
    spec.get_reducer().init_accum_state(accum_state);
    spec.add_slice_contributions(accum_state, slice_index);
}

/// Serially fill every `accum_state` in `statepack`
pub fn fill_statepack_serial(
    spec: &impl SliceReduction,
    statepack: &mut StatePackViewMut,
) -> Result<(), &'static str> {
    if [statepack.state_size(), statepack.n_states()] != spec.statepack_shape() {
        return Err("the statepack doesn't have the correct shape");
    }
    for slice_index in 0..spec.n_slices() {
        fill_slice_accum_state(spec, &mut statepack.get_state_mut(slice_index), slice_index);
    }
    Ok(())
}

/// Computes the mean of `values` (the first pass of the two-pass
/// statistics).
#[inline]
pub fn mean_of(values: &[f64]) -> f64 {
    let reducer = Mean;
    let mut storage = [0.0; 2];
    let mut accum_state = AccumStateViewMut::from_contiguous_slice(&mut storage);
    reducer.init_accum_state(&mut accum_state);
    for value in values {
        reducer.consume(&mut accum_state, &Datum::from_scalar_value(*value, 1.0));
    }
    Mean::mean_from_accum_state(&accum_state.as_view())
}

/// The per-slice mean of a value array
pub struct SlicedMean<'a> {
    bounds: SliceBoundsView<'a>,
    values: &'a [f64],
    reducer: Mean,
}

impl<'a> SlicedMean<'a> {
    pub fn new(bounds: SliceBoundsView<'a>, values: &'a [f64]) -> Result<Self, &'static str> {
        if values.len() != bounds.n_particles() {
            Err("values must hold 1 entry per particle")
        } else {
            Ok(Self {
                bounds,
                values,
                reducer: Mean,
            })
        }
    }
}

impl SliceReduction for SlicedMean<'_> {
    type ReducerType = Mean;

    fn get_reducer(&self) -> &Self::ReducerType {
        &self.reducer
    }

    fn n_slices(&self) -> usize {
        self.bounds.n_slices()
    }

    fn add_slice_contributions(&self, accum_state: &mut AccumStateViewMut, slice_index: usize) {
        for value in &self.values[self.bounds.range(slice_index)] {
            self.reducer
                .consume(accum_state, &Datum::from_scalar_value(*value, 1.0));
        }
    }
}

/// The per-slice second central comoment of a pair of value arrays.
///
/// Each slice is reduced in 2 passes: the first pass computes the slice-mean
/// of both arrays and the second pass accumulates products of the deviations
/// from those means. When `u` and `v` are the same array, this computes the
/// variance.
pub struct SlicedComoment<'a> {
    bounds: SliceBoundsView<'a>,
    u: &'a [f64],
    v: &'a [f64],
    reducer: Comoment,
}

impl<'a> SlicedComoment<'a> {
    pub fn new(
        bounds: SliceBoundsView<'a>,
        u: &'a [f64],
        v: &'a [f64],
        normalization: Normalization,
    ) -> Result<Self, &'static str> {
        let n_particles = bounds.n_particles();
        if (u.len() != n_particles) || (v.len() != n_particles) {
            Err("u and v must hold 1 entry per particle")
        } else {
            Ok(Self {
                bounds,
                u,
                v,
                reducer: Comoment::new(normalization),
            })
        }
    }
}

impl SliceReduction for SlicedComoment<'_> {
    type ReducerType = Comoment;

    fn get_reducer(&self) -> &Self::ReducerType {
        &self.reducer
    }

    fn n_slices(&self) -> usize {
        self.bounds.n_slices()
    }

    fn add_slice_contributions(&self, accum_state: &mut AccumStateViewMut, slice_index: usize) {
        let range = self.bounds.range(slice_index);
        let u = &self.u[range.clone()];
        let v = &self.v[range];

        // first pass
        let mean_u = mean_of(u);
        let mean_v = mean_of(v);

        // second pass
        for (u_i, v_i) in u.iter().zip(v.iter()) {
            let datum = Datum::from_pair(u_i - mean_u, v_i - mean_v, 1.0);
            self.reducer.consume(accum_state, &datum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayViewMut1;

    // slice_index_of_particle = [0, 0, 1, 1, 1, 2]
    const LOWER: [usize; 3] = [0, 2, 5];
    const UPPER: [usize; 3] = [2, 5, 6];
    const U: [f64; 6] = [1.0, 3.0, 2.0, 4.0, 6.0, 10.0];

    fn reduce_component(spec: &impl SliceReduction) -> [f64; 3] {
        let mut buf = [0.0; 6];
        let mut statepack = StatePackViewMut::from_contiguous_slice(&mut buf, 2, 3).unwrap();
        fill_statepack_serial(spec, &mut statepack).unwrap();
        // grab the first output component of each slice
        let mut out = [0.0; 3];
        for (i, out_val) in out.iter_mut().enumerate() {
            let mut value = [0.0; 2];
            spec.get_reducer().value_from_accum_state(
                &mut ArrayViewMut1::from(&mut value[..]),
                &statepack.get_state(i),
            );
            *out_val = value[0];
        }
        out
    }

    #[test]
    fn sliced_mean() {
        let bounds = SliceBoundsView::new(&LOWER, &UPPER, 6).unwrap();
        let spec = SlicedMean::new(bounds, &U).unwrap();
        assert_eq!(reduce_component(&spec), [2.0, 4.0, 10.0]);
    }

    #[test]
    fn sliced_variance() {
        let bounds = SliceBoundsView::new(&LOWER, &UPPER, 6).unwrap();
        let spec = SlicedComoment::new(bounds, &U, &U, Normalization::Population).unwrap();
        assert_eq!(reduce_component(&spec), [1.0, 8.0 / 3.0, 0.0]);
    }

    #[test]
    fn sliced_shifted_covariance() {
        let bounds = SliceBoundsView::new(&LOWER, &UPPER, 6).unwrap();
        let v = [2.0, 6.0, 4.0, 8.0, 12.0, 20.0];
        let spec = SlicedComoment::new(bounds, &U, &v, Normalization::ShiftedCount).unwrap();
        // slice 0: deviations (-1,-2), (1,2) -> sum 4, n = 2
        // slice 1: deviations (-2,-4), (0,0), (2,4) -> sum 16, n = 3
        assert_eq!(reduce_component(&spec), [4.0 / 3.0, 16.0 / 4.0, 0.0]);
    }

    #[test]
    fn empty_slice() {
        // the middle slice holds no particles
        let lower = [0, 2, 2];
        let upper = [2, 2, 4];
        let values = [1.0, 1.0, 5.0, 5.0];
        let bounds = SliceBoundsView::new(&lower, &upper, 4).unwrap();
        let spec = SlicedMean::new(bounds, &values).unwrap();
        assert_eq!(reduce_component(&spec), [1.0, 0.0, 5.0]);
    }

    #[test]
    fn construction_errors() {
        assert!(SliceBoundsView::new(&LOWER, &UPPER[..2], 6).is_err());
        assert!(SliceBoundsView::new(&LOWER, &UPPER, 5).is_err());
        assert!(SliceBoundsView::new(&[], &[], 0).is_err());

        let bounds = SliceBoundsView::new(&LOWER, &UPPER, 6).unwrap();
        assert!(SlicedMean::new(bounds, &U[..5]).is_err());
        assert!(SlicedComoment::new(bounds, &U, &U[..4], Normalization::Population).is_err());
    }

    #[test]
    fn wrong_statepack_shape() {
        let bounds = SliceBoundsView::new(&LOWER, &UPPER, 6).unwrap();
        let spec = SlicedMean::new(bounds, &U).unwrap();
        let mut buf = [0.0; 4];
        let mut statepack = StatePackViewMut::from_contiguous_slice(&mut buf, 2, 2).unwrap();
        assert!(fill_statepack_serial(&spec, &mut statepack).is_err());
    }
}
