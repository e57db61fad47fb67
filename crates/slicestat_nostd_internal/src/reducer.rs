//! Define basic accumulator machinery (that doesn't require the standard lib)
//!
//! # Accumulation Machinery
//!
//! The idea is that we want to compute statistics for each slice of a beam,
//! where each particle contributes a small vector of values `𝒚ᵢ` with a
//! weight `wᵢ`. The slicing itself is taken care of separately (see
//! [`crate::bounds`]); the accumulation machinery is responsible for
//! computing the statistic within a single slice.
//!
//! We draw a distinction between the current state of an accumulator and the
//! actual accumulation logic.
//! - We refer to the current state of a single accumulator as the
//!   `accum_state`.
//! - The accumulation logic is encapsulated by the functions implemented by
//!   the [`Reducer`] trait. A Reducer implements logic for modifying a single
//!   `accum_state` at a time.
//! - From the perspective of a reducer, the `accum_state` is packaged inside
//!   of the [`AccumStateView`] & [`AccumStateViewMut`] types.
//!
//! External code manages each slice's `accum_state`. A collection of
//! `accum_state`s is usually managed by a [`crate::StatePackViewMut`].

use crate::state::{AccumStateView, AccumStateViewMut};
use ndarray::ArrayViewMut1;

/// Instances of this element are consumed by the Reducer
///
/// `value[0]` and `value[1]` hold the pair of quantities that contribute to
/// the statistic. Reducers that only care about a single quantity ignore
/// `value[1]`.
#[derive(Clone, Copy, Debug)]
pub struct Datum {
    pub value: [f64; 2],
    pub weight: f64,
}

impl Datum {
    #[inline(always)]
    pub fn from_scalar_value(value: f64, weight: f64) -> Self {
        Datum {
            value: [value, 0.0],
            weight,
        }
    }

    #[inline(always)]
    pub fn from_pair(u: f64, v: f64, weight: f64) -> Self {
        Datum {
            value: [u, v],
            weight,
        }
    }
}

/// describes the output components from a single Reducer accum_state
pub enum OutputDescr {
    MultiScalarComp(&'static [&'static str]),
}

impl OutputDescr {
    /// the number of components to allocate per accum_state
    pub fn n_per_accum_state(&self) -> usize {
        match self {
            Self::MultiScalarComp(names) => names.len(),
        }
    }
}

/// Reducers operate on individual `accum_state`s.
pub trait Reducer {
    /// the number of f64 elements needed to track the accumulator data
    fn accum_state_size(&self) -> usize;

    /// initializes the storage tracking the acumulator's state.
    ///
    /// You need to call this function before you start working with the
    /// storage. You can also use this to reset the accumulator's state since
    /// it blindly overwrites any existing values.
    fn init_accum_state(&self, accum_state: &mut AccumStateViewMut);

    /// consume the datum to update the accum_state
    fn consume(&self, accum_state: &mut AccumStateViewMut, datum: &Datum);

    /// extract all output-values from a single accum_state. Expects `value` to
    /// have the shape given by `[self.output_descr().n_per_accum_state()]`
    /// and `accum_state` to have the shape `[self.accum_state_size()]`
    fn value_from_accum_state(&self, value: &mut ArrayViewMut1<f64>, accum_state: &AccumStateView);

    /// Describes the outputs produced from a single accum_state
    fn output_descr(&self) -> OutputDescr;
}

/// Computes the weighted mean of `value[0]`.
///
/// An accum_state that hasn't consumed any weight reports a mean of `0`
/// (rather than `NaN`), so that empty slices stay usable in downstream
/// arithmetic.
#[derive(Clone, Copy, Default)]
pub struct Mean;

impl Mean {
    const TOTAL: usize = 0;
    const WEIGHT: usize = 1;

    const VALUE_MEAN: usize = 0;
    const VALUE_WEIGHT: usize = 1;
    const OUTPUT_COMPONENTS: &'static [&'static str] = &["mean", "weight"];

    /// compute the mean directly from an accum_state
    #[inline]
    pub fn mean_from_accum_state(accum_state: &AccumStateView) -> f64 {
        let weight = accum_state[Mean::WEIGHT];
        if weight == 0.0 {
            0.0
        } else {
            accum_state[Mean::TOTAL] / weight
        }
    }
}

impl Reducer for Mean {
    fn accum_state_size(&self) -> usize {
        2_usize
    }

    fn init_accum_state(&self, accum_state: &mut AccumStateViewMut) {
        accum_state[Mean::TOTAL] = 0.0;
        accum_state[Mean::WEIGHT] = 0.0;
    }

    #[inline(always)]
    fn consume(&self, accum_state: &mut AccumStateViewMut, datum: &Datum) {
        accum_state[Mean::WEIGHT] += datum.weight;
        accum_state[Mean::TOTAL] += datum.value[0] * datum.weight;
    }

    fn output_descr(&self) -> OutputDescr {
        OutputDescr::MultiScalarComp(Mean::OUTPUT_COMPONENTS)
    }

    fn value_from_accum_state(&self, value: &mut ArrayViewMut1<f64>, accum_state: &AccumStateView) {
        value[[Mean::VALUE_MEAN]] = Mean::mean_from_accum_state(accum_state);
        value[[Mean::VALUE_WEIGHT]] = accum_state[Mean::WEIGHT];
    }
}

/// Specifies how a [`Comoment`] normalizes the accumulated sum of products
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// divide by the total weight, `n`
    Population,
    /// divide by `n + 1`.
    ///
    /// This matches the whole-beam covariance, `mean(x*y) * n / (n + 1)`.
    /// Downstream consumers depend on this exact scaling.
    ShiftedCount,
}

impl Normalization {
    #[inline]
    pub fn normalize(&self, product_sum: f64, weight: f64) -> f64 {
        match self {
            Normalization::Population if weight == 0.0 => 0.0,
            Normalization::Population => product_sum / weight,
            Normalization::ShiftedCount => product_sum / (weight + 1.0),
        }
    }
}

/// Accumulates the (weighted) sum of products `Σ w·y₀·y₁`.
///
/// This reducer expects to consume values that have already been centred
/// (i.e. the mean of each component has already been subtracted). Under that
/// assumption, the normalized output is the second central comoment: the
/// variance when both components hold the same quantity, the covariance
/// otherwise.
#[derive(Clone, Copy)]
pub struct Comoment {
    normalization: Normalization,
}

impl Comoment {
    const PRODUCT_SUM: usize = 0;
    const WEIGHT: usize = 1;

    const VALUE_COMOMENT: usize = 0;
    const VALUE_WEIGHT: usize = 1;
    const OUTPUT_COMPONENTS: &'static [&'static str] = &["comoment", "weight"];

    pub fn new(normalization: Normalization) -> Self {
        Self { normalization }
    }
}

impl Reducer for Comoment {
    fn accum_state_size(&self) -> usize {
        2_usize
    }

    fn init_accum_state(&self, accum_state: &mut AccumStateViewMut) {
        accum_state[Comoment::PRODUCT_SUM] = 0.0;
        accum_state[Comoment::WEIGHT] = 0.0;
    }

    #[inline(always)]
    fn consume(&self, accum_state: &mut AccumStateViewMut, datum: &Datum) {
        accum_state[Comoment::WEIGHT] += datum.weight;
        accum_state[Comoment::PRODUCT_SUM] += datum.weight * (datum.value[0] * datum.value[1]);
    }

    fn output_descr(&self) -> OutputDescr {
        OutputDescr::MultiScalarComp(Comoment::OUTPUT_COMPONENTS)
    }

    fn value_from_accum_state(&self, value: &mut ArrayViewMut1<f64>, accum_state: &AccumStateView) {
        let weight = accum_state[Comoment::WEIGHT];
        value[[Comoment::VALUE_COMOMENT]] = self
            .normalization
            .normalize(accum_state[Comoment::PRODUCT_SUM], weight);
        value[[Comoment::VALUE_WEIGHT]] = weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayViewMut1;

    fn single_output(reducer: &impl Reducer, storage: &[f64]) -> [f64; 2] {
        let mut out = [0.0; 2];
        reducer.value_from_accum_state(
            &mut ArrayViewMut1::from(&mut out[..]),
            &AccumStateView::from_contiguous_slice(storage),
        );
        out
    }

    #[test]
    fn mean_consume_twice() {
        let reducer = Mean;
        let mut storage = [0.0, 0.0];
        let mut accum_state = AccumStateViewMut::from_contiguous_slice(&mut storage);
        reducer.init_accum_state(&mut accum_state);
        reducer.consume(&mut accum_state, &Datum::from_scalar_value(4.0, 1.0));
        reducer.consume(&mut accum_state, &Datum::from_scalar_value(8.0, 1.0));
        assert_eq!(single_output(&reducer, &storage), [6.0, 2.0]);
    }

    #[test]
    fn mean_empty() {
        let reducer = Mean;
        let mut storage = [3.0, 3.0];
        reducer.init_accum_state(&mut AccumStateViewMut::from_contiguous_slice(&mut storage));
        assert_eq!(single_output(&reducer, &storage), [0.0, 0.0]);
    }

    #[test]
    fn comoment_normalizations() {
        // centred values: [-1, 1] paired with [-2, 2]
        for (normalization, expected) in [
            (Normalization::Population, 2.0),
            (Normalization::ShiftedCount, 4.0 / 3.0),
        ] {
            let reducer = Comoment::new(normalization);
            let mut storage = [0.0, 0.0];
            let mut accum_state = AccumStateViewMut::from_contiguous_slice(&mut storage);
            reducer.init_accum_state(&mut accum_state);
            reducer.consume(&mut accum_state, &Datum::from_pair(-1.0, -2.0, 1.0));
            reducer.consume(&mut accum_state, &Datum::from_pair(1.0, 2.0, 1.0));
            assert_eq!(single_output(&reducer, &storage), [expected, 2.0]);
        }
    }

    #[test]
    fn comoment_empty() {
        for normalization in [Normalization::Population, Normalization::ShiftedCount] {
            let reducer = Comoment::new(normalization);
            let mut storage = [1.0, 1.0];
            reducer.init_accum_state(&mut AccumStateViewMut::from_contiguous_slice(&mut storage));
            assert_eq!(single_output(&reducer, &storage), [0.0, 0.0]);
        }
    }
}
