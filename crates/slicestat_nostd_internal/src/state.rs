//! Introduces the [`AccumStateView`], [`AccumStateViewMut`] and
//! [`StatePackViewMut`] types
//!
//! Currently these simply wrap `ndarray::ArrayView1<f64>`,
//! `ndarray::ArrayViewMut1<f64>` and `ndarray::ArrayViewMut2<f64>`,
//! respectively. Keeping most references to ndarray inside of this file makes
//! it easier to move away from ndarray in the future (e.g. if we ever want to
//! hand a statepack to a GPU kernel).
//!
//! A statepack holds one `accum_state` per slice. The states are laid out
//! along axis 1, so a statepack for `n_slices` slices and a reducer with an
//! `accum_state_size` of `k` has the shape `[k, n_slices]`.

use core::ops::{Index, IndexMut};
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};

/// A read-only view of a single accumulator state
pub struct AccumStateView<'a> {
    data: ArrayView1<'a, f64>,
}

impl<'a> AccumStateView<'a> {
    pub fn from_array_view(data: ArrayView1<'a, f64>) -> Self {
        Self { data }
    }

    pub fn from_contiguous_slice(data: &'a [f64]) -> Self {
        Self {
            data: ArrayView1::from(data),
        }
    }

    pub fn as_array_view(&self) -> ArrayView1<'_, f64> {
        self.data.view()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Index<usize> for AccumStateView<'_> {
    type Output = f64;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

/// A mutable view of a single accumulator state
pub struct AccumStateViewMut<'a> {
    data: ArrayViewMut1<'a, f64>,
}

impl<'a> AccumStateViewMut<'a> {
    pub fn from_array_view(data: ArrayViewMut1<'a, f64>) -> Self {
        Self { data }
    }

    pub fn from_contiguous_slice(data: &'a mut [f64]) -> Self {
        Self {
            data: ArrayViewMut1::from(data),
        }
    }

    pub fn as_view(&self) -> AccumStateView<'_> {
        AccumStateView {
            data: self.data.view(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Index<usize> for AccumStateViewMut<'_> {
    type Output = f64;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for AccumStateViewMut<'_> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// Represents a collection of accumulator states (1 per slice)
///
/// # Note
/// There is some benefit to defining this even though it wraps ArrayViewMut2
/// since it helps contain all references to the ndarray package to a single
/// file.
pub struct StatePackViewMut<'a> {
    data: ArrayViewMut2<'a, f64>,
}

impl<'a> StatePackViewMut<'a> {
    pub fn from_array_view(array_view: ArrayViewMut2<'a, f64>) -> Self {
        Self { data: array_view }
    }

    /// Construct a statepack from a contiguous buffer holding `n_states`
    /// states, each with `state_size` entries
    pub fn from_contiguous_slice(
        data: &'a mut [f64],
        state_size: usize,
        n_states: usize,
    ) -> Result<Self, &'static str> {
        if data.len() != state_size * n_states {
            return Err("the buffer length doesn't match the statepack shape");
        }
        ArrayViewMut2::from_shape([state_size, n_states], data)
            .map(Self::from_array_view)
            .map_err(|_| "the buffer can't be viewed with the statepack shape")
    }

    pub fn get_state(&self, i: usize) -> AccumStateView<'_> {
        AccumStateView::from_array_view(self.data.index_axis(Axis(1), i))
    }

    pub fn get_state_mut(&mut self, i: usize) -> AccumStateViewMut<'_> {
        AccumStateViewMut::from_array_view(self.data.index_axis_mut(Axis(1), i))
    }

    pub fn state_size(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_states(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn as_array_view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn as_array_view_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.data.view_mut()
    }
}
