//! Defines [`SliceSet`], which describes how particles are assigned to slices,
//! and [`SliceBounds`], the cached location of each slice within the sorted
//! particle arrays.

use crate::{Error, error::saturating_i64, permutation::argsort};
use slicestat_nostd_internal::{BoundSearch, SliceBoundsView};
use std::ops::Range;
use std::sync::OnceLock;

/// The half-open index range that each slice occupies within the sorted
/// particle arrays.
///
/// `lower_bounds()[i]..upper_bounds()[i]` holds every particle in slice `i`.
/// Ranges never overlap and the lower bounds never decrease.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceBounds {
    lower: Vec<usize>,
    upper: Vec<usize>,
    n_particles: usize,
}

impl SliceBounds {
    fn resolve(slice_index_of_particle: &[i32], n_slices: usize) -> Result<Self, Error> {
        let n_particles = slice_index_of_particle.len();
        let strategy = BoundSearch::choose(n_particles, n_slices);
        let mut lower = vec![0; n_slices];
        let mut upper = vec![0; n_slices];
        strategy
            .fill(slice_index_of_particle, &mut lower, &mut upper)
            .map_err(Error::internal_legacy_adhoc)?;
        log::debug!(
            "resolved bounds of {n_slices} slices over {n_particles} particles ({strategy:?})"
        );
        Ok(SliceBounds {
            lower,
            upper,
            n_particles,
        })
    }

    pub fn lower_bounds(&self) -> &[usize] {
        &self.lower
    }

    pub fn upper_bounds(&self) -> &[usize] {
        &self.upper
    }

    pub fn n_slices(&self) -> usize {
        self.lower.len()
    }

    /// the range of particle indices occupied by `slice_index`
    pub fn range(&self, slice_index: usize) -> Range<usize> {
        self.lower[slice_index]..self.upper[slice_index]
    }

    /// the number of macroparticles in each slice
    pub fn macroparticles_per_slice(&self) -> Vec<usize> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(lo, up)| up - lo)
            .collect()
    }

    /// the range of particle indices that lie within any slice
    pub fn particles_within_cuts(&self) -> Range<usize> {
        // there is always at least 1 slice
        self.lower[0]..self.upper[self.upper.len() - 1]
    }

    pub(crate) fn as_view(&self) -> Result<SliceBoundsView<'_>, Error> {
        SliceBoundsView::new(&self.lower, &self.upper, self.n_particles)
            .map_err(Error::internal_legacy_adhoc)
    }
}

/// Describes how the particles of a beam are assigned to slices.
///
/// The slice index of each particle **must** be sorted in ascending order
/// (use [`SliceSet::from_unsorted`] when that isn't already the case).
/// Entries that lie outside of `[0, n_slices)` mark particles that lie
/// outside of every slice.
///
/// The [`SliceBounds`] are resolved the first time that they are needed and
/// are then reused by every later statistics request against the same
/// `SliceSet`. Because a `SliceSet` can't be mutated, the cached bounds never
/// go stale.
#[derive(Debug)]
pub struct SliceSet {
    slice_index_of_particle: Vec<i32>,
    n_slices: usize,
    bounds: OnceLock<SliceBounds>,
}

impl SliceSet {
    /// Construct a new SliceSet from sorted slice indices
    pub fn new(slice_index_of_particle: Vec<i32>, n_slices: usize) -> Result<Self, Error> {
        if n_slices == 0 || n_slices > (i32::MAX as usize) {
            return Err(Error::integer_range(
                "n_slices",
                saturating_i64(n_slices),
                1,
                i64::from(i32::MAX),
            ));
        }
        debug_assert!(
            slice_index_of_particle.is_sorted(),
            "slice_index_of_particle must be sorted"
        );
        Ok(SliceSet {
            slice_index_of_particle,
            n_slices,
            bounds: OnceLock::new(),
        })
    }

    /// Construct a new SliceSet from slice indices in arbitrary order.
    ///
    /// Returns the SliceSet and the permutation that sorted the indices. The
    /// permutation must be applied (see [`crate::apply_permutation`]) to
    /// every value array before it is used with the SliceSet.
    pub fn from_unsorted(
        slice_index_of_particle: &[i32],
        n_slices: usize,
    ) -> Result<(Self, Vec<i32>), Error> {
        let perm = argsort(slice_index_of_particle)?;
        let sorted = perm
            .iter()
            .map(|&p| slice_index_of_particle[p as usize])
            .collect();
        Ok((SliceSet::new(sorted, n_slices)?, perm))
    }

    pub fn n_slices(&self) -> usize {
        self.n_slices
    }

    pub fn n_particles(&self) -> usize {
        self.slice_index_of_particle.len()
    }

    pub fn slice_index_of_particle(&self) -> &[i32] {
        &self.slice_index_of_particle
    }

    /// Returns the slice bounds, resolving them on the first call.
    ///
    /// If multiple threads race to make the first call, the bounds are still
    /// only resolved once.
    pub fn bounds(&self) -> Result<&SliceBounds, Error> {
        if let Some(bounds) = self.bounds.get() {
            return Ok(bounds);
        }
        // resolution can only fail if the constructor's checks were bypassed,
        // so we resolve outside of the OnceLock to propagate that error
        let resolved = SliceBounds::resolve(&self.slice_index_of_particle, self.n_slices)?;
        Ok(self.bounds.get_or_init(|| resolved))
    }

    /// the number of macroparticles in each slice
    pub fn macroparticles_per_slice(&self) -> Result<Vec<usize>, Error> {
        Ok(self.bounds()?.macroparticles_per_slice())
    }

    /// the range of particle indices that lie within any slice
    pub fn particles_within_cuts(&self) -> Result<Range<usize>, Error> {
        Ok(self.bounds()?.particles_within_cuts())
    }
}
