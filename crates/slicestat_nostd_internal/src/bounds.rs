//! Resolve the boundaries of each slice within a sorted particle array
//!
//! Particles are assumed to be sorted by slice index. For slice `i`, the
//! half-open range `[lower[i], upper[i])` holds every particle whose slice
//! index is `i`:
//! - `lower[i]` is the first position where `slice_index >= i`
//! - `upper[i]` is the first position where `slice_index > i`
//!
//! Particles whose slice index lies outside of `[0, n_slices)` (e.g. a
//! negative sentinel) are simply never covered by any range. Because the
//! indices are sorted, they gather at the front and back of the array.
//!
//! There are 2 equally valid ways to fill in the bounds:
//! 1. bisection: a pair of binary searches per slice
//! 2. a linear merge: a single pass that walks the particle array and the
//!    sequence of slice indices at the same time
//!
//! The merge is the better choice when the particle count and the slice
//! count have comparable magnitudes. [`BoundSearch::choose`] encodes that
//! heuristic. Both strategies produce identical output.

/// first position in `sorted` where `sorted[pos] >= key`
#[inline]
pub fn lower_bound(sorted: &[i32], key: i32) -> usize {
    sorted.partition_point(|&x| x < key)
}

/// first position in `sorted` where `sorted[pos] > key`
#[inline]
pub fn upper_bound(sorted: &[i32], key: i32) -> usize {
    sorted.partition_point(|&x| x <= key)
}

fn check_bound_lengths(lower: &[usize], upper: &[usize]) -> Result<(), &'static str> {
    if lower.len() != upper.len() {
        Err("lower and upper must have the same length")
    } else if lower.is_empty() {
        Err("there must be at least 1 slice")
    } else if lower.len() > (i32::MAX as usize) {
        Err("the number of slices can't exceed i32::MAX")
    } else {
        Ok(())
    }
}

/// Fill `lower` & `upper` with the slice boundaries by bisecting `sorted`
/// twice per slice.
pub fn fill_bounds_bisect(
    sorted: &[i32],
    lower: &mut [usize],
    upper: &mut [usize],
) -> Result<(), &'static str> {
    check_bound_lengths(lower, upper)?;
    for (i, (lo, up)) in lower.iter_mut().zip(upper.iter_mut()).enumerate() {
        let key = i as i32;
        *lo = lower_bound(sorted, key);
        *up = upper_bound(sorted, key);
    }
    debug_assert!(bounds_are_consistent(lower, upper, sorted.len()));
    Ok(())
}

/// Fill `lower` & `upper` with the slice boundaries with a single linear
/// pass over `sorted`.
pub fn fill_bounds_merge(
    sorted: &[i32],
    lower: &mut [usize],
    upper: &mut [usize],
) -> Result<(), &'static str> {
    check_bound_lengths(lower, upper)?;
    let len = sorted.len();
    let mut pos = 0;
    for (i, (lo, up)) in lower.iter_mut().zip(upper.iter_mut()).enumerate() {
        let key = i as i32;
        while pos < len && sorted[pos] < key {
            pos += 1;
        }
        *lo = pos;
        while pos < len && sorted[pos] == key {
            pos += 1;
        }
        *up = pos;
    }
    debug_assert!(bounds_are_consistent(lower, upper, len));
    Ok(())
}

/// Checks the invariants that hold for bounds derived from a sorted array:
/// each range is well-formed, ranges never overlap and lower bounds never
/// decrease.
///
/// Visible corruption (e.g. from an unsorted input) shows up as a violation
/// of one of these properties.
pub fn bounds_are_consistent(lower: &[usize], upper: &[usize], n_particles: usize) -> bool {
    if lower.len() != upper.len() {
        return false;
    }
    let ranges_ok = lower
        .iter()
        .zip(upper.iter())
        .all(|(&lo, &up)| lo <= up && up <= n_particles);
    let ordered_ok = upper
        .iter()
        .zip(lower.iter().skip(1))
        .all(|(&prev_up, &next_lo)| prev_up <= next_lo);
    ranges_ok && ordered_ok
}

/// The strategy used to resolve slice boundaries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundSearch {
    Bisect,
    Merge,
}

impl BoundSearch {
    /// Pick the cheaper strategy for the given problem size.
    ///
    /// Bisection costs roughly `2 * n_slices * log2(n_particles)`
    /// comparisons, while the merge costs `n_particles + n_slices`.
    pub fn choose(n_particles: usize, n_slices: usize) -> Self {
        // ilog2 panics on 0
        let log2_particles = (n_particles.max(1).ilog2() as usize) + 1;
        let bisect_cost = n_slices.saturating_mul(2 * log2_particles);
        let merge_cost = n_particles.saturating_add(n_slices);
        if bisect_cost < merge_cost {
            BoundSearch::Bisect
        } else {
            BoundSearch::Merge
        }
    }

    pub fn fill(
        &self,
        sorted: &[i32],
        lower: &mut [usize],
        upper: &mut [usize],
    ) -> Result<(), &'static str> {
        match self {
            BoundSearch::Bisect => fill_bounds_bisect(sorted, lower, upper),
            BoundSearch::Merge => fill_bounds_merge(sorted, lower, upper),
        }
    }
}
