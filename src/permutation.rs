//! Sorting and permutation utilities
//!
//! The per-slice statistics assume that particles are sorted by slice index.
//! These utilities compute the permutation that sorts an array and apply a
//! permutation to other per-particle arrays so that they share that order.
//!
//! Permutations are `i32` arrays where `permuted[i] = values[perm[i]]`. Only
//! [`DType::Float64`] and [`DType::Int32`] arrays can be sorted or permuted.

use crate::{
    Error,
    error::saturating_i64,
    values::{DType, ValueArray, ValueArrayView},
};

/// checks that `len` can be indexed by an `i32` permutation
fn check_permutable_len(len: usize) -> Result<(), Error> {
    if len > (i32::MAX as usize) {
        Err(Error::integer_range(
            "the array length",
            saturating_i64(len),
            0,
            i64::from(i32::MAX),
        ))
    } else {
        Ok(())
    }
}

/// Return the (stable) permutation required to sort `values` in ascending
/// order.
///
/// `f64` values are ordered with [`f64::total_cmp`], so `NaN`s are placed
/// after every other value.
pub fn argsort<'a>(values: impl Into<ValueArrayView<'a>>) -> Result<Vec<i32>, Error> {
    let values = values.into();
    check_permutable_len(values.len())?;
    let mut perm: Vec<i32> = (0..values.len() as i32).collect();
    match values {
        ValueArrayView::Float64(s) => {
            perm.sort_by(|&a, &b| s[a as usize].total_cmp(&s[b as usize]));
        }
        ValueArrayView::Int32(s) => perm.sort_by_key(|&a| s[a as usize]),
        _ => return Err(Error::unsupported_type("argsort", values.dtype())),
    }
    Ok(perm)
}

/// checks that every entry of `perm` is a valid index into an array of
/// length `len`
fn check_perm_entries(perm: &[i32], len: usize) -> Result<(), Error> {
    if let Some(&bad) = perm.iter().find(|&&p| p < 0 || (p as usize) >= len) {
        Err(Error::integer_range(
            "a permutation entry",
            i64::from(bad),
            0,
            saturating_i64(len) - 1,
        ))
    } else {
        Ok(())
    }
}

fn gather<T: Copy>(values: &[T], perm: &[i32]) -> Vec<T> {
    perm.iter().map(|&p| values[p as usize]).collect()
}

/// Permute the entries of `values` according to `perm`. Returns a new array
/// equal to `values[perm]`.
pub fn apply_permutation<'a>(
    values: impl Into<ValueArrayView<'a>>,
    perm: &[i32],
) -> Result<ValueArray, Error> {
    let values = values.into();
    // check the type first, so that we fail fast before inspecting perm
    if !matches!(values.dtype(), DType::Float64 | DType::Int32) {
        return Err(Error::unsupported_type("apply_permutation", values.dtype()));
    } else if perm.len() != values.len() {
        return Err(Error::shape_mismatch(
            "the permutation array",
            values.len(),
            perm.len(),
        ));
    }
    check_perm_entries(perm, values.len())?;
    match values {
        ValueArrayView::Float64(s) => Ok(ValueArray::Float64(gather(s, perm))),
        ValueArrayView::Int32(s) => Ok(ValueArray::Int32(gather(s, perm))),
        _ => Err(Error::unsupported_type("apply_permutation", values.dtype())),
    }
}

/// Compute the inverse of `perm`, such that applying `perm` and then its
/// inverse restores the original order.
pub fn invert_permutation(perm: &[i32]) -> Result<Vec<i32>, Error> {
    check_permutable_len(perm.len())?;
    check_perm_entries(perm, perm.len())?;
    let mut inverse = vec![-1_i32; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        let slot = &mut inverse[p as usize];
        if *slot != -1 {
            return Err(Error::permutation(p));
        }
        *slot = i as i32;
    }
    Ok(inverse)
}
