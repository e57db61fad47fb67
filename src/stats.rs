//! The public statistics routines
//!
//! Every routine validates all of its value arrays (element type, then
//! length) before any reduction begins. The per-slice routines return 1 entry
//! per slice. A slice without particles produces `0` rather than an error.

use crate::{
    Error, RuntimeSpec, SliceSet, ValueArrayView, executor::Executor, reducers::get_output,
};
use slicestat_nostd_internal::{
    CovarianceSet, Normalization, SliceBoundsView, SliceReduction, SlicedComoment, SlicedMean,
    StatePackViewMut,
};
use std::borrow::Cow;

/// converts `values` to `f64` on behalf of `operation` and checks that it
/// holds `n_particles` entries
fn prepare<'a>(
    operation: &'static str,
    name: &'static str,
    values: ValueArrayView<'a>,
    n_particles: usize,
) -> Result<Cow<'a, [f64]>, Error> {
    let converted = values.as_f64(operation)?;
    if converted.len() != n_particles {
        Err(Error::shape_mismatch(name, n_particles, converted.len()))
    } else {
        Ok(converted)
    }
}

/// drive `spec` with `runtime` and pull out the `component` output
fn reduce_per_slice(
    spec: &(impl SliceReduction + Sync),
    component: &'static str,
    runtime: &RuntimeSpec,
) -> Result<Vec<f64>, Error> {
    let [accum_state_size, n_slices] = spec.statepack_shape();
    let mut buffer = vec![0.0; accum_state_size * n_slices];
    let mut statepack =
        StatePackViewMut::from_contiguous_slice(&mut buffer, accum_state_size, n_slices)
            .map_err(Error::internal_legacy_adhoc)?;
    runtime.drive_reduce(&mut statepack, spec)?;

    get_output(spec.get_reducer(), &statepack)
        .remove(component)
        .ok_or(Error::internal_legacy_adhoc(
            "the reducer didn't produce the requested output component",
        ))
}

fn comoment_per_slice(
    bounds: SliceBoundsView,
    u: &[f64],
    v: &[f64],
    normalization: Normalization,
    runtime: &RuntimeSpec,
) -> Result<Vec<f64>, Error> {
    let spec =
        SlicedComoment::new(bounds, u, v, normalization).map_err(Error::internal_legacy_adhoc)?;
    reduce_per_slice(&spec, "comoment", runtime)
}

/// Computes the mean of `u` within each slice.
///
/// Empty slices have a mean of `0`.
pub fn mean_per_slice<'a>(
    slices: &SliceSet,
    u: impl Into<ValueArrayView<'a>>,
    runtime: &RuntimeSpec,
) -> Result<Vec<f64>, Error> {
    let u = prepare("mean_per_slice", "u", u.into(), slices.n_particles())?;
    let bounds = slices.bounds()?.as_view()?;
    let spec = SlicedMean::new(bounds, &u).map_err(Error::internal_legacy_adhoc)?;
    reduce_per_slice(&spec, "mean", runtime)
}

/// Computes the (population) standard deviation of `u` within each slice.
///
/// Each slice is processed in 2 passes (the mean, then the mean squared
/// deviation). Slices holding 0 or 1 particles have a standard deviation of
/// `0`.
pub fn std_per_slice<'a>(
    slices: &SliceSet,
    u: impl Into<ValueArrayView<'a>>,
    runtime: &RuntimeSpec,
) -> Result<Vec<f64>, Error> {
    let u = prepare("std_per_slice", "u", u.into(), slices.n_particles())?;
    let bounds = slices.bounds()?.as_view()?;
    let mut out = comoment_per_slice(bounds, &u, &u, Normalization::Population, runtime)?;
    out.iter_mut().for_each(|variance| *variance = variance.sqrt());
    Ok(out)
}

/// Computes the covariance of `u` and `v` within each slice.
///
/// The sum of the products of deviations from the slice means is divided by
/// `n + 1` (where `n` counts the particles in the slice). This matches
/// [`covariance`], which computes `mean(u·v)·n/(n+1)` over centred data.
pub fn cov_per_slice<'a, 'b>(
    slices: &SliceSet,
    u: impl Into<ValueArrayView<'a>>,
    v: impl Into<ValueArrayView<'b>>,
    runtime: &RuntimeSpec,
) -> Result<Vec<f64>, Error> {
    let n_particles = slices.n_particles();
    let u = prepare("cov_per_slice", "u", u.into(), n_particles)?;
    let v = prepare("cov_per_slice", "v", v.into(), n_particles)?;
    let bounds = slices.bounds()?.as_view()?;
    comoment_per_slice(bounds, &u, &v, Normalization::ShiftedCount, runtime)
}

/// Composes a set of covariances into an emittance.
///
/// A `dp_dp` of `0` isn't an error: the result is non-finite.
pub fn emittance_from_cov(covs: &CovarianceSet) -> f64 {
    covs.squared_emittance().sqrt()
}

/// Computes the emittance of the `(u, up)` phase space within each slice,
/// optionally correcting for the dispersion contribution of `dp`.
///
/// The required covariance reductions are independent and may run
/// concurrently (depending on `runtime`). When several of them fail, the error
/// of the first failing reduction (in the order `(u,u)`, `(up,up)`, `(u,up)`,
/// `(u,dp)`, `(up,dp)`, `(dp,dp)`) is reported.
pub fn emittance_per_slice<'a, 'b, 'c>(
    slices: &SliceSet,
    u: impl Into<ValueArrayView<'a>>,
    up: impl Into<ValueArrayView<'b>>,
    dp: Option<ValueArrayView<'c>>,
    runtime: &RuntimeSpec,
) -> Result<Vec<f64>, Error> {
    let n_particles = slices.n_particles();
    let u = prepare("emittance_per_slice", "u", u.into(), n_particles)?;
    let up = prepare("emittance_per_slice", "up", up.into(), n_particles)?;
    let dp = match dp {
        Some(dp) => Some(prepare("emittance_per_slice", "dp", dp, n_particles)?),
        None => None,
    };
    let bounds = slices.bounds()?.as_view()?;

    let cov = |a: &[f64], b: &[f64]| {
        comoment_per_slice(bounds, a, b, Normalization::ShiftedCount, runtime)
    };
    let ((u_u, up_up, u_up), dispersion) = runtime.join(
        || runtime.join3(|| cov(&u, &u), || cov(&up, &up), || cov(&u, &up)),
        || {
            dp.as_deref().map(|dp| {
                runtime.join3(|| cov(&u, dp), || cov(&up, dp), || cov(dp, dp))
            })
        },
    );

    let (u_u, up_up, u_up) = (u_u?, up_up?, u_up?);
    let out = match dispersion {
        None => (0..bounds.n_slices())
            .map(|i| {
                emittance_from_cov(&CovarianceSet::without_dispersion(u_u[i], up_up[i], u_up[i]))
            })
            .collect(),
        Some((u_dp, up_dp, dp_dp)) => {
            let (u_dp, up_dp, dp_dp) = (u_dp?, up_dp?, dp_dp?);
            (0..bounds.n_slices())
                .map(|i| {
                    emittance_from_cov(&CovarianceSet {
                        u_u: u_u[i],
                        up_up: up_up[i],
                        u_up: u_up[i],
                        u_dp: u_dp[i],
                        up_dp: up_dp[i],
                        dp_dp: dp_dp[i],
                    })
                })
                .collect()
        }
    };
    Ok(out)
}

// whole-beam statistics are computed by treating every particle as a member
// of a single slice
const WHOLE_BEAM_LOWER: [usize; 1] = [0];

fn whole_beam_bounds(upper: &[usize; 1]) -> Result<SliceBoundsView<'_>, Error> {
    SliceBoundsView::new(&WHOLE_BEAM_LOWER, upper, upper[0]).map_err(Error::internal_legacy_adhoc)
}

fn single(values: Vec<f64>) -> Result<f64, Error> {
    values
        .first()
        .copied()
        .ok_or(Error::internal_legacy_adhoc("expected a single output value"))
}

fn whole_beam_comoment(u: &[f64], v: &[f64], normalization: Normalization) -> Result<f64, Error> {
    let upper = [u.len()];
    let bounds = whole_beam_bounds(&upper)?;
    single(comoment_per_slice(
        bounds,
        u,
        v,
        normalization,
        &RuntimeSpec::serial(),
    )?)
}

/// Computes the mean of every entry in `u` (`0` when `u` is empty)
pub fn mean<'a>(u: impl Into<ValueArrayView<'a>>) -> Result<f64, Error> {
    let u = u.into();
    let u = prepare("mean", "u", u, u.len())?;
    let upper = [u.len()];
    let spec = SlicedMean::new(whole_beam_bounds(&upper)?, &u)
        .map_err(Error::internal_legacy_adhoc)?;
    single(reduce_per_slice(&spec, "mean", &RuntimeSpec::serial())?)
}

/// Computes the population standard deviation of every entry in `u`
pub fn std<'a>(u: impl Into<ValueArrayView<'a>>) -> Result<f64, Error> {
    let u = u.into();
    let u = prepare("std", "u", u, u.len())?;
    Ok(whole_beam_comoment(&u, &u, Normalization::Population)?.sqrt())
}

/// Computes the covariance of `u` and `v` over the whole beam.
///
/// This is `mean((u-ū)·(v-v̄))·n/(n+1)`, the same convention used by
/// [`cov_per_slice`].
pub fn covariance<'a, 'b>(
    u: impl Into<ValueArrayView<'a>>,
    v: impl Into<ValueArrayView<'b>>,
) -> Result<f64, Error> {
    let u = u.into();
    let u = prepare("covariance", "u", u, u.len())?;
    let v = prepare("covariance", "v", v.into(), u.len())?;
    whole_beam_comoment(&u, &v, Normalization::ShiftedCount)
}

/// Computes the emittance of the whole beam in the `(u, up)` phase space,
/// optionally correcting for the dispersion contribution of `dp`.
pub fn emittance<'a, 'b, 'c>(
    u: impl Into<ValueArrayView<'a>>,
    up: impl Into<ValueArrayView<'b>>,
    dp: Option<ValueArrayView<'c>>,
) -> Result<f64, Error> {
    let u = u.into();
    let u = prepare("emittance", "u", u, u.len())?;
    let up = prepare("emittance", "up", up.into(), u.len())?;
    let dp = match dp {
        Some(dp) => Some(prepare("emittance", "dp", dp, u.len())?),
        None => None,
    };

    let cov = |a: &[f64], b: &[f64]| whole_beam_comoment(a, b, Normalization::ShiftedCount);
    let covs = match dp.as_deref() {
        None => CovarianceSet::without_dispersion(cov(&u, &u)?, cov(&up, &up)?, cov(&u, &up)?),
        Some(dp) => CovarianceSet {
            u_u: cov(&u, &u)?,
            up_up: cov(&up, &up)?,
            u_up: cov(&u, &up)?,
            u_dp: cov(&u, dp)?,
            up_dp: cov(&up, dp)?,
            dp_dp: cov(dp, dp)?,
        },
    };
    Ok(emittance_from_cov(&covs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> SliceSet {
        SliceSet::new(vec![0, 0, 1, 1, 1, 2], 3).unwrap()
    }

    #[test]
    fn per_slice_mean_and_std() {
        let slices = scenario();
        let u = [1.0, 3.0, 2.0, 4.0, 6.0, 10.0];
        let runtime = RuntimeSpec::default();
        assert_eq!(mean_per_slice(&slices, &u, &runtime).unwrap(), [2.0, 4.0, 10.0]);
        let std = std_per_slice(&slices, &u, &runtime).unwrap();
        assert_eq!(std, [1.0, (8.0_f64 / 3.0).sqrt(), 0.0]);
    }

    #[test]
    fn int32_input() {
        let slices = scenario();
        let u = [1, 3, 2, 4, 6, 10];
        let out = mean_per_slice(&slices, &u, &RuntimeSpec::default()).unwrap();
        assert_eq!(out, [2.0, 4.0, 10.0]);
    }

    #[test]
    fn validation_happens_first() {
        let slices = scenario();
        let runtime = RuntimeSpec::default();
        let u = [1.0, 3.0, 2.0, 4.0, 6.0, 10.0];

        let err = cov_per_slice(&slices, &u, &u[..5], &runtime).unwrap_err();
        assert!(err.is_shape_mismatch());

        let v = [1.0_f32; 6];
        let err = cov_per_slice(&slices, &u, &v, &runtime).unwrap_err();
        assert!(err.is_unsupported_type());

        let dp = [0_i64; 6];
        let err =
            emittance_per_slice(&slices, &u, &u, Some((&dp).into()), &runtime).unwrap_err();
        assert!(err.is_unsupported_type());
    }

    #[test]
    fn whole_beam() {
        let u = [1.0, 2.0, 3.0, 4.0];
        let v = [2.0, 1.0, 4.0, 3.0];
        assert_eq!(mean(&u).unwrap(), 2.5);
        assert_eq!(std(&u).unwrap(), 1.25_f64.sqrt());
        // deviations products: 1.5*0.5 + 0.5*1.5 + 0.5*1.5 + 1.5*0.5 = 3
        assert_eq!(covariance(&u, &v).unwrap(), 3.0 / 5.0);
        assert_eq!(mean(&[] as &[f64]).unwrap(), 0.0);
        assert!(covariance(&u, &v[..3]).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn whole_beam_emittance() {
        let u = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 1.0, 4.0, 3.0];
        // cov(u,u) = cov(up,up) = 5/5, cov(u,up) = 3/5
        let expected = (1.0_f64 - 0.36).sqrt();
        let eps = emittance(&u, &up, None).unwrap();
        assert!((eps - expected).abs() < 1e-12);

        let dp = [0.5; 4];
        assert!(!emittance(&u, &up, Some((&dp).into())).unwrap().is_finite());
    }
}
