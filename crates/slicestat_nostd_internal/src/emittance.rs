//! Arithmetic for composing covariances into an emittance
//!
//! The emittance of a coordinate `u` and its conjugate momentum `up`,
//! corrected for the longitudinal momentum deviation `dp`, is
//! `sqrt(σ11·σ22 - σ12²)` where
//! - `σ11 = cov(u,u) - cov(u,dp)² / cov(dp,dp)`
//! - `σ12 = cov(u,up) - cov(u,dp)·cov(up,dp) / cov(dp,dp)`
//! - `σ22 = cov(up,up) - cov(up,dp)² / cov(dp,dp)`
//!
//! When `dp` isn't known, the dispersion terms default to `(0, 0, 1)` and the
//! correction vanishes (this is the "effective emittance").
//!
//! # Note
//! `f64::sqrt` isn't available in no_std crates, so this module stops at the
//! squared emittance. The square root is taken by the `slicestat` crate.

/// The covariances that enter into an emittance calculation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CovarianceSet {
    pub u_u: f64,
    pub up_up: f64,
    pub u_up: f64,
    pub u_dp: f64,
    pub up_dp: f64,
    pub dp_dp: f64,
}

impl CovarianceSet {
    /// Construct a set where the dispersion terms take their neutral values
    pub fn without_dispersion(u_u: f64, up_up: f64, u_up: f64) -> Self {
        CovarianceSet {
            u_u,
            up_up,
            u_up,
            u_dp: 0.0,
            up_dp: 0.0,
            dp_dp: 1.0,
        }
    }

    /// Computes `σ11·σ22 - σ12²`, the square of the emittance
    ///
    /// A `dp_dp` of `0` is **not** guarded against: the result becomes
    /// non-finite.
    #[inline]
    pub fn squared_emittance(&self) -> f64 {
        let sigma11 = self.u_u - self.u_dp * self.u_dp / self.dp_dp;
        let sigma12 = self.u_up - self.u_dp * self.up_dp / self.dp_dp;
        let sigma22 = self.up_up - self.up_dp * self.up_dp / self.dp_dp;
        sigma11 * sigma22 - sigma12 * sigma12
    }
}
