// shared helpers for the integration tests. This is named mod.rs so that
// cargo doesn't treat it as a test crate of its own
#![allow(dead_code)]

use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

pub fn assert_allclose(actual: &[f64], ref_vals: &[f64], rtol: f64, atol: f64) {
    assert_eq!(actual.len(), ref_vals.len(), "the lengths differ");
    for (i, (a, r)) in actual.iter().zip(ref_vals.iter()).enumerate() {
        assert!(
            isclose(*a, *r, rtol, atol),
            "entry {i}: actual = {a}, reference = {r}"
        );
    }
}

/// randomly generated, slice-sorted beam data
pub struct RandomBeam {
    pub slice_index_of_particle: Vec<i32>,
    pub n_slices: usize,
    pub u: Vec<f64>,
    pub up: Vec<f64>,
    pub dp: Vec<f64>,
}

impl RandomBeam {
    /// Generates `n_particles` particles spread over `n_slices` slices.
    ///
    /// Some particles are assigned to indices outside of `[0, n_slices)` and
    /// some slices will typically be empty.
    pub fn new(seed: u64, n_particles: usize, n_slices: usize) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let index_dist = Uniform::try_from(-1..=(n_slices as i32)).unwrap();
        let value_dist = Uniform::try_from(-1.0..1.0).unwrap();

        let mut slice_index_of_particle: Vec<i32> =
            (0..n_particles).map(|_| index_dist.sample(&mut rng)).collect();
        slice_index_of_particle.sort();

        let mut sample = || -> Vec<f64> {
            (0..n_particles)
                .map(|_| value_dist.sample(&mut rng))
                .collect()
        };
        let u = sample();
        // correlate up with u so that the emittance is nontrivial
        let up = sample()
            .into_iter()
            .zip(u.iter())
            .map(|(noise, u)| 0.3 * u + noise)
            .collect();
        let dp = sample();
        RandomBeam {
            slice_index_of_particle,
            n_slices,
            u,
            up,
            dp,
        }
    }

    /// the values of `values` that belong to `slice_index`
    pub fn members(&self, values: &[f64], slice_index: usize) -> Vec<f64> {
        self.slice_index_of_particle
            .iter()
            .zip(values.iter())
            .filter(|(idx, _)| **idx == slice_index as i32)
            .map(|(_, val)| *val)
            .collect()
    }
}

// naive reference implementations

pub fn naive_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn naive_cov(u: &[f64], v: &[f64]) -> f64 {
    let (mean_u, mean_v) = (naive_mean(u), naive_mean(v));
    let total: f64 = u
        .iter()
        .zip(v.iter())
        .map(|(a, b)| (a - mean_u) * (b - mean_v))
        .sum();
    total / (u.len() as f64 + 1.0)
}

pub fn naive_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = naive_mean(values);
    let total: f64 = values.iter().map(|x| (x - mean) * (x - mean)).sum();
    (total / values.len() as f64).sqrt()
}
