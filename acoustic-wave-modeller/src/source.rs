use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Shape of the injected time function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveletKind {
    /// `-2·τ·f0²·exp(-f0²·τ²)`, τ = t − t0.
    #[default]
    GaussianDerivative,
    /// `(1 − 2(π f0 τ)²)·exp(−(π f0 τ)²)`.
    Ricker,
}

impl WaveletKind {
    pub fn sample(self, t: f64, f0: f64, t0: f64) -> f64 {
        let tau = t - t0;
        match self {
            WaveletKind::GaussianDerivative => {
                let f0_sq = f0 * f0;
                -2.0 * tau * f0_sq * (-f0_sq * tau * tau).exp()
            }
            WaveletKind::Ricker => {
                let arg = (PI * f0 * tau).powi(2);
                (1.0 - 2.0 * arg) * (-arg).exp()
            }
        }
    }
}

/// Source time series, one amplitude per time step. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWavelet {
    samples: Vec<f64>,
}

impl SourceWavelet {
    /// Samples `kind` at `t_k = k·dt` for `k in 0..nt`.
    pub fn new(kind: WaveletKind, f0: f64, t0: f64, dt: f64, nt: usize) -> Self {
        let samples = (0..nt)
            .map(|k| kind.sample(k as f64 * dt, f0, t0))
            .collect();
        Self { samples }
    }

    /// Negative time derivative of a Gaussian.
    pub fn gaussian_derivative(f0: f64, t0: f64, dt: f64, nt: usize) -> Self {
        Self::new(WaveletKind::GaussianDerivative, f0, t0, dt, nt)
    }

    pub fn ricker(f0: f64, t0: f64, dt: f64, nt: usize) -> Self {
        Self::new(WaveletKind::Ricker, f0, t0, dt, nt)
    }

    /// Explicit series, e.g. an all-zero source for quiet runs.
    pub fn from_samples(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Amplitude at step `it`; zero past the end of the series.
    pub fn at(&self, it: usize) -> f64 {
        self.samples.get(it).copied().unwrap_or(0.0)
    }

    /// Largest absolute sample.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0_f64, |acc, &s| acc.max(s.abs()))
    }

    /// Display range hint: `0.1 · peak / (dx·dz) · dt²`. Not used by the solver.
    pub fn clip(&self, dx: f64, dz: f64, dt: f64) -> f64 {
        0.1 * self.peak() / (dx * dz) * dt * dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_gaussian_derivative_formula() {
        let f0 = 100.0;
        let t0 = 0.1;
        let dt = 0.001;
        let src = SourceWavelet::gaussian_derivative(f0, t0, dt, 200);
        assert_eq!(src.len(), 200);

        let t: f64 = 95.0 * dt;
        let tau = t - t0;
        let expected = -2.0 * tau * f0 * f0 * (-(f0 * f0) * tau * tau).exp();
        assert!((src.at(95) - expected).abs() < 1e-12);
        // zero crossing at t0
        assert!(src.at(100).abs() < 1e-9, "src(t0)={}", src.at(100));
        // positive lobe before t0
        assert!(src.at(95) > 0.0);
    }

    #[test]
    fn test_antisymmetric_about_t0() {
        let dt = 0.001;
        let src = SourceWavelet::gaussian_derivative(100.0, 0.1, dt, 201);
        let scale = src.peak();
        for d in 1..=100 {
            let before = src.at(100 - d);
            let after = src.at(100 + d);
            assert!(
                (before + after).abs() <= 1e-9 * scale,
                "asymmetry at offset {}: {} vs {}",
                d,
                before,
                after
            );
        }
    }

    #[test]
    fn test_ricker_peaks_at_t0() {
        let src = SourceWavelet::ricker(25.0, 0.05, 0.001, 100);
        assert!((src.at(50) - 1.0).abs() < 1e-9);
        assert!((src.peak() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clip_hint() {
        let src = SourceWavelet::from_samples(vec![0.0, -4.0, 2.0]);
        assert_eq!(src.peak(), 4.0);
        let clip = src.clip(5.0, 5.0, 0.001);
        assert!((clip - 0.1 * 4.0 / 25.0 * 1e-6).abs() < 1e-18);
    }

    #[test]
    fn test_at_past_end_is_zero() {
        let src = SourceWavelet::from_samples(vec![1.0, 2.0]);
        assert_eq!(src.at(1), 2.0);
        assert_eq!(src.at(2), 0.0);
        assert!(SourceWavelet::from_samples(Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_gaussian_derivative_is_odd(
            f0 in 1.0f64..200.0,
            t0 in 0.0f64..1.0,
            delta in 0.0f64..0.5,
        ) {
            let kind = WaveletKind::GaussianDerivative;
            let before = kind.sample(t0 - delta, f0, t0);
            let after = kind.sample(t0 + delta, f0, t0);
            prop_assert!((before + after).abs() <= 1e-9 * (1.0 + before.abs()));
        }
    }
}
