//! Cerjan sponge: a frame of cells along the left, right and bottom edges
//! in which the wavefield is multiplied by a factor in (0, 1] every step.
//!
//! The top edge (z = 0) is the free surface and is never damped. Cells near
//! two edges take the smaller of the two factors, so corners are damped no
//! more than the stronger single edge would.

use crate::error::ConfigError;
use crate::grid::Grid;
use ndarray::{Array2, ArrayView2, Zip};

#[derive(Debug, Clone)]
pub struct AbsorbingProfile {
    width: usize,
    decay: f64,
    coeffs: Array2<f64>,
}

impl AbsorbingProfile {
    /// Builds the coefficient field for a frame `width` cells wide with decay
    /// factor `decay`. `width = 0` gives an all-ones (inactive) profile.
    pub fn new(grid: &Grid, width: usize, decay: f64) -> Result<Self, ConfigError> {
        let min_dim = grid.nx.min(grid.nz);
        if 2 * width >= min_dim {
            return Err(ConfigError::FrameTooWide { width, min_dim });
        }
        if width > 0 && (!decay.is_finite() || decay <= 0.0) {
            return Err(ConfigError::NonPositive {
                name: "absorbing decay",
                value: decay,
            });
        }

        let (nx, nz) = grid.shape();
        let coeffs = Array2::from_shape_fn((nx, nz), |(i, k)| {
            let mut c = 1.0_f64;
            if i < width {
                c = c.min(frame_coeff(i, width, decay));
            }
            if i >= nx - width {
                c = c.min(frame_coeff(nx - 1 - i, width, decay));
            }
            if k >= nz - width {
                c = c.min(frame_coeff(nz - 1 - k, width, decay));
            }
            c
        });

        Ok(Self {
            width,
            decay,
            coeffs,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }

    pub fn is_active(&self) -> bool {
        self.width > 0
    }

    pub fn coeffs(&self) -> ArrayView2<'_, f64> {
        self.coeffs.view()
    }

    pub fn coeff(&self, i: usize, k: usize) -> f64 {
        self.coeffs[[i, k]]
    }

    /// Multiplies `field` elementwise by the coefficients.
    pub fn apply(&self, field: &mut Array2<f64>) {
        if !self.is_active() {
            return;
        }
        Zip::from(field)
            .and(&self.coeffs)
            .for_each(|p, &c| *p *= c);
    }
}

/// Per-axis factor at `i` cells in from the outer edge: `exp(-a²·(width − i)²)`.
pub fn frame_coeff(i: usize, width: usize, decay: f64) -> f64 {
    let d = width.saturating_sub(i) as f64;
    (-(decay * decay) * d * d).exp()
}
