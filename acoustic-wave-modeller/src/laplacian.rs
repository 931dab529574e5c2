//! Second spatial derivatives with the centred 3-point stencil.
//!
//! Only interior cells `1 ≤ i < nx−1`, `1 ≤ k < nz−1` are written. Edge rows
//! and columns of the output keep whatever they held before the call (zero
//! for freshly allocated fields), which the solver relies on as a fixed,
//! non-updated edge.

use ndarray::{Array2, ArrayView2, Zip};

/// How the per-cell work of one call is scheduled. Both produce identical
/// results, each cell is written exactly once from read-only input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    #[default]
    Serial,
    Parallel,
}

/// Allocates zeroed output fields and fills their interior.
pub fn laplacian(p: ArrayView2<'_, f64>, dx: f64, dz: f64) -> (Array2<f64>, Array2<f64>) {
    let mut d2px = Array2::zeros(p.dim());
    let mut d2pz = Array2::zeros(p.dim());
    laplacian_into(p, dx, dz, &mut d2px, &mut d2pz, Execution::Serial);
    (d2px, d2pz)
}

/// Writes `∂²p/∂x²` into `d2px` and `∂²p/∂z²` into `d2pz`.
pub fn laplacian_into(
    p: ArrayView2<'_, f64>,
    dx: f64,
    dz: f64,
    d2px: &mut Array2<f64>,
    d2pz: &mut Array2<f64>,
    execution: Execution,
) {
    debug_assert_eq!(p.dim(), d2px.dim());
    debug_assert_eq!(p.dim(), d2pz.dim());

    match execution {
        Execution::Serial => serial(p, dx, dz, d2px, d2pz),
        Execution::Parallel => parallel(p, dx, dz, d2px, d2pz),
    }
}

fn serial(
    p: ArrayView2<'_, f64>,
    dx: f64,
    dz: f64,
    d2px: &mut Array2<f64>,
    d2pz: &mut Array2<f64>,
) {
    let (nx, nz) = p.dim();
    let inv_dx2 = 1.0 / (dx * dx);
    let inv_dz2 = 1.0 / (dz * dz);

    for i in 1..nx.saturating_sub(1) {
        for k in 1..nz.saturating_sub(1) {
            let centre = 2.0 * p[[i, k]];
            d2px[[i, k]] = (p[[i + 1, k]] - centre + p[[i - 1, k]]) * inv_dx2;
            d2pz[[i, k]] = (p[[i, k + 1]] - centre + p[[i, k - 1]]) * inv_dz2;
        }
    }
}

fn parallel(
    p: ArrayView2<'_, f64>,
    dx: f64,
    dz: f64,
    d2px: &mut Array2<f64>,
    d2pz: &mut Array2<f64>,
) {
    let (nx, nz) = p.dim();
    let inv_dx2 = 1.0 / (dx * dx);
    let inv_dz2 = 1.0 / (dz * dz);

    Zip::indexed(d2px)
        .and(d2pz)
        .par_for_each(|(i, k), ax, az| {
            if i == 0 || k == 0 || i + 1 == nx || k + 1 == nz {
                return;
            }
            let centre = 2.0 * p[[i, k]];
            *ax = (p[[i + 1, k]] - centre + p[[i - 1, k]]) * inv_dx2;
            *az = (p[[i, k + 1]] - centre + p[[i, k - 1]]) * inv_dz2;
        });
}
