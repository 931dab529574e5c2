use ndarray::ArrayView2;

/// Sum of squared pressure over the whole field.
pub fn field_energy(p: ArrayView2<'_, f64>) -> f64 {
    p.iter().map(|&v| v * v).sum()
}

/// Largest absolute pressure; NaN anywhere propagates as NaN.
pub fn max_abs(p: ArrayView2<'_, f64>) -> f64 {
    p.iter().fold(0.0_f64, |acc, &v| {
        if v.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.max(v.abs())
        }
    })
}

/// Discrete energy of the leapfrog scheme between two consecutive levels:
///
/// `E = Σ (1/vp²)·((now − past)/dt)² + Σ_edges (D now)·(D past)`
///
/// where `D` is the forward difference across each x and z edge divided by
/// the spacing. With fixed zero edges, no source and no damping this is
/// conserved to round-off, and it is positive while `dt` is below the
/// stability bound.
pub fn discrete_energy(
    past: ArrayView2<'_, f64>,
    now: ArrayView2<'_, f64>,
    vp2: ArrayView2<'_, f64>,
    dx: f64,
    dz: f64,
    dt: f64,
) -> f64 {
    let (nx, nz) = now.dim();
    let inv_dt2 = 1.0 / (dt * dt);
    let inv_dx2 = 1.0 / (dx * dx);
    let inv_dz2 = 1.0 / (dz * dz);

    let mut kinetic = 0.0;
    for i in 0..nx {
        for k in 0..nz {
            let dp = now[[i, k]] - past[[i, k]];
            kinetic += dp * dp / vp2[[i, k]];
        }
    }

    let mut strain = 0.0;
    for i in 0..nx - 1 {
        for k in 0..nz {
            let a = now[[i + 1, k]] - now[[i, k]];
            let b = past[[i + 1, k]] - past[[i, k]];
            strain += a * b * inv_dx2;
        }
    }
    for i in 0..nx {
        for k in 0..nz - 1 {
            let a = now[[i, k + 1]] - now[[i, k]];
            let b = past[[i, k + 1]] - past[[i, k]];
            strain += a * b * inv_dz2;
        }
    }

    kinetic * inv_dt2 + strain
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_field_energy() {
        let mut p = Array2::zeros((3, 3));
        p[[1, 1]] = 2.0;
        p[[0, 2]] = -1.0;
        assert_eq!(field_energy(p.view()), 5.0);
    }

    #[test]
    fn test_max_abs() {
        let mut p = Array2::zeros((3, 3));
        p[[2, 0]] = -4.0;
        p[[1, 1]] = 3.0;
        assert_eq!(max_abs(p.view()), 4.0);
        p[[0, 0]] = f64::NAN;
        assert!(max_abs(p.view()).is_nan());
    }

    #[test]
    fn test_discrete_energy_of_static_field_is_strain_only() {
        // p = i along x, same at both levels: no kinetic part
        let p = Array2::from_shape_fn((4, 3), |(i, _)| i as f64);
        let vp2 = Array2::from_elem((4, 3), 1.0);
        let e = discrete_energy(p.view(), p.view(), vp2.view(), 1.0, 1.0, 0.1);
        // 3 x-edges per column, 3 columns, unit gradient
        assert!((e - 9.0).abs() < 1e-12, "e={}", e);
    }

    #[test]
    fn test_discrete_energy_zero_field() {
        let p = Array2::zeros((5, 5));
        let vp2 = Array2::from_elem((5, 5), 9.0e6);
        assert_eq!(discrete_energy(p.view(), p.view(), vp2.view(), 5.0, 5.0, 1e-3), 0.0);
    }
}
