use crate::error::ConfigError;
use crate::grid::Grid;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Anything that can fill an `nx × nz` P-wave speed field (m/s).
///
/// The solver only ever sees the built array, so new media are added by
/// implementing this trait.
pub trait VelocityModel {
    fn build(&self, grid: &Grid) -> Array2<f64>;
}

/// Constant speed everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homogeneous {
    pub vp: f64,
}

impl VelocityModel for Homogeneous {
    fn build(&self, grid: &Grid) -> Array2<f64> {
        Array2::from_elem(grid.shape(), self.vp)
    }
}

/// One horizontal interface: everything at depth `>= depth` takes `vp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub depth: f64, // meters below the free surface
    pub vp: f64,
}

/// Horizontally layered medium. Layers may be given in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layered {
    pub vp_top: f64,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl VelocityModel for Layered {
    fn build(&self, grid: &Grid) -> Array2<f64> {
        let mut layers = self.layers.clone();
        layers.sort_by(|a, b| a.depth.total_cmp(&b.depth));

        Array2::from_shape_fn(grid.shape(), |(_, k)| {
            let z = grid.z_coord(k);
            layers
                .iter()
                .take_while(|layer| layer.depth <= z)
                .last()
                .map_or(self.vp_top, |layer| layer.vp)
        })
    }
}

/// Alternating square tiles of `vp·(1 + perturbation)` and `vp·(1 − perturbation)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkerboard {
    pub vp: f64,
    pub perturbation: f64,
    pub tile: usize, // tile edge in cells
}

impl VelocityModel for Checkerboard {
    fn build(&self, grid: &Grid) -> Array2<f64> {
        let tile = self.tile.max(1);
        Array2::from_shape_fn(grid.shape(), |(i, k)| {
            if (i / tile + k / tile) % 2 == 0 {
                self.vp * (1.0 + self.perturbation)
            } else {
                self.vp * (1.0 - self.perturbation)
            }
        })
    }
}

/// A fully specified array is its own model.
impl VelocityModel for Array2<f64> {
    fn build(&self, _grid: &Grid) -> Array2<f64> {
        self.clone()
    }
}

/// Velocity models that can be named in a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum VelocityConfig {
    Homogeneous(Homogeneous),
    Layered(Layered),
    Checkerboard(Checkerboard),
}

impl Default for VelocityConfig {
    fn default() -> Self {
        VelocityConfig::Homogeneous(Homogeneous { vp: 3000.0 })
    }
}

impl VelocityModel for VelocityConfig {
    fn build(&self, grid: &Grid) -> Array2<f64> {
        match self {
            VelocityConfig::Homogeneous(m) => m.build(grid),
            VelocityConfig::Layered(m) => m.build(grid),
            VelocityConfig::Checkerboard(m) => m.build(grid),
        }
    }
}

/// Validated, time-invariant speed field with `vp²` cached for the update.
#[derive(Debug, Clone)]
pub struct VelocityField {
    vp: Array2<f64>,
    vp2: Array2<f64>,
    vp_max: f64,
}

impl VelocityField {
    pub fn new(grid: &Grid, model: &dyn VelocityModel) -> Result<Self, ConfigError> {
        Self::from_array(grid, model.build(grid))
    }

    pub fn from_array(grid: &Grid, vp: Array2<f64>) -> Result<Self, ConfigError> {
        if vp.dim() != grid.shape() {
            return Err(ConfigError::VelocityShape {
                got: vp.dim(),
                expected: grid.shape(),
            });
        }

        let mut vp_max = 0.0_f64;
        for ((i, k), &v) in vp.indexed_iter() {
            if !v.is_finite() || v <= 0.0 {
                return Err(ConfigError::InvalidVelocity { i, k, value: v });
            }
            vp_max = vp_max.max(v);
        }

        let vp2 = vp.mapv(|v| v * v);
        Ok(Self { vp, vp2, vp_max })
    }

    pub fn vp(&self) -> ArrayView2<'_, f64> {
        self.vp.view()
    }

    pub fn vp2(&self) -> ArrayView2<'_, f64> {
        self.vp2.view()
    }

    pub fn vp_max(&self) -> f64 {
        self.vp_max
    }

    /// Largest stable step for the 5-point stencil:
    /// `dt ≤ min(dx, dz) / (v_max·√2)`.
    pub fn max_stable_dt(&self, grid: &Grid) -> f64 {
        grid.dx.min(grid.dz) / (self.vp_max * std::f64::consts::SQRT_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(8, 10, 5.0, 5.0).unwrap()
    }

    #[test]
    fn test_homogeneous_fills_every_cell() {
        let vp = Homogeneous { vp: 3000.0 }.build(&grid());
        assert_eq!(vp.dim(), (8, 10));
        assert!(vp.iter().all(|&v| v == 3000.0));
    }

    #[test]
    fn test_layered_depths() {
        let model = Layered {
            vp_top: 1500.0,
            // out of order on purpose
            layers: vec![
                Layer { depth: 30.0, vp: 4000.0 },
                Layer { depth: 10.0, vp: 2500.0 },
            ],
        };
        let vp = model.build(&grid());
        // z = 0, 5 above the first interface
        assert_eq!(vp[[3, 0]], 1500.0);
        assert_eq!(vp[[3, 1]], 1500.0);
        // z = 10 is on the interface
        assert_eq!(vp[[3, 2]], 2500.0);
        assert_eq!(vp[[0, 5]], 2500.0);
        assert_eq!(vp[[7, 6]], 4000.0);
        assert_eq!(vp[[7, 9]], 4000.0);
    }

    #[test]
    fn test_checkerboard_alternates() {
        let model = Checkerboard {
            vp: 2000.0,
            perturbation: 0.1,
            tile: 2,
        };
        let vp = model.build(&grid());
        assert!((vp[[0, 0]] - 2200.0).abs() < 1e-9);
        assert!((vp[[1, 1]] - 2200.0).abs() < 1e-9);
        assert!((vp[[2, 0]] - 1800.0).abs() < 1e-9);
        assert!((vp[[2, 2]] - 2200.0).abs() < 1e-9);
    }

    #[test]
    fn test_field_caches_square_and_max() {
        let g = grid();
        let model = Layered {
            vp_top: 1000.0,
            layers: vec![Layer { depth: 20.0, vp: 2000.0 }],
        };
        let field = VelocityField::new(&g, &model).unwrap();
        assert_eq!(field.vp_max(), 2000.0);
        assert_eq!(field.vp2()[[0, 0]], 1.0e6);
        assert_eq!(field.vp2()[[0, 9]], 4.0e6);
    }

    #[test]
    fn test_stability_bound() {
        let g = Grid::new(10, 10, 5.0, 5.0).unwrap();
        let field = VelocityField::new(&g, &Homogeneous { vp: 3000.0 }).unwrap();
        let dt_max = field.max_stable_dt(&g);
        assert!((dt_max - 0.001_178_5).abs() < 1e-7, "dt_max={}", dt_max);
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let g = grid();
        let err = VelocityField::from_array(&g, Array2::from_elem((3, 3), 1.0)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::VelocityShape {
                got: (3, 3),
                expected: (8, 10)
            }
        );
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let g = grid();
        let mut vp = Homogeneous { vp: 3000.0 }.build(&g);
        vp[[2, 4]] = 0.0;
        let err = VelocityField::from_array(&g, vp).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidVelocity {
                i: 2,
                k: 4,
                value: 0.0
            }
        );
    }

    #[test]
    fn test_model_deserializes_from_tagged_table() {
        let model: VelocityConfig = toml::from_str("model = \"homogeneous\"\nvp = 2500.0\n").unwrap();
        assert_eq!(model, VelocityConfig::Homogeneous(Homogeneous { vp: 2500.0 }));

        let model: VelocityConfig = toml::from_str(
            "model = \"layered\"\nvp_top = 1500.0\n\n[[layers]]\ndepth = 100.0\nvp = 3000.0\n",
        )
        .unwrap();
        assert!(matches!(model, VelocityConfig::Layered(ref l) if l.layers.len() == 1));
    }
}
