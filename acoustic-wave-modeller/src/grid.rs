use crate::error::ConfigError;

/// Regular 2D grid, fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub nx: usize, // Number of points in x direction
    pub nz: usize, // Number of points in z direction (z = 0 is the free surface)
    pub dx: f64,   // Grid spacing in x (meters)
    pub dz: f64,   // Grid spacing in z (meters)
}

impl Grid {
    pub fn new(nx: usize, nz: usize, dx: f64, dz: f64) -> Result<Self, ConfigError> {
        if nx < 3 {
            return Err(ConfigError::GridTooSmall { axis: "nx", n: nx });
        }
        if nz < 3 {
            return Err(ConfigError::GridTooSmall { axis: "nz", n: nz });
        }
        if !dx.is_finite() || dx <= 0.0 {
            return Err(ConfigError::NonPositive { name: "dx", value: dx });
        }
        if !dz.is_finite() || dz <= 0.0 {
            return Err(ConfigError::NonPositive { name: "dz", value: dz });
        }
        Ok(Grid { nx, nz, dx, dz })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.nz)
    }

    pub fn z_coord(&self, k: usize) -> f64 {
        self.dz * (k as f64)
    }

    /// True where the 3-point stencil has a neighbour on every side.
    pub fn in_interior(&self, i: usize, k: usize) -> bool {
        i >= 1 && i + 1 < self.nx && k >= 1 && k + 1 < self.nz
    }

    /// Area of one cell, the normalisation of a point source.
    pub fn cell_area(&self) -> f64 {
        self.dx * self.dz
    }
}
