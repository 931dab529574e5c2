use crate::error::ConfigError;
use crate::grid::Grid;
use crate::laplacian::Execution;
use crate::source::{SourceWavelet, WaveletKind};
use crate::velocity::VelocityConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Domain extent and spacing (meters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub xmax: f64,
    pub zmax: f64,
    pub dx: f64,
    pub dz: f64,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            xmax: 1000.0,
            zmax: 1000.0,
            dx: 5.0,
            dz: 5.0,
        }
    }
}

/// Time horizon and step (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    pub tmax: f64,
    pub dt: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            tmax: 0.5,
            dt: 0.001,
        }
    }
}

/// Point source position (meters) and wavelet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub xsrc: f64,
    pub zsrc: f64,
    pub f0: f64, // dominant frequency (Hz)
    pub t0: f64, // time shift (s)
    #[serde(default)]
    pub wavelet: WaveletKind,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            xsrc: 500.0,
            zsrc: 500.0,
            f0: 100.0,
            t0: 0.1,
            wavelet: WaveletKind::GaussianDerivative,
        }
    }
}

/// Cerjan frame: `width` cells along left, right and bottom edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorbingConfig {
    #[serde(default = "default_frame_width")]
    pub width: usize,
    #[serde(default = "default_decay")]
    pub decay: f64,
}

fn default_frame_width() -> usize {
    20
}

fn default_decay() -> f64 {
    0.015
}

impl Default for AbsorbingConfig {
    fn default() -> Self {
        Self {
            width: default_frame_width(),
            decay: default_decay(),
        }
    }
}

/// Snapshot cadence and run options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_isnap")]
    pub isnap: usize,
    #[serde(default)]
    pub parallel: bool,
    /// Stop when `max|p|` exceeds this multiple of the clip amplitude.
    /// Non-finite pressure always stops the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergence_factor: Option<f64>,
}

fn default_isnap() -> usize {
    10
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            isnap: default_isnap(),
            parallel: false,
            divergence_factor: None,
        }
    }
}

/// Every parameter a run consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub velocity: VelocityConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub absorbing: AbsorbingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Quantities that follow from the configuration without running anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub nx: usize,
    pub nz: usize,
    pub nt: usize,
    pub isrc: usize,
    pub jsrc: usize,
    pub clip: f64,
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig =
            toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn execution(&self) -> Execution {
        if self.output.parallel {
            Execution::Parallel
        } else {
            Execution::Serial
        }
    }

    pub fn grid(&self) -> Result<Grid, ConfigError> {
        let d = &self.domain;
        let dx = positive("dx", d.dx)?;
        let dz = positive("dz", d.dz)?;
        let xmax = positive("xmax", d.xmax)?;
        let zmax = positive("zmax", d.zmax)?;
        Grid::new(
            (xmax / dx).round() as usize,
            (zmax / dz).round() as usize,
            dx,
            dz,
        )
    }

    pub fn nt(&self) -> Result<usize, ConfigError> {
        let tmax = positive("tmax", self.time.tmax)?;
        let dt = positive("dt", self.time.dt)?;
        let nt = (tmax / dt).round() as usize;
        if nt == 0 {
            return Err(ConfigError::NonPositive {
                name: "nt = tmax/dt",
                value: 0.0,
            });
        }
        Ok(nt)
    }

    /// Nearest grid cell to `(xsrc, zsrc)`, checked against the stencil interior.
    pub fn source_cell(&self, grid: &Grid) -> Result<(usize, usize), ConfigError> {
        let (xsrc, zsrc) = (self.source.xsrc, self.source.zsrc);
        if !xsrc.is_finite() || !zsrc.is_finite() || xsrc < 0.0 || zsrc < 0.0 {
            return Err(ConfigError::SourcePosition { xsrc, zsrc });
        }
        let isrc = (xsrc / grid.dx).round() as usize;
        let jsrc = (zsrc / grid.dz).round() as usize;
        if !grid.in_interior(isrc, jsrc) {
            return Err(ConfigError::SourceOutsideGrid {
                isrc,
                jsrc,
                nx: grid.nx,
                nz: grid.nz,
            });
        }
        Ok((isrc, jsrc))
    }

    /// Source series over the full time horizon.
    pub fn wavelet(&self) -> Result<SourceWavelet, ConfigError> {
        let f0 = positive("f0", self.source.f0)?;
        if !self.source.t0.is_finite() {
            return Err(ConfigError::NotFinite {
                name: "t0",
                value: self.source.t0,
            });
        }
        let nt = self.nt()?;
        Ok(SourceWavelet::new(
            self.source.wavelet,
            f0,
            self.source.t0,
            self.time.dt,
            nt,
        ))
    }

    pub fn derive(&self) -> Result<Derived, ConfigError> {
        let grid = self.grid()?;
        let nt = self.nt()?;
        let (isrc, jsrc) = self.source_cell(&grid)?;
        let clip = self.wavelet()?.clip(grid.dx, grid.dz, self.time.dt);
        Ok(Derived {
            nx: grid.nx,
            nz: grid.nz,
            nt,
            isrc,
            jsrc,
            clip,
        })
    }

    /// Everything that can be checked without building the velocity field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.grid()?;
        self.derive()?;
        if self.absorbing.width > 0 {
            positive("absorbing decay", self.absorbing.decay)?;
        }
        let min_dim = grid.nx.min(grid.nz);
        if 2 * self.absorbing.width >= min_dim {
            return Err(ConfigError::FrameTooWide {
                width: self.absorbing.width,
                min_dim,
            });
        }
        if self.output.isnap == 0 {
            return Err(ConfigError::InvalidSnapshotStride);
        }
        if let Some(factor) = self.output.divergence_factor {
            positive("divergence_factor", factor)?;
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        let d = &self.domain;
        info!(
            "Domain: {} x {} m at dx={} m, dz={} m",
            d.xmax, d.zmax, d.dx, d.dz
        );
        info!("Time: dt={} s, tmax={} s", self.time.dt, self.time.tmax);
        info!("Velocity: {:?}", self.velocity);
        info!(
            "Source: ({}, {}) m, {:?} f0={} Hz t0={} s",
            self.source.xsrc, self.source.zsrc, self.source.wavelet, self.source.f0, self.source.t0
        );
        info!(
            "Absorbing frame: width={} cells, decay={}",
            self.absorbing.width, self.absorbing.decay
        );
        if let Ok(derived) = self.derive() {
            info!(
                "Derived: nx={} nz={} nt={} isrc={} jsrc={} clip={:e}",
                derived.nx, derived.nz, derived.nt, derived.isrc, derived.jsrc, derived.clip
            );
        }
    }
}
