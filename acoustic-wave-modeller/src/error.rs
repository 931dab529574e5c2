use thiserror::Error;

/// Problems detected while binding a configuration, before any step runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid dimension {axis}={n} is too small, the stencil needs at least 3 cells")]
    GridTooSmall { axis: &'static str, n: usize },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("absorbing frame width {width} must be below min(nx, nz)/2 = {min_dim}/2")]
    FrameTooWide { width: usize, min_dim: usize },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("dt={dt} exceeds the CFL bound dt_max={dt_max} (v_max={vp_max} m/s)")]
    CflViolated { dt: f64, dt_max: f64, vp_max: f64 },

    #[error(
        "source cell ({isrc}, {jsrc}) must lie in the interior [1, {}] x [1, {}]",
        .nx.saturating_sub(2),
        .nz.saturating_sub(2)
    )]
    SourceOutsideGrid {
        isrc: usize,
        jsrc: usize,
        nx: usize,
        nz: usize,
    },

    #[error("source position ({xsrc}, {zsrc}) m must be finite and non-negative")]
    SourcePosition { xsrc: f64, zsrc: f64 },

    #[error("velocity field has shape {got:?}, grid is {expected:?}")]
    VelocityShape {
        got: (usize, usize),
        expected: (usize, usize),
    },

    #[error("velocity at ({i}, {k}) is {value}, must be finite and positive")]
    InvalidVelocity { i: usize, k: usize, value: f64 },

    #[error("isnap must be a positive number of steps")]
    InvalidSnapshotStride,
}

/// Failures of a configured run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("pressure diverged at step {step}: max |p| = {max_abs:e} (limit {limit:e})")]
    Diverged { step: usize, max_abs: f64, limit: f64 },

    #[error("run already completed all {nt} steps")]
    Completed { nt: usize },
}

pub type Result<T, E = SolverError> = std::result::Result<T, E>;
