//! 2D acoustic wave modelling with an explicit finite-difference scheme.
//!
//! The solver marches `∂²p/∂t² = vp²·∇²p + s` with a second-order leapfrog
//! in time and centred 3-point stencils in space. Artificial edges are
//! handled by a Cerjan sponge on the left, right and bottom; the top edge is
//! a free surface.
//!
//! ```no_run
//! use acoustic_wave_modeller::{SimulationConfig, WaveSolver};
//!
//! let config = SimulationConfig::default();
//! let mut solver = WaveSolver::new(&config)?;
//! solver.run_with_observer(&mut |snap: &acoustic_wave_modeller::Snapshot<'_>| {
//!     println!("step {} max {}", snap.step, snap.pressure.iter().fold(0.0_f64, |a, &p| a.max(p.abs())));
//! })?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod absorbing;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod laplacian;
pub mod solver;
pub mod source;
pub mod velocity;
pub mod visualisation;
pub mod wavefield;

pub use absorbing::AbsorbingProfile;
pub use config::{Derived, SimulationConfig};
pub use error::{ConfigError, SolverError};
pub use grid::Grid;
pub use laplacian::Execution;
pub use solver::{Snapshot, SnapshotObserver, SnapshotRecorder, SolverState, WaveSolver};
pub use source::{SourceWavelet, WaveletKind};
pub use velocity::{VelocityConfig, VelocityField, VelocityModel};
