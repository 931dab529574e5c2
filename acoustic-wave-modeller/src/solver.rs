use crate::absorbing::AbsorbingProfile;
use crate::config::SimulationConfig;
use crate::diagnostics;
use crate::error::{ConfigError, Result, SolverError};
use crate::grid::Grid;
use crate::laplacian::{laplacian_into, Execution};
use crate::source::SourceWavelet;
use crate::velocity::{VelocityField, VelocityModel};
use crate::wavefield::PressureBuffers;
use ndarray::{s, Array2, ArrayView2, Zip};
use tracing::{debug, info, warn};

/// Lifecycle of a run. A solver only exists once configured; `Completed` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Configured,
    Running,
    Completed,
}

/// Read-only view of the pressure field after step `step`, i.e. at time
/// `(step + 1)·dt`. Valid until the solver advances; copy it to keep it.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub step: usize,
    pub time: f64,
    pub pressure: ArrayView2<'a, f64>,
}

/// Receives a snapshot every `isnap` steps.
pub trait SnapshotObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>);
}

impl<F> SnapshotObserver for F
where
    F: FnMut(&Snapshot<'_>),
{
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        self(snapshot)
    }
}

/// Keeps an owned copy of every snapshot it sees.
#[derive(Debug, Default, Clone)]
pub struct SnapshotRecorder {
    pub frames: Vec<(usize, Array2<f64>)>,
}

impl SnapshotObserver for SnapshotRecorder {
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        self.frames
            .push((snapshot.step, snapshot.pressure.to_owned()));
    }
}

/// Explicit leapfrog solver for `∂²p/∂t² = vp²·∇²p + s` with a Cerjan sponge.
///
/// `dt` must satisfy `dt ≤ min(dx, dz) / (v_max·√2)`; configuration fails
/// otherwise instead of letting the field blow up.
pub struct WaveSolver {
    grid: Grid,
    dt: f64,
    nt: usize,
    isnap: usize,
    isrc: usize,
    jsrc: usize,
    velocity: VelocityField,
    absorbing: AbsorbingProfile,
    source: SourceWavelet,
    clip: f64,
    divergence_limit: Option<f64>,
    execution: Execution,
    buffers: PressureBuffers,
    d2px: Array2<f64>,
    d2pz: Array2<f64>,
    it: usize,
    state: SolverState,
}

impl WaveSolver {
    /// Binds the configuration, using its velocity section and wavelet.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let source = config.wavelet()?;
        Self::from_parts(config, &config.velocity, source)
    }

    /// Same as [`WaveSolver::new`] with a caller-supplied speed array.
    pub fn with_velocity(config: &SimulationConfig, vp: Array2<f64>) -> Result<Self, ConfigError> {
        let source = config.wavelet()?;
        Self::from_parts(config, &vp, source)
    }

    /// Fully explicit setup: any velocity model and any source series.
    pub fn from_parts(
        config: &SimulationConfig,
        model: &dyn VelocityModel,
        source: SourceWavelet,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid()?;
        let nt = config.nt()?;
        let (isrc, jsrc) = config.source_cell(&grid)?;
        let dt = config.time.dt;

        let velocity = VelocityField::new(&grid, model)?;
        let dt_max = velocity.max_stable_dt(&grid);
        if dt > dt_max {
            return Err(ConfigError::CflViolated {
                dt,
                dt_max,
                vp_max: velocity.vp_max(),
            });
        }

        let absorbing =
            AbsorbingProfile::new(&grid, config.absorbing.width, config.absorbing.decay)?;
        let clip = source.clip(grid.dx, grid.dz, dt);
        let divergence_limit = config.output.divergence_factor.map(|f| f * clip);

        Ok(Self {
            grid,
            dt,
            nt,
            isnap: config.output.isnap,
            isrc,
            jsrc,
            velocity,
            absorbing,
            source,
            clip,
            divergence_limit,
            execution: config.execution(),
            buffers: PressureBuffers::new(grid.nx, grid.nz),
            d2px: Array2::zeros(grid.shape()),
            d2pz: Array2::zeros(grid.shape()),
            it: 0,
            state: SolverState::Configured,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn nt(&self) -> usize {
        self.nt
    }

    pub fn isnap(&self) -> usize {
        self.isnap
    }

    pub fn source_cell(&self) -> (usize, usize) {
        (self.isrc, self.jsrc)
    }

    pub fn clip(&self) -> f64 {
        self.clip
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Number of steps taken so far.
    pub fn step_index(&self) -> usize {
        self.it
    }

    pub fn is_finished(&self) -> bool {
        self.state == SolverState::Completed
    }

    pub fn pressure(&self) -> ArrayView2<'_, f64> {
        self.buffers.now()
    }

    pub fn velocity(&self) -> ArrayView2<'_, f64> {
        self.velocity.vp()
    }

    pub fn absorbing(&self) -> &AbsorbingProfile {
        &self.absorbing
    }

    pub fn wavelet(&self) -> &SourceWavelet {
        &self.source
    }

    pub fn set_execution(&mut self, execution: Execution) {
        self.execution = execution;
    }

    /// Leapfrog energy of the current pair of time levels.
    pub fn discrete_energy(&self) -> f64 {
        diagnostics::discrete_energy(
            self.buffers.past(),
            self.buffers.now(),
            self.velocity.vp2(),
            self.grid.dx,
            self.grid.dz,
            self.dt,
        )
    }

    pub fn field_energy(&self) -> f64 {
        diagnostics::field_energy(self.buffers.now())
    }

    /// Advances one time step. Returns `true` when the step is a snapshot step
    /// (`it mod isnap == 0`), after which [`WaveSolver::pressure`] holds the
    /// field to show.
    pub fn step(&mut self) -> Result<bool> {
        if self.state == SolverState::Completed {
            return Err(SolverError::Completed { nt: self.nt });
        }
        self.state = SolverState::Running;

        let it = self.it;
        let (nx, nz) = self.grid.shape();
        let dt2 = self.dt * self.dt;

        // 1. spatial derivatives of the current field
        laplacian_into(
            self.buffers.now(),
            self.grid.dx,
            self.grid.dz,
            &mut self.d2px,
            &mut self.d2pz,
            self.execution,
        );

        // 2. leapfrog update on the interior; edges stay at zero
        {
            let PressureBuffers { past, now, next } = &mut self.buffers;
            let interior = s![1..nx - 1, 1..nz - 1];
            Zip::from(next.slice_mut(interior))
                .and(now.slice(interior))
                .and(past.slice(interior))
                .and(self.d2px.slice(interior))
                .and(self.d2pz.slice(interior))
                .and(self.velocity.vp2().slice_move(interior))
                .for_each(|p_next, &p_now, &p_past, &ax, &az, &vp2| {
                    *p_next = 2.0 * p_now - p_past + vp2 * dt2 * (ax + az);
                });

            // 3. point source
            next[[self.isrc, self.jsrc]] += self.source.at(it) / self.grid.cell_area() * dt2;

            // 4. damp both the current and the new level
            self.absorbing.apply(now);
            self.absorbing.apply(next);
        }

        // 5. past <- now <- next
        self.buffers.rotate();
        self.it += 1;
        if self.it >= self.nt {
            self.state = SolverState::Completed;
        }

        let snapshot = it % self.isnap == 0;
        if snapshot {
            self.check_divergence(it)?;
        }
        Ok(snapshot)
    }

    fn check_divergence(&mut self, it: usize) -> Result<()> {
        let max_abs = diagnostics::max_abs(self.buffers.now());
        let limit = self.divergence_limit.unwrap_or(f64::INFINITY);
        if max_abs.is_finite() && max_abs <= limit {
            return Ok(());
        }
        warn!(
            "Pressure diverged at step {}: max |p| = {:e}, limit {:e}",
            it, max_abs, limit
        );
        self.state = SolverState::Completed;
        Err(SolverError::Diverged {
            step: it,
            max_abs,
            limit,
        })
    }

    fn snapshot(&self, step: usize) -> Snapshot<'_> {
        Snapshot {
            step,
            time: (step + 1) as f64 * self.dt,
            pressure: self.buffers.now(),
        }
    }

    /// Runs the remaining steps without an observer.
    pub fn run(&mut self) -> Result<()> {
        self.run_inner(None)
    }

    /// Runs the remaining steps, handing every snapshot to `observer`.
    pub fn run_with_observer(&mut self, observer: &mut dyn SnapshotObserver) -> Result<()> {
        self.run_inner(Some(observer))
    }

    fn run_inner(&mut self, mut observer: Option<&mut dyn SnapshotObserver>) -> Result<()> {
        info!(
            "Starting run: grid {}x{}, dt={} s, {} steps, source at ({}, {})",
            self.grid.nx, self.grid.nz, self.dt, self.nt, self.isrc, self.jsrc
        );
        info!(
            "Absorbing frame {} cells (a={}), snapshot every {} steps",
            self.absorbing.width(),
            self.absorbing.decay(),
            self.isnap
        );

        while !self.is_finished() {
            let step = self.it;
            if self.step()? {
                debug!(
                    "Step {}/{} (t={:.4}s)",
                    step + 1,
                    self.nt,
                    (step + 1) as f64 * self.dt
                );
                if let Some(observer) = observer.as_deref_mut() {
                    observer.on_snapshot(&self.snapshot(step));
                }
            }
        }

        info!("Run complete after {} steps", self.it);
        Ok(())
    }
}
