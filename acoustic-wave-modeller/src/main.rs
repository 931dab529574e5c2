use acoustic_wave_modeller::visualisation::FrameWriter;
use acoustic_wave_modeller::{Execution, SimulationConfig, WaveSolver};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "acoustic-wave-modeller")]
#[command(about = "2D acoustic FD modelling with Cerjan absorbing boundaries")]
struct Args {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for PNG snapshots
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Run without writing snapshots
    #[arg(long)]
    headless: bool,

    /// Use the rayon Laplacian kernel whatever the config says
    #[arg(long)]
    parallel: bool,

    /// Frame size in pixels
    #[arg(long, default_value_t = 800)]
    frame_width: u32,

    #[arg(long, default_value_t = 800)]
    frame_height: u32,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    config.log_summary();

    let mut solver = WaveSolver::new(&config).context("Invalid simulation configuration")?;
    if args.parallel {
        solver.set_execution(Execution::Parallel);
    }

    if args.headless {
        solver.run()?;
    } else {
        let mut frames = FrameWriter::new(
            &args.output,
            args.frame_width,
            args.frame_height,
            solver.clip(),
        )
        .with_context(|| format!("Failed to create output directory {:?}", args.output))?;
        frames
            .write_velocity(solver.velocity())
            .map_err(|e| anyhow!("Failed to write velocity model: {}", e))?;
        solver.run_with_observer(&mut frames)?;
        info!(
            "{} frames saved to {}",
            frames.frames_written(),
            args.output.display()
        );
    }

    info!(
        "Final field energy: {:e} (discrete {:e})",
        solver.field_energy(),
        solver.discrete_energy()
    );
    Ok(())
}
