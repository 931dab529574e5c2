use acoustic_wave_modeller::velocity::VelocityConfig;
use acoustic_wave_modeller::{Execution, SimulationConfig, WaveSolver};
use std::path::Path;

fn load(name: &str) -> SimulationConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs").join(name);
    SimulationConfig::from_file(&path).unwrap()
}

#[test]
fn test_homogeneous_config_matches_defaults() {
    let config = load("homogeneous.toml");
    assert_eq!(config, SimulationConfig::default());
    assert!(WaveSolver::new(&config).is_ok());
}

#[test]
fn test_layered_config_builds_solver() {
    let config = load("layered.toml");
    assert!(matches!(config.velocity, VelocityConfig::Layered(ref l) if l.layers.len() == 2));
    assert_eq!(config.execution(), Execution::Parallel);

    let derived = config.derive().unwrap();
    assert_eq!((derived.nx, derived.nz, derived.nt), (300, 200, 750));
    assert_eq!((derived.isrc, derived.jsrc), (150, 10));

    let solver = WaveSolver::new(&config).unwrap();
    let vp = solver.velocity();
    assert_eq!(vp[[0, 0]], 1800.0);
    assert_eq!(vp[[0, 60]], 2600.0);
    assert_eq!(vp[[0, 199]], 4000.0);
    // 4000 m/s at 5 m needs dt <= 0.000884
    assert!(solver.dt() < 5.0 / (4000.0 * std::f64::consts::SQRT_2));
}
