use particle_demo::config::DemoConfig;
use particle_demo::core::{init_logging, EngineResult};
use particle_demo::demo::Demo;
use particle_demo::render::NullBackend;

fn main() {
    if let Err(e) = run() {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> EngineResult<()> {
    let mut config = DemoConfig::load_or_default();
    config.apply_env_overrides();
    init_logging(&config.logging);

    tracing::info!(
        target: "demo",
        frames = config.simulation.frames,
        frame_time = config.simulation.frame_time,
        seed = ?config.simulation.seed,
        "Starting particle demo"
    );

    let mut demo = Demo::new(config, NullBackend::new())?;
    let summary = demo.run();
    demo.shutdown();
    println!(
        "{} frames, peak {} particles, {} spawned, {} hits, score {}",
        summary.frames, summary.peak_living, summary.spawned, summary.hits, summary.score
    );
    Ok(())
}
