//! `run` command implementation.
//!
//! Supports both real CARLA and mock modes via feature flags. When the
//! `real-carla` feature is disabled, runs in mock mode.
//!
//! There is deliberately no cancellation handling: a capture run either
//! completes or the operator kills the process and uses `restore`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use contracts::RunBlueprint;
use tracing::info;
use world_client::WorldClient;

use crate::cli::RunArgs;
use crate::logfile::LateLogFile;

/// Execute the `run` command
pub async fn run_capture(args: &RunArgs, log_file: &LateLogFile) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding CARLA host from CLI");
        blueprint.world.carla_host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port = %port, "Overriding CARLA port from CLI");
        blueprint.world.carla_port = port;
    }

    info!(
        name = %blueprint.run.name,
        town = ?blueprint.run.town,
        host = %blueprint.world.carla_host,
        port = blueprint.world.carla_port,
        cameras = blueprint.cameras.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Results root: CLI argument > config > ./results
    let results_root = args
        .results
        .clone()
        .or_else(|| blueprint.run.results_root.clone())
        .unwrap_or_else(|| PathBuf::from("results"));

    let run_root = capture::init_result_folder(&results_root, &blueprint.run.name)
        .with_context(|| format!("Failed to create result folder under {}", results_root.display()))?;

    // Mirror the log into the result folder from here on
    let log_path = run_root.join(format!(
        "log{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M")
    ));
    log_file
        .bind(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
    info!(log = %log_path.display(), "Run log mirrored to file");

    run_with_client(blueprint, run_root).await
}

/// Run against a real CARLA server
#[cfg(feature = "real-carla")]
async fn run_with_client(blueprint: RunBlueprint, run_root: PathBuf) -> Result<()> {
    use world_client::RealCarlaWorld;

    info!(
        host = %blueprint.world.carla_host,
        port = blueprint.world.carla_port,
        "Connecting to CARLA server..."
    );
    drive(RealCarlaWorld::new(), blueprint, run_root).await
}

/// Run against the mock client
#[cfg(not(feature = "real-carla"))]
async fn run_with_client(blueprint: RunBlueprint, run_root: PathBuf) -> Result<()> {
    use world_client::MockWorld;

    info!("Running in MOCK mode (no CARLA server required)");
    drive(MockWorld::new(), blueprint, run_root).await
}

/// Common run logic shared between mock and real modes
async fn drive<W: WorldClient>(world: W, blueprint: RunBlueprint, run_root: PathBuf) -> Result<()> {
    let mut run = capture::TestRun::connect(world, &blueprint, run_root)
        .await
        .context("Failed to start test run")?;

    if let Some(weather) = blueprint.weather {
        info!(weather = weather.name(), "Applying weather");
        run.set_weather(&weather.to_params())
            .await
            .context("Failed to apply weather")?;
    }

    run.execute(blueprint.textures.as_ref())
        .await
        .context("Capture run failed")?;

    run.end().await.context("Failed to restore real-time mode")?;

    info!("TSR Harness finished");
    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &RunBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Run:");
    println!("  Name: {}", blueprint.run.name);
    if let Some(town) = &blueprint.run.town {
        println!("  Town: {}", town);
    }
    println!("  Spawn point: {}", blueprint.run.spawn_point);
    println!(
        "  Ticks: {} prep + {} recording @ {}s",
        blueprint.run.ticks_prep, blueprint.run.ticks, blueprint.run.tick_length
    );
    println!(
        "  CARLA: {}:{}",
        blueprint.world.carla_host, blueprint.world.carla_port
    );

    println!("\nCameras ({}):", blueprint.cameras.len());
    for camera in &blueprint.cameras {
        let name = if camera.name.is_empty() {
            "<unnamed>"
        } else {
            &camera.name
        };
        println!(
            "  - {} {}x{} fov {} - {} presets, settle {:.2}s",
            name,
            camera.width,
            camera.height,
            camera.fov,
            camera.presets.len(),
            camera.settle_secs()
        );
    }

    if let Some(weather) = &blueprint.weather {
        println!("\nWeather: {}", weather.name());
    }

    if let Some(textures) = &blueprint.textures {
        println!(
            "\nTextures: {} catalog labels, {} explicit entries",
            textures.labels.len(),
            textures.entries.len()
        );
    }

    println!();
}
