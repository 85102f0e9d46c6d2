//! `info` command implementation.

use anyhow::{Context, Result};

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        println!("{}", config_loader::ConfigLoader::to_json(&blueprint)?);
        return Ok(());
    }

    println!("Run '{}'", blueprint.run.name);
    if let Some(town) = &blueprint.run.town {
        println!("  Town: {}", town);
    }
    println!("  Vehicle: {}", blueprint.run.vehicle);
    println!("  Spawn point: {}", blueprint.run.spawn_point);
    println!(
        "  Ticks: {} prep + {} recording @ {}s",
        blueprint.run.ticks_prep, blueprint.run.ticks, blueprint.run.tick_length
    );
    println!(
        "  CARLA: {}:{} (timeout {}s)",
        blueprint.world.carla_host, blueprint.world.carla_port, blueprint.world.timeout_secs
    );
    if let Some(weather) = &blueprint.weather {
        println!("  Weather: {}", weather.name());
    }

    if args.cameras {
        println!("\nCameras ({}):", blueprint.cameras.len());
        for camera in &blueprint.cameras {
            let name = if camera.name.is_empty() {
                "<unnamed>"
            } else {
                &camera.name
            };
            println!(
                "  - {}: {}x{}, fov {}, sensor_tick {}, save_delay {}s, settle {:.2}s",
                name,
                camera.width,
                camera.height,
                camera.fov,
                camera.sensor_tick,
                camera.save_delay,
                camera.settle_secs()
            );
            for preset in &camera.presets {
                let known = capture::presets::overrides_for(preset).is_some();
                println!(
                    "      {} {}",
                    preset,
                    if known { "" } else { "(unknown preset!)" }
                );
            }
        }
    }

    if args.textures {
        match &blueprint.textures {
            Some(plan) => {
                let assignments =
                    capture::textures::resolve_plan(plan).context("Texture plan does not resolve")?;
                let targets = capture::textures::resolve_targets(plan);
                println!("\nTextures ({} cycles):", assignments.len());
                for assignment in &assignments {
                    println!("  - {} <- {}", assignment.label, assignment.path.display());
                }
                println!("Targets ({}):", targets.len());
                for target in &targets {
                    println!("  - {}", target);
                }
            }
            None => println!("\nTextures: none (single Default cycle)"),
        }
    }

    Ok(())
}
