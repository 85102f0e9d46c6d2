//! Configuration validation module
//!
//! Validation rules:
//! - at least one camera; multiple cameras must all be named, names unique
//! - preset list per camera non-empty
//! - resolutions, fov, tick counts and delays within sane bounds
//! - texture labels unique across the whole plan

use std::collections::HashSet;

use contracts::{ContractError, RunBlueprint};

/// Validate a RunBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    validate_run(blueprint)?;
    validate_world(blueprint)?;
    validate_cameras(blueprint)?;
    validate_textures(blueprint)?;
    Ok(())
}

fn validate_run(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    let run = &blueprint.run;

    if run.name.is_empty() {
        return Err(ContractError::config_validation(
            "run.name",
            "test name cannot be empty",
        ));
    }
    if run.ticks == 0 {
        return Err(ContractError::config_validation(
            "run.ticks",
            "recording must run for at least one tick",
        ));
    }
    if run.tick_length <= 0.0 {
        return Err(ContractError::config_validation(
            "run.tick_length",
            format!("tick_length must be > 0, got {}", run.tick_length),
        ));
    }
    if run.flush_secs < 0.0 {
        return Err(ContractError::config_validation(
            "run.flush_secs",
            format!("flush_secs must be >= 0, got {}", run.flush_secs),
        ));
    }
    if run.vehicle.is_empty() {
        return Err(ContractError::config_validation(
            "run.vehicle",
            "vehicle blueprint cannot be empty",
        ));
    }
    Ok(())
}

fn validate_world(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    if blueprint.world.timeout_secs <= 0.0 {
        return Err(ContractError::config_validation(
            "world.timeout_secs",
            format!(
                "timeout_secs must be > 0, got {}",
                blueprint.world.timeout_secs
            ),
        ));
    }
    Ok(())
}

fn validate_cameras(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    if blueprint.cameras.is_empty() {
        return Err(ContractError::config_validation(
            "cameras",
            "at least one camera is required",
        ));
    }

    // Unnamed cameras share the empty folder prefix, so only a single
    // camera may stay unnamed.
    if blueprint.cameras.len() > 1 {
        for (idx, cam) in blueprint.cameras.iter().enumerate() {
            if cam.name.is_empty() {
                return Err(ContractError::config_validation(
                    format!("cameras[{idx}].name"),
                    "cameras must be named when more than one is configured",
                ));
            }
        }
    }

    let mut seen = HashSet::new();
    for (idx, cam) in blueprint.cameras.iter().enumerate() {
        if !cam.name.is_empty() && !seen.insert(cam.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("cameras[{idx}].name"),
                format!("duplicate camera name '{}'", cam.name),
            ));
        }
        if cam.presets.is_empty() {
            return Err(ContractError::config_validation(
                format!("cameras[{idx}].presets"),
                "preset list cannot be empty",
            ));
        }
        if cam.width == 0 || cam.height == 0 {
            return Err(ContractError::config_validation(
                format!("cameras[{idx}]"),
                format!("resolution must be non-zero, got {}x{}", cam.width, cam.height),
            ));
        }
        if cam.fov <= 0.0 || cam.fov > 180.0 {
            return Err(ContractError::config_validation(
                format!("cameras[{idx}].fov"),
                format!("fov must be in (0, 180], got {}", cam.fov),
            ));
        }
        if cam.sensor_tick < 0.0 {
            return Err(ContractError::config_validation(
                format!("cameras[{idx}].sensor_tick"),
                format!("sensor_tick must be >= 0, got {}", cam.sensor_tick),
            ));
        }
        if cam.save_delay < 0.0 {
            return Err(ContractError::config_validation(
                format!("cameras[{idx}].save_delay"),
                format!("save_delay must be >= 0, got {}", cam.save_delay),
            ));
        }
    }
    Ok(())
}

/// Texture labels name result subfolders; a duplicate would silently
/// overwrite the earlier cycle's frames.
fn validate_textures(blueprint: &RunBlueprint) -> Result<(), ContractError> {
    let Some(plan) = &blueprint.textures else {
        return Ok(());
    };

    let mut seen = HashSet::new();
    for label in &plan.labels {
        if !seen.insert(label.as_str()) {
            return Err(ContractError::config_validation(
                "textures.labels",
                format!("duplicate texture label '{label}'"),
            ));
        }
    }
    for entry in &plan.entries {
        if !seen.insert(entry.label.as_str()) {
            return Err(ContractError::config_validation(
                "textures.entries",
                format!("duplicate texture label '{}'", entry.label),
            ));
        }
        if entry.path.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                "textures.entries",
                format!("texture '{}' has an empty path", entry.label),
            ));
        }
    }
    Ok(())
}
