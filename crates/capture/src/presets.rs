//! Camera preset table
//!
//! A preset is a named bundle of sensor attribute overrides applied to a
//! camera blueprint before a recording phase. The table is data, not
//! branching logic: an unknown preset is a single lookup miss that logs a
//! warning and applies no overrides instead of failing the run.

use std::collections::HashMap;

use contracts::CameraConfig;
use tracing::warn;

/// Attribute overrides of one preset
pub type AttributeOverrides = &'static [(&'static str, &'static str)];

/// The recognized no-op preset: camera stays at the harness baseline
/// (manual exposure, gamma 1.0)
pub const NO_OP_PRESET: &str = "01_default_new";

/// All known presets.
///
/// Numbering groups related settings: 0x exposure baselines, 1x motion
/// blur, 2x shutter speed, 3x ISO, 4x gamma, 5x lens flare, 6x aperture,
/// 7x-8x post-processing and lens distortion.
pub const PRESET_TABLE: &[(&str, AttributeOverrides)] = &[
    // restore the simulator's own defaults
    (
        "00_default_carla",
        &[("exposure_mode", "histogram"), ("gamma", "2.2")],
    ),
    (NO_OP_PRESET, &[]),
    ("02_auto_exposure", &[("exposure_mode", "histogram")]),
    (
        "10_mblur_low",
        &[
            ("blur_amount", "0.3"),
            ("motion_blur_intensity", "0.2"),
            ("motion_blur_max_distortion", "0.15"),
            ("motion_blur_min_object_screen_size", "0.04"),
        ],
    ),
    (
        "11_mblur_high",
        &[
            ("blur_amount", "3.5"),
            ("motion_blur_intensity", "0.8"),
            ("motion_blur_max_distortion", "0.7"),
            ("motion_blur_min_object_screen_size", "0.4"),
        ],
    ),
    ("20_low_shutter_speed", &[("shutter_speed", "50.0")]),
    ("21_high_shutter_speed", &[("shutter_speed", "800.0")]),
    (
        "22_low_shutter_speed_iso",
        &[("shutter_speed", "50.0"), ("iso", "25")],
    ),
    (
        "23_high_shutter_speed_iso",
        &[("shutter_speed", "800.0"), ("iso", "400")],
    ),
    ("30_iso_400", &[("iso", "400")]),
    ("31_iso_25", &[("iso", "25")]),
    (
        "32_npp_iso400",
        &[("enable_postprocess_effects", "false"), ("iso", "400")],
    ),
    ("40_high_gamma", &[("gamma", "5.0")]),
    ("41_gamma_1.0", &[("gamma", "1.0")]),
    (
        "50_high_lensflare_intensity",
        &[("lens_flare_intensity", "1.5")],
    ),
    ("60_small_f_stop", &[("fstop", "0.7")]),
    ("61_large_fstop", &[("fstop", "2.8")]),
    ("62_small_f_stop_iso", &[("fstop", "0.7"), ("iso", "25")]),
    ("63_large_fstop_iso", &[("fstop", "2.8"), ("iso", "400")]),
    ("70_npp", &[("enable_postprocess_effects", "false")]),
    (
        "70_distort_lens_circle_falloff_1",
        &[("lens_circle_falloff", "1.0")],
    ),
    (
        "71_distort_lens_circle_falloff_9",
        &[("lens_circle_falloff", "9.0")],
    ),
    (
        "72_lens_circle_multiplier_5",
        &[("lens_circle_multiplier", "5.0")],
    ),
    ("73_lens_k_-10", &[("lens_k", "-10.0")]),
    ("74_lens_k_10", &[("lens_k", "10.0")]),
    ("75_lens_kcube_-10", &[("lens_kcube", "-10.0")]),
    ("76_lens_kcube_10", &[("lens_kcube", "10.0")]),
    (
        "80_lens_circle_multiplier_1",
        &[("lens_circle_multiplier", "1.0")],
    ),
    (
        "81_lens_circle_multiplier_2",
        &[("lens_circle_multiplier", "2.0")],
    ),
    (
        "82_lens_circle_multiplier_10",
        &[("lens_circle_multiplier", "10.0")],
    ),
];

/// Look up a preset's overrides; `None` for unknown names
pub fn overrides_for(preset: &str) -> Option<AttributeOverrides> {
    PRESET_TABLE
        .iter()
        .find(|(name, _)| *name == preset)
        .map(|(_, overrides)| *overrides)
}

/// Build the full attribute map for one camera sensor: the harness
/// baseline first, then the preset's overrides on top.
///
/// Unknown presets degrade to a warning and the bare baseline.
pub fn camera_attributes(config: &CameraConfig, preset: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::from([
        ("image_size_x".to_string(), config.width.to_string()),
        ("image_size_y".to_string(), config.height.to_string()),
        ("fov".to_string(), config.fov.to_string()),
        ("sensor_tick".to_string(), config.sensor_tick.to_string()),
        ("exposure_mode".to_string(), "manual".to_string()),
        ("gamma".to_string(), "1.0".to_string()),
    ]);

    match overrides_for(preset) {
        Some(overrides) => {
            for (key, value) in overrides {
                attrs.insert((*key).to_string(), (*value).to_string());
            }
        }
        None => warn!(preset, "unknown camera preset, using defaults"),
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_has_overrides_or_is_the_noop() {
        for (name, overrides) in PRESET_TABLE {
            assert!(
                !overrides.is_empty() || *name == NO_OP_PRESET,
                "preset '{name}' is empty but not the recognized no-op"
            );
        }
    }

    #[test]
    fn preset_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (name, _) in PRESET_TABLE {
            assert!(seen.insert(*name), "preset '{name}' declared twice");
        }
    }

    #[test]
    fn lookup_hits_exactly_one_entry() {
        for (name, overrides) in PRESET_TABLE {
            assert_eq!(overrides_for(name), Some(*overrides));
        }
        assert_eq!(overrides_for("99_not_a_preset"), None);
    }

    #[test]
    fn baseline_attributes_cover_resolution_and_exposure() {
        let config = CameraConfig::default();
        let attrs = camera_attributes(&config, NO_OP_PRESET);
        assert_eq!(attrs.get("image_size_x").unwrap(), "1360");
        assert_eq!(attrs.get("image_size_y").unwrap(), "800");
        assert_eq!(attrs.get("fov").unwrap(), "120");
        assert_eq!(attrs.get("exposure_mode").unwrap(), "manual");
        assert_eq!(attrs.get("gamma").unwrap(), "1.0");
    }

    #[test]
    fn preset_overrides_replace_baseline() {
        let config = CameraConfig::default();
        let attrs = camera_attributes(&config, "00_default_carla");
        assert_eq!(attrs.get("exposure_mode").unwrap(), "histogram");
        assert_eq!(attrs.get("gamma").unwrap(), "2.2");
    }

    #[test]
    fn unknown_preset_falls_back_to_baseline() {
        let config = CameraConfig::default();
        let attrs = camera_attributes(&config, "does_not_exist");
        assert_eq!(attrs.get("exposure_mode").unwrap(), "manual");
        assert_eq!(attrs.len(), 6);
    }
}
