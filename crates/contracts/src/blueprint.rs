//! RunBlueprint - Config Loader output
//!
//! Describes one complete capture run: simulator endpoint, drive/tick
//! parameters, camera descriptors, weather selection, texture plan.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Location, Transform, WeatherSelection};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete blueprint for one capture run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Simulator endpoint settings
    #[serde(default)]
    pub world: WorldConfig,

    /// Drive and tick parameters
    pub run: RunConfig,

    /// Camera descriptors, one per physical mount point
    pub cameras: Vec<CameraConfig>,

    /// Weather applied once before the first cycle (optional)
    #[serde(default)]
    pub weather: Option<WeatherSelection>,

    /// Texture repaint plan (optional; absent = one `Default` cycle)
    #[serde(default)]
    pub textures: Option<TexturePlan>,
}

/// Simulator endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// CARLA server address
    #[serde(default = "default_carla_host")]
    pub carla_host: String,

    /// CARLA server port
    #[serde(default = "default_carla_port")]
    pub carla_port: u16,

    /// Client timeout in seconds; generous because map loads are slow
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    /// Traffic manager port
    #[serde(default = "default_tm_port")]
    pub tm_port: u16,
}

fn default_carla_host() -> String {
    "127.0.0.1".to_string()
}

fn default_carla_port() -> u16 {
    2000
}

fn default_timeout_secs() -> f64 {
    15.0
}

fn default_tm_port() -> u16 {
    8000
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            carla_host: default_carla_host(),
            carla_port: default_carla_port(),
            timeout_secs: default_timeout_secs(),
            tm_port: default_tm_port(),
        }
    }
}

/// Drive and tick parameters for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Test name, used for labeling the result directory
    #[serde(default = "default_name")]
    pub name: String,

    /// Map to load before the run; `None` keeps whatever is loaded
    #[serde(default)]
    pub town: Option<String>,

    /// Spawn point index of the vehicle in the loaded map
    #[serde(default = "default_spawn_point")]
    pub spawn_point: usize,

    /// Vehicle blueprint
    #[serde(default = "default_vehicle")]
    pub vehicle: String,

    /// World steps for accelerating the vehicle before recording starts
    #[serde(default = "default_ticks_prep")]
    pub ticks_prep: u32,

    /// World steps while recording
    #[serde(default = "default_ticks")]
    pub ticks: u32,

    /// Length of one world step in simulated seconds
    #[serde(default = "default_tick_length")]
    pub tick_length: f64,

    /// Grace sleep before teardown so in-flight frame saves can finish
    #[serde(default = "default_flush_secs")]
    pub flush_secs: f64,

    /// Base folder for results; overridable on the command line
    #[serde(default)]
    pub results_root: Option<PathBuf>,
}

fn default_name() -> String {
    "generic_test".to_string()
}

fn default_spawn_point() -> usize {
    79
}

fn default_vehicle() -> String {
    "vehicle.bmw.grandtourer".to_string()
}

fn default_ticks_prep() -> u32 {
    50
}

fn default_ticks() -> u32 {
    200
}

fn default_tick_length() -> f64 {
    0.05
}

fn default_flush_secs() -> f64 {
    10.0
}

/// One camera mount point with its preset list.
///
/// Default resolution matches the GTSRB-style datasets the captured frames
/// feed into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Optional label; prefixes the per-preset result folders
    #[serde(default)]
    pub name: String,

    /// Horizontal resolution
    #[serde(default = "default_width")]
    pub width: u32,

    /// Vertical resolution
    #[serde(default = "default_height")]
    pub height: u32,

    /// Field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f64,

    /// Seconds between captures; 0.0 = one frame per world step
    #[serde(default)]
    pub sensor_tick: f64,

    /// Preset names applied one sensor each
    #[serde(default = "default_presets")]
    pub presets: Vec<String>,

    /// Mount pose relative to the vehicle
    #[serde(default = "default_mount")]
    pub mount: Transform,

    /// Per-frame save delay in seconds, staggered by preset index
    #[serde(default = "default_save_delay")]
    pub save_delay: f64,
}

fn default_width() -> u32 {
    1360
}

fn default_height() -> u32 {
    800
}

fn default_fov() -> f64 {
    120.0
}

fn default_presets() -> Vec<String> {
    vec!["01_default_new".to_string()]
}

fn default_mount() -> Transform {
    Transform::at(Location::new(0.6, 0.0, 1.45))
}

fn default_save_delay() -> f64 {
    0.25
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: default_width(),
            height: default_height(),
            fov: default_fov(),
            sensor_tick: 0.0,
            presets: default_presets(),
            mount: default_mount(),
            save_delay: default_save_delay(),
        }
    }
}

impl CameraConfig {
    /// Folder prefix: the camera name plus `_`, or empty for unnamed cameras
    pub fn folder_prefix(&self) -> String {
        if self.name.is_empty() {
            String::new()
        } else {
            format!("{}_", self.name)
        }
    }

    /// Settle time = save delay x number of presets.
    ///
    /// Paces the step loop: the last preset's save callback waits
    /// `(presets - 1) * save_delay` before writing, plus the write itself.
    pub fn settle_secs(&self) -> f64 {
        self.save_delay * self.presets.len() as f64
    }

    pub fn settle_time(&self) -> Duration {
        Duration::from_secs_f64(self.settle_secs())
    }
}

/// Texture repaint plan: which sign textures to cycle through and which
/// in-world objects receive them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TexturePlan {
    /// Labels resolved against the built-in sign catalog
    #[serde(default)]
    pub labels: Vec<String>,

    /// Explicit assignments in addition to (or instead of) catalog labels
    #[serde(default)]
    pub entries: Vec<TextureAssignment>,

    /// Target object names; empty = the built-in Town07 round-sign list
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Symbolic label plus the image file painted for it.
///
/// Labels feed the downstream classifier taxonomy; they also name the
/// per-cycle result subfolder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureAssignment {
    pub label: String,
    pub path: PathBuf,
}

impl TexturePlan {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_defaults_match_dataset_resolution() {
        let cam = CameraConfig::default();
        assert_eq!(cam.width, 1360);
        assert_eq!(cam.height, 800);
        assert_eq!(cam.fov, 120.0);
        assert_eq!(cam.presets, vec!["01_default_new".to_string()]);
        assert_eq!(cam.save_delay, 0.25);
        assert_eq!(cam.mount.location.x, 0.6);
        assert_eq!(cam.mount.location.z, 1.45);
    }

    #[test]
    fn settle_time_is_delay_times_preset_count() {
        let mut cam = CameraConfig {
            save_delay: 0.25,
            ..Default::default()
        };
        cam.presets = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(cam.settle_secs(), 0.75);

        cam.save_delay = 0.0;
        assert_eq!(cam.settle_secs(), 0.0);

        cam.save_delay = 2.0;
        cam.presets = vec!["a".into()];
        assert_eq!(cam.settle_secs(), 2.0);
    }

    #[test]
    fn folder_prefix_appends_separator_only_when_named() {
        let unnamed = CameraConfig::default();
        assert_eq!(unnamed.folder_prefix(), "");

        let named = CameraConfig {
            name: "Front_HR".to_string(),
            ..Default::default()
        };
        assert_eq!(named.folder_prefix(), "Front_HR_");
    }

    #[test]
    fn blueprint_deserializes_with_defaults() {
        let bp: RunBlueprint = serde_json::from_str(
            r#"{
                "run": { "name": "t7_demo", "spawn_point": 107 },
                "cameras": [{}]
            }"#,
        )
        .unwrap();
        assert_eq!(bp.world.carla_host, "127.0.0.1");
        assert_eq!(bp.world.carla_port, 2000);
        assert_eq!(bp.world.tm_port, 8000);
        assert_eq!(bp.run.ticks_prep, 50);
        assert_eq!(bp.run.ticks, 200);
        assert_eq!(bp.run.tick_length, 0.05);
        assert_eq!(bp.run.vehicle, "vehicle.bmw.grandtourer");
        assert!(bp.weather.is_none());
        assert!(bp.textures.is_none());
    }
}
