//! Camera rig: one configured mount point, one sensor per preset
//!
//! Each sensor saves into its own subfolder. Save callbacks are staggered
//! by preset index x save_delay so the cameras of one tick do not all hit
//! the disk at the same moment; the rig's settle time tells the
//! orchestrator how long to pace the step loop for the slowest sensor.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{ActorId, CameraConfig, CapturedFrame, FrameCallback};
use tracing::{error, info};
use world_client::WorldClient;

use crate::error::Result;
use crate::presets;

/// One camera mount with its preset list and the spawned sensors
pub struct CameraRig {
    config: CameraConfig,
    sensors: Vec<ActorId>,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            sensors: Vec::new(),
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Settle time for the whole rig, see `CameraConfig::settle_time`
    pub fn settle_time(&self) -> Duration {
        self.config.settle_time()
    }

    /// Number of currently attached sensors
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Log the rig configuration at the start of a run
    pub fn log_summary(&self) {
        info!(
            camera = %self.config.name,
            resolution = format!("{}x{}", self.config.width, self.config.height),
            fov = self.config.fov,
            sensor_tick = self.config.sensor_tick,
            presets = ?self.config.presets,
            "camera configured"
        );
    }

    /// Preset name at an index.
    ///
    /// An out-of-range index falls back to the first preset with a logged
    /// error instead of failing the run.
    pub fn preset_at(&self, index: usize) -> &str {
        match self.config.presets.get(index) {
            Some(preset) => preset,
            None => {
                error!(
                    index,
                    available = self.config.presets.len(),
                    "camera preset index out of range, switching to default"
                );
                &self.config.presets[0]
            }
        }
    }

    /// Spawn one sensor per preset and start saving frames under
    /// `cycle_dir`.
    ///
    /// `tick` is the per-run tick counter the save callbacks read to name
    /// their output files.
    pub async fn attach<W: WorldClient>(
        &mut self,
        world: &W,
        vehicle: ActorId,
        cycle_dir: &Path,
        tick: Arc<AtomicU64>,
    ) -> Result<()> {
        for index in 0..self.config.presets.len() {
            let preset = self.preset_at(index).to_string();
            info!(camera = %self.config.name, preset = %preset, "attaching camera sensor");

            let attributes = presets::camera_attributes(&self.config, &preset);

            let sensor_dir = cycle_dir.join(format!("{}{}", self.config.folder_prefix(), preset));
            if !sensor_dir.exists() {
                info!(folder = %sensor_dir.display(), "creating folder");
                std::fs::create_dir_all(&sensor_dir)?;
            }

            let save_offset = Duration::from_secs_f64(index as f64 * self.config.save_delay);
            let callback = frame_saver(sensor_dir, save_offset, tick.clone());

            let actor_id = world
                .spawn_camera(&attributes, self.config.mount, vehicle, callback)
                .await?;
            self.sensors.push(actor_id);
        }
        Ok(())
    }

    /// Destroy all sensors of this rig. Idempotent; safe to call on an
    /// already-detached rig.
    pub async fn detach_all<W: WorldClient>(&mut self, world: &W) -> Result<()> {
        info!(
            camera = %self.config.name,
            count = self.sensors.len(),
            "destroying cameras"
        );
        for actor_id in self.sensors.drain(..) {
            world.destroy_actor(actor_id).await?;
        }
        Ok(())
    }
}

/// Build the out-of-band save callback for one sensor.
///
/// Runs on the simulator's callback thread: waits its stagger offset,
/// then writes `<tick>.png`. Errors are logged, not propagated; there is
/// nobody to propagate to out of band.
fn frame_saver(dir: PathBuf, offset: Duration, tick: Arc<AtomicU64>) -> FrameCallback {
    Box::new(move |frame: CapturedFrame| {
        if !offset.is_zero() {
            std::thread::sleep(offset);
        }
        let tick_number = tick.load(Ordering::SeqCst);
        let path = dir.join(format!("{tick_number:04}.png"));
        match save_frame_png(&path, &frame) {
            Ok(()) => info!(path = %path.display(), "saved frame"),
            Err(e) => error!(path = %path.display(), error = %e, "failed to save frame"),
        }
    })
}

/// Write a BGRA frame as an RGBA png
fn save_frame_png(path: &Path, frame: &CapturedFrame) -> std::io::Result<()> {
    if frame.data.len() != frame.expected_len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "frame buffer is {} bytes, expected {}",
                frame.data.len(),
                frame.expected_len()
            ),
        ));
    }

    // Convert BGRA to RGBA
    let mut rgba = frame.data.to_vec();
    for chunk in rgba.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }

    image::save_buffer(
        path,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
    )
    .map_err(std::io::Error::other)
}
