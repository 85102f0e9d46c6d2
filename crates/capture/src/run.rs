//! Test-run orchestrator
//!
//! The one component with real sequencing logic. Per run:
//!
//! `DISCONNECTED -> CONNECTED(stepped) -> [PREPARING -> RECORDING ->
//! TEARDOWN]* -> REALTIME -> CLOSED`
//!
//! One `TestRun` per process; the run is not reentrant.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{RunBlueprint, RunConfig, TextureAssignment, TexturePlan, Transform, WeatherParams};
use tracing::info;
use world_client::WorldClient;

use crate::camera::CameraRig;
use crate::error::Result;
use crate::textures;

/// Autopilot target speed handed to the traffic manager
const TARGET_SPEED: f32 = 36.0;

/// The vehicle ignores every sign: the signs are what the cameras are
/// pointed at, not rules to obey
const IGNORE_SIGNS_PCT: f32 = 100.0;

/// Spectator hovers slightly above the spawn point
const SPECTATOR_Z: f64 = 2.0;

/// Vehicle spawns a little above the road to avoid ground collision
const VEHICLE_SPAWN_Z: f64 = 1.5;

/// Create the timestamped run folder under the results root.
///
/// Called before the run starts so the caller can bind the run log file
/// into it.
pub fn init_result_folder(results_root: &Path, name: &str) -> std::io::Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M");
    let folder = results_root.join(format!("{stamp}_{name}"));
    std::fs::create_dir_all(&folder)?;
    Ok(folder)
}

/// Orchestrates one capture run against a simulator.
///
/// Construction connects and switches the world to the stepped clock;
/// `end` restores real-time mode.
pub struct TestRun<W: WorldClient> {
    world: W,
    run: RunConfig,
    rigs: Vec<CameraRig>,
    run_root: PathBuf,
    spawn_pose: Transform,
    /// Current recording tick, read by the out-of-band save callbacks
    tick: Arc<AtomicU64>,
}

impl<W: WorldClient> TestRun<W> {
    /// DISCONNECTED -> CONNECTED(stepped)
    ///
    /// Connects, loads the configured town if needed (map loads reset the
    /// world settings, so this happens first), forces synchronous stepping
    /// on world and traffic manager, and resolves the spawn point.
    pub async fn connect(mut world: W, blueprint: &RunBlueprint, run_root: PathBuf) -> Result<Self> {
        let run = blueprint.run.clone();
        let endpoint = &blueprint.world;

        world
            .connect(
                &endpoint.carla_host,
                endpoint.carla_port,
                Duration::from_secs_f64(endpoint.timeout_secs),
            )
            .await?;

        if let Some(town) = &run.town {
            info!(town = %town, "loading map");
            world.ensure_map(town).await?;
        }

        info!("client connected, switching to sync mode");
        world
            .enable_fixed_step(run.tick_length, endpoint.tm_port)
            .await?;

        let point = world.spawn_point(run.spawn_point).await?;
        info!(
            spawn_point = run.spawn_point,
            location = ?point.location,
            "vehicle spawn point resolved"
        );
        // Move the operator's view to the action (only once per run)
        world.move_spectator(point.with_z(SPECTATOR_Z)).await?;
        let spawn_pose = point.with_z(VEHICLE_SPAWN_Z);

        let rigs: Vec<CameraRig> = blueprint
            .cameras
            .iter()
            .cloned()
            .map(CameraRig::new)
            .collect();

        info!(name = %run.name, folder = %run_root.display(), "test run configured");
        info!(
            spawn_point = run.spawn_point,
            ticks_prep = run.ticks_prep,
            ticks = run.ticks,
            tick_length = run.tick_length,
            "run parameters"
        );
        for rig in &rigs {
            rig.log_summary();
        }

        Ok(Self {
            world,
            run,
            rigs,
            run_root,
            spawn_pose,
            tick: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Root folder of this run's results
    pub fn run_root(&self) -> &Path {
        &self.run_root
    }

    /// Underlying world client (used by tests to inspect the ledger)
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Apply a weather bundle to the world
    pub async fn set_weather(&self, weather: &WeatherParams) -> Result<()> {
        self.world.set_weather(weather).await?;
        info!("weather changed");
        Ok(())
    }

    /// PREPARING -> RECORDING -> TEARDOWN for one cycle.
    ///
    /// `label` names the result subfolder; texture cycles pass the
    /// texture's symbolic label so outputs stay traceable.
    pub async fn run_cycle(&mut self, label: &str) -> Result<()> {
        let cycle_dir = self.run_root.join(label);
        std::fs::create_dir_all(&cycle_dir)?;

        // PREPARING: spawn and bring the vehicle up to cruising speed
        info!(label, "spawning new vehicle at spawn point");
        let vehicle = self.world.spawn_vehicle(&self.run.vehicle, self.spawn_pose).await?;
        self.world
            .enable_autopilot(vehicle, TARGET_SPEED, IGNORE_SIGNS_PCT)
            .await?;

        let step_pause = Duration::from_secs_f64(self.run.tick_length);
        info!(ticks = self.run.ticks_prep, "accelerating vehicle");
        for _ in 0..self.run.ticks_prep {
            self.world.step().await?;
            tokio::time::sleep(step_pause).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        // RECORDING: attach all rigs, then step with settle pacing
        let world = &self.world;
        for rig in &mut self.rigs {
            rig.attach(world, vehicle, &cycle_dir, self.tick.clone())
                .await?;
        }

        // Pace each step by the slowest rig so every out-of-band save
        // finishes before the next tick overwrites the counter.
        let settle = self
            .rigs
            .iter()
            .map(CameraRig::settle_time)
            .max()
            .unwrap_or(Duration::ZERO);

        for tick in 0..self.run.ticks {
            self.tick.store(tick as u64, Ordering::SeqCst);
            let speed = self.world.vehicle_speed(vehicle).await?;
            info!(tick, speed_mps = format!("{speed:.2}"), "recording tick");
            self.world.step().await?;
            tokio::time::sleep(settle).await;
        }

        // TEARDOWN: give the save callbacks time to drain, then destroy
        tokio::time::sleep(Duration::from_secs_f64(self.run.flush_secs)).await;
        let world = &self.world;
        for rig in &mut self.rigs {
            rig.detach_all(world).await?;
        }
        info!("destroy vehicle");
        self.world.destroy_actor(vehicle).await?;

        Ok(())
    }

    /// Upload one texture onto every target object
    pub async fn update_object_textures(
        &self,
        assignment: &TextureAssignment,
        targets: &[String],
    ) -> Result<()> {
        info!(
            texture = %assignment.path.display(),
            targets = targets.len(),
            "applying texture to objects"
        );
        let texture = textures::load_texture(&assignment.path)?;
        for object in targets {
            self.world.paint_object(object, &texture).await?;
        }
        Ok(())
    }

    /// One repaint + cycle per texture assignment
    pub async fn run_textures(
        &mut self,
        assignments: &[TextureAssignment],
        targets: &[String],
    ) -> Result<()> {
        for assignment in assignments {
            self.update_object_textures(assignment, targets).await?;
            self.run_cycle(&assignment.label).await?;
        }
        Ok(())
    }

    /// Execute the blueprint's texture plan, or a single `Default` cycle
    /// when no plan is configured.
    pub async fn execute(&mut self, plan: Option<&TexturePlan>) -> Result<()> {
        match plan {
            Some(plan) if !plan.is_empty() => {
                let assignments = textures::resolve_plan(plan)?;
                let targets = textures::resolve_targets(plan);
                self.run_textures(&assignments, &targets).await
            }
            _ => self.run_cycle("Default").await,
        }
    }

    /// REALTIME -> CLOSED: hand the simulator back in real-time mode
    pub async fn end(self) -> Result<()> {
        info!("switch back to real time mode");
        self.world.restore_realtime().await?;
        info!("test finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CameraConfig, TexturePlan, WorldConfig};
    use world_client::{MockWorld, WorldEvent};

    fn fast_blueprint(name: &str) -> RunBlueprint {
        RunBlueprint {
            version: contracts::ConfigVersion::V1,
            world: WorldConfig::default(),
            run: RunConfig {
                name: name.into(),
                town: Some("Town07_attacked".into()),
                spawn_point: 107,
                vehicle: "vehicle.bmw.grandtourer".into(),
                ticks_prep: 1,
                ticks: 2,
                tick_length: 0.001,
                flush_secs: 0.0,
                results_root: None,
            },
            cameras: vec![CameraConfig {
                presets: vec!["01_default_new".into()],
                save_delay: 0.0,
                ..Default::default()
            }],
            weather: None,
            textures: None,
        }
    }

    #[test]
    fn result_folder_is_timestamp_plus_name() {
        let root = tempfile::tempdir().unwrap();
        let folder = init_result_folder(root.path(), "t7_demo").unwrap();
        assert!(folder.is_dir());

        let file_name = folder.file_name().unwrap().to_str().unwrap();
        assert!(file_name.ends_with("_t7_demo"), "got: {file_name}");
        // YYYYmmdd_HHMM prefix
        let stamp = file_name.strip_suffix("_t7_demo").unwrap();
        assert_eq!(stamp.len(), 13);
        assert!(stamp[..8].chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn default_cycle_steps_and_tears_down_in_order() {
        let root = tempfile::tempdir().unwrap();
        let blueprint = fast_blueprint("order_check");
        let run_root = init_result_folder(root.path(), &blueprint.run.name).unwrap();

        let mut run = TestRun::connect(MockWorld::new(), &blueprint, run_root.clone())
            .await
            .unwrap();
        run.execute(None).await.unwrap();

        let events = run.world().events();
        let steps = events
            .iter()
            .filter(|e| matches!(e, WorldEvent::Stepped(_)))
            .count();
        // 1 prep tick + 2 recording ticks
        assert_eq!(steps, 3);

        // all camera destroys come before the vehicle destroy
        let destroys: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::ActorDestroyed(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(destroys.len(), 2);
        let vehicle = events
            .iter()
            .find_map(|e| match e {
                WorldEvent::VehicleSpawned(id) => Some(*id),
                _ => None,
            })
            .unwrap();
        assert_eq!(*destroys.last().unwrap(), vehicle);

        assert!(run_root.join("Default").is_dir());
        run.end().await.unwrap();
    }

    #[tokio::test]
    async fn texture_cycles_are_labeled_after_their_texture() {
        let root = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();

        // A tiny stand-in sign texture
        let sign = assets.path().join("sign.png");
        image::RgbaImage::new(2, 2).save(&sign).unwrap();

        let mut blueprint = fast_blueprint("texture_labels");
        blueprint.textures = Some(TexturePlan {
            labels: vec![],
            entries: vec![
                TextureAssignment {
                    label: "Speed_30".into(),
                    path: sign.clone(),
                },
                TextureAssignment {
                    label: "Speed_50#Speed_30".into(),
                    path: sign,
                },
            ],
            targets: vec!["BP_Tempo64_2".into(), "BP_Tempo65_5".into()],
        });

        let run_root = init_result_folder(root.path(), &blueprint.run.name).unwrap();
        let mut run = TestRun::connect(MockWorld::new(), &blueprint, run_root.clone())
            .await
            .unwrap();
        run.execute(blueprint.textures.as_ref()).await.unwrap();

        assert!(run_root.join("Speed_30").is_dir());
        assert!(run_root.join("Speed_50#Speed_30").is_dir());

        let painted = run
            .world()
            .events()
            .iter()
            .filter(|e| matches!(e, WorldEvent::ObjectPainted { .. }))
            .count();
        // 2 textures x 2 targets
        assert_eq!(painted, 4);
        run.end().await.unwrap();
    }

    #[tokio::test]
    async fn out_of_range_spawn_point_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let mut blueprint = fast_blueprint("bad_spawn");
        blueprint.run.spawn_point = 100_000;
        let run_root = init_result_folder(root.path(), &blueprint.run.name).unwrap();

        let result = TestRun::connect(MockWorld::new(), &blueprint, run_root).await;
        assert!(result.is_err());
    }
}
