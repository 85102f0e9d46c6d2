//! Mock simulator client
//!
//! Event-recording stub used by unit tests, the integration suite and the
//! default (simulator-less) run mode. Every trait call appends to an
//! ordered ledger so tests can assert sequencing, and each step fires one
//! synthetic frame into every listening camera so the save path is
//! exercised end to end.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use contracts::{ActorId, CapturedFrame, DecodedTexture, FrameCallback, Transform, WeatherParams};
use tracing::instrument;

use crate::client::WorldClient;
use crate::error::{Result, WorldClientError};

/// Mock client configuration
#[derive(Debug, Clone)]
pub struct MockWorldConfig {
    /// Number of spawn points the fake map exposes
    pub spawn_point_count: usize,
    /// Synthetic frame size (width, height)
    pub frame_size: (u32, u32),
    /// Fail the next vehicle spawn (for error-path tests)
    pub fail_vehicle_spawn: bool,
    /// Fail the next camera spawn
    pub fail_camera_spawn: bool,
}

impl Default for MockWorldConfig {
    fn default() -> Self {
        Self {
            spawn_point_count: 155,
            frame_size: (4, 2),
            fail_vehicle_spawn: false,
            fail_camera_spawn: false,
        }
    }
}

/// Ordered record of everything the orchestrator asked the world to do
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Connected,
    MapLoaded(String),
    FixedStepEnabled { step_secs: f64 },
    RealtimeRestored,
    SpectatorMoved,
    VehicleSpawned(ActorId),
    AutopilotEnabled { vehicle: ActorId },
    CameraSpawned(ActorId),
    Stepped(u64),
    WeatherApplied,
    ObjectPainted { object: String },
    ActorDestroyed(ActorId),
}

enum MockActor {
    Vehicle,
    Camera,
}

/// Mock simulator client
pub struct MockWorld {
    config: MockWorldConfig,
    connected: Mutex<bool>,
    /// Actor IDs start at 1000 for easy recognition in logs
    next_actor_id: AtomicU32,
    actors: Mutex<HashMap<ActorId, MockActor>>,
    cameras: Mutex<HashMap<ActorId, FrameCallback>>,
    frame: AtomicU64,
    events: Arc<Mutex<Vec<WorldEvent>>>,
}

impl MockWorld {
    /// Create default mock client
    pub fn new() -> Self {
        Self::with_config(MockWorldConfig::default())
    }

    /// Create mock client with configuration
    pub fn with_config(config: MockWorldConfig) -> Self {
        Self {
            config,
            connected: Mutex::new(false),
            next_actor_id: AtomicU32::new(1000),
            actors: Mutex::new(HashMap::new()),
            cameras: Mutex::new(HashMap::new()),
            frame: AtomicU64::new(0),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the event ledger
    pub fn events(&self) -> Vec<WorldEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Shared handle to the ledger; stays readable after the client has
    /// been consumed by the orchestrator
    pub fn event_handle(&self) -> Arc<Mutex<Vec<WorldEvent>>> {
        self.events.clone()
    }

    /// Number of currently alive actors
    pub fn actor_count(&self) -> usize {
        self.actors.lock().unwrap().len()
    }

    fn record(&self, event: WorldEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn allocate_actor_id(&self) -> ActorId {
        self.next_actor_id.fetch_add(1, Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<()> {
        if *self.connected.lock().unwrap() {
            Ok(())
        } else {
            Err(WorldClientError::connection("not connected"))
        }
    }

    fn synthetic_frame(&self, frame_number: u64) -> CapturedFrame {
        let (width, height) = self.config.frame_size;
        // Solid mid-gray BGRA so saved PNGs are valid and non-empty
        let data = vec![128u8; (width * height * 4) as usize];
        CapturedFrame {
            frame_number,
            width,
            height,
            data: Bytes::from(data),
        }
    }
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldClient for MockWorld {
    #[instrument(name = "mock_world_connect", skip(self, _timeout), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16, _timeout: Duration) -> Result<()> {
        let _ = (host, port);
        *self.connected.lock().unwrap() = true;
        self.record(WorldEvent::Connected);
        Ok(())
    }

    #[instrument(name = "mock_world_ensure_map", skip(self), fields(town = %town))]
    async fn ensure_map(&self, town: &str) -> Result<()> {
        self.ensure_connected()?;
        self.record(WorldEvent::MapLoaded(town.to_string()));
        Ok(())
    }

    #[instrument(name = "mock_world_enable_fixed_step", skip(self), fields(step_secs))]
    async fn enable_fixed_step(&self, step_secs: f64, _tm_port: u16) -> Result<()> {
        self.ensure_connected()?;
        self.record(WorldEvent::FixedStepEnabled { step_secs });
        Ok(())
    }

    #[instrument(name = "mock_world_restore_realtime", skip(self))]
    async fn restore_realtime(&self) -> Result<()> {
        self.ensure_connected()?;
        self.record(WorldEvent::RealtimeRestored);
        Ok(())
    }

    #[instrument(name = "mock_world_spawn_point", skip(self), fields(index))]
    async fn spawn_point(&self, index: usize) -> Result<Transform> {
        self.ensure_connected()?;
        if index >= self.config.spawn_point_count {
            return Err(WorldClientError::SpawnPointOutOfRange {
                index,
                available: self.config.spawn_point_count,
            });
        }
        Ok(Transform::at(contracts::Location::new(
            index as f64,
            0.0,
            0.5,
        )))
    }

    #[instrument(name = "mock_world_move_spectator", skip(self, _pose))]
    async fn move_spectator(&self, _pose: Transform) -> Result<()> {
        self.ensure_connected()?;
        self.record(WorldEvent::SpectatorMoved);
        Ok(())
    }

    #[instrument(name = "mock_world_spawn_vehicle", skip(self, _at), fields(blueprint = %blueprint))]
    async fn spawn_vehicle(&self, blueprint: &str, _at: Transform) -> Result<ActorId> {
        self.ensure_connected()?;
        if self.config.fail_vehicle_spawn {
            return Err(WorldClientError::vehicle_spawn(blueprint, "mock failure"));
        }

        let actor_id = self.allocate_actor_id();
        self.actors
            .lock()
            .unwrap()
            .insert(actor_id, MockActor::Vehicle);
        self.record(WorldEvent::VehicleSpawned(actor_id));
        Ok(actor_id)
    }

    #[instrument(name = "mock_world_enable_autopilot", skip(self), fields(vehicle))]
    async fn enable_autopilot(
        &self,
        vehicle: ActorId,
        _target_speed: f32,
        _ignore_signs_pct: f32,
    ) -> Result<()> {
        if !self.actors.lock().unwrap().contains_key(&vehicle) {
            return Err(WorldClientError::ActorNotFound { actor_id: vehicle });
        }
        self.record(WorldEvent::AutopilotEnabled { vehicle });
        Ok(())
    }

    #[instrument(name = "mock_world_vehicle_speed", skip(self), fields(vehicle))]
    async fn vehicle_speed(&self, vehicle: ActorId) -> Result<f64> {
        if !self.actors.lock().unwrap().contains_key(&vehicle) {
            return Err(WorldClientError::ActorNotFound { actor_id: vehicle });
        }
        // Fake acceleration curve: half a m/s per elapsed step, capped
        let steps = self.frame.load(Ordering::Relaxed) as f64;
        Ok((steps * 0.5).min(10.0))
    }

    #[instrument(
        name = "mock_world_spawn_camera",
        skip(self, attributes, _mount, on_frame),
        fields(parent, attribute_count = attributes.len())
    )]
    async fn spawn_camera(
        &self,
        attributes: &HashMap<String, String>,
        _mount: Transform,
        parent: ActorId,
        on_frame: FrameCallback,
    ) -> Result<ActorId> {
        self.ensure_connected()?;

        if !self.actors.lock().unwrap().contains_key(&parent) {
            return Err(WorldClientError::CameraSpawnFailed {
                parent_id: parent,
                message: "parent actor not found".into(),
            });
        }
        if self.config.fail_camera_spawn {
            return Err(WorldClientError::CameraSpawnFailed {
                parent_id: parent,
                message: "mock failure".into(),
            });
        }

        let actor_id = self.allocate_actor_id();
        self.actors
            .lock()
            .unwrap()
            .insert(actor_id, MockActor::Camera);
        self.cameras.lock().unwrap().insert(actor_id, on_frame);
        self.record(WorldEvent::CameraSpawned(actor_id));
        Ok(actor_id)
    }

    #[instrument(name = "mock_world_step", skip(self))]
    async fn step(&self) -> Result<u64> {
        self.ensure_connected()?;
        let frame = self.frame.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(WorldEvent::Stepped(frame));

        // Fire one synthetic frame per listening camera, like the real
        // sensor callbacks would after a world tick.
        let mut cameras = self.cameras.lock().unwrap();
        for callback in cameras.values_mut() {
            callback(self.synthetic_frame(frame));
        }
        Ok(frame)
    }

    #[instrument(name = "mock_world_set_weather", skip(self, _weather))]
    async fn set_weather(&self, _weather: &WeatherParams) -> Result<()> {
        self.ensure_connected()?;
        self.record(WorldEvent::WeatherApplied);
        Ok(())
    }

    #[instrument(name = "mock_world_paint_object", skip(self, texture), fields(object = %object))]
    async fn paint_object(&self, object: &str, texture: &DecodedTexture) -> Result<()> {
        self.ensure_connected()?;
        if texture.data.len() != (texture.width * texture.height * 4) as usize {
            return Err(WorldClientError::TextureUploadFailed {
                object: object.to_string(),
                message: "pixel buffer does not match dimensions".into(),
            });
        }
        self.record(WorldEvent::ObjectPainted {
            object: object.to_string(),
        });
        Ok(())
    }

    #[instrument(name = "mock_world_destroy_actor", skip(self), fields(actor_id))]
    async fn destroy_actor(&self, actor_id: ActorId) -> Result<()> {
        // Idempotent: return Ok even if not present
        if self.actors.lock().unwrap().remove(&actor_id).is_some() {
            self.cameras.lock().unwrap().remove(&actor_id);
            self.record(WorldEvent::ActorDestroyed(actor_id));
        }
        Ok(())
    }
}
