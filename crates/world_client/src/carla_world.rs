//! Real CARLA client implementation
//!
//! Connects to a CARLA server using the carla-rust crate.
//! Only compiled when the `real-carla` feature is enabled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use carla::client::{ActorBase, Client, Sensor, Vehicle, World};
use carla::geom::{Location, Rotation, Transform as CarlaTransform};
use carla::rpc::MaterialParameter;
use carla::sensor::data::Image;
use carla::sensor::SensorDataBase;
use contracts::{ActorId, CapturedFrame, DecodedTexture, FrameCallback, Transform, WeatherParams};
use tracing::{debug, info, instrument, warn};

use crate::client::WorldClient;
use crate::error::{Result, WorldClientError};

/// Real CARLA client
///
/// Wraps carla-rust's Client, implements the WorldClient trait.
/// Uses Mutex for interior mutability, allowing `&self` methods to modify
/// World and the traffic manager.
#[derive(Default, Clone)]
pub struct RealCarlaWorld {
    /// CARLA client
    client: Arc<Mutex<Option<Client>>>,
    /// World reference
    world: Arc<Mutex<Option<World>>>,
    /// Traffic manager port chosen at `enable_fixed_step`
    tm_port: Arc<Mutex<Option<u16>>>,
    /// Created actors list (for teardown and handle lookup)
    actors: Arc<Mutex<HashMap<ActorId, ActorKind>>>,
}

/// Actor kind enumeration
#[derive(Clone)]
enum ActorKind {
    Vehicle(Vehicle),
    Camera(Sensor),
}

impl RealCarlaWorld {
    /// Create new client (disconnected state)
    pub fn new() -> Self {
        Self::default()
    }

    /// Access World with mutable reference, ensuring connected
    fn with_world_mut<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut World) -> Result<R>,
    {
        let mut world_guard = self.world.lock().unwrap();
        let world = world_guard
            .as_mut()
            .ok_or_else(|| WorldClientError::connection("not connected to CARLA server"))?;
        f(world)
    }

    fn with_client<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Client) -> Result<R>,
    {
        let client_guard = self.client.lock().unwrap();
        let client = client_guard
            .as_ref()
            .ok_or_else(|| WorldClientError::connection("not connected to CARLA server"))?;
        f(client)
    }

    fn store_actor(&self, actor_id: ActorId, actor: ActorKind) {
        self.actors.lock().unwrap().insert(actor_id, actor);
    }

    fn vehicle_handle(&self, actor_id: ActorId) -> Result<Vehicle> {
        let actors = self.actors.lock().unwrap();
        match actors.get(&actor_id) {
            Some(ActorKind::Vehicle(v)) => Ok(v.clone()),
            _ => Err(WorldClientError::ActorNotFound { actor_id }),
        }
    }

    fn destroy_vehicle_actor(vehicle: Vehicle, actor_id: ActorId) {
        if !vehicle.destroy() {
            warn!(actor_id, "destroy vehicle returned false");
        }
    }

    fn destroy_camera_actor(sensor: Sensor, actor_id: ActorId) {
        if sensor.is_listening() {
            sensor.stop();
        }
        if !sensor.destroy() {
            warn!(actor_id, "destroy camera returned false");
        }
    }

    /// Convert internal Transform to CARLA Transform
    fn to_carla_transform(transform: Transform) -> CarlaTransform {
        let location = Location {
            x: transform.location.x as f32,
            y: transform.location.y as f32,
            z: transform.location.z as f32,
        };
        let rotation = Rotation {
            pitch: transform.rotation.pitch as f32,
            yaw: transform.rotation.yaw as f32,
            roll: transform.rotation.roll as f32,
        };
        CarlaTransform { location, rotation }
    }

    /// Convert CARLA Transform to internal Transform
    fn from_carla_transform(transform: &CarlaTransform) -> Transform {
        Transform {
            location: contracts::Location {
                x: transform.location.x as f64,
                y: transform.location.y as f64,
                z: transform.location.z as f64,
            },
            rotation: contracts::Rotation {
                pitch: transform.rotation.pitch as f64,
                yaw: transform.rotation.yaw as f64,
                roll: transform.rotation.roll as f64,
            },
        }
    }
}

impl WorldClient for RealCarlaWorld {
    #[instrument(name = "carla_connect", skip(self, timeout), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<()> {
        let mut client = Client::connect(host, port, None);
        client.set_timeout(timeout);
        let world = client.world();

        info!(
            map = %world.map().name(),
            "connected to CARLA server"
        );

        *self.client.lock().unwrap() = Some(client);
        *self.world.lock().unwrap() = Some(world);

        Ok(())
    }

    #[instrument(name = "carla_ensure_map", skip(self), fields(town = %town))]
    async fn ensure_map(&self, town: &str) -> Result<()> {
        let current = self.with_world_mut(|world| Ok(world.map().name()))?;
        // Map names come back fully qualified ("Carla/Maps/Town07")
        if current.ends_with(town) {
            debug!(map = %current, "requested map already loaded");
            return Ok(());
        }

        info!(town = %town, "loading map, this can take a while");
        let world = self.with_client(|client| Ok(client.load_world(town)))?;
        *self.world.lock().unwrap() = Some(world);
        Ok(())
    }

    #[instrument(name = "carla_enable_fixed_step", skip(self), fields(step_secs, tm_port))]
    async fn enable_fixed_step(&self, step_secs: f64, tm_port: u16) -> Result<()> {
        self.with_world_mut(|world| {
            let mut settings = world.settings();
            settings.synchronous_mode = true;
            settings.fixed_delta_seconds = Some(step_secs);
            world.apply_settings(&settings, Duration::ZERO);
            Ok(())
        })?;

        self.with_client(|client| {
            let mut tm = client.instance_tm(tm_port);
            tm.set_synchronous_mode(true);
            Ok(())
        })?;
        *self.tm_port.lock().unwrap() = Some(tm_port);

        info!(step_secs, "world switched to synchronous stepping");
        Ok(())
    }

    #[instrument(name = "carla_restore_realtime", skip(self))]
    async fn restore_realtime(&self) -> Result<()> {
        self.with_world_mut(|world| {
            let mut settings = world.settings();
            settings.synchronous_mode = false;
            settings.fixed_delta_seconds = None;
            world.apply_settings(&settings, Duration::ZERO);
            Ok(())
        })?;
        info!("world restored to real-time mode");
        Ok(())
    }

    #[instrument(name = "carla_spawn_point", skip(self), fields(index))]
    async fn spawn_point(&self, index: usize) -> Result<Transform> {
        self.with_world_mut(|world| {
            let points = world.map().recommended_spawn_points();
            let available = points.len();
            points
                .get(index)
                .map(|t| Self::from_carla_transform(&t))
                .ok_or(WorldClientError::SpawnPointOutOfRange { index, available })
        })
    }

    #[instrument(name = "carla_move_spectator", skip(self, pose))]
    async fn move_spectator(&self, pose: Transform) -> Result<()> {
        self.with_world_mut(|world| {
            world
                .spectator()
                .set_transform(&Self::to_carla_transform(pose));
            Ok(())
        })
    }

    #[instrument(name = "carla_spawn_vehicle", skip(self, at), fields(blueprint = %blueprint))]
    async fn spawn_vehicle(&self, blueprint: &str, at: Transform) -> Result<ActorId> {
        let vehicle = self.with_world_mut(|world| {
            let bp_library = world.blueprint_library();
            let vehicle_bp = bp_library.find(blueprint).ok_or_else(|| {
                WorldClientError::vehicle_spawn(
                    blueprint,
                    format!("blueprint '{blueprint}' not found"),
                )
            })?;

            let carla_transform = Self::to_carla_transform(at);
            let actor = world
                .spawn_actor(&vehicle_bp, &carla_transform)
                .map_err(|e| WorldClientError::vehicle_spawn(blueprint, e.to_string()))?;

            Vehicle::try_from(actor).map_err(|_| {
                WorldClientError::vehicle_spawn(blueprint, "spawned actor is not a vehicle")
            })
        })?;

        let actor_id = vehicle.id();
        debug!(actor_id, blueprint, "vehicle spawned");
        self.store_actor(actor_id, ActorKind::Vehicle(vehicle));

        Ok(actor_id)
    }

    #[instrument(
        name = "carla_enable_autopilot",
        skip(self),
        fields(vehicle, target_speed, ignore_signs_pct)
    )]
    async fn enable_autopilot(
        &self,
        vehicle: ActorId,
        target_speed: f32,
        ignore_signs_pct: f32,
    ) -> Result<()> {
        let handle = self.vehicle_handle(vehicle)?;
        let tm_port = self.tm_port.lock().unwrap().ok_or_else(|| {
            WorldClientError::connection("traffic manager not initialized; call enable_fixed_step")
        })?;

        handle.set_autopilot(true);
        self.with_client(|client| {
            let mut tm = client.instance_tm(tm_port);
            tm.set_desired_speed(&handle, target_speed);
            tm.set_percentage_ignore_signs(&handle, ignore_signs_pct);
            Ok(())
        })?;

        info!(actor_id = vehicle, target_speed, "autopilot enabled for vehicle");
        Ok(())
    }

    #[instrument(name = "carla_vehicle_speed", skip(self), fields(vehicle))]
    async fn vehicle_speed(&self, vehicle: ActorId) -> Result<f64> {
        let handle = self.vehicle_handle(vehicle)?;
        Ok(handle.velocity().norm() as f64)
    }

    #[instrument(
        name = "carla_spawn_camera",
        skip(self, attributes, mount, on_frame),
        fields(parent, attribute_count = attributes.len())
    )]
    async fn spawn_camera(
        &self,
        attributes: &HashMap<String, String>,
        mount: Transform,
        parent: ActorId,
        on_frame: FrameCallback,
    ) -> Result<ActorId> {
        let parent_vehicle = self.vehicle_handle(parent)?;

        let sensor = self.with_world_mut(|world| {
            let bp_library = world.blueprint_library();
            let mut camera_bp = bp_library.find("sensor.camera.rgb").ok_or_else(|| {
                WorldClientError::CameraSpawnFailed {
                    parent_id: parent,
                    message: "blueprint 'sensor.camera.rgb' not found".into(),
                }
            })?;

            for (key, value) in attributes {
                let success = camera_bp.set_attribute(key, value);
                if !success {
                    warn!(key, value, "failed to set camera attribute");
                }
            }

            let carla_transform = Self::to_carla_transform(mount);
            let actor = world
                .spawn_actor_attached(&camera_bp, &carla_transform, &parent_vehicle, None)
                .map_err(|e| WorldClientError::CameraSpawnFailed {
                    parent_id: parent,
                    message: e.to_string(),
                })?;

            Sensor::try_from(actor).map_err(|_| WorldClientError::CameraSpawnFailed {
                parent_id: parent,
                message: "spawned actor is not a sensor".into(),
            })
        })?;

        let actor_id = sensor.id();

        // Sensor callbacks run on CARLA's worker thread, out of band with
        // the stepping loop.
        let mut on_frame = on_frame;
        sensor.listen(move |sensor_data| {
            let frame_number = sensor_data.frame() as u64;
            match Image::try_from(sensor_data) {
                Ok(image) => on_frame(CapturedFrame {
                    frame_number,
                    width: image.width() as u32,
                    height: image.height() as u32,
                    data: Bytes::copy_from_slice(image.as_raw_bytes()),
                }),
                Err(_) => {
                    warn!(frame_number, "camera delivered non-image data");
                }
            }
        });

        debug!(actor_id, parent, "camera spawned, attached and listening");
        self.store_actor(actor_id, ActorKind::Camera(sensor));

        Ok(actor_id)
    }

    #[instrument(name = "carla_step", skip(self))]
    async fn step(&self) -> Result<u64> {
        self.with_world_mut(|world| Ok(world.tick()))
    }

    #[instrument(name = "carla_set_weather", skip(self, weather))]
    async fn set_weather(&self, weather: &WeatherParams) -> Result<()> {
        self.with_world_mut(|world| {
            // Start from the current bundle so fields this harness does not
            // model keep their simulator-side values.
            let mut params = world.weather();
            params.cloudiness = weather.cloudiness;
            params.precipitation = weather.precipitation;
            params.precipitation_deposits = weather.precipitation_deposits;
            params.wind_intensity = weather.wind_intensity;
            params.sun_azimuth_angle = weather.sun_azimuth_angle;
            params.sun_altitude_angle = weather.sun_altitude_angle;
            params.fog_density = weather.fog_density;
            params.fog_distance = weather.fog_distance;
            params.fog_falloff = weather.fog_falloff;
            params.wetness = weather.wetness;
            params.scattering_intensity = weather.scattering_intensity;
            params.mie_scattering_scale = weather.mie_scattering_scale;
            params.rayleigh_scattering_scale = weather.rayleigh_scattering_scale;
            world.set_weather(&params);
            Ok(())
        })?;
        info!("weather applied");
        Ok(())
    }

    #[instrument(name = "carla_paint_object", skip(self, texture), fields(object = %object))]
    async fn paint_object(&self, object: &str, texture: &DecodedTexture) -> Result<()> {
        use carla::rpc::{Color, TextureColor};

        self.with_world_mut(|world| {
            let mut upload = TextureColor::new(texture.width, texture.height);
            for y in 0..texture.height {
                for x in 0..texture.width {
                    let idx = ((y * texture.width + x) * 4) as usize;
                    upload.set(
                        x,
                        y,
                        Color {
                            r: texture.data[idx],
                            g: texture.data[idx + 1],
                            b: texture.data[idx + 2],
                            // alpha was already forced opaque at decode time
                            a: texture.data[idx + 3],
                        },
                    );
                }
            }
            world.apply_color_texture_to_object(object, MaterialParameter::Diffuse, &upload);
            Ok(())
        })?;

        debug!(object, "texture uploaded");
        Ok(())
    }

    #[instrument(name = "carla_destroy_actor", skip(self), fields(actor_id))]
    async fn destroy_actor(&self, actor_id: ActorId) -> Result<()> {
        let mut actors = self.actors.lock().unwrap();

        if let Some(actor) = actors.remove(&actor_id) {
            match actor {
                ActorKind::Vehicle(v) => Self::destroy_vehicle_actor(v, actor_id),
                ActorKind::Camera(s) => Self::destroy_camera_actor(s, actor_id),
            }
            debug!(actor_id, "actor destroyed");
        }

        // Idempotent: return Ok even if not exists
        Ok(())
    }
}
