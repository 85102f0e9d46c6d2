//! Simulator client abstraction
//!
//! Defines the trait for interacting with CARLA, supporting the real
//! implementation and mock testing.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use contracts::{ActorId, DecodedTexture, FrameCallback, Transform, WeatherParams};

use crate::error::Result;

/// Simulator client trait
///
/// Abstracts the world-control and actor-lifecycle operations the capture
/// harness needs. The real CARLA client and the mock client share this
/// interface, so the orchestrator and its tests run against either.
pub trait WorldClient: Send + Sync {
    /// Connect to the simulator
    ///
    /// The timeout should be generous: loading a different world can take
    /// many seconds on slower machines.
    fn connect(
        &mut self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Load the requested map if it is not already the active one.
    ///
    /// Switching maps resets world settings, so this must happen before
    /// `enable_fixed_step`.
    fn ensure_map(&self, town: &str) -> impl Future<Output = Result<()>> + Send;

    /// Force the world onto a stepped clock with a fixed step size and
    /// enable synchronous stepping on the traffic manager.
    fn enable_fixed_step(
        &self,
        step_secs: f64,
        tm_port: u16,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Restore the free-running real-time clock.
    ///
    /// Must be called at the end of a run so other users of the simulator
    /// are not left with a stalled world.
    fn restore_realtime(&self) -> impl Future<Output = Result<()>> + Send;

    /// Resolve a spawn point index in the active map.
    ///
    /// # Errors
    /// `SpawnPointOutOfRange` when the index does not exist; this is fatal.
    fn spawn_point(&self, index: usize) -> impl Future<Output = Result<Transform>> + Send;

    /// Move the spectator view to a pose (so an operator watching the
    /// simulator window sees the test)
    fn move_spectator(&self, pose: Transform) -> impl Future<Output = Result<()>> + Send;

    /// Spawn a vehicle
    ///
    /// # Arguments
    /// * `blueprint` - blueprint name, e.g., "vehicle.bmw.grandtourer"
    /// * `at` - spawn pose in world coordinates
    fn spawn_vehicle(
        &self,
        blueprint: &str,
        at: Transform,
    ) -> impl Future<Output = Result<ActorId>> + Send;

    /// Enable autopilot on a vehicle with a target speed and a percentage
    /// of traffic signs to ignore.
    ///
    /// The harness always passes 100% sign-ignoring: the signs are the
    /// subject under test, not rules for the vehicle to obey.
    fn enable_autopilot(
        &self,
        vehicle: ActorId,
        target_speed: f32,
        ignore_signs_pct: f32,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Current speed of a vehicle in m/s
    fn vehicle_speed(&self, vehicle: ActorId) -> impl Future<Output = Result<f64>> + Send;

    /// Spawn an RGB camera sensor attached to a parent actor.
    ///
    /// `on_frame` fires out of band with the stepping loop whenever the
    /// sensor renders a frame.
    fn spawn_camera(
        &self,
        attributes: &HashMap<String, String>,
        mount: Transform,
        parent: ActorId,
        on_frame: FrameCallback,
    ) -> impl Future<Output = Result<ActorId>> + Send;

    /// Advance the stepped clock by one tick; returns the new frame number
    fn step(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Apply a weather parameter bundle to the world
    fn set_weather(&self, weather: &WeatherParams) -> impl Future<Output = Result<()>> + Send;

    /// Upload a decoded texture onto a named in-world object.
    ///
    /// The object's material must accept runtime diffuse replacement.
    fn paint_object(
        &self,
        object: &str,
        texture: &DecodedTexture,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Destroy an actor
    ///
    /// Idempotent operation: returns Ok if the actor doesn't exist
    fn destroy_actor(&self, actor_id: ActorId) -> impl Future<Output = Result<()>> + Send;
}
