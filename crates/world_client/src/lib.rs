//! # World Client
//!
//! Simulator abstraction layer: one trait for everything the capture
//! harness asks of CARLA, with a real implementation (behind the
//! `real-carla` feature) and a mock for tests and simulator-less runs.

mod client;
mod error;
mod mock_world;

#[cfg(feature = "real-carla")]
mod carla_world;

pub use client::WorldClient;
pub use error::{Result, WorldClientError};
pub use mock_world::{MockWorld, MockWorldConfig, WorldEvent};

#[cfg(feature = "real-carla")]
pub use carla_world::RealCarlaWorld;
