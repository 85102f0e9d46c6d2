//! World client error types

use contracts::ContractError;
use thiserror::Error;

/// World client specific error
#[derive(Debug, Error)]
pub enum WorldClientError {
    /// Simulator connection error
    #[error("failed to connect to CARLA: {message}")]
    ConnectionFailed { message: String },

    /// Map load error
    #[error("failed to load map '{town}': {message}")]
    MapLoadFailed { town: String, message: String },

    /// Vehicle spawn error
    #[error("failed to spawn vehicle '{vehicle_id}': {message}")]
    VehicleSpawnFailed { vehicle_id: String, message: String },

    /// Camera sensor spawn error
    #[error("failed to spawn camera on actor {parent_id}: {message}")]
    CameraSpawnFailed { parent_id: u32, message: String },

    /// Requested spawn point does not exist
    #[error("spawn point {index} out of range: map has {available} spawn points")]
    SpawnPointOutOfRange { index: usize, available: usize },

    /// Actor handle is unknown to this client
    #[error("actor {actor_id} not found")]
    ActorNotFound { actor_id: u32 },

    /// Texture upload error
    #[error("failed to paint object '{object}': {message}")]
    TextureUploadFailed { object: String, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl WorldClientError {
    /// Create connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create vehicle spawn error
    pub fn vehicle_spawn(vehicle_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VehicleSpawnFailed {
            vehicle_id: vehicle_id.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, WorldClientError>;
