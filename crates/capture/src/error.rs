//! Capture error types

use contracts::ContractError;
use thiserror::Error;
use world_client::WorldClientError;

/// Capture specific error
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Simulator-side failure
    #[error(transparent)]
    World(#[from] WorldClientError),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Texture label not present in the built-in catalog
    #[error("unknown texture label '{label}': not in the sign catalog")]
    UnknownTextureLabel { label: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias
pub type Result<T> = std::result::Result<T, CaptureError>;
