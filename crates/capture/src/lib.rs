//! # Capture
//!
//! The test-run orchestration core: camera presets, camera rigs with
//! frame-save callbacks, the sign texture catalog, and the `TestRun`
//! state machine that sequences one capture run against a `WorldClient`.

mod camera;
mod error;
pub mod presets;
mod run;
pub mod textures;

pub use camera::CameraRig;
pub use error::{CaptureError, Result};
pub use run::{init_result_folder, TestRun};
