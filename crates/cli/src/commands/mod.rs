//! CLI command implementations

mod info;
mod restore;
mod run;
mod validate;

pub use info::run_info;
pub use restore::run_restore;
pub use run::run_capture;
pub use validate::run_validate;
