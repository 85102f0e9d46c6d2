//! `restore` command implementation.
//!
//! An interrupted run leaves the simulator on the stepped clock, stalling
//! every other client. This command connects and switches it back to
//! real-time mode.

use anyhow::Result;

use crate::cli::RestoreArgs;

#[cfg(feature = "real-carla")]
pub async fn run_restore(args: &RestoreArgs) -> Result<()> {
    use anyhow::Context;
    use std::time::Duration;
    use tracing::info;
    use world_client::{RealCarlaWorld, WorldClient};

    let mut world = RealCarlaWorld::new();
    world
        .connect(&args.host, args.port, Duration::from_secs(2))
        .await
        .with_context(|| format!("Failed to connect to CARLA at {}:{}", args.host, args.port))?;

    info!("switching to rt mode");
    world
        .restore_realtime()
        .await
        .context("Failed to restore real-time mode")?;

    info!("Simulator back in real-time mode");
    Ok(())
}

#[cfg(not(feature = "real-carla"))]
pub async fn run_restore(args: &RestoreArgs) -> Result<()> {
    let _ = args;
    anyhow::bail!("restore needs a real simulator; rebuild with --features real-carla")
}
