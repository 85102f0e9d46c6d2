//! Capture run against a real CARLA server.
//!
//! Requires a running simulator with the `Town07_attacked` map installed
//! and the texture assets from `images/textures_traffic_sign/`.
//!
//! ```sh
//! cargo run --bin real_run --features real-carla -- configs/demo.toml
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use world_client::RealCarlaWorld;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().compact().init();

    let config = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "configs/demo.toml".to_string());
    let blueprint = config_loader::ConfigLoader::load_from_path(Path::new(&config))
        .with_context(|| format!("failed to load {config}"))?;

    let run_root = capture::init_result_folder("results".as_ref(), &blueprint.run.name)?;
    let mut run =
        capture::TestRun::connect(RealCarlaWorld::new(), &blueprint, run_root.clone()).await?;

    if let Some(weather) = blueprint.weather {
        run.set_weather(&weather.to_params()).await?;
    }
    run.execute(blueprint.textures.as_ref()).await?;
    run.end().await?;

    println!("Frames under {}", run_root.display());
    Ok(())
}
