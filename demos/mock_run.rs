//! Miniature capture run against the mock world.
//!
//! No CARLA server required; the frames are synthetic, but the whole
//! sequencing (sync mode, prep ticks, recording, texture repaints,
//! teardown, real-time restore) runs for real. Results land in
//! `./results/<timestamp>_mock_demo/`.

use anyhow::Result;
use contracts::{CameraConfig, RunBlueprint, RunConfig, WeatherSelection, WorldConfig};
use world_client::MockWorld;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().compact().init();

    let blueprint = RunBlueprint {
        version: contracts::ConfigVersion::V1,
        world: WorldConfig::default(),
        run: RunConfig {
            name: "mock_demo".into(),
            town: Some("Town07_attacked".into()),
            spawn_point: 107,
            vehicle: "vehicle.bmw.grandtourer".into(),
            // kept tiny so the demo finishes in seconds
            ticks_prep: 5,
            ticks: 10,
            tick_length: 0.01,
            flush_secs: 0.0,
            results_root: None,
        },
        cameras: vec![CameraConfig {
            presets: vec!["01_default_new".into(), "30_iso_400".into()],
            save_delay: 0.01,
            ..Default::default()
        }],
        weather: Some(WeatherSelection::Sunset {
            sun_azimuth: 0.0,
            sun_altitude: 1.6,
        }),
        textures: None,
    };

    let run_root = capture::init_result_folder("results".as_ref(), &blueprint.run.name)?;
    let mut run = capture::TestRun::connect(MockWorld::new(), &blueprint, run_root.clone()).await?;

    if let Some(weather) = blueprint.weather {
        run.set_weather(&weather.to_params()).await?;
    }
    run.execute(None).await?;
    run.end().await?;

    println!("Demo frames under {}", run_root.display());
    Ok(())
}
