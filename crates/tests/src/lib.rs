//! # Integration Tests
//!
//! Cross-crate tests of the capture harness against the mock world:
//! - full run sequencing (steps, teardown order, real-time restoration)
//! - result tree layout (per-texture and per-preset folders, frame files)
//! - config loading wired through to the orchestrator

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use capture::{init_result_folder, TestRun};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{CameraConfig, RunBlueprint, RunConfig, WorldConfig};
    use world_client::{MockWorld, WorldEvent};

    /// A 2-tick, single-preset blueprint with no prep phase and zero
    /// pacing delays, so every world step belongs to the recording loop.
    fn two_tick_blueprint(name: &str) -> RunBlueprint {
        RunBlueprint {
            version: contracts::ConfigVersion::V1,
            world: WorldConfig::default(),
            run: RunConfig {
                name: name.into(),
                town: Some("Town07_attacked".into()),
                spawn_point: 107,
                vehicle: "vehicle.bmw.grandtourer".into(),
                ticks_prep: 0,
                ticks: 2,
                tick_length: 0.001,
                flush_secs: 0.0,
                results_root: None,
            },
            cameras: vec![CameraConfig {
                presets: vec!["01_default_new".into()],
                save_delay: 0.0,
                ..Default::default()
            }],
            weather: None,
            textures: None,
        }
    }

    /// End-to-end: 2-tick, 1-camera-preset run performs exactly 2 step
    /// advances and exactly one teardown sequence (sensor destroy, then
    /// vehicle destroy), followed by real-time restoration.
    #[tokio::test]
    async fn test_e2e_two_tick_single_preset_run() {
        let results = tempfile::tempdir().unwrap();
        let blueprint = two_tick_blueprint("e2e_two_ticks");
        let run_root = init_result_folder(results.path(), &blueprint.run.name).unwrap();

        let world = MockWorld::new();
        let ledger = world.event_handle();

        let mut run = TestRun::connect(world, &blueprint, run_root.clone())
            .await
            .unwrap();
        run.execute(None).await.unwrap();
        run.end().await.unwrap();

        let events = ledger.lock().unwrap().clone();

        let steps: Vec<usize> = positions(&events, |e| matches!(e, WorldEvent::Stepped(_)));
        assert_eq!(steps.len(), 2, "expected exactly 2 step advances");

        let camera = find_id(&events, |e| match e {
            WorldEvent::CameraSpawned(id) => Some(*id),
            _ => None,
        });
        let vehicle = find_id(&events, |e| match e {
            WorldEvent::VehicleSpawned(id) => Some(*id),
            _ => None,
        });

        let destroys: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::ActorDestroyed(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(destroys, vec![camera, vehicle], "sensor must die before vehicle");

        let restore = positions(&events, |e| matches!(e, WorldEvent::RealtimeRestored));
        assert_eq!(restore.len(), 1);
        assert_eq!(
            restore[0],
            events.len() - 1,
            "real-time restoration must be the final world operation"
        );

        // Both recording ticks produced a frame under the preset folder
        let frames_dir = run_root.join("Default").join("01_default_new");
        assert!(frames_dir.join("0000.png").is_file());
        assert!(frames_dir.join("0001.png").is_file());
    }

    /// Weather is applied once, before any vehicle exists.
    #[tokio::test]
    async fn test_weather_applies_before_first_cycle() {
        let results = tempfile::tempdir().unwrap();
        let mut blueprint = two_tick_blueprint("e2e_weather");
        blueprint.weather = Some(contracts::WeatherSelection::Sunset {
            sun_azimuth: 0.0,
            sun_altitude: 1.6,
        });
        let run_root = init_result_folder(results.path(), &blueprint.run.name).unwrap();

        let world = MockWorld::new();
        let ledger = world.event_handle();

        let mut run = TestRun::connect(world, &blueprint, run_root).await.unwrap();
        run.set_weather(&blueprint.weather.unwrap().to_params())
            .await
            .unwrap();
        run.execute(None).await.unwrap();
        run.end().await.unwrap();

        let events = ledger.lock().unwrap().clone();
        let weather = positions(&events, |e| matches!(e, WorldEvent::WeatherApplied));
        let spawns = positions(&events, |e| matches!(e, WorldEvent::VehicleSpawned(_)));
        assert_eq!(weather.len(), 1);
        assert!(weather[0] < spawns[0]);
    }

    /// A texture plan paints every target before each cycle and labels the
    /// cycle folder after the texture.
    #[tokio::test]
    async fn test_texture_plan_paints_and_labels() {
        let results = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();

        let sign = assets.path().join("tempo30.png");
        image::RgbaImage::from_pixel(8, 8, image::Rgba([200, 10, 10, 40]))
            .save(&sign)
            .unwrap();

        let mut blueprint = two_tick_blueprint("e2e_textures");
        blueprint.textures = Some(contracts::TexturePlan {
            labels: vec![],
            entries: vec![contracts::TextureAssignment {
                label: "Speed_30".into(),
                path: sign,
            }],
            // empty targets fall back to the 14 Town07 round signs
            targets: vec![],
        });

        let run_root = init_result_folder(results.path(), &blueprint.run.name).unwrap();
        let world = MockWorld::new();
        let ledger = world.event_handle();

        let mut run = TestRun::connect(world, &blueprint, run_root.clone())
            .await
            .unwrap();
        run.execute(blueprint.textures.as_ref()).await.unwrap();
        run.end().await.unwrap();

        let events = ledger.lock().unwrap().clone();
        let painted = positions(&events, |e| matches!(e, WorldEvent::ObjectPainted { .. }));
        assert_eq!(painted.len(), 14);

        let spawns = positions(&events, |e| matches!(e, WorldEvent::VehicleSpawned(_)));
        assert!(painted.iter().all(|p| *p < spawns[0]), "repaint precedes the cycle");

        assert!(run_root.join("Speed_30").join("01_default_new").is_dir());
        assert!(!run_root.join("Default").exists());
    }

    /// A config file drives the same path the scripts used to.
    #[tokio::test]
    async fn test_config_file_to_run() {
        let results = tempfile::tempdir().unwrap();
        let blueprint = ConfigLoader::load_from_str(
            r#"
[run]
name = "from_config"
spawn_point = 10
ticks_prep = 0
ticks = 1
tick_length = 0.001
flush_secs = 0.0

[[cameras]]
presets = ["30_iso_400"]
save_delay = 0.0
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let run_root = init_result_folder(results.path(), &blueprint.run.name).unwrap();
        let mut run = TestRun::connect(MockWorld::new(), &blueprint, run_root.clone())
            .await
            .unwrap();
        run.execute(None).await.unwrap();
        run.end().await.unwrap();

        assert!(run_root
            .join("Default")
            .join("30_iso_400")
            .join("0000.png")
            .is_file());
    }

    fn positions(events: &[WorldEvent], pred: impl Fn(&WorldEvent) -> bool) -> Vec<usize> {
        events
            .iter()
            .enumerate()
            .filter_map(|(i, e)| pred(e).then_some(i))
            .collect()
    }

    fn find_id(events: &[WorldEvent], extract: impl Fn(&WorldEvent) -> Option<u32>) -> u32 {
        events.iter().find_map(extract).expect("event not found")
    }
}
