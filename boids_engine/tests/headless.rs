use boids_engine::{
    birdwatcher::AgentData,
    flock::Flock,
    flock_base,
    options::{RunOptions, SaveOptions, Toggles, TrackerType, UpdateOrder},
    parameters::ParameterSet,
    FRAME_DT,
};

fn parameter_set(agent_count: usize) -> ParameterSet {
    let mut set = ParameterSet::default();
    set.agent_count = agent_count;
    set
}

#[test]
fn headless_run_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let options = RunOptions {
        seed: Some(5),
        sample_rate: 2,
        save_options: SaveOptions {
            save_locations: true,
            save_locations_path: Some(dir.path().to_string_lossy().into_owned()),
            save_locations_timestamp: false,
        },
        ..Default::default()
    };

    let data = flock_base(6, &options, &parameter_set(10), Toggles::default()).unwrap();
    assert_eq!(data.len(), 30);

    let mut reader = csv::Reader::from_path(dir.path().join("boids-data.csv")).unwrap();
    let rows: Vec<AgentData> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows, data);
}

#[test]
fn seeded_runs_are_reproducible() {
    let options = RunOptions {
        seed: Some(99),
        ..Default::default()
    };

    let first = flock_base(15, &options, &parameter_set(50), Toggles::default()).unwrap();
    let second = flock_base(15, &options, &parameter_set(50), Toggles::default()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn cyclic_world_keeps_agents_inside() {
    let options = RunOptions {
        seed: Some(1),
        ..Default::default()
    };
    let toggles = Toggles {
        horizontal_cyclic_boundary: true,
        vertical_cyclic_boundary: true,
        horizontal_wall_active: false,
        vertical_wall_active: false,
        ..Toggles::default()
    };
    let mut flock = Flock::new(&options, &parameter_set(200)).unwrap();
    flock.start_motion();

    for _ in 0..60 {
        flock.update(toggles);
        flock.advance(FRAME_DT);
    }
    // one more boundary pass pulls the last step back in
    flock.update(toggles);

    let world = flock.world();
    for agent in flock.agents() {
        let p = agent.position();
        assert!((0. ..world.width).contains(&p.x), "x = {}", p.x);
        assert!((0. ..world.height).contains(&p.y), "y = {}", p.y);
    }
}

#[test]
fn update_orders_and_trackers_all_respect_speed_band() {
    let set = parameter_set(150);
    let combos = [
        (TrackerType::Naive, UpdateOrder::Snapshot),
        (TrackerType::SpatHash, UpdateOrder::Snapshot),
        (TrackerType::Naive, UpdateOrder::Sequential),
    ];

    for (tracker_type, update_order) in combos {
        let options = RunOptions {
            seed: Some(21),
            tracker_type,
            update_order,
            ..Default::default()
        };
        let mut flock = Flock::new(&options, &set).unwrap();
        flock.start_motion();

        for _ in 0..20 {
            flock.update(Toggles::default());
            flock.advance(FRAME_DT);
        }

        let params = *flock.parameters();
        for agent in flock.agents() {
            let speed = agent.velocity().length();
            assert!(speed >= params.speed_min * 0.999 && speed <= params.speed_max * 1.001);
        }
    }
}
