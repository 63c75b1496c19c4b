use std::{env, process::ExitCode, sync::Arc};

use image_track::{
    BBox, BoundingBox, ClassIdentifier, ObjectSpeedConfig, Track, TrackerConfig,
    compute_track_statistics,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn demo_config() -> TrackerConfig {
    let mut config = TrackerConfig {
        max_age: 3,
        min_detections_active: 2,
        ..Default::default()
    };
    config.kalman_filter_config.kalman_delay = 2;
    config
        .assignment_cost_config
        .distance_cost
        .obj_speed
        .insert(0, ObjectSpeedConfig { x: 8.0, b: 20.0 });

    config
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match env::args().nth(1) {
        Some(path) => match TrackerConfig::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(%path, "{e}");
                return ExitCode::FAILURE;
            }
        },
        None => demo_config(),
    };
    if let Err(e) = config.validate([0]) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let person = ClassIdentifier::new(0, "person");
    let detection = |frame: i64| {
        let x = 10.0 + 4.0 * frame as f64;
        BoundingBox::new(BBox::new(x, 50.0, x + 20.0, 90.0), person.clone())
    };
    let occluder = BoundingBox::new(BBox::new(60.0, 40.0, 80.0, 100.0), person.clone());

    let mut track = Track::new(Arc::new(config), 0, 0, &detection(0), None, None);

    for frame in 1..=40 {
        track.predict(Some(std::slice::from_ref(&occluder)));
        if !track.is_alive() {
            break;
        }
        // the object is not detected while passing behind the occluder
        if !(10..14).contains(&frame) {
            track.update(&detection(frame));
        }

        match track.get_redetect_radius() {
            Ok(radius) => info!(frame, state = %track.current_state(), radius, "frame processed"),
            Err(e) => error!("{e}"),
        }
    }

    for event in track.track_events().values() {
        match event.to_value(false, true) {
            Ok(value) => println!("{value}"),
            Err(e) => error!("{e}"),
        }
    }
    println!("{:?}", compute_track_statistics([&track]));

    ExitCode::SUCCESS
}
