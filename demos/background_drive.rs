use core::time::Duration;

use log::{info, warn};
use mintspark::{devices::mock::SimRobot, prelude::*};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => DriveConfig::load(&path).unwrap_or_else(|err| {
            warn!("{err}, using the default configuration");
            DriveConfig::default()
        }),
        None => DriveConfig::default(),
    };

    let robot = SimRobot::new().with_drift(-2.0);
    let mut drive = DriveController::new(robot.motors(), robot.inertial(), config);

    mintspark::time::pause();

    block_on({
        let robot = robot.clone();
        async move {
            // Keep driving in the background until an obstacle shows up.
            if let Err(err) = drive.gyro_drive_background(Direction::Forward, 45.0).await {
                warn!("could not start: {err}");
                return;
            }

            let mut sonar = Ultrasonic::new(mintspark::devices::mock::ScriptedRangeFinder::new([
                80.0, 62.0, 0.0, 41.0, 0.0, 18.0,
            ]));

            loop {
                sleep(Duration::from_millis(200)).await;

                match sonar.distance(DistanceUnit::Centimeters) {
                    Ok(distance) if distance < 20.0 => {
                        info!("obstacle at {distance} cm");
                        break;
                    }
                    Ok(distance) => info!("clear for {distance} cm, yaw {:.2}", robot.yaw()),
                    Err(err) => warn!("{err}"),
                }
            }

            // Any new command preempts the background drive before it runs.
            drive.stop().await;
        }
    });
}
