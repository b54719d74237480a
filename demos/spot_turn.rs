use log::info;
use mintspark::{devices::mock::SimRobot, prelude::*};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let robot = SimRobot::new();
    let mut drive = DriveController::new(robot.motors(), robot.inertial(), DriveConfig::default());

    mintspark::time::pause();

    // Trace a square: four straight legs with a right angle between each.
    let result = block_on({
        let robot = robot.clone();
        async move {
            for leg in 1..=4 {
                let command = DriveCommand::new(
                    Direction::Forward,
                    50.0,
                    StopCondition::Distance(300.0),
                );
                drive.gyro_drive(command).await?;
                drive
                    .gyro_spot_turn(SpotTurn::new(TurnDirection::Right, 40.0, 90.0))
                    .await?;
                info!("leg {leg} done, heading {:.1}", robot.yaw());
            }

            // Ease out of the last corner instead of jumping to speed.
            drive
                .ramp_tank(60.0, 60.0, core::time::Duration::from_millis(400))
                .await;
            drive.stop().await;

            Ok::<(), DriveError>(())
        }
    });

    if let Err(err) = result {
        log::error!("square aborted: {err}");
    }
}
