use core::time::Duration;

use log::info;
use mintspark::{devices::mock::SimRobot, prelude::*};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    // The simulated robot pulls slightly to the right, like a worn left gearbox would.
    let robot = SimRobot::new().with_drift(3.0);
    let mut drive = DriveController::new(robot.motors(), robot.inertial(), DriveConfig::default());

    // Run on virtual time so the demo finishes instantly.
    mintspark::time::pause();

    let result = block_on(async move {
        // Drive forward at 30% for two seconds while holding the heading.
        let command = DriveCommand::with_unit(Direction::Forward, 30.0, 2.0, DriveUnit::Seconds)?;
        drive.gyro_drive(command).await?;

        // Then back up 20 centimeters.
        let command =
            DriveCommand::with_unit(Direction::Reverse, 40.0, 20.0, DriveUnit::Centimeters)?;
        drive.gyro_drive(command).await?;

        sleep(Duration::from_millis(500)).await;
        Ok::<(), DriveError>(())
    });

    match result {
        Ok(()) => info!("finished with a heading of {:.2} degrees", robot.yaw()),
        Err(err) => log::error!("drive failed: {err}"),
    }
}
