use core::time::Duration;

use approx::assert_relative_eq;
use mintspark_async::{
    block_on,
    time::{self, Instant},
};
use mintspark_devices::{
    mock::{SimInertial, SimMotors, SimRobot},
    motor::MotorId,
};
use mintspark_drive::{
    DifferentialOutput, DriveConfig, DriveController, DriveError, DriveOutcome, DriveState,
    SpotTurn, TankBindings, TurnDirection,
};

fn controller(robot: &SimRobot, config: DriveConfig) -> DriveController<SimMotors, SimInertial> {
    DriveController::new(robot.motors(), robot.inertial(), config)
}

#[test]
fn right_spot_turn_stops_after_the_angle() {
    time::pause();
    let robot = SimRobot::new();
    let mut drive = controller(&robot, DriveConfig::default());

    let (outcome, state) = block_on(async move {
        let outcome = drive
            .gyro_spot_turn(SpotTurn::new(TurnDirection::Right, 50.0, 90.0))
            .await;
        (outcome, drive.state())
    });

    assert_eq!(outcome, Ok(DriveOutcome::Completed));
    assert_eq!(state, DriveState::Idle);

    let yaw = robot.yaw();
    assert!((89.9..91.0).contains(&yaw), "yaw {yaw}");

    assert_eq!(robot.commands_for(MotorId::M1)[0].speed, 50.0);
    assert_eq!(robot.commands_for(MotorId::M2)[0].speed, -50.0);
    assert_eq!(robot.speed(MotorId::M1), 0.0);
    assert_eq!(robot.speed(MotorId::M2), 0.0);
}

#[test]
fn left_spot_turn_spins_counter_clockwise() {
    time::pause();
    let robot = SimRobot::new();
    let mut drive = controller(&robot, DriveConfig::default());

    block_on(async move {
        drive
            .gyro_spot_turn(SpotTurn::new(TurnDirection::Left, 100.0, 45.0))
            .await
    })
    .unwrap();

    let yaw = robot.yaw();
    assert!((-47.0..=-44.9).contains(&yaw), "yaw {yaw}");
}

#[test]
fn spot_turn_past_a_full_revolution() {
    time::pause();
    let robot = SimRobot::new();
    let mut drive = controller(&robot, DriveConfig::default());
    let start = Instant::now();

    block_on(async move {
        drive
            .gyro_spot_turn(SpotTurn::new(TurnDirection::Right, 100.0, 450.0))
            .await
    })
    .unwrap();

    // 180 degrees per second at full speed, after one second of calibration.
    let turning = start.elapsed() - Duration::from_secs(1);
    assert!(turning >= Duration::from_millis(2500));
    assert!(turning <= Duration::from_millis(2520));
}

#[test]
fn spot_turn_crosses_the_wrap() {
    time::pause();
    let robot = SimRobot::new()
        .with_calibrated_heading(170.0)
        .with_wrapped_yaw();
    let mut drive = controller(&robot, DriveConfig::default());

    let outcome = block_on(async move {
        drive
            .gyro_spot_turn(SpotTurn::new(TurnDirection::Right, 100.0, 45.0))
            .await
    });

    assert_eq!(outcome, Ok(DriveOutcome::Completed));
    // The sensor read 170 at the start and about -145 at the end.
    let yaw = robot.yaw();
    assert!((214.9..217.0).contains(&yaw), "yaw {yaw}");
    assert_eq!(robot.speed(MotorId::M1), 0.0);
}

#[test]
fn spot_turn_rejects_bad_angles() {
    time::pause();
    let robot = SimRobot::new();
    let mut drive = controller(&robot, DriveConfig::default());

    let result = block_on(async move {
        drive
            .gyro_spot_turn(SpotTurn::new(TurnDirection::Left, 50.0, -30.0))
            .await
    });

    assert_eq!(result, Err(DriveError::InvalidAngle { angle: -30.0 }));
    assert!(robot.commands().is_empty());
}

#[test]
fn drive_tank_clamps_and_applies_reversal() {
    time::pause();
    let robot = SimRobot::new().with_drive_motors(MotorId::M3, MotorId::M4);
    let config = DriveConfig {
        tank: TankBindings::new(MotorId::M3, MotorId::M4).reversed(false, true),
        ..DriveConfig::default()
    };
    let mut drive = controller(&robot, config);

    let applied = block_on(async move { drive.drive_tank(150.0, 40.0).await });

    assert_eq!(applied, DifferentialOutput::new(100.0, 40.0));
    assert_eq!(robot.commands_for(MotorId::M3)[0].speed, 100.0);
    assert_eq!(robot.commands_for(MotorId::M4)[0].speed, -40.0);
    assert!(robot.commands_for(MotorId::M1).is_empty());
}

#[test]
fn rebinding_moves_commands_to_other_outputs() {
    time::pause();
    let robot = SimRobot::new();
    let mut drive = controller(&robot, DriveConfig::default());

    drive.set_bindings(TankBindings::new(MotorId::M4, MotorId::M3));
    assert_eq!(drive.bindings().left, MotorId::M4);

    block_on(async move { drive.drive_tank(10.0, 20.0).await });

    assert_eq!(robot.speed(MotorId::M4), 10.0);
    assert_eq!(robot.speed(MotorId::M3), 20.0);
}

#[test]
fn ramp_from_standstill_boosts_then_reaches_target() {
    time::pause();
    let robot = SimRobot::new();
    let mut drive = controller(&robot, DriveConfig::default());
    let start = Instant::now();

    let applied =
        block_on(async move { drive.ramp_tank(50.0, 50.0, Duration::from_millis(200)).await });

    assert_eq!(applied, DifferentialOutput::new(50.0, 50.0));
    assert_eq!(start.elapsed(), Duration::from_millis(200));

    let left: Vec<_> = robot
        .commands_for(MotorId::M1)
        .iter()
        .map(|command| (command.at - start, command.speed))
        .collect();
    assert_eq!(left.len(), 5);
    assert_eq!(left[0], (Duration::ZERO, 10.0));
    assert_eq!(left[4], (Duration::from_millis(200), 50.0));
}

#[test]
fn ramp_continues_from_the_last_applied_speeds() {
    time::pause();
    let robot = SimRobot::new();
    let mut drive = controller(&robot, DriveConfig::default());

    let applied = block_on(async move {
        drive.drive_tank(80.0, -80.0).await;
        drive.ramp_tank(-30.0, 30.0, Duration::from_millis(130)).await
    });

    assert_eq!(applied, DifferentialOutput::new(-30.0, 30.0));

    // No boost when already moving: three steps, the first a third of the way.
    let left: Vec<_> = robot
        .commands_for(MotorId::M1)
        .iter()
        .map(|command| command.speed)
        .collect();
    assert_eq!(left.len(), 4);
    assert_relative_eq!(left[1], 80.0 - 110.0 / 3.0, epsilon = 1e-9);
    assert_eq!(left[3], -30.0);
}

#[test]
fn oversized_boost_never_overshoots_the_target() {
    time::pause();
    let robot = SimRobot::new();
    let config = DriveConfig {
        ramp_boost: 3.0,
        ..DriveConfig::default()
    };
    let mut drive = controller(&robot, config);

    block_on(async move { drive.ramp_tank(50.0, 50.0, Duration::from_millis(200)).await });

    let left: Vec<_> = robot
        .commands_for(MotorId::M1)
        .iter()
        .map(|command| command.speed)
        .collect();
    assert_eq!(left, vec![50.0; 5]);
}
