use robot_cmd::{
  geometry::Pose2d,
  units::{degree, meter, motion::{rpm, AngularVelocity}, second, Angle, Time},
};

pub mod operators {
  pub const DRIVER: usize = 0;
  pub const OPERATOR: usize = 1;
  pub const STICK_DEADBAND: f64 = 0.1;
}

pub mod drive {
  use robot_cmd::{control::pid::PIDConfig, units::{degree, meter, motion::{meters_per_second, rads_per_second, AngularVelocity, Velocity}, Angle, Length}};

  pub const MAX_SPEED_MPS: f64 = 4.5;
  pub const MAX_ANGULAR_RADS: f64 = 2.0 * std::f64::consts::PI;
  pub const MODULES: [&str; 4] = ["swerve_fl", "swerve_fr", "swerve_bl", "swerve_br"];

  pub fn max_speed() -> Velocity {
    MAX_SPEED_MPS * meters_per_second
  }

  pub fn max_angular() -> AngularVelocity {
    MAX_ANGULAR_RADS * rads_per_second
  }

  /// Heading controller for snap modes. Output is rad/s per radian of error.
  pub fn heading_pid() -> PIDConfig {
    PIDConfig { kp: 5.0, ki: 0.0, kd: 0.0, izone: None }
  }

  pub fn snap_tolerance() -> Angle {
    2.0 * degree
  }

  /// Translation gain for drive-to-pose, (m/s) per metre of error.
  pub const POSE_KP: f64 = 2.0;

  pub fn pose_tolerance() -> Length {
    0.05 * meter
  }
}

pub mod arm {
  pub const MIN_DEGREES: f64 = 10.0;
  pub const MAX_DEGREES: f64 = 90.0;
  pub const TOLERANCE_DEGREES: f64 = 1.0;
  pub const INTAKE_DEGREES: f64 = 15.0;
  pub const SUBWOOFER_DEGREES: f64 = 48.5;
  pub const TEST_UP_DEGREES: f64 = 90.0;
  pub const TEST_DOWN_DEGREES: f64 = 37.0;
  /// Manual control rate at full stick deflection.
  pub const MANUAL_DEGREES_PER_SECOND: f64 = 90.0;

  /// Shot angle by distance to the speaker, (metres, degrees), sorted by distance.
  pub const DISTANCE_ANGLES: [(f64, f64); 6] = [
    (1.3, 48.5),
    (2.0, 40.0),
    (2.5, 35.0),
    (3.0, 31.0),
    (4.0, 26.0),
    (5.0, 23.0),
  ];
}

pub mod shooter {
  pub const IDLE_RPM: f64 = 2000.0;
  pub const AIMED_RPM: f64 = 4700.0;
  pub const SUBWOOFER_RPM: f64 = 4500.0;
  pub const TEST_RPM: f64 = 4700.0;
  pub const TEST_END_RPM: f64 = 1000.0;
  pub const TOLERANCE_RPM: f64 = 100.0;

  pub const AIMED_FEED_SECONDS: f64 = 0.7;
  pub const SUBWOOFER_FEED_SECONDS: f64 = 1.0;
  pub const AUTO_FEED_SECONDS: f64 = 0.5;
  pub const TEST_FEED_SECONDS: f64 = 3.0;
}

pub mod feeder {
  pub const HP_SPEED: f64 = -0.4;
  pub const INTAKE_SPEED: f64 = 0.6;
  pub const OUTTAKE_SPEED: f64 = -0.6;
  pub const SHOOT_SPEED: f64 = 1.0;

  /// Outtake is done once the beam has been clear this long.
  pub const OUTTAKE_CLEAR_SECONDS: f64 = 0.25;
  /// Simulated time for a note to leave the feeder once driven out.
  pub const NOTE_EXIT_SECONDS: f64 = 0.1;
}

pub mod intake {
  pub const IN_SPEED: f64 = 0.8;
  pub const OUT_SPEED: f64 = -0.8;
}

pub mod climber {
  /// Soft limits, in spool rotations.
  pub const MIN_POSITION: f64 = 0.0;
  pub const MAX_POSITION: f64 = 40.0;
  pub const EXTEND_SPEED: f64 = 1.0;
  pub const RETRACT_SPEED: f64 = -1.0;
}

pub mod lights {
  pub type Color = (u8, u8, u8);

  pub const RED: Color = (255, 0, 0);
  pub const GREEN: Color = (0, 255, 0);
  pub const BLUE: Color = (0, 0, 255);
  pub const OFF: Color = (0, 0, 0);

  pub const SHOOT_RED: Color = (150, 0, 0);
  pub const SHOOT_GREEN: Color = (0, 150, 0);
}

pub fn arm_min() -> Angle {
  arm::MIN_DEGREES * degree
}

pub fn arm_max() -> Angle {
  arm::MAX_DEGREES * degree
}

pub fn idle_rpm() -> AngularVelocity {
  shooter::IDLE_RPM * rpm
}

pub fn seconds(value: f64) -> Time {
  value * second
}

/// Centre of the speaker opening on the field.
pub fn speaker() -> Pose2d {
  Pose2d::new(0.0 * meter, 5.55 * meter, 0.0 * degree)
}

/// Lined up on the amp.
pub fn amp() -> Pose2d {
  Pose2d::new(1.5768705606460571 * meter, 6.266633987426758 * meter, 0.0 * degree)
}
