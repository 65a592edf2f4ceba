use robot_cmd::{
  command::InstantCommand,
  geometry::Pose2d,
  input::hid::apply_deadband,
  prelude::*,
  units::{
    degree,
    motion::{meters_per_second, AngularVelocity},
    traits::MaybeUnitNumber,
    Angle, QuantityBase, Time,
  },
};
use strum::Display;

use crate::{constants::{drive, operators}, subsystems::Swerve};

/// Driver control from the sticks. Inputs are raw stick values in [-1, 1]; forward on the
/// left stick is negative on the HID, so callers pass the negated axis.
pub struct TeleopSwerve {
  swerve: Handle<Swerve>,
  translation: Box<dyn Fn() -> f64>,
  strafe: Box<dyn Fn() -> f64>,
  rotation: Box<dyn Fn() -> f64>,
  robot_centric: Box<dyn Fn() -> bool>,
}

impl TeleopSwerve {
  pub fn new<T, S, R, C>(swerve: Handle<Swerve>, translation: T, strafe: S, rotation: R, robot_centric: C) -> Self
  where
    T: Fn() -> f64 + 'static,
    S: Fn() -> f64 + 'static,
    R: Fn() -> f64 + 'static,
    C: Fn() -> bool + 'static,
  {
    Self {
      swerve,
      translation: Box::new(translation),
      strafe: Box::new(strafe),
      rotation: Box::new(rotation),
      robot_centric: Box::new(robot_centric),
    }
  }
}

impl Command for TeleopSwerve {
  fn execute(&mut self, _now: Time) {
    let translation = apply_deadband((self.translation)(), operators::STICK_DEADBAND);
    let strafe = apply_deadband((self.strafe)(), operators::STICK_DEADBAND);
    let rotation = apply_deadband((self.rotation)(), operators::STICK_DEADBAND);

    self.swerve.borrow_mut().drive(
      translation * drive::max_speed(),
      strafe * drive::max_speed(),
      rotation * drive::max_angular(),
      !(self.robot_centric)(),
    );
  }

  fn end(&mut self, _interrupted: bool) {
    self.swerve.borrow_mut().stop();
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.swerve.id()])
  }

  fn name(&self) -> String {
    "TeleopSwerve".into()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SnapMode {
  Left,
  Right,
  Forward,
  Backward,
  /// Face the speaker from wherever the robot is.
  Speaker,
}

impl SnapMode {
  pub fn target(&self, swerve: &Swerve) -> Angle {
    match self {
      SnapMode::Left => 90.0 * degree,
      SnapMode::Right => -90.0 * degree,
      SnapMode::Forward => 0.0 * degree,
      SnapMode::Backward => 180.0 * degree,
      SnapMode::Speaker => swerve.heading_to_speaker(),
    }
  }
}

/// Turns the robot in place to face a heading. Without `hold` it finishes once within
/// tolerance; with `hold` it keeps tracking until released.
pub struct SnapTo {
  swerve: Handle<Swerve>,
  mode: SnapMode,
  hold: bool,
  on_target: bool,
}

impl SnapTo {
  pub fn new(swerve: Handle<Swerve>, mode: SnapMode) -> Self {
    Self { swerve, mode, hold: false, on_target: false }
  }

  pub fn holding(swerve: Handle<Swerve>, mode: SnapMode) -> Self {
    Self { swerve, mode, hold: true, on_target: false }
  }
}

impl Command for SnapTo {
  fn initialize(&mut self, _now: Time) {
    self.on_target = false;
  }

  fn execute(&mut self, now: Time) {
    let mut swerve = self.swerve.borrow_mut();
    let target = self.mode.target(&swerve);
    let omega = swerve.snap_rotation(target, now);
    swerve.drive(0.0 * meters_per_second, 0.0 * meters_per_second, omega, true);
    self.on_target = swerve.heading_error(target).abs() <= drive::snap_tolerance();
  }

  fn is_finished(&self) -> bool {
    !self.hold && self.on_target
  }

  fn end(&mut self, _interrupted: bool) {
    self.swerve.borrow_mut().stop();
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.swerve.id()])
  }

  fn name(&self) -> String {
    format!("SnapTo({})", self.mode)
  }
}

/// Drives straight at a fixed field pose, finishing once there.
pub struct DriveToPose {
  swerve: Handle<Swerve>,
  target: Pose2d,
  arrived: bool,
}

impl DriveToPose {
  pub fn new(swerve: Handle<Swerve>, target: Pose2d) -> Self {
    Self { swerve, target, arrived: false }
  }
}

impl Command for DriveToPose {
  fn initialize(&mut self, _now: Time) {
    self.arrived = false;
  }

  fn execute(&mut self, now: Time) {
    let mut swerve = self.swerve.borrow_mut();
    let pose = swerve.pose();
    let max = drive::max_speed();
    let vx = (drive::POSE_KP * (self.target.x - pose.x).to_base() * meters_per_second).clamp_to(-max, max);
    let vy = (drive::POSE_KP * (self.target.y - pose.y).to_base() * meters_per_second).clamp_to(-max, max);
    let omega: AngularVelocity = swerve.snap_rotation(self.target.rotation, now);
    swerve.drive(vx, vy, omega, true);

    self.arrived = pose.distance_to(&self.target) <= drive::pose_tolerance()
      && swerve.heading_error(self.target.rotation).abs() <= drive::snap_tolerance();
  }

  fn is_finished(&self) -> bool {
    self.arrived
  }

  fn end(&mut self, _interrupted: bool) {
    self.swerve.borrow_mut().stop();
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.swerve.id()])
  }

  fn name(&self) -> String {
    "DriveToPose".into()
  }
}

pub fn zero_gyro(swerve: Handle<Swerve>) -> impl Command {
  InstantCommand::new(move || swerve.borrow_mut().zero_gyro(), &[]).with_name("ZeroGyro")
}

pub fn reset_pose(swerve: Handle<Swerve>) -> impl Command {
  InstantCommand::new(move || swerve.borrow_mut().set_pose(Pose2d::origin()), &[]).with_name("Reset Pose")
}
