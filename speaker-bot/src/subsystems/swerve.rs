use std::rc::Rc;

use robot_cmd::{
  control::pid::{PIDConfig, PID},
  geometry::{ChassisSpeeds, Pose2d},
  hardware::{FlashStore, HardwareError, MotorControl, MotorParams, SimMotor},
  prelude::*,
  units::{
    motion::{meters_per_second, rads_per_second, AngularVelocity, Velocity},
    traits::{Angle as _, MaybeUnitNumber},
    Angle, Length, QuantityBase, Time,
  },
};

use crate::constants::{self, drive};

fn module_params() -> MotorParams {
  MotorParams {
    pid: PIDConfig { kp: 0.1, ki: 0.0, kd: 0.0, izone: None },
    kf: 1.0 / drive::MAX_SPEED_MPS,
    free_speed: drive::MAX_SPEED_MPS,
    time_constant: 0.05,
    max_output: 1.0,
    min_output: -1.0,
  }
}

/// The drivetrain, simulated as an ideal holonomic base: commanded field-relative speeds are
/// integrated straight into the pose.
#[derive(NamedSubsystem)]
#[subsystem(id = "drive")]
pub struct Swerve {
  pose: Pose2d,
  speeds: ChassisSpeeds,
  heading_pid: PID,
  modules: Vec<SimMotor>,
  last_update: Option<Time>,
}

impl Swerve {
  pub fn new(flash: Rc<dyn FlashStore>) -> Result<Self, HardwareError> {
    let modules = drive::MODULES
      .iter()
      .map(|name| SimMotor::new(&format!("{}_drive", name), module_params(), flash.clone()))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self {
      pose: Pose2d::origin(),
      speeds: ChassisSpeeds::stopped(),
      heading_pid: PID::new(drive::heading_pid(), 0.0, 0.5),
      modules,
      last_update: None,
    })
  }

  /// Translation is field-relative unless `field_relative` is false, in which case it is
  /// taken relative to the robot's heading.
  pub fn drive(&mut self, vx: Velocity, vy: Velocity, omega: AngularVelocity, field_relative: bool) {
    let max = drive::max_speed();
    let max_omega = drive::max_angular();
    let speeds = ChassisSpeeds::new(vx.clamp_to(-max, max), vy.clamp_to(-max, max), omega.clamp_to(-max_omega, max_omega));
    self.speeds = if field_relative { speeds } else { speeds.robot_to_field(self.heading()) };
  }

  pub fn stop(&mut self) {
    self.speeds = ChassisSpeeds::stopped();
  }

  pub fn speeds(&self) -> ChassisSpeeds {
    self.speeds
  }

  pub fn pose(&self) -> Pose2d {
    self.pose
  }

  pub fn set_pose(&mut self, pose: Pose2d) {
    self.pose = pose;
  }

  pub fn heading(&self) -> Angle {
    self.pose.rotation
  }

  pub fn zero_gyro(&mut self) {
    self.pose.rotation = Angle::default();
  }

  pub fn distance_to_speaker(&self) -> Length {
    self.pose.distance_to(&constants::speaker())
  }

  pub fn heading_to_speaker(&self) -> Angle {
    self.pose.bearing_to(&constants::speaker())
  }

  pub fn heading_error(&self, target: Angle) -> Angle {
    (target - self.heading()).wrapped()
  }

  /// Rotation rate that turns the robot towards `target`.
  pub fn snap_rotation(&mut self, target: Angle, now: Time) -> AngularVelocity {
    let error = self.heading_error(target).to_base();
    let output = self.heading_pid.calculate(-error, now.to_base());
    let max = drive::MAX_ANGULAR_RADS;
    output.clamp(-max, max) * rads_per_second
  }

  pub fn module_speed(&self, index: usize) -> Option<f64> {
    self.modules.get(index).map(|m| m.velocity())
  }
}

impl Subsystem for Swerve {
  fn periodic(&mut self, now: Time) {
    if let Some(last) = self.last_update.replace(now) {
      self.pose = self.pose.integrate(&self.speeds, now - last);
    }

    let vx = self.speeds.vx.to::<meters_per_second>();
    let vy = self.speeds.vy.to::<meters_per_second>();
    let speed = vx.hypot(vy);
    for module in self.modules.iter_mut() {
      module.set(MotorControl::Velocity(speed));
      module.update(now);
    }
  }

  fn burn_to_flash(&mut self) -> Result<(), HardwareError> {
    self.modules.iter_mut().try_for_each(|m| m.burn_to_flash())
  }
}
