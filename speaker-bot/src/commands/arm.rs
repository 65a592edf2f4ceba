use robot_cmd::{
  input::hid::apply_deadband,
  prelude::*,
  units::{degree, meter, traits::MaybeUnitNumber, Angle, Length, QuantityBase, Time},
};

use crate::{
  constants::{arm, arm_max, arm_min, operators},
  subsystems::{Arm, Swerve},
};

/// Moves the arm to a setpoint and finishes once it is there. The setpoint stays with the
/// arm after the command ends.
pub struct ToAngle {
  arm: Handle<Arm>,
  setpoint: Setpoint<Angle>,
}

impl ToAngle {
  pub fn new<S: Into<Setpoint<Angle>>>(arm: Handle<Arm>, setpoint: S) -> Self {
    Self { arm, setpoint: setpoint.into() }
  }
}

impl Command for ToAngle {
  fn initialize(&mut self, _now: Time) {
    self.arm.borrow_mut().set_angle(self.setpoint.clone());
  }

  fn is_finished(&self) -> bool {
    self.arm.borrow().at_setpoint()
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.arm.id()])
  }

  fn name(&self) -> String {
    "ToAngle".into()
  }
}

/// Shot angle for a distance from the speaker, interpolated from the shot table and held at
/// the table's ends.
pub fn distance_angle(distance: Length) -> Angle {
  let d = distance.to::<meter>();
  let table = &arm::DISTANCE_ANGLES;

  let (first_d, first_a) = table[0];
  if d <= first_d {
    return first_a * degree;
  }

  for pair in table.windows(2) {
    let ((d0, a0), (d1, a1)) = (pair[0], pair[1]);
    if d <= d1 {
      let t = (d - d0) / (d1 - d0);
      return (a0 + (a1 - a0) * t) * degree;
    }
  }

  let (_, last_a) = table[table.len() - 1];
  last_a * degree
}

/// Tracks the shot angle for the robot's current distance to the speaker. Only the arm is
/// required; the drivetrain is read, never commanded.
pub struct ToDistanceAngle {
  swerve: Handle<Swerve>,
  arm: Handle<Arm>,
}

impl ToDistanceAngle {
  pub fn new(swerve: Handle<Swerve>, arm: Handle<Arm>) -> Self {
    Self { swerve, arm }
  }
}

impl Command for ToDistanceAngle {
  fn initialize(&mut self, _now: Time) {
    let swerve = self.swerve.clone();
    self.arm.borrow_mut().set_angle(Setpoint::supplier(move || distance_angle(swerve.borrow().distance_to_speaker())));
  }

  fn is_finished(&self) -> bool {
    self.arm.borrow().at_setpoint()
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.arm.id()])
  }

  fn name(&self) -> String {
    "ToDistanceAngle".into()
  }
}

/// Operator stick control of the arm. Pushing the stick forward (negative Y) raises it.
pub struct ManualArm {
  arm: Handle<Arm>,
  input: Box<dyn Fn() -> f64>,
  last: Time,
}

impl ManualArm {
  pub fn new<F: Fn() -> f64 + 'static>(arm: Handle<Arm>, input: F) -> Self {
    Self { arm, input: Box::new(input), last: Time::default() }
  }
}

impl Command for ManualArm {
  fn initialize(&mut self, now: Time) {
    let mut arm = self.arm.borrow_mut();
    let current = arm.setpoint();
    arm.set_angle(current);
    self.last = now;
  }

  fn execute(&mut self, now: Time) {
    let dt = (now - self.last).to_base();
    self.last = now;

    let input = apply_deadband((self.input)(), operators::STICK_DEADBAND);
    if input == 0.0 {
      return;
    }

    let mut arm = self.arm.borrow_mut();
    let delta = -input * arm::MANUAL_DEGREES_PER_SECOND * dt * degree;
    let target = (arm.setpoint() + delta).clamp_to(arm_min(), arm_max());
    arm.set_angle(target);
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.arm.id()])
  }

  fn name(&self) -> String {
    "ManualArm".into()
  }
}
