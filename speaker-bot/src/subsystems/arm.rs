use std::rc::Rc;

use robot_cmd::{
  control::pid::PIDConfig,
  hardware::{FlashStore, HardwareError, MotorControl, MotorParams, SimMotor},
  prelude::*,
  units::{degree, rotation, traits::MaybeUnitNumber, Angle, QuantityBase, Time},
};

use crate::constants::{arm, arm_max, arm_min};

fn motor_params() -> MotorParams {
  MotorParams {
    pid: PIDConfig { kp: 20.0, ki: 0.0, kd: 0.0, izone: None },
    kf: 0.0,
    // Arm rotations per second at full output, after the gearbox.
    free_speed: 0.5,
    time_constant: 0.0,
    max_output: 1.0,
    min_output: -1.0,
  }
}

/// Shooter pivot. Position controlled, with the setpoint clamped to the arm's range of motion.
#[derive(NamedSubsystem)]
pub struct Arm {
  motor: SimMotor,
  setpoint: Setpoint<Angle>,
}

impl Arm {
  pub fn new(flash: Rc<dyn FlashStore>) -> Result<Self, HardwareError> {
    let mut motor = SimMotor::new("arm", motor_params(), flash)?;
    // The arm rests on its hard stop at power on.
    motor.set_position(arm_min().to::<rotation>());
    Ok(Self { motor, setpoint: Setpoint::Constant(arm_min()) })
  }

  pub fn set_angle<S: Into<Setpoint<Angle>>>(&mut self, setpoint: S) {
    self.setpoint = setpoint.into();
  }

  /// The current target, evaluated now and clamped to the range of motion.
  pub fn setpoint(&self) -> Angle {
    self.setpoint.get().clamp_to(arm_min(), arm_max())
  }

  pub fn angle(&self) -> Angle {
    self.motor.position() * rotation
  }

  pub fn at_setpoint(&self) -> bool {
    (self.angle() - self.setpoint()).abs() <= arm::TOLERANCE_DEGREES * degree
  }
}

impl Subsystem for Arm {
  fn periodic(&mut self, now: Time) {
    let target = self.setpoint();
    self.motor.set(MotorControl::Position(target.to::<rotation>()));
    self.motor.update(now);
  }

  fn reset_integral(&mut self) {
    self.motor.reset_integral();
  }

  fn burn_to_flash(&mut self) -> Result<(), HardwareError> {
    self.motor.burn_to_flash()
  }
}

#[cfg(test)]
mod tests {
  use std::rc::Rc;

  use approx::assert_relative_eq;
  use robot_cmd::{hardware::MemoryFlash, prelude::*, units::{degree, millisecond}};

  use super::Arm;

  #[test]
  fn test_setpoint_clamped() {
    let mut arm = Arm::new(Rc::new(MemoryFlash::new())).unwrap();
    arm.set_angle(120.0 * degree);
    assert_relative_eq!(arm.setpoint(), 90.0 * degree);
    arm.set_angle(Setpoint::supplier(|| 0.0 * degree));
    assert_relative_eq!(arm.setpoint(), 10.0 * degree);
  }

  #[test]
  fn test_reaches_setpoint() {
    let mut arm = Arm::new(Rc::new(MemoryFlash::new())).unwrap();
    assert!(arm.at_setpoint());

    arm.set_angle(48.5 * degree);
    assert!(!arm.at_setpoint());
    for i in 0..50 {
      arm.periodic((i as f64 * 20.0) * millisecond);
    }
    assert!(arm.at_setpoint());
    assert_relative_eq!(arm.angle(), 48.5 * degree, epsilon = 0.1 * degree);
  }
}
