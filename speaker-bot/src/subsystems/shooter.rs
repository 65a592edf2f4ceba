use std::rc::Rc;

use robot_cmd::{
  control::pid::PIDConfig,
  hardware::{FlashStore, HardwareError, MotorControl, MotorParams, SimMotor},
  prelude::*,
  units::{motion::{rpm, AngularVelocity}, traits::MaybeUnitNumber, QuantityBase, Time},
};

use crate::constants::shooter;

const FREE_SPEED_RPM: f64 = 6000.0;

fn motor_params() -> MotorParams {
  MotorParams {
    pid: PIDConfig { kp: 0.0001, ki: 0.0, kd: 0.0, izone: None },
    kf: 1.0 / FREE_SPEED_RPM,
    free_speed: FREE_SPEED_RPM,
    time_constant: 0.1,
    max_output: 1.0,
    min_output: -1.0,
  }
}

/// Velocity controlled flywheel.
#[derive(NamedSubsystem)]
pub struct Shooter {
  motor: SimMotor,
  setpoint: Setpoint<AngularVelocity>,
}

impl Shooter {
  pub fn new(flash: Rc<dyn FlashStore>) -> Result<Self, HardwareError> {
    Ok(Self {
      motor: SimMotor::new("shooter", motor_params(), flash)?,
      setpoint: Setpoint::Constant(AngularVelocity::default()),
    })
  }

  pub fn set_rpm<S: Into<Setpoint<AngularVelocity>>>(&mut self, setpoint: S) {
    self.setpoint = setpoint.into();
  }

  pub fn setpoint(&self) -> AngularVelocity {
    self.setpoint.get()
  }

  pub fn speed(&self) -> AngularVelocity {
    self.motor.velocity() * rpm
  }

  pub fn at_rpm(&self) -> bool {
    (self.speed() - self.setpoint()).abs() <= shooter::TOLERANCE_RPM * rpm
  }
}

impl Subsystem for Shooter {
  fn periodic(&mut self, now: Time) {
    self.motor.set(MotorControl::Velocity(self.setpoint().to::<rpm>()));
    self.motor.update(now);
  }

  fn reset_integral(&mut self) {
    self.motor.reset_integral();
  }

  fn burn_to_flash(&mut self) -> Result<(), HardwareError> {
    self.motor.burn_to_flash()
  }
}
