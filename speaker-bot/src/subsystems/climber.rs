use std::rc::Rc;

use log::trace;
use robot_cmd::{
  control::pid::PIDConfig,
  hardware::{FlashStore, HardwareError, MotorControl, MotorParams, SimMotor},
  prelude::*,
  units::Time,
};

use crate::constants::climber;

fn motor_params() -> MotorParams {
  MotorParams {
    pid: PIDConfig { kp: 0.0, ki: 0.0, kd: 0.0, izone: None },
    kf: 0.0,
    // Spool rotations per second.
    free_speed: 20.0,
    time_constant: 0.05,
    max_output: 1.0,
    min_output: -1.0,
  }
}

/// Winch climber. Percent output, refusing to drive past either end of travel.
#[derive(NamedSubsystem)]
pub struct Climber {
  motor: SimMotor,
  percent: f64,
}

impl Climber {
  pub fn new(flash: Rc<dyn FlashStore>) -> Result<Self, HardwareError> {
    Ok(Self { motor: SimMotor::new("climber", motor_params(), flash)?, percent: 0.0 })
  }

  pub fn set_percent(&mut self, percent: f64) {
    self.percent = percent.clamp(-1.0, 1.0);
  }

  pub fn stop(&mut self) {
    self.percent = 0.0;
  }

  /// Spool rotations from fully retracted.
  pub fn position(&self) -> f64 {
    self.motor.position()
  }

  pub fn at_top(&self) -> bool {
    self.position() >= climber::MAX_POSITION
  }

  pub fn at_bottom(&self) -> bool {
    self.position() <= climber::MIN_POSITION
  }

  fn limited_output(&self) -> f64 {
    if (self.percent > 0.0 && self.at_top()) || (self.percent < 0.0 && self.at_bottom()) {
      trace!("Climber at soft limit, holding");
      0.0
    } else {
      self.percent
    }
  }
}

impl Subsystem for Climber {
  fn periodic(&mut self, now: Time) {
    self.motor.set(MotorControl::Percent(self.limited_output()));
    self.motor.update(now);
  }

  fn reset_integral(&mut self) {
    self.motor.reset_integral();
  }

  fn burn_to_flash(&mut self) -> Result<(), HardwareError> {
    self.motor.burn_to_flash()
  }
}
