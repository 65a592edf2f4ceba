use std::rc::Rc;

use robot_cmd::{
  control::pid::PIDConfig,
  hardware::{FlashStore, HardwareError, MotorControl, MotorParams, SimDigitalInput, SimMotor},
  prelude::*,
  units::Time,
};

use crate::constants::intake;

fn motor_params() -> MotorParams {
  MotorParams {
    pid: PIDConfig { kp: 0.0, ki: 0.0, kd: 0.0, izone: None },
    kf: 0.0,
    free_speed: 5000.0,
    time_constant: 0.05,
    max_output: 1.0,
    min_output: -1.0,
  }
}

/// Ground intake roller with a beam break just behind it.
#[derive(NamedSubsystem)]
pub struct Intake {
  motor: SimMotor,
  beam: SimDigitalInput,
  percent: f64,
}

impl Intake {
  pub fn new(flash: Rc<dyn FlashStore>, beam: SimDigitalInput) -> Result<Self, HardwareError> {
    Ok(Self { motor: SimMotor::new("intake", motor_params(), flash)?, beam, percent: 0.0 })
  }

  pub fn run_in(&mut self) {
    self.percent = intake::IN_SPEED;
  }

  pub fn run_out(&mut self) {
    self.percent = intake::OUT_SPEED;
  }

  pub fn stop(&mut self) {
    self.percent = 0.0;
  }

  pub fn percent(&self) -> f64 {
    self.percent
  }

  pub fn note_detected(&self) -> bool {
    self.beam.get()
  }
}

impl Subsystem for Intake {
  fn periodic(&mut self, now: Time) {
    self.motor.set(MotorControl::Percent(self.percent));
    self.motor.update(now);
  }

  fn reset_integral(&mut self) {
    self.motor.reset_integral();
  }

  fn burn_to_flash(&mut self) -> Result<(), HardwareError> {
    self.motor.burn_to_flash()
  }
}
