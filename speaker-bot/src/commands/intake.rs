use robot_cmd::{prelude::*, units::Time};

use crate::subsystems::Intake;

/// Runs the rollers inwards until interrupted.
pub struct IntakeIn {
  intake: Handle<Intake>,
}

impl IntakeIn {
  pub fn new(intake: Handle<Intake>) -> Self {
    Self { intake }
  }
}

impl Command for IntakeIn {
  fn initialize(&mut self, _now: Time) {
    self.intake.borrow_mut().run_in();
  }

  fn end(&mut self, _interrupted: bool) {
    self.intake.borrow_mut().stop();
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.intake.id()])
  }

  fn name(&self) -> String {
    "IntakeIn".into()
  }
}

/// Runs the rollers outwards until interrupted.
pub struct Outake {
  intake: Handle<Intake>,
}

impl Outake {
  pub fn new(intake: Handle<Intake>) -> Self {
    Self { intake }
  }
}

impl Command for Outake {
  fn initialize(&mut self, _now: Time) {
    self.intake.borrow_mut().run_out();
  }

  fn end(&mut self, _interrupted: bool) {
    self.intake.borrow_mut().stop();
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.intake.id()])
  }

  fn name(&self) -> String {
    "Outake".into()
  }
}

/// Waits for a note to cross the intake beam. Reads the sensor only, so it can run beside
/// whatever is driving the intake.
pub struct WaitForIntakeBeam {
  intake: Handle<Intake>,
}

impl WaitForIntakeBeam {
  pub fn new(intake: Handle<Intake>) -> Self {
    Self { intake }
  }
}

impl Command for WaitForIntakeBeam {
  fn is_finished(&self) -> bool {
    self.intake.borrow().note_detected()
  }

  fn requirements(&self) -> Requirements {
    Requirements::new()
  }

  fn name(&self) -> String {
    "WaitForIntakeBeam".into()
  }
}
