use robot_cmd::{input::hid::apply_deadband, prelude::*, units::Time};

use crate::{constants::{climber, operators}, subsystems::Climber};

/// Operator stick control of the winch. Stick forward (negative Y) extends.
pub struct ClimberManual {
  climber: Handle<Climber>,
  input: Box<dyn Fn() -> f64>,
}

impl ClimberManual {
  pub fn new<F: Fn() -> f64 + 'static>(climber: Handle<Climber>, input: F) -> Self {
    Self { climber, input: Box::new(input) }
  }
}

impl Command for ClimberManual {
  fn execute(&mut self, _now: Time) {
    let input = apply_deadband((self.input)(), operators::STICK_DEADBAND);
    self.climber.borrow_mut().set_percent(-input);
  }

  fn end(&mut self, _interrupted: bool) {
    self.climber.borrow_mut().stop();
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.climber.id()])
  }

  fn name(&self) -> String {
    "ClimberManual".into()
  }
}

/// Drives the climber to one end of its travel.
pub struct ClimbTo {
  climber: Handle<Climber>,
  extend: bool,
}

impl ClimbTo {
  pub fn extend(climber: Handle<Climber>) -> Self {
    Self { climber, extend: true }
  }

  pub fn retract(climber: Handle<Climber>) -> Self {
    Self { climber, extend: false }
  }
}

impl Command for ClimbTo {
  fn initialize(&mut self, _now: Time) {
    let speed = if self.extend { climber::EXTEND_SPEED } else { climber::RETRACT_SPEED };
    self.climber.borrow_mut().set_percent(speed);
  }

  fn is_finished(&self) -> bool {
    let climber = self.climber.borrow();
    if self.extend { climber.at_top() } else { climber.at_bottom() }
  }

  fn end(&mut self, _interrupted: bool) {
    self.climber.borrow_mut().stop();
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.climber.id()])
  }

  fn name(&self) -> String {
    if self.extend { "ClimbExtend".into() } else { "ClimbRetract".into() }
  }
}
