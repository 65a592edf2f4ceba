use crate::{subsystem::SubsystemId, time::has_elapsed, units::{second, Time}};

use super::{Command, Requirements};

/// Runs an action once on initialize and finishes straight away.
pub struct InstantCommand {
  action: Box<dyn FnMut()>,
  requirements: Requirements,
}

impl InstantCommand {
  pub fn new<F: FnMut() + 'static>(action: F, requirements: &[SubsystemId]) -> Self {
    Self { action: Box::new(action), requirements: requirements.iter().copied().collect() }
  }
}

impl Command for InstantCommand {
  fn initialize(&mut self, _now: Time) {
    (self.action)()
  }

  fn is_finished(&self) -> bool {
    true
  }

  fn requirements(&self) -> Requirements {
    self.requirements.clone()
  }

  fn name(&self) -> String {
    "InstantCommand".into()
  }
}

/// Runs an action every tick until interrupted.
pub struct RunCommand {
  action: Box<dyn FnMut()>,
  requirements: Requirements,
}

impl RunCommand {
  pub fn new<F: FnMut() + 'static>(action: F, requirements: &[SubsystemId]) -> Self {
    Self { action: Box::new(action), requirements: requirements.iter().copied().collect() }
  }
}

impl Command for RunCommand {
  fn execute(&mut self, _now: Time) {
    (self.action)()
  }

  fn requirements(&self) -> Requirements {
    self.requirements.clone()
  }

  fn name(&self) -> String {
    "RunCommand".into()
  }
}

/// A command assembled from four closures.
pub struct FunctionalCommand {
  on_init: Box<dyn FnMut()>,
  on_execute: Box<dyn FnMut()>,
  on_end: Box<dyn FnMut(bool)>,
  is_finished: Box<dyn Fn() -> bool>,
  requirements: Requirements,
}

impl FunctionalCommand {
  pub fn new<I, E, N, F>(on_init: I, on_execute: E, on_end: N, is_finished: F, requirements: &[SubsystemId]) -> Self
  where
    I: FnMut() + 'static,
    E: FnMut() + 'static,
    N: FnMut(bool) + 'static,
    F: Fn() -> bool + 'static,
  {
    Self {
      on_init: Box::new(on_init),
      on_execute: Box::new(on_execute),
      on_end: Box::new(on_end),
      is_finished: Box::new(is_finished),
      requirements: requirements.iter().copied().collect(),
    }
  }
}

impl Command for FunctionalCommand {
  fn initialize(&mut self, _now: Time) {
    (self.on_init)()
  }

  fn execute(&mut self, _now: Time) {
    (self.on_execute)()
  }

  fn is_finished(&self) -> bool {
    (self.is_finished)()
  }

  fn end(&mut self, interrupted: bool) {
    (self.on_end)(interrupted)
  }

  fn requirements(&self) -> Requirements {
    self.requirements.clone()
  }

  fn name(&self) -> String {
    "FunctionalCommand".into()
  }
}

pub struct WaitCommand {
  duration: Time,
  start: Time,
  elapsed: Time,
}

impl WaitCommand {
  pub fn new(duration: Time) -> Self {
    Self { duration, start: 0.0 * second, elapsed: 0.0 * second }
  }
}

impl Command for WaitCommand {
  fn initialize(&mut self, now: Time) {
    self.start = now;
    self.elapsed = 0.0 * second;
  }

  fn execute(&mut self, now: Time) {
    self.elapsed = now - self.start;
  }

  fn is_finished(&self) -> bool {
    has_elapsed(self.elapsed, self.duration)
  }

  fn requirements(&self) -> Requirements {
    Requirements::new()
  }

  fn name(&self) -> String {
    "WaitCommand".into()
  }

  fn runs_when_disabled(&self) -> bool {
    true
  }
}

pub struct WaitUntilCommand {
  condition: Box<dyn Fn() -> bool>,
}

impl WaitUntilCommand {
  pub fn new<F: Fn() -> bool + 'static>(condition: F) -> Self {
    Self { condition: Box::new(condition) }
  }
}

impl Command for WaitUntilCommand {
  fn is_finished(&self) -> bool {
    (self.condition)()
  }

  fn requirements(&self) -> Requirements {
    Requirements::new()
  }

  fn name(&self) -> String {
    "WaitUntilCommand".into()
  }

  fn runs_when_disabled(&self) -> bool {
    true
  }
}
