use crate::{error::CommandError, time::has_elapsed, units::{second, Time}};

use super::{Command, InterruptionBehavior, Requirements};

macro_rules! delegate {
  (requirements) => {
    fn requirements(&self) -> Requirements { self.inner.requirements() }
  };
  (name) => {
    fn name(&self) -> String { self.inner.name() }
  };
  (runs_when_disabled) => {
    fn runs_when_disabled(&self) -> bool { self.inner.runs_when_disabled() }
  };
  (interruption_behavior) => {
    fn interruption_behavior(&self) -> InterruptionBehavior { self.inner.interruption_behavior() }
  };
  (validate) => {
    fn validate(&self) -> Result<(), CommandError> { self.inner.validate() }
  };
  (lifecycle) => {
    fn initialize(&mut self, now: Time) { self.inner.initialize(now) }
    fn execute(&mut self, now: Time) { self.inner.execute(now) }
    fn is_finished(&self) -> bool { self.inner.is_finished() }
    fn end(&mut self, interrupted: bool) { self.inner.end(interrupted) }
  };
  ($($item:ident),+) => {
    $(delegate!($item);)+
  };
}

/// Finishes the wrapped command once `duration` has passed since it was initialized. The
/// wrapped command sees `interrupted = true` if it had not finished by itself.
pub struct Timeout<C> {
  inner: C,
  duration: Time,
  start: Time,
  elapsed: Time,
}

impl<C: Command> Timeout<C> {
  pub fn new(inner: C, duration: Time) -> Self {
    Self { inner, duration, start: 0.0 * second, elapsed: 0.0 * second }
  }

  fn timed_out(&self) -> bool {
    has_elapsed(self.elapsed, self.duration)
  }
}

impl<C: Command> Command for Timeout<C> {
  fn initialize(&mut self, now: Time) {
    self.start = now;
    self.elapsed = 0.0 * second;
    self.inner.initialize(now);
  }

  fn execute(&mut self, now: Time) {
    self.inner.execute(now);
    self.elapsed = now - self.start;
  }

  fn is_finished(&self) -> bool {
    self.timed_out() || self.inner.is_finished()
  }

  fn end(&mut self, interrupted: bool) {
    let natural = self.inner.is_finished();
    self.inner.end(interrupted || !natural);
  }

  delegate!(requirements, name, runs_when_disabled, interruption_behavior, validate);
}

/// Runs a fallback whenever the wrapped command ends without completing: binding release,
/// preemption, disable, explicit cancel or cancellation of an enclosing group.
pub struct HandleInterrupt<C> {
  inner: C,
  handler: Box<dyn FnMut()>,
}

impl<C: Command> HandleInterrupt<C> {
  pub fn new<F: FnMut() + 'static>(inner: C, handler: F) -> Self {
    Self { inner, handler: Box::new(handler) }
  }
}

impl<C: Command> Command for HandleInterrupt<C> {
  fn initialize(&mut self, now: Time) {
    self.inner.initialize(now)
  }

  fn execute(&mut self, now: Time) {
    self.inner.execute(now)
  }

  fn is_finished(&self) -> bool {
    self.inner.is_finished()
  }

  fn end(&mut self, interrupted: bool) {
    self.inner.end(interrupted);
    if interrupted {
      (self.handler)();
    }
  }

  delegate!(requirements, name, runs_when_disabled, interruption_behavior, validate);
}

pub struct Until<C> {
  inner: C,
  condition: Box<dyn Fn() -> bool>,
}

impl<C: Command> Until<C> {
  pub fn new<F: Fn() -> bool + 'static>(inner: C, condition: F) -> Self {
    Self { inner, condition: Box::new(condition) }
  }
}

impl<C: Command> Command for Until<C> {
  fn initialize(&mut self, now: Time) {
    self.inner.initialize(now)
  }

  fn execute(&mut self, now: Time) {
    self.inner.execute(now)
  }

  fn is_finished(&self) -> bool {
    self.inner.is_finished() || (self.condition)()
  }

  fn end(&mut self, interrupted: bool) {
    let natural = self.inner.is_finished();
    self.inner.end(interrupted || !natural)
  }

  delegate!(requirements, name, runs_when_disabled, interruption_behavior, validate);
}

pub struct FinallyDo<C> {
  inner: C,
  f: Box<dyn FnMut(bool)>,
}

impl<C: Command> FinallyDo<C> {
  pub fn new<F: FnMut(bool) + 'static>(inner: C, f: F) -> Self {
    Self { inner, f: Box::new(f) }
  }
}

impl<C: Command> Command for FinallyDo<C> {
  fn initialize(&mut self, now: Time) {
    self.inner.initialize(now)
  }

  fn execute(&mut self, now: Time) {
    self.inner.execute(now)
  }

  fn is_finished(&self) -> bool {
    self.inner.is_finished()
  }

  fn end(&mut self, interrupted: bool) {
    self.inner.end(interrupted);
    (self.f)(interrupted)
  }

  delegate!(requirements, name, runs_when_disabled, interruption_behavior, validate);
}

pub struct Named<C> {
  inner: C,
  name: String,
}

impl<C: Command> Named<C> {
  pub fn new(inner: C, name: &str) -> Self {
    Self { inner, name: name.to_owned() }
  }
}

impl<C: Command> Command for Named<C> {
  fn name(&self) -> String {
    self.name.clone()
  }

  delegate!(lifecycle, requirements, runs_when_disabled, interruption_behavior, validate);
}

pub struct IgnoringDisable<C>(pub(crate) C);

impl<C: Command> Command for IgnoringDisable<C> {
  fn initialize(&mut self, now: Time) { self.0.initialize(now) }
  fn execute(&mut self, now: Time) { self.0.execute(now) }
  fn is_finished(&self) -> bool { self.0.is_finished() }
  fn end(&mut self, interrupted: bool) { self.0.end(interrupted) }
  fn requirements(&self) -> Requirements { self.0.requirements() }
  fn name(&self) -> String { self.0.name() }
  fn interruption_behavior(&self) -> InterruptionBehavior { self.0.interruption_behavior() }
  fn validate(&self) -> Result<(), CommandError> { self.0.validate() }

  fn runs_when_disabled(&self) -> bool {
    true
  }
}

pub struct WithInterruptionBehavior<C>(pub(crate) C, pub(crate) InterruptionBehavior);

impl<C: Command> Command for WithInterruptionBehavior<C> {
  fn initialize(&mut self, now: Time) { self.0.initialize(now) }
  fn execute(&mut self, now: Time) { self.0.execute(now) }
  fn is_finished(&self) -> bool { self.0.is_finished() }
  fn end(&mut self, interrupted: bool) { self.0.end(interrupted) }
  fn requirements(&self) -> Requirements { self.0.requirements() }
  fn name(&self) -> String { self.0.name() }
  fn runs_when_disabled(&self) -> bool { self.0.runs_when_disabled() }
  fn validate(&self) -> Result<(), CommandError> { self.0.validate() }

  fn interruption_behavior(&self) -> InterruptionBehavior {
    self.1
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::{Cell, RefCell}, rc::Rc};

  use mockall::Sequence;

  use crate::{command::{testing::Probe, Command, CommandExt, MockCommand, Requirements}, units::{millisecond, second, Time}};

  fn quiet_mock() -> MockCommand {
    let mut mock = MockCommand::new();
    mock.expect_name().return_const("Mock".to_owned());
    mock.expect_requirements().returning(Requirements::new);
    mock
  }

  #[test]
  fn test_timeout_bounds_endless_command() {
    let mut mock = quiet_mock();
    let mut seq = Sequence::new();
    mock.expect_initialize().once().in_sequence(&mut seq).return_const(());
    mock.expect_execute().times(50).in_sequence(&mut seq).return_const(());
    mock.expect_is_finished().return_const(false);
    mock.expect_end().once().withf(|&interrupted| interrupted).in_sequence(&mut seq).return_const(());

    let mut timeout = mock.with_timeout(1.0 * second);
    let mut now: Time = 3.0 * second;
    timeout.initialize(now);
    let mut ticks = 0;
    while !timeout.is_finished() {
      now += 20.0 * millisecond;
      timeout.execute(now);
      ticks += 1;
    }
    timeout.end(false);
    assert_eq!(ticks, 50);
  }

  #[test]
  fn test_timeout_passes_through_natural_finish() {
    let log = Rc::new(RefCell::new(vec![]));
    let mut timeout = Probe::new("a", &log, Some(2)).with_timeout(10.0 * second);
    timeout.initialize(0.0 * second);
    timeout.execute(0.02 * second);
    timeout.execute(0.04 * second);
    assert!(timeout.is_finished());
    timeout.end(false);
    assert_eq!(log.borrow().last().map(String::as_str), Some("a:end(false)"));
  }

  #[test]
  fn test_handler_runs_only_on_interrupt() {
    let count = Rc::new(Cell::new(0));
    let log = Rc::new(RefCell::new(vec![]));

    let c2 = count.clone();
    let mut cmd = Probe::new("shot", &log, None).handle_interrupt(move || c2.set(c2.get() + 1));
    cmd.initialize(0.0 * second);
    cmd.end(false);
    assert_eq!(count.get(), 0);
    cmd.initialize(0.0 * second);
    cmd.end(true);
    assert_eq!(count.get(), 1);
    assert_eq!(log.borrow().last().map(String::as_str), Some("shot:end(true)"));
  }

  #[test]
  fn test_until_and_finally() {
    let flag = Rc::new(Cell::new(false));
    let ended = Rc::new(Cell::new(None));
    let log = Rc::new(RefCell::new(vec![]));

    let f2 = flag.clone();
    let e2 = ended.clone();
    let mut cmd = Probe::new("a", &log, None)
      .until(move || f2.get())
      .finally_do(move |interrupted| e2.set(Some(interrupted)))
      .with_name("Guarded")
      .ignoring_disable();

    assert_eq!(cmd.name(), "Guarded");
    assert!(cmd.runs_when_disabled());
    cmd.initialize(0.0 * second);
    assert!(!cmd.is_finished());
    flag.set(true);
    assert!(cmd.is_finished());
    cmd.end(false);
    assert_eq!(ended.get(), Some(false));
    assert_eq!(log.borrow().last().map(String::as_str), Some("a:end(true)"));
  }
}
