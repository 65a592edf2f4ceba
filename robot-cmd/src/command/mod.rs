use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

use mockall::automock;

use crate::{error::CommandError, subsystem::SubsystemId, units::Time};

pub mod basic;
pub mod group;
pub mod wrapper;

pub use basic::*;
pub use group::*;
pub use wrapper::*;

pub type Requirements = BTreeSet<SubsystemId>;

/// What happens when another command asks for a subsystem this command holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionBehavior {
  /// This command ends with `interrupted = true` and the newcomer runs.
  CancelSelf,
  /// The newcomer is refused.
  CancelIncoming,
}

/// A unit of robot behaviour run by the scheduler.
///
/// Lifecycle: `initialize` once when scheduled, then `execute` once per tick until
/// `is_finished` reports true or the command is interrupted, then `end` exactly once.
#[automock]
pub trait Command {
  #[allow(unused_variables)]
  fn initialize(&mut self, now: Time) { }

  #[allow(unused_variables)]
  fn execute(&mut self, now: Time) { }

  fn is_finished(&self) -> bool {
    false
  }

  #[allow(unused_variables)]
  fn end(&mut self, interrupted: bool) { }

  fn requirements(&self) -> Requirements;

  fn name(&self) -> String {
    "<unnamed command>".into()
  }

  fn runs_when_disabled(&self) -> bool {
    false
  }

  fn interruption_behavior(&self) -> InterruptionBehavior {
    InterruptionBehavior::CancelSelf
  }

  /// Checks composition rules that can be decided before the command ever runs.
  fn validate(&self) -> Result<(), CommandError> {
    Ok(())
  }
}

impl<C: Command + ?Sized> Command for Box<C> {
  fn initialize(&mut self, now: Time) { (**self).initialize(now) }
  fn execute(&mut self, now: Time) { (**self).execute(now) }
  fn is_finished(&self) -> bool { (**self).is_finished() }
  fn end(&mut self, interrupted: bool) { (**self).end(interrupted) }
  fn requirements(&self) -> Requirements { (**self).requirements() }
  fn name(&self) -> String { (**self).name() }
  fn runs_when_disabled(&self) -> bool { (**self).runs_when_disabled() }
  fn interruption_behavior(&self) -> InterruptionBehavior { (**self).interruption_behavior() }
  fn validate(&self) -> Result<(), CommandError> { (**self).validate() }
}

/// A scheduled (or schedulable) command instance. Bindings keep one of these and reuse it
/// for every press, so identity is the allocation.
pub type CommandRef = Rc<RefCell<dyn Command>>;

pub fn command_ref<C: Command + 'static>(command: C) -> CommandRef {
  Rc::new(RefCell::new(command))
}

pub(crate) fn same_command(a: &CommandRef, b: &CommandRef) -> bool {
  Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

pub trait CommandExt : Command + Sized + 'static {
  fn boxed(self) -> Box<dyn Command> {
    Box::new(self)
  }

  fn into_ref(self) -> CommandRef {
    command_ref(self)
  }

  fn with_timeout(self, duration: Time) -> Timeout<Self> {
    Timeout::new(self, duration)
  }

  fn until<F: Fn() -> bool + 'static>(self, condition: F) -> Until<Self> {
    Until::new(self, condition)
  }

  fn and_then<C: Command + 'static>(self, next: C) -> SequentialGroup {
    SequentialGroup::new(vec![self.boxed(), next.boxed()])
  }

  fn along_with<C: Command + 'static>(self, other: C) -> ParallelGroup {
    ParallelGroup::new(vec![self.boxed(), other.boxed()])
  }

  fn race_with<C: Command + 'static>(self, other: C) -> RaceGroup {
    RaceGroup::new(vec![self.boxed(), other.boxed()])
  }

  /// Runs `companion` alongside this command, stopping it when this command finishes.
  fn deadline_with<C: Command + 'static>(self, companion: C) -> DeadlineGroup {
    DeadlineGroup::new(self.boxed(), vec![companion.boxed()])
  }

  /// Runs `handler` after this command ends on any path other than natural completion.
  fn handle_interrupt<F: FnMut() + 'static>(self, handler: F) -> HandleInterrupt<Self> {
    HandleInterrupt::new(self, handler)
  }

  fn finally_do<F: FnMut(bool) + 'static>(self, f: F) -> FinallyDo<Self> {
    FinallyDo::new(self, f)
  }

  fn with_name(self, name: &str) -> Named<Self> {
    Named::new(self, name)
  }

  fn ignoring_disable(self) -> IgnoringDisable<Self> {
    IgnoringDisable(self)
  }

  fn with_interruption_behavior(self, behavior: InterruptionBehavior) -> WithInterruptionBehavior<Self> {
    WithInterruptionBehavior(self, behavior)
  }
}

impl<C: Command + 'static> CommandExt for C {}
