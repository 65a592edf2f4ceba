use std::{cell::{Ref, RefCell, RefMut}, fmt::Debug, rc::Rc};

use crate::{hardware::HardwareError, units::Time};

pub type SubsystemId = &'static str;

/// A mechanism the scheduler arbitrates access to. Everything here is called from the
/// scheduler tick and must not block.
pub trait Subsystem {
  /// The subsystem's own control cycle. Runs once per tick before any command executes.
  #[allow(unused_variables)]
  fn periodic(&mut self, now: Time) { }

  /// Clears accumulated controller error. Only called while the robot is disabled.
  fn reset_integral(&mut self) { }

  /// Commits current tunables to non-volatile storage.
  fn burn_to_flash(&mut self) -> Result<(), HardwareError> { Ok(()) }
}

pub trait NamedSubsystem {
  const ID: SubsystemId;
}

/// Shared ownership of a subsystem. The container creates one per mechanism and clones it
/// into every command that needs the mechanism.
pub struct Handle<T> {
  id: SubsystemId,
  inner: Rc<RefCell<T>>,
}

impl<T> Clone for Handle<T> {
  fn clone(&self) -> Self {
    Self { id: self.id, inner: self.inner.clone() }
  }
}

impl<T: NamedSubsystem> Handle<T> {
  pub fn new(subsystem: T) -> Self {
    Self { id: T::ID, inner: Rc::new(RefCell::new(subsystem)) }
  }
}

impl<T> Handle<T> {
  pub fn id(&self) -> SubsystemId {
    self.id
  }

  pub fn borrow(&self) -> Ref<'_, T> {
    self.inner.borrow()
  }

  pub fn borrow_mut(&self) -> RefMut<'_, T> {
    self.inner.borrow_mut()
  }

  pub(crate) fn shared(&self) -> Rc<RefCell<T>> {
    self.inner.clone()
  }
}

impl<T> Debug for Handle<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Handle").field(&self.id).finish()
  }
}

/// A target for a mechanism: either fixed, or computed from other state every control cycle.
pub enum Setpoint<T> {
  Constant(T),
  Supplier(Rc<dyn Fn() -> T>),
}

impl<T: Copy> Setpoint<T> {
  pub fn supplier<F: Fn() -> T + 'static>(f: F) -> Self {
    Self::Supplier(Rc::new(f))
  }

  pub fn get(&self) -> T {
    match self {
      Setpoint::Constant(value) => *value,
      Setpoint::Supplier(f) => f(),
    }
  }
}

impl<T: Copy> Clone for Setpoint<T> {
  fn clone(&self) -> Self {
    match self {
      Setpoint::Constant(value) => Setpoint::Constant(*value),
      Setpoint::Supplier(f) => Setpoint::Supplier(f.clone()),
    }
  }
}

impl<T> From<T> for Setpoint<T> {
  fn from(value: T) -> Self {
    Setpoint::Constant(value)
  }
}

impl<T: Debug> Debug for Setpoint<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Setpoint::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
      Setpoint::Supplier(_) => write!(f, "Supplier"),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::{macros::NamedSubsystem, units::{degree, Angle}};

  use super::{Handle, NamedSubsystem as _, Setpoint};

  #[derive(NamedSubsystem, Default)]
  struct ClimberArm { value: i32 }

  #[derive(NamedSubsystem)]
  #[subsystem(id = "wrist")]
  struct Wrist;

  #[test]
  fn test_derived_ids() {
    assert_eq!(ClimberArm::ID, "climber_arm");
    assert_eq!(Wrist::ID, "wrist");

    let handle = Handle::new(ClimberArm::default());
    let other = handle.clone();
    other.borrow_mut().value = 3;
    assert_eq!(handle.borrow().value, 3);
    assert_eq!(handle.id(), "climber_arm");
  }

  #[test]
  fn test_supplier_evaluated_on_each_get() {
    let source = Rc::new(Cell::new(10.0));
    let s2 = source.clone();
    let setpoint: Setpoint<Angle> = Setpoint::supplier(move || s2.get() * degree);

    assert_eq!(setpoint.get(), 10.0 * degree);
    source.set(20.0);
    assert_eq!(setpoint.get(), 20.0 * degree);

    let constant: Setpoint<Angle> = (5.0 * degree).into();
    assert_eq!(constant.get(), 5.0 * degree);
  }
}
