use std::{fmt::Debug, rc::Rc};

use crate::{command::{command_ref, Command, CommandRef}, control::edge_detect::{Edge, EdgeDetector}};

/// A named boolean condition polled once per tick. Triggers built from the same input share
/// a name, which is how the binding table recognises two bindings on the same event.
#[derive(Clone)]
pub struct Trigger {
  name: String,
  condition: Rc<dyn Fn() -> bool>,
}

impl Trigger {
  pub fn new<F: Fn() -> bool + 'static>(name: &str, condition: F) -> Self {
    Self { name: name.to_owned(), condition: Rc::new(condition) }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn get(&self) -> bool {
    (self.condition)()
  }

  pub fn and(self, other: Trigger) -> Trigger {
    let name = format!("({} && {})", self.name, other.name);
    Trigger::new(&name, move || self.get() && other.get())
  }

  pub fn or(self, other: Trigger) -> Trigger {
    let name = format!("({} || {})", self.name, other.name);
    Trigger::new(&name, move || self.get() || other.get())
  }

  pub fn negate(self) -> Trigger {
    let name = format!("!{}", self.name);
    Trigger::new(&name, move || !self.get())
  }
}

impl Debug for Trigger {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Trigger").field(&self.name).finish()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
  /// Schedule on the rising edge.
  OnTrue,
  /// Schedule on the falling edge.
  OnFalse,
  /// Schedule on the rising edge, cancel on the falling edge.
  WhileTrue,
  /// Schedule on the falling edge, cancel on the rising edge.
  WhileFalse,
  /// Rising edge schedules the command if idle, cancels it if running.
  ToggleOnTrue,
}

impl BindingKind {
  /// The edge on which this binding may start its command.
  pub fn scheduling_edge(&self) -> Edge {
    match self {
      BindingKind::OnTrue | BindingKind::WhileTrue | BindingKind::ToggleOnTrue => Edge::Rising,
      BindingKind::OnFalse | BindingKind::WhileFalse => Edge::Falling,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAction {
  Schedule,
  Cancel,
  Toggle,
}

pub struct Binding {
  pub(crate) trigger: Trigger,
  pub(crate) kind: BindingKind,
  pub(crate) command: CommandRef,
  detector: EdgeDetector,
}

impl Binding {
  pub fn new(trigger: Trigger, kind: BindingKind, command: CommandRef) -> Self {
    Self { trigger, kind, command, detector: EdgeDetector::new() }
  }

  pub fn trigger(&self) -> &Trigger {
    &self.trigger
  }

  pub fn kind(&self) -> BindingKind {
    self.kind
  }

  pub fn command(&self) -> &CommandRef {
    &self.command
  }

  /// Samples the trigger without acting on it. Done once at install so a button held
  /// during startup does not fire.
  pub(crate) fn prime(&mut self) {
    self.detector = EdgeDetector::primed(self.trigger.get());
  }

  pub(crate) fn poll(&mut self) -> Option<BindingAction> {
    let edge = self.detector.update(self.trigger.get())?;
    match (self.kind, edge) {
      (BindingKind::OnTrue, Edge::Rising) => Some(BindingAction::Schedule),
      (BindingKind::OnFalse, Edge::Falling) => Some(BindingAction::Schedule),
      (BindingKind::WhileTrue, Edge::Rising) => Some(BindingAction::Schedule),
      (BindingKind::WhileTrue, Edge::Falling) => Some(BindingAction::Cancel),
      (BindingKind::WhileFalse, Edge::Falling) => Some(BindingAction::Schedule),
      (BindingKind::WhileFalse, Edge::Rising) => Some(BindingAction::Cancel),
      (BindingKind::ToggleOnTrue, Edge::Rising) => Some(BindingAction::Toggle),
      _ => None,
    }
  }
}

/// The full input-to-command mapping, declared once and handed to
/// [`CommandScheduler::install_bindings`](crate::scheduler::CommandScheduler::install_bindings).
#[derive(Default)]
pub struct BindingTable {
  bindings: Vec<Binding>,
}

impl BindingTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn bind<C: Command + 'static>(&mut self, trigger: Trigger, kind: BindingKind, command: C) -> &mut Self {
    self.bind_ref(trigger, kind, command_ref(command))
  }

  pub fn bind_ref(&mut self, trigger: Trigger, kind: BindingKind, command: CommandRef) -> &mut Self {
    self.bindings.push(Binding::new(trigger, kind, command));
    self
  }

  pub fn on_true<C: Command + 'static>(&mut self, trigger: Trigger, command: C) -> &mut Self {
    self.bind(trigger, BindingKind::OnTrue, command)
  }

  pub fn on_false<C: Command + 'static>(&mut self, trigger: Trigger, command: C) -> &mut Self {
    self.bind(trigger, BindingKind::OnFalse, command)
  }

  pub fn while_true<C: Command + 'static>(&mut self, trigger: Trigger, command: C) -> &mut Self {
    self.bind(trigger, BindingKind::WhileTrue, command)
  }

  pub fn while_false<C: Command + 'static>(&mut self, trigger: Trigger, command: C) -> &mut Self {
    self.bind(trigger, BindingKind::WhileFalse, command)
  }

  pub fn toggle_on_true<C: Command + 'static>(&mut self, trigger: Trigger, command: C) -> &mut Self {
    self.bind(trigger, BindingKind::ToggleOnTrue, command)
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Binding> {
    self.bindings.iter()
  }

  pub(crate) fn into_bindings(self) -> Vec<Binding> {
    self.bindings
  }
}
