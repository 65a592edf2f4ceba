use std::{cell::RefCell, collections::{HashMap, VecDeque}, rc::Rc};

use log::{debug, info, warn};

use crate::{
  command::{command_ref, same_command, Command, CommandRef, InterruptionBehavior, Requirements},
  error::CommandError,
  subsystem::{Handle, Subsystem, SubsystemId},
  trigger::{Binding, BindingAction, BindingTable},
  units::{second, Time},
};

struct RegisteredSubsystem {
  id: SubsystemId,
  subsystem: Rc<RefCell<dyn Subsystem>>,
  default_command: Option<CommandRef>,
}

struct ScheduledCommand {
  command: CommandRef,
  name: String,
}

enum SchedulerRequest {
  Schedule(CommandRef),
  Fallback(CommandRef),
  Cancel(CommandRef),
}

/// Lets commands (and the closures they carry) ask for scheduling changes. Requests are
/// applied after every scheduled command has executed for the tick.
#[derive(Clone)]
pub struct SchedulerHandle {
  requests: Rc<RefCell<VecDeque<SchedulerRequest>>>,
}

impl SchedulerHandle {
  pub fn schedule(&self, command: &CommandRef) {
    self.requests.borrow_mut().push_back(SchedulerRequest::Schedule(command.clone()));
  }

  pub fn schedule_command<C: Command + 'static>(&self, command: C) -> CommandRef {
    let command = command_ref(command);
    self.schedule(&command);
    command
  }

  /// Schedules a command unless one of its subsystems has been claimed, since the request
  /// was made, by something other than that subsystem's default command.
  pub fn schedule_fallback<C: Command + 'static>(&self, command: C) {
    self.requests.borrow_mut().push_back(SchedulerRequest::Fallback(command_ref(command)));
  }

  pub fn cancel(&self, command: &CommandRef) {
    self.requests.borrow_mut().push_back(SchedulerRequest::Cancel(command.clone()));
  }

  pub fn pending(&self) -> usize {
    self.requests.borrow().len()
  }
}

/// Cooperative, single threaded command scheduler.
///
/// Each call to [`run`](Self::run) is one tick:
/// 1. every registered subsystem's `periodic`, in registration order
/// 2. while disabled, cancel commands that do not run when disabled
/// 3. poll bindings and apply their schedule/cancel/toggle actions
/// 4. execute scheduled commands in scheduling order, ending those that finish
/// 5. apply requests queued through [`SchedulerHandle`]
/// 6. schedule the default command of every subsystem nothing holds
///
/// The requirement map is the only arbiter of exclusion: each subsystem is held by at most
/// one command, and scheduling a command first ends whatever holds its subsystems.
pub struct CommandScheduler {
  subsystems: Vec<RegisteredSubsystem>,
  scheduled: Vec<ScheduledCommand>,
  requirements: HashMap<SubsystemId, CommandRef>,
  bindings: Vec<Binding>,
  requests: Rc<RefCell<VecDeque<SchedulerRequest>>>,
  enabled: bool,
  now: Time,
}

impl CommandScheduler {
  pub fn new() -> Self {
    Self {
      subsystems: vec![],
      scheduled: vec![],
      requirements: HashMap::new(),
      bindings: vec![],
      requests: Rc::new(RefCell::new(VecDeque::new())),
      enabled: false,
      now: 0.0 * second,
    }
  }

  pub fn handle(&self) -> SchedulerHandle {
    SchedulerHandle { requests: self.requests.clone() }
  }

  pub fn now(&self) -> Time {
    self.now
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  pub fn set_enabled(&mut self, enabled: bool) {
    if enabled != self.enabled {
      info!("Scheduler {}", if enabled { "enabled" } else { "disabled" });
    }
    self.enabled = enabled;
  }

  pub fn register_subsystem<T: Subsystem + 'static>(&mut self, handle: &Handle<T>) -> Result<(), CommandError> {
    if self.is_registered(handle.id()) {
      return Err(CommandError::DuplicateSubsystem(handle.id()));
    }
    let subsystem: Rc<RefCell<dyn Subsystem>> = handle.shared();
    self.subsystems.push(RegisteredSubsystem { id: handle.id(), subsystem, default_command: None });
    debug!("Registered subsystem {}", handle.id());
    Ok(())
  }

  pub fn is_registered(&self, id: SubsystemId) -> bool {
    self.subsystems.iter().any(|s| s.id == id)
  }

  pub fn subsystem_ids(&self) -> Vec<SubsystemId> {
    self.subsystems.iter().map(|s| s.id).collect()
  }

  pub fn set_default_command<C: Command + 'static>(&mut self, id: SubsystemId, command: C) -> Result<CommandRef, CommandError> {
    let command = command_ref(command);
    self.set_default_command_ref(id, command.clone())?;
    Ok(command)
  }

  pub fn set_default_command_ref(&mut self, id: SubsystemId, command: CommandRef) -> Result<(), CommandError> {
    let (name, requirements) = {
      let c = command.borrow();
      c.validate()?;
      (c.name(), c.requirements())
    };

    if !requirements.contains(id) {
      return Err(CommandError::DefaultCommandMissingRequirement { command: name, subsystem: id });
    }
    self.check_registered(&name, &requirements)?;

    match self.subsystems.iter_mut().find(|s| s.id == id) {
      Some(s) => s.default_command = Some(command),
      None => return Err(CommandError::UnregisteredSubsystem { command: name, subsystem: id }),
    }
    Ok(())
  }

  pub fn default_command(&self, id: SubsystemId) -> Option<CommandRef> {
    self.subsystems.iter().find(|s| s.id == id).and_then(|s| s.default_command.clone())
  }

  fn check_registered(&self, name: &str, requirements: &Requirements) -> Result<(), CommandError> {
    match requirements.iter().copied().find(|&r| !self.is_registered(r)) {
      Some(missing) => Err(CommandError::UnregisteredSubsystem { command: name.to_owned(), subsystem: missing }),
      None => Ok(()),
    }
  }

  /// Installs a binding table. Every bound command is validated, and two bindings that
  /// would start commands on the same edge of the same trigger must not share a subsystem.
  pub fn install_bindings(&mut self, table: BindingTable) -> Result<(), CommandError> {
    let mut bindings = table.into_bindings();

    for binding in &bindings {
      let c = binding.command.borrow();
      c.validate()?;
      self.check_registered(&c.name(), &c.requirements())?;
    }

    for (i, a) in bindings.iter().enumerate() {
      for b in bindings[i + 1..].iter().chain(self.bindings.iter()) {
        if a.trigger.name() != b.trigger.name() || a.kind.scheduling_edge() != b.kind.scheduling_edge() {
          continue;
        }
        let ra = a.command.borrow().requirements();
        let rb = b.command.borrow().requirements();
        if let Some(&subsystem) = ra.intersection(&rb).next() {
          return Err(CommandError::ConflictingBindings {
            trigger: a.trigger.name().to_owned(),
            first: a.command.borrow().name(),
            second: b.command.borrow().name(),
            subsystem,
          });
        }
      }
    }

    for binding in bindings.iter_mut() {
      binding.prime();
    }
    info!("Installed {} bindings", bindings.len());
    self.bindings.extend(bindings);
    Ok(())
  }

  pub fn is_scheduled(&self, command: &CommandRef) -> bool {
    self.scheduled.iter().any(|s| same_command(&s.command, command))
  }

  pub fn requiring(&self, id: SubsystemId) -> Option<CommandRef> {
    self.requirements.get(id).cloned()
  }

  pub fn scheduled_names(&self) -> Vec<String> {
    self.scheduled.iter().map(|s| s.name.clone()).collect()
  }

  /// Schedules a command, initializing it straight away. Returns false if the command was
  /// refused: already running, disabled, or one of its subsystems is held by a command that
  /// cannot be interrupted.
  pub fn schedule(&mut self, command: &CommandRef) -> bool {
    if self.is_scheduled(command) {
      return false;
    }

    let (name, requirements, runs_when_disabled) = {
      let c = command.borrow();
      (c.name(), c.requirements(), c.runs_when_disabled())
    };

    if !self.enabled && !runs_when_disabled {
      debug!("Not scheduling {} while disabled", name);
      return false;
    }

    let mut holders: Vec<CommandRef> = vec![];
    for req in &requirements {
      if let Some(holder) = self.requirements.get(req) {
        if !holders.iter().any(|h| same_command(h, holder)) {
          holders.push(holder.clone());
        }
      }
    }

    for holder in &holders {
      let h = holder.borrow();
      if h.interruption_behavior() == InterruptionBehavior::CancelIncoming {
        warn!("Refusing {}: {} holds its subsystems and cannot be interrupted", name, h.name());
        return false;
      }
    }

    for holder in &holders {
      self.end_command(holder, true);
    }

    for &req in &requirements {
      self.requirements.insert(req, command.clone());
    }
    self.scheduled.push(ScheduledCommand { command: command.clone(), name: name.clone() });
    debug!("Scheduled {}", name);

    command.borrow_mut().initialize(self.now);
    true
  }

  pub fn schedule_command<C: Command + 'static>(&mut self, command: C) -> Option<CommandRef> {
    let command = command_ref(command);
    self.schedule(&command).then_some(command)
  }

  pub fn cancel(&mut self, command: &CommandRef) {
    if self.is_scheduled(command) {
      self.end_command(command, true);
    }
  }

  pub fn cancel_all(&mut self) {
    let all: Vec<CommandRef> = self.scheduled.iter().map(|s| s.command.clone()).collect();
    for command in all {
      self.cancel(&command);
    }
  }

  fn end_command(&mut self, command: &CommandRef, interrupted: bool) {
    let Some(index) = self.scheduled.iter().position(|s| same_command(&s.command, command)) else { return };
    let entry = self.scheduled.remove(index);
    self.requirements.retain(|_, holder| !same_command(holder, command));

    if interrupted {
      debug!("Interrupted {}", entry.name);
    } else {
      debug!("Finished {}", entry.name);
    }
    command.borrow_mut().end(interrupted);
  }

  fn fallback_allowed(&self, command: &CommandRef) -> bool {
    command.borrow().requirements().into_iter().all(|req| match self.requirements.get(req) {
      None => true,
      Some(holder) => self.default_command(req).map(|d| same_command(&d, holder)).unwrap_or(false),
    })
  }

  fn apply_requests(&mut self) {
    loop {
      let request = self.requests.borrow_mut().pop_front();
      match request {
        None => break,
        Some(SchedulerRequest::Schedule(command)) => {
          self.schedule(&command);
        },
        Some(SchedulerRequest::Fallback(command)) => {
          if self.fallback_allowed(&command) {
            self.schedule(&command);
          } else {
            debug!("Skipping fallback {}: its subsystems were claimed", command.borrow().name());
          }
        },
        Some(SchedulerRequest::Cancel(command)) => self.cancel(&command),
      }
    }
  }

  /// Runs one tick at time `now`.
  pub fn run(&mut self, now: Time) {
    self.now = now;

    for s in &self.subsystems {
      s.subsystem.borrow_mut().periodic(now);
    }

    if !self.enabled {
      let to_cancel: Vec<CommandRef> = self.scheduled
        .iter()
        .filter(|s| !s.command.borrow().runs_when_disabled())
        .map(|s| s.command.clone())
        .collect();
      for command in to_cancel {
        self.end_command(&command, true);
      }
    }

    let mut bindings = std::mem::take(&mut self.bindings);
    for binding in bindings.iter_mut() {
      match binding.poll() {
        Some(BindingAction::Schedule) => { self.schedule(&binding.command); },
        Some(BindingAction::Cancel) => self.cancel(&binding.command),
        Some(BindingAction::Toggle) => {
          if self.is_scheduled(&binding.command) {
            self.cancel(&binding.command)
          } else {
            self.schedule(&binding.command);
          }
        },
        None => (),
      }
    }
    self.bindings = bindings;

    let snapshot: Vec<CommandRef> = self.scheduled.iter().map(|s| s.command.clone()).collect();
    for command in snapshot {
      if !self.is_scheduled(&command) {
        continue;
      }
      let finished = {
        let mut c = command.borrow_mut();
        c.execute(now);
        c.is_finished()
      };
      if finished {
        self.end_command(&command, false);
      }
    }

    self.apply_requests();

    let defaults: Vec<CommandRef> = self.subsystems
      .iter()
      .filter(|s| !self.requirements.contains_key(s.id))
      .filter_map(|s| s.default_command.clone())
      .collect();
    for command in defaults {
      self.schedule(&command);
    }
  }
}

impl Default for CommandScheduler {
  fn default() -> Self {
    Self::new()
  }
}
