use crate::{error::CommandError, units::Time};

use super::{Command, InterruptionBehavior, Requirements};

fn union<'a, I: Iterator<Item = &'a Box<dyn Command>>>(children: I) -> Requirements {
  children.flat_map(|c| c.requirements()).collect()
}

fn all_run_when_disabled<'a, I: Iterator<Item = &'a Box<dyn Command>>>(mut children: I) -> bool {
  children.all(|c| c.runs_when_disabled())
}

fn interruption<'a, I: Iterator<Item = &'a Box<dyn Command>>>(mut children: I) -> InterruptionBehavior {
  if children.any(|c| c.interruption_behavior() == InterruptionBehavior::CancelIncoming) {
    InterruptionBehavior::CancelIncoming
  } else {
    InterruptionBehavior::CancelSelf
  }
}

/// Validates each child, then checks no two of them (which will run at the same time) share
/// a subsystem.
fn validate_concurrent<'a, I: Iterator<Item = &'a Box<dyn Command>>>(group: &str, children: I) -> Result<(), CommandError> {
  let mut seen = Requirements::new();
  for child in children {
    child.validate()?;
    for req in child.requirements() {
      if !seen.insert(req) {
        return Err(CommandError::ConflictingRequirements { group: group.to_owned(), subsystem: req });
      }
    }
  }
  Ok(())
}

/// Runs its children one after another. The next child is initialized in the same tick
/// the previous one finishes.
pub struct SequentialGroup {
  commands: Vec<Box<dyn Command>>,
  current: usize,
}

impl SequentialGroup {
  pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
    let current = commands.len();
    Self { commands, current }
  }
}

impl Command for SequentialGroup {
  fn initialize(&mut self, now: Time) {
    self.current = 0;
    if let Some(first) = self.commands.first_mut() {
      first.initialize(now);
    }
  }

  fn execute(&mut self, now: Time) {
    let Some(command) = self.commands.get_mut(self.current) else { return };

    command.execute(now);
    if command.is_finished() {
      command.end(false);
      self.current += 1;
      if let Some(next) = self.commands.get_mut(self.current) {
        next.initialize(now);
      }
    }
  }

  fn is_finished(&self) -> bool {
    self.current >= self.commands.len()
  }

  fn end(&mut self, interrupted: bool) {
    if interrupted {
      if let Some(command) = self.commands.get_mut(self.current) {
        command.end(true);
      }
    }
    self.current = self.commands.len();
  }

  fn requirements(&self) -> Requirements {
    union(self.commands.iter())
  }

  fn name(&self) -> String {
    "SequentialGroup".into()
  }

  fn runs_when_disabled(&self) -> bool {
    all_run_when_disabled(self.commands.iter())
  }

  fn interruption_behavior(&self) -> InterruptionBehavior {
    interruption(self.commands.iter())
  }

  fn validate(&self) -> Result<(), CommandError> {
    self.commands.iter().try_for_each(|c| c.validate())
  }
}

/// Runs its children together, finishing once every child has finished. A child that
/// finishes early is ended and not executed again.
pub struct ParallelGroup {
  commands: Vec<(Box<dyn Command>, bool)>,
}

impl ParallelGroup {
  pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
    Self { commands: commands.into_iter().map(|c| (c, false)).collect() }
  }
}

impl Command for ParallelGroup {
  fn initialize(&mut self, now: Time) {
    for (command, running) in self.commands.iter_mut() {
      command.initialize(now);
      *running = true;
    }
  }

  fn execute(&mut self, now: Time) {
    for (command, running) in self.commands.iter_mut().filter(|(_, r)| *r) {
      command.execute(now);
      if command.is_finished() {
        command.end(false);
        *running = false;
      }
    }
  }

  fn is_finished(&self) -> bool {
    self.commands.iter().all(|(_, running)| !running)
  }

  fn end(&mut self, interrupted: bool) {
    for (command, running) in self.commands.iter_mut().filter(|(_, r)| *r) {
      command.end(interrupted);
      *running = false;
    }
  }

  fn requirements(&self) -> Requirements {
    union(self.commands.iter().map(|(c, _)| c))
  }

  fn name(&self) -> String {
    "ParallelGroup".into()
  }

  fn runs_when_disabled(&self) -> bool {
    all_run_when_disabled(self.commands.iter().map(|(c, _)| c))
  }

  fn interruption_behavior(&self) -> InterruptionBehavior {
    interruption(self.commands.iter().map(|(c, _)| c))
  }

  fn validate(&self) -> Result<(), CommandError> {
    validate_concurrent(&self.name(), self.commands.iter().map(|(c, _)| c))
  }
}

/// Runs a controlling command with companions and finishes exactly when the controlling
/// command does. Companions still running at that point are ended as interrupted.
pub struct DeadlineGroup {
  deadline: Box<dyn Command>,
  deadline_running: bool,
  companions: Vec<(Box<dyn Command>, bool)>,
}

impl DeadlineGroup {
  pub fn new(deadline: Box<dyn Command>, companions: Vec<Box<dyn Command>>) -> Self {
    Self {
      deadline,
      deadline_running: false,
      companions: companions.into_iter().map(|c| (c, false)).collect()
    }
  }

  fn children(&self) -> impl Iterator<Item = &Box<dyn Command>> {
    std::iter::once(&self.deadline).chain(self.companions.iter().map(|(c, _)| c))
  }
}

impl Command for DeadlineGroup {
  fn initialize(&mut self, now: Time) {
    self.deadline.initialize(now);
    self.deadline_running = true;
    for (command, running) in self.companions.iter_mut() {
      command.initialize(now);
      *running = true;
    }
  }

  fn execute(&mut self, now: Time) {
    if self.deadline_running {
      self.deadline.execute(now);
      if self.deadline.is_finished() {
        self.deadline.end(false);
        self.deadline_running = false;
      }
    }

    for (command, running) in self.companions.iter_mut().filter(|(_, r)| *r) {
      command.execute(now);
      if command.is_finished() {
        command.end(false);
        *running = false;
      }
    }
  }

  fn is_finished(&self) -> bool {
    !self.deadline_running
  }

  fn end(&mut self, _interrupted: bool) {
    if self.deadline_running {
      self.deadline.end(true);
      self.deadline_running = false;
    }
    for (command, running) in self.companions.iter_mut().filter(|(_, r)| *r) {
      command.end(true);
      *running = false;
    }
  }

  fn requirements(&self) -> Requirements {
    union(self.children())
  }

  fn name(&self) -> String {
    "DeadlineGroup".into()
  }

  fn runs_when_disabled(&self) -> bool {
    all_run_when_disabled(self.children())
  }

  fn interruption_behavior(&self) -> InterruptionBehavior {
    interruption(self.children())
  }

  fn validate(&self) -> Result<(), CommandError> {
    validate_concurrent(&self.name(), self.children())
  }
}

/// Runs its children together and finishes as soon as any one of them does.
pub struct RaceGroup {
  commands: Vec<Box<dyn Command>>,
  finished: bool,
}

impl RaceGroup {
  pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
    Self { commands, finished: false }
  }
}

impl Command for RaceGroup {
  fn initialize(&mut self, now: Time) {
    self.finished = false;
    for command in self.commands.iter_mut() {
      command.initialize(now);
    }
  }

  fn execute(&mut self, now: Time) {
    for command in self.commands.iter_mut() {
      command.execute(now);
      if command.is_finished() {
        self.finished = true;
      }
    }
  }

  fn is_finished(&self) -> bool {
    self.finished
  }

  fn end(&mut self, _interrupted: bool) {
    for command in self.commands.iter_mut() {
      let done = command.is_finished();
      command.end(!done);
    }
  }

  fn requirements(&self) -> Requirements {
    union(self.commands.iter())
  }

  fn name(&self) -> String {
    "RaceGroup".into()
  }

  fn runs_when_disabled(&self) -> bool {
    all_run_when_disabled(self.commands.iter())
  }

  fn interruption_behavior(&self) -> InterruptionBehavior {
    interruption(self.commands.iter())
  }

  fn validate(&self) -> Result<(), CommandError> {
    validate_concurrent(&self.name(), self.commands.iter())
  }
}

#[macro_export]
macro_rules! sequence {
  ($($cmd:expr),* $(,)?) => {
    $crate::command::SequentialGroup::new(vec![$($crate::command::CommandExt::boxed($cmd)),*])
  };
}

#[macro_export]
macro_rules! parallel {
  ($($cmd:expr),* $(,)?) => {
    $crate::command::ParallelGroup::new(vec![$($crate::command::CommandExt::boxed($cmd)),*])
  };
}

#[macro_export]
macro_rules! race {
  ($($cmd:expr),* $(,)?) => {
    $crate::command::RaceGroup::new(vec![$($crate::command::CommandExt::boxed($cmd)),*])
  };
}

#[macro_export]
macro_rules! deadline {
  ($deadline:expr $(, $cmd:expr)* $(,)?) => {
    $crate::command::DeadlineGroup::new(
      $crate::command::CommandExt::boxed($deadline),
      vec![$($crate::command::CommandExt::boxed($cmd)),*]
    )
  };
}
