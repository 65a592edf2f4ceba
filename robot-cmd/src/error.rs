use thiserror::Error;

use crate::subsystem::SubsystemId;

/// Configuration errors. These surface while the robot is being wired together at startup,
/// never while a match is running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
  #[error("{group}: children running at the same time both require {subsystem}")]
  ConflictingRequirements { group: String, subsystem: SubsystemId },

  #[error("{trigger}: {first} and {second} fire on the same edge and both require {subsystem}")]
  ConflictingBindings { trigger: String, first: String, second: String, subsystem: SubsystemId },

  #[error("default command {command} for {subsystem} does not require it")]
  DefaultCommandMissingRequirement { command: String, subsystem: SubsystemId },

  #[error("{command} requires {subsystem}, which is not registered")]
  UnregisteredSubsystem { command: String, subsystem: SubsystemId },

  #[error("subsystem {0} is registered twice")]
  DuplicateSubsystem(SubsystemId),

  #[error("no named command called {0}")]
  UnknownNamedCommand(String),

  #[error("no dashboard command called {0}")]
  UnknownDashboardCommand(String),

  #[error("auto {auto}: {kind} commands are not supported")]
  UnsupportedAutoCommand { auto: String, kind: String },

  #[error("auto {path} could not be read: {reason}")]
  MalformedAuto { path: String, reason: String },
}
