extern crate self as robot_cmd;

pub use robot_cmd_macros as macros;
pub use robot_cmd_units as units;

pub mod auto;
pub mod command;
pub mod control;
pub mod dashboard;
pub mod ds;
pub mod error;
pub mod geometry;
pub mod hardware;
pub mod input;
pub mod scheduler;
pub mod start;
pub mod subsystem;
pub mod time;
pub mod trigger;

pub mod prelude {
  pub use crate::command::{Command, CommandExt, CommandRef, InterruptionBehavior, Requirements};
  pub use crate::error::CommandError;
  pub use crate::scheduler::{CommandScheduler, SchedulerHandle};
  pub use crate::subsystem::{Handle, NamedSubsystem, Setpoint, Subsystem, SubsystemId};
  pub use crate::trigger::{BindingTable, Trigger};
  pub use crate::macros::NamedSubsystem;
  pub use crate::{parallel, race, sequence, deadline};
}
