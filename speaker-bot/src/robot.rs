use log::info;
use robot_cmd::{
  ds::{ControlMode, RobotControlState},
  prelude::*,
  units::Time,
};

use crate::container::RobotContainer;

/// Mode handling around the container, the way the driver station sees the robot.
pub struct Robot {
  pub container: RobotContainer,
  mode: Option<ControlMode>,
  auto_command: Option<CommandRef>,
}

impl Robot {
  pub fn new(container: RobotContainer) -> Self {
    Self { container, mode: None, auto_command: None }
  }

  pub fn mode(&self) -> Option<ControlMode> {
    self.mode
  }

  /// One control cycle at `now`.
  pub fn tick(&mut self, state: &RobotControlState, now: Time) -> Result<(), CommandError> {
    let enabled = state.enabled && !state.estopped;
    let mode = if enabled { state.mode } else { ControlMode::Disabled };

    self.container.scheduler.set_enabled(enabled);
    if self.mode != Some(mode) {
      info!("Mode {} -> {}", self.mode.map(|m| m.to_string()).unwrap_or_else(|| "startup".to_owned()), mode);
      self.mode = Some(mode);
      self.transition(mode)?;
    }

    if mode == ControlMode::Disabled {
      self.container.disabled_actions();
    }

    self.container.scheduler.run(now);
    self.container.telemetry();
    Ok(())
  }

  fn transition(&mut self, mode: ControlMode) -> Result<(), CommandError> {
    match mode {
      ControlMode::Disabled => self.container.disabled_init(),
      ControlMode::Autonomous => {
        if let Some(command) = self.container.autonomous_command()? {
          let command = command.into_ref();
          self.container.scheduler.schedule(&command);
          self.auto_command = Some(command);
        }
      },
      ControlMode::Teleop => {
        if let Some(command) = self.auto_command.take() {
          self.container.scheduler.cancel(&command);
        }
        self.container.teleop_init();
      },
      ControlMode::Test => self.container.scheduler.cancel_all(),
    }
    Ok(())
  }
}
