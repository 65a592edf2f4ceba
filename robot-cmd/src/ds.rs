use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{time::has_elapsed, units::Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
  Autonomous,
  Teleop,
  Test,
  #[default]
  Disabled,
}

#[derive(Debug, Clone, Default)]
pub struct RobotControlState {
  pub mode: ControlMode,
  pub enabled: bool,
  pub estopped: bool,
  pub ds_attached: bool,
  pub fms_attached: bool,
}

impl RobotControlState {
  pub fn disabled() -> Self {
    Self { ds_attached: true, ..Default::default() }
  }

  pub fn enabled(mode: ControlMode) -> Self {
    Self { mode, enabled: mode != ControlMode::Disabled, ds_attached: true, ..Default::default() }
  }
}

/// A simulated driver station: the robot sits disabled, then runs autonomous, then teleop.
#[derive(Debug, Clone, Copy)]
pub struct MatchScript {
  pub disabled: Time,
  pub autonomous: Time,
  pub teleop: Time,
}

impl MatchScript {
  pub fn new(disabled: Time, autonomous: Time, teleop: Time) -> Self {
    Self { disabled, autonomous, teleop }
  }

  pub fn length(&self) -> Time {
    self.disabled + self.autonomous + self.teleop
  }

  /// Control state `elapsed` into the match, or `None` once the match is over.
  pub fn state_at(&self, elapsed: Time) -> Option<RobotControlState> {
    if !has_elapsed(elapsed, self.disabled) {
      Some(RobotControlState::disabled())
    } else if !has_elapsed(elapsed, self.disabled + self.autonomous) {
      Some(RobotControlState::enabled(ControlMode::Autonomous))
    } else if !has_elapsed(elapsed, self.length()) {
      Some(RobotControlState::enabled(ControlMode::Teleop))
    } else {
      None
    }
  }
}
