use std::{fs, path::{Path, PathBuf}};

use anyhow::Context;
use robot_cmd::units::{millisecond, Time};
use serde::{Deserialize, Serialize};

use crate::constants::operators;

fn default_period_ms() -> f64 { 20.0 }
fn default_driver_port() -> usize { operators::DRIVER }
fn default_operator_port() -> usize { operators::OPERATOR }
fn default_autos_dir() -> PathBuf { PathBuf::from("deploy/autos") }
fn default_led_count() -> usize { 60 }

/// Runtime configuration, read from an optional JSON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
  #[serde(default = "default_period_ms")]
  pub period_ms: f64,
  #[serde(default = "default_driver_port")]
  pub driver_port: usize,
  #[serde(default = "default_operator_port")]
  pub operator_port: usize,
  #[serde(default = "default_autos_dir")]
  pub autos_dir: PathBuf,
  /// Where burned motor parameters live. Without one, flash is kept in memory.
  #[serde(default)]
  pub flash_dir: Option<PathBuf>,
  #[serde(default = "default_led_count")]
  pub led_count: usize,
}

impl Default for RobotConfig {
  fn default() -> Self {
    Self {
      period_ms: default_period_ms(),
      driver_port: default_driver_port(),
      operator_port: default_operator_port(),
      autos_dir: default_autos_dir(),
      flash_dir: None,
      led_count: default_led_count(),
    }
  }
}

impl RobotConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
  }

  pub fn period(&self) -> Time {
    self.period_ms * millisecond
  }
}
