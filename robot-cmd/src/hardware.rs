//! Simulated motor controllers and sensors, plus the flash store motor tunables are burned
//! into. Devices are plain values owned by their subsystem and stepped from its `periodic`.

use std::{
  cell::{Cell, RefCell},
  collections::HashMap,
  fs,
  path::PathBuf,
  rc::Rc,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  control::pid::{PIDConfig, PID},
  units::{QuantityBase, Time},
};

#[derive(Debug, Error)]
pub enum HardwareError {
  #[error("flash I/O failed: {0}")]
  Io(#[from] std::io::Error),
  #[error("flash contents could not be (de)serialised: {0}")]
  Serialisation(#[from] serde_json::Error),
}

fn default_max_output() -> f64 { 1.0 }
fn default_min_output() -> f64 { -1.0 }

/// Tunables of a motor controller. These are what `burn_to_flash` persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorParams {
  pub pid: PIDConfig,
  /// Velocity feed-forward, output per native unit/s of setpoint.
  #[serde(default)]
  pub kf: f64,
  /// Native units/s at full output.
  pub free_speed: f64,
  /// Time constant of the simulated plant's velocity response. Zero responds instantly.
  #[serde(default)]
  pub time_constant: f64,
  #[serde(default = "default_max_output")]
  pub max_output: f64,
  #[serde(default = "default_min_output")]
  pub min_output: f64,
}

pub trait FlashStore {
  fn load(&self, device: &str) -> Result<Option<MotorParams>, HardwareError>;
  fn store(&self, device: &str, params: &MotorParams) -> Result<(), HardwareError>;
}

/// Stores each device as `{dir}/{device}.json`.
#[derive(Debug, Clone)]
pub struct FileFlash {
  dir: PathBuf,
}

impl FileFlash {
  pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
    Self { dir: dir.into() }
  }

  fn path(&self, device: &str) -> PathBuf {
    self.dir.join(format!("{}.json", device))
  }
}

impl FlashStore for FileFlash {
  fn load(&self, device: &str) -> Result<Option<MotorParams>, HardwareError> {
    let path = self.path(device);
    if !path.exists() {
      return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
  }

  fn store(&self, device: &str, params: &MotorParams) -> Result<(), HardwareError> {
    fs::create_dir_all(&self.dir)?;
    fs::write(self.path(device), serde_json::to_string_pretty(params)?)?;
    Ok(())
  }
}

#[derive(Debug, Default)]
pub struct MemoryFlash {
  devices: RefCell<HashMap<String, MotorParams>>,
  writes: Cell<usize>,
}

impl MemoryFlash {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn writes(&self) -> usize {
    self.writes.get()
  }

  pub fn devices(&self) -> Vec<String> {
    let mut names: Vec<String> = self.devices.borrow().keys().cloned().collect();
    names.sort();
    names
  }
}

impl FlashStore for MemoryFlash {
  fn load(&self, device: &str) -> Result<Option<MotorParams>, HardwareError> {
    Ok(self.devices.borrow().get(device).cloned())
  }

  fn store(&self, device: &str, params: &MotorParams) -> Result<(), HardwareError> {
    self.devices.borrow_mut().insert(device.to_owned(), params.clone());
    self.writes.set(self.writes.get() + 1);
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorControl {
  Neutral,
  Percent(f64),
  Position(f64),
  Velocity(f64),
}

/// A closed-loop motor controller and the mechanism it drives, in native units.
pub struct SimMotor {
  device: String,
  params: MotorParams,
  pid: PID,
  flash: Rc<dyn FlashStore>,
  control: MotorControl,
  position: f64,
  velocity: f64,
  output: f64,
  last_update: Option<Time>,
}

impl SimMotor {
  /// Creates the controller, taking burned parameters over `defaults` when the flash has any.
  pub fn new(device: &str, defaults: MotorParams, flash: Rc<dyn FlashStore>) -> Result<Self, HardwareError> {
    let params = match flash.load(device)? {
      Some(burned) => {
        info!("{}: loaded parameters from flash", device);
        burned
      },
      None => defaults,
    };

    Ok(Self {
      device: device.to_owned(),
      pid: PID::new(params.pid.clone(), 0.0, 0.5),
      params,
      flash,
      control: MotorControl::Neutral,
      position: 0.0,
      velocity: 0.0,
      output: 0.0,
      last_update: None,
    })
  }

  pub fn device(&self) -> &str {
    &self.device
  }

  pub fn params(&self) -> &MotorParams {
    &self.params
  }

  pub fn set_params(&mut self, params: MotorParams) {
    self.pid = PID::new(params.pid.clone(), self.pid.get_setpoint(), 0.5);
    self.params = params;
  }

  pub fn set(&mut self, control: MotorControl) {
    self.control = control;
  }

  pub fn control(&self) -> MotorControl {
    self.control
  }

  pub fn position(&self) -> f64 {
    self.position
  }

  /// Re-zeroes the encoder.
  pub fn set_position(&mut self, position: f64) {
    self.position = position;
  }

  pub fn velocity(&self) -> f64 {
    self.velocity
  }

  pub fn output(&self) -> f64 {
    self.output
  }

  pub fn pid(&self) -> &PID {
    &self.pid
  }

  pub fn update(&mut self, now: Time) {
    let t = now.to_base();
    let dt = match self.last_update.replace(now) {
      Some(last) => (now - last).to_base(),
      None => return,
    };
    if dt <= 0.0 {
      return;
    }

    let demand = match self.control {
      MotorControl::Neutral => 0.0,
      MotorControl::Percent(p) => p,
      MotorControl::Position(target) => {
        self.pid.set_setpoint(target);
        self.pid.calculate(self.position, t)
      },
      MotorControl::Velocity(target) => {
        self.pid.set_setpoint(target);
        self.params.kf * target + self.pid.calculate(self.velocity, t)
      },
    };
    self.output = demand.clamp(self.params.min_output, self.params.max_output);

    let target_velocity = self.output * self.params.free_speed;
    let alpha = if self.params.time_constant > 0.0 {
      1.0 - (-dt / self.params.time_constant).exp()
    } else {
      1.0
    };
    self.velocity += (target_velocity - self.velocity) * alpha;
    self.position += self.velocity * dt;
  }

  pub fn reset_integral(&mut self) {
    self.pid.reset_integral();
  }

  pub fn burn_to_flash(&mut self) -> Result<(), HardwareError> {
    debug!("{}: burning parameters", self.device);
    self.flash.store(&self.device, &self.params)
  }
}

impl std::fmt::Debug for SimMotor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SimMotor")
      .field("device", &self.device)
      .field("control", &self.control)
      .field("position", &self.position)
      .field("velocity", &self.velocity)
      .finish()
  }
}

/// A digital input (beam break, limit switch). Clones share the same line, so the simulation
/// can drive the value the subsystem reads.
#[derive(Debug, Clone, Default)]
pub struct SimDigitalInput {
  value: Rc<Cell<bool>>,
}

impl SimDigitalInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self) -> bool {
    self.value.get()
  }

  pub fn set(&self, value: bool) {
    self.value.set(value)
  }
}
