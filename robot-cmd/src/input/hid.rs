use std::{cell::RefCell, rc::Rc};

pub trait HIDDevice {
  /// Buttons are 1-indexed, matching the driver station.
  fn button(&self, index: usize) -> bool;
  fn axis(&self, index: usize) -> f64;
  /// Angle in degrees, or -1 when the hat is centred.
  fn pov(&self, index: usize) -> isize;

  fn n_buttons(&self) -> usize;
  fn n_axes(&self) -> usize;
  fn n_pov(&self) -> usize;

  fn port(&self) -> usize;
  fn name(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
struct HIDState {
  buttons: Vec<bool>,
  axes: Vec<f64>,
  povs: Vec<isize>,
}

/// A controller whose inputs are set by the simulation harness (or a test). Clones share
/// state, so a test can hold one clone and press buttons the robot sees through another.
#[derive(Debug, Clone)]
pub struct SimHID {
  port: usize,
  name: String,
  state: Rc<RefCell<HIDState>>,
}

impl SimHID {
  pub fn new(port: usize, name: &str, n_buttons: usize, n_axes: usize, n_pov: usize) -> Self {
    Self {
      port,
      name: name.to_owned(),
      state: Rc::new(RefCell::new(HIDState {
        buttons: vec![false; n_buttons],
        axes: vec![0.0; n_axes],
        povs: vec![-1; n_pov],
      })),
    }
  }

  pub fn set_button(&self, index: usize, value: bool) {
    let mut state = self.state.borrow_mut();
    if let Some(b) = index.checked_sub(1).and_then(|i| state.buttons.get_mut(i)) {
      *b = value;
    }
  }

  pub fn set_axis(&self, index: usize, value: f64) {
    if let Some(a) = self.state.borrow_mut().axes.get_mut(index) {
      *a = value.clamp(-1.0, 1.0);
    }
  }

  pub fn set_pov(&self, index: usize, value: isize) {
    if let Some(p) = self.state.borrow_mut().povs.get_mut(index) {
      *p = value;
    }
  }

  /// Releases every button, centres every axis and hat.
  pub fn reset(&self) {
    let mut state = self.state.borrow_mut();
    state.buttons.iter_mut().for_each(|b| *b = false);
    state.axes.iter_mut().for_each(|a| *a = 0.0);
    state.povs.iter_mut().for_each(|p| *p = -1);
  }
}

impl HIDDevice for SimHID {
  fn button(&self, index: usize) -> bool {
    index.checked_sub(1).and_then(|i| self.state.borrow().buttons.get(i).copied()).unwrap_or(false)
  }

  fn axis(&self, index: usize) -> f64 {
    self.state.borrow().axes.get(index).copied().unwrap_or(0.0)
  }

  fn pov(&self, index: usize) -> isize {
    self.state.borrow().povs.get(index).copied().unwrap_or(-1)
  }

  fn n_buttons(&self) -> usize {
    self.state.borrow().buttons.len()
  }

  fn n_axes(&self) -> usize {
    self.state.borrow().axes.len()
  }

  fn n_pov(&self) -> usize {
    self.state.borrow().povs.len()
  }

  fn port(&self) -> usize {
    self.port
  }

  fn name(&self) -> Option<String> {
    Some(self.name.clone())
  }
}

/// Scales a stick reading so the output is zero inside +/- `deadband` and still reaches
/// +/- 1 at full deflection.
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
  if value.abs() < deadband {
    0.0
  } else {
    value.signum() * (value.abs() - deadband) / (1.0 - deadband)
  }
}
