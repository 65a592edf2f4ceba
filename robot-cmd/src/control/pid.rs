use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::dashboard::{Dashboard, GenericPublisher};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PIDConfig {
  pub kp: f64,
  pub ki: f64,
  pub kd: f64,
  /// Errors outside +/- izone do not accumulate into the integral.
  #[serde(default)]
  pub izone: Option<f64>,
}

#[derive(Default, Debug, Clone)]
pub struct PIDMeasurement {
  pub time: f64,
  pub setpoint: f64,
  pub process_variable: f64,
  pub error: f64,
  pub derivative: f64,
  pub integral_sum: f64,
  pub output: f64,
  pub output_parts: [f64; 3],
}

#[derive(Clone, Debug)]
pub struct PID {
  config: PIDConfig,
  history_time: f64,
  history: VecDeque<PIDMeasurement>,
  setpoint: f64,
}

impl PID {
  pub fn new(config: PIDConfig, setpoint: f64, history: f64) -> Self {
    Self {
      config,
      setpoint,
      history_time: history,
      history: VecDeque::new(),
    }
  }

  pub fn config(&self) -> &PIDConfig {
    &self.config
  }

  pub fn last(&self) -> Option<&PIDMeasurement> {
    self.history.back()
  }

  pub fn reset(&mut self) {
    self.history.clear();
  }

  /// Zeroes the accumulated integral while keeping the derivative history intact.
  pub fn reset_integral(&mut self) {
    for measurement in self.history.iter_mut() {
      measurement.integral_sum = 0.0;
    }
  }

  pub fn set_setpoint(&mut self, setpoint: f64) {
    self.setpoint = setpoint;
  }

  pub fn get_setpoint(&self) -> f64 {
    self.setpoint
  }

  pub fn calculate(&mut self, pv: f64, time: f64) -> f64 {
    let error = self.setpoint - pv;

    let measurement = match self.last() {
      Some(last) if time > last.time => {
        let dt = time - last.time;
        let derivative = (error - last.error) / dt;
        let integral = match self.config.izone {
          Some(izone) if error.abs() > izone => 0.0,
          _ => error * dt,
        };

        let integral_sum = last.integral_sum + integral;

        let parts = [
          self.config.kp * error,
          self.config.ki * integral_sum,
          self.config.kd * derivative,
        ];
        PIDMeasurement {
          time,
          setpoint: self.setpoint,
          process_variable: pv,
          error,
          derivative,
          integral_sum,
          output: parts.iter().sum(),
          output_parts: parts,
        }
      },
      Some(last) => {
        let parts = [self.config.kp * error, self.config.ki * last.integral_sum, 0.0];
        PIDMeasurement {
          time,
          setpoint: self.setpoint,
          process_variable: pv,
          error,
          derivative: 0.0,
          integral_sum: last.integral_sum,
          output: parts.iter().sum(),
          output_parts: parts,
        }
      },
      None => PIDMeasurement {
        time,
        setpoint: self.setpoint,
        process_variable: pv,
        error,
        derivative: 0.0,
        integral_sum: 0.0,
        output: self.config.kp * error,
        output_parts: [self.config.kp * error, 0.0, 0.0],
      },
    };

    // Evict old history
    while self.history.front().map(|x| (time - x.time) >= self.history_time).unwrap_or(false) {
      self.history.pop_front();
    }

    let output = measurement.output;
    self.history.push_back(measurement);
    output
  }

  pub fn is_stable(&self, error_threshold: f64, derivative_thresh: Option<f64>) -> bool {
    if self.history.is_empty() {
      return false;
    }

    let mut setpoint_error = 0.0;
    let mut error_total = 0.0;
    let mut deriv_total = 0.0;

    for measurement in self.history.iter() {
      setpoint_error = self.setpoint - measurement.setpoint;
      error_total += measurement.error * measurement.error;
      deriv_total += measurement.derivative * measurement.derivative;
    }

    let setpoint_ok = setpoint_error.abs() < error_threshold;
    let error_ok = error_total.sqrt() < error_threshold;

    match derivative_thresh {
      Some(d_thresh) => setpoint_ok && error_ok && deriv_total.sqrt() < d_thresh,
      None => setpoint_ok && error_ok,
    }
  }

  /// Publishes the latest measurement under `{path}/pid`.
  pub fn publish(&self, dashboard: &Dashboard, path: &str) {
    let base = format!("{}/pid", path);
    let last = self.last().cloned().unwrap_or_default();

    dashboard.topic(&format!("{}/setpoint", base)).publish::<f64>().set(last.setpoint);
    dashboard.topic(&format!("{}/process_variable", base)).publish::<f64>().set(last.process_variable);
    dashboard.topic(&format!("{}/error", base)).publish::<f64>().set(last.error);
    dashboard.topic(&format!("{}/integral_sum", base)).publish::<f64>().set(last.integral_sum);
    dashboard.topic(&format!("{}/output", base)).publish::<f64>().set(last.output);
    dashboard.topic(&format!("{}/output_parts", base)).publish::<Vec<f64>>().set(last.output_parts.to_vec());
  }
}
