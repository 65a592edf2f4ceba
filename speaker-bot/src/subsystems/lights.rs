use robot_cmd::{prelude::*, units::Time};

use crate::constants::lights::{self, Color};

/// Addressable LED strip, shown in one solid colour.
#[derive(NamedSubsystem)]
pub struct Lights {
  color: Color,
  buffer: Vec<Color>,
}

impl Lights {
  pub fn new(led_count: usize) -> Self {
    Self { color: lights::OFF, buffer: vec![lights::OFF; led_count] }
  }

  pub fn set_color(&mut self, color: Color) {
    self.color = color;
  }

  pub fn color(&self) -> Color {
    self.color
  }

  pub fn buffer(&self) -> &[Color] {
    &self.buffer
  }

  pub fn clear_buffer(&mut self) {
    self.color = lights::OFF;
    self.buffer.fill(lights::OFF);
  }
}

impl Subsystem for Lights {
  fn periodic(&mut self, _now: Time) {
    self.buffer.fill(self.color);
  }
}
