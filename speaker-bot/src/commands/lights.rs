use robot_cmd::{command::InstantCommand, prelude::*};

use crate::{constants::lights::Color, subsystems::Lights};

/// Sets the strip to one colour and finishes.
pub fn solid_color(lights: Handle<Lights>, color: Color) -> impl Command {
  let id = lights.id();
  InstantCommand::new(move || lights.borrow_mut().set_color(color), &[id]).with_name("SolidColor")
}
