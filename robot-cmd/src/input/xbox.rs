use std::rc::Rc;

use crate::trigger::Trigger;

use super::hid::HIDDevice;

pub mod buttons {
  pub const A: usize = 1;
  pub const B: usize = 2;
  pub const X: usize = 3;
  pub const Y: usize = 4;
  pub const LEFT_BUMPER: usize = 5;
  pub const RIGHT_BUMPER: usize = 6;
  pub const BACK: usize = 7;
  pub const START: usize = 8;
  pub const LEFT_STICK: usize = 9;
  pub const RIGHT_STICK: usize = 10;
}

pub mod axes {
  pub const LEFT_X: usize = 0;
  pub const LEFT_Y: usize = 1;
  pub const LEFT_TRIGGER: usize = 2;
  pub const RIGHT_TRIGGER: usize = 3;
  pub const RIGHT_X: usize = 4;
  pub const RIGHT_Y: usize = 5;
}

/// Analog triggers read as pressed past this point.
pub const TRIGGER_THRESHOLD: f64 = 0.5;

pub trait XboxController {
  type HID: HIDDevice;

  fn inner(&self) -> &Self::HID;

  fn left_x(&self) -> f64 { self.inner().axis(axes::LEFT_X) }
  fn left_y(&self) -> f64 { self.inner().axis(axes::LEFT_Y) }
  fn left_trigger(&self) -> f64 { self.inner().axis(axes::LEFT_TRIGGER) }
  fn right_trigger(&self) -> f64 { self.inner().axis(axes::RIGHT_TRIGGER) }
  fn right_x(&self) -> f64 { self.inner().axis(axes::RIGHT_X) }
  fn right_y(&self) -> f64 { self.inner().axis(axes::RIGHT_Y) }

  fn dpad(&self) -> isize { self.inner().pov(0) }

  fn a(&self) -> bool { self.inner().button(buttons::A) }
  fn b(&self) -> bool { self.inner().button(buttons::B) }
  fn x(&self) -> bool { self.inner().button(buttons::X) }
  fn y(&self) -> bool { self.inner().button(buttons::Y) }
  fn left_bumper(&self) -> bool { self.inner().button(buttons::LEFT_BUMPER) }
  fn right_bumper(&self) -> bool { self.inner().button(buttons::RIGHT_BUMPER) }
  fn back(&self) -> bool { self.inner().button(buttons::BACK) }
  fn start(&self) -> bool { self.inner().button(buttons::START) }
  fn left_stick(&self) -> bool { self.inner().button(buttons::LEFT_STICK) }
  fn right_stick(&self) -> bool { self.inner().button(buttons::RIGHT_STICK) }
}

#[derive(Debug, Clone)]
pub struct Xbox<HID: HIDDevice>(HID);

impl<HID: HIDDevice> From<HID> for Xbox<HID> {
  fn from(value: HID) -> Self {
    Xbox(value)
  }
}

impl<HID: HIDDevice> Xbox<HID> {
  pub fn new(hid: HID) -> Self {
    Xbox(hid)
  }
}

impl<HID: HIDDevice> XboxController for Xbox<HID> {
  type HID = HID;

  fn inner(&self) -> &HID { &self.0 }
}

/// An Xbox controller that hands out [`Trigger`]s for the binding table. Trigger names are
/// `{label}.{input}`, e.g. `operator.right_bumper`.
#[derive(Debug)]
pub struct CommandXbox<HID: HIDDevice> {
  label: String,
  controller: Rc<Xbox<HID>>,
}

impl<HID: HIDDevice> Clone for CommandXbox<HID> {
  fn clone(&self) -> Self {
    Self { label: self.label.clone(), controller: self.controller.clone() }
  }
}

impl<HID: HIDDevice + 'static> CommandXbox<HID> {
  pub fn new(label: &str, hid: HID) -> Self {
    Self { label: label.to_owned(), controller: Rc::new(Xbox::new(hid)) }
  }

  pub fn hid(&self) -> &HID {
    self.controller.inner()
  }

  pub fn controller(&self) -> Rc<Xbox<HID>> {
    self.controller.clone()
  }

  fn trigger<F: Fn(&Xbox<HID>) -> bool + 'static>(&self, input: &str, f: F) -> Trigger {
    let controller = self.controller.clone();
    Trigger::new(&format!("{}.{}", self.label, input), move || f(&controller))
  }

  pub fn a(&self) -> Trigger { self.trigger("a", |c| c.a()) }
  pub fn b(&self) -> Trigger { self.trigger("b", |c| c.b()) }
  pub fn x(&self) -> Trigger { self.trigger("x", |c| c.x()) }
  pub fn y(&self) -> Trigger { self.trigger("y", |c| c.y()) }
  pub fn left_bumper(&self) -> Trigger { self.trigger("left_bumper", |c| c.left_bumper()) }
  pub fn right_bumper(&self) -> Trigger { self.trigger("right_bumper", |c| c.right_bumper()) }
  pub fn back(&self) -> Trigger { self.trigger("back", |c| c.back()) }
  pub fn start(&self) -> Trigger { self.trigger("start", |c| c.start()) }
  pub fn left_stick(&self) -> Trigger { self.trigger("left_stick", |c| c.left_stick()) }
  pub fn right_stick(&self) -> Trigger { self.trigger("right_stick", |c| c.right_stick()) }

  pub fn left_trigger(&self) -> Trigger {
    self.trigger("left_trigger", |c| c.left_trigger() > TRIGGER_THRESHOLD)
  }

  pub fn right_trigger(&self) -> Trigger {
    self.trigger("right_trigger", |c| c.right_trigger() > TRIGGER_THRESHOLD)
  }

  pub fn pov(&self, angle: isize) -> Trigger {
    self.trigger(&format!("pov{}", angle), move |c| c.dpad() == angle)
  }

  pub fn pov_up(&self) -> Trigger { self.pov(0) }
  pub fn pov_right(&self) -> Trigger { self.pov(90) }
  pub fn pov_down(&self) -> Trigger { self.pov(180) }
  pub fn pov_left(&self) -> Trigger { self.pov(270) }

  /// Supplier for an axis, for commands that read a stick every tick.
  pub fn axis(&self, index: usize) -> impl Fn() -> f64 + 'static {
    let controller = self.controller.clone();
    move || controller.inner().axis(index)
  }
}

#[cfg(test)]
mod tests {
  use crate::input::hid::SimHID;

  use super::{axes, buttons, CommandXbox, XboxController};

  #[test]
  fn test_triggers_follow_hid() {
    let hid = SimHID::new(1, "operator", 10, 6, 1);
    let xbox = CommandXbox::new("operator", hid.clone());

    let bumper = xbox.right_bumper();
    let trigger = xbox.right_trigger();
    let right = xbox.pov_right();
    assert_eq!(bumper.name(), "operator.right_bumper");
    assert_eq!(right.name(), "operator.pov90");

    assert!(!bumper.get());
    hid.set_button(buttons::RIGHT_BUMPER, true);
    assert!(bumper.get());

    hid.set_axis(axes::RIGHT_TRIGGER, 0.4);
    assert!(!trigger.get());
    hid.set_axis(axes::RIGHT_TRIGGER, 0.9);
    assert!(trigger.get());

    hid.set_pov(0, 90);
    assert!(right.get());

    hid.set_axis(axes::LEFT_Y, -0.5);
    assert_eq!((xbox.axis(axes::LEFT_Y))(), -0.5);
    assert_eq!(xbox.controller().left_y(), -0.5);
  }
}
