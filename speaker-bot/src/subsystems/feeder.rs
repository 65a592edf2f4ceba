use std::rc::Rc;

use log::debug;
use robot_cmd::{
  control::pid::PIDConfig,
  hardware::{FlashStore, HardwareError, MotorControl, MotorParams, SimDigitalInput, SimMotor},
  prelude::*,
  time::has_elapsed,
  units::Time,
};
use strum::Display;

use crate::constants::{feeder, seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FeedMode {
  Off,
  /// Pulling a note in from the human player station, through the shooter.
  Hp,
  Intake,
  Outtake,
  Shoot,
}

impl FeedMode {
  fn speed(&self) -> f64 {
    match self {
      FeedMode::Off => 0.0,
      FeedMode::Hp => feeder::HP_SPEED,
      FeedMode::Intake => feeder::INTAKE_SPEED,
      FeedMode::Outtake => feeder::OUTTAKE_SPEED,
      FeedMode::Shoot => feeder::SHOOT_SPEED,
    }
  }
}

fn motor_params() -> MotorParams {
  MotorParams {
    pid: PIDConfig { kp: 0.0, ki: 0.0, kd: 0.0, izone: None },
    kf: 0.0,
    free_speed: 5000.0,
    time_constant: 0.05,
    max_output: 1.0,
    min_output: -1.0,
  }
}

/// Moves notes between the intake and the shooter. The feeder decides when the current feed
/// mode has done its job; commands poll [`Feeder::should_command_stop`].
#[derive(NamedSubsystem)]
pub struct Feeder {
  motor: SimMotor,
  beam: SimDigitalInput,
  mode: FeedMode,
  should_command_stop: bool,
  mode_started: Time,
  beam_clear_since: Option<Time>,
  now: Time,
}

impl Feeder {
  pub fn new(flash: Rc<dyn FlashStore>, beam: SimDigitalInput) -> Result<Self, HardwareError> {
    Ok(Self {
      motor: SimMotor::new("feeder", motor_params(), flash)?,
      beam,
      mode: FeedMode::Off,
      should_command_stop: false,
      mode_started: Time::default(),
      beam_clear_since: None,
      now: Time::default(),
    })
  }

  pub fn set_feed_mode(&mut self, mode: FeedMode) {
    if mode != self.mode {
      debug!("Feed mode {} -> {}", self.mode, mode);
    }
    self.mode = mode;
    self.should_command_stop = false;
    self.mode_started = self.now;
    self.beam_clear_since = None;
  }

  pub fn feed_mode(&self) -> FeedMode {
    self.mode
  }

  pub fn should_command_stop(&self) -> bool {
    self.should_command_stop
  }

  pub fn note_detected(&self) -> bool {
    self.beam.get()
  }

  pub fn output(&self) -> f64 {
    self.motor.output()
  }

  fn note_has_left(&self, now: Time) -> bool {
    has_elapsed(now - self.mode_started, seconds(feeder::NOTE_EXIT_SECONDS))
  }
}

impl Subsystem for Feeder {
  fn periodic(&mut self, now: Time) {
    self.now = now;

    match self.mode {
      FeedMode::Off => (),
      FeedMode::Hp | FeedMode::Intake => {
        if self.note_detected() {
          self.should_command_stop = true;
        }
      },
      FeedMode::Outtake => {
        if self.note_detected() && self.note_has_left(now) {
          self.beam.set(false);
        }
        if self.note_detected() {
          self.beam_clear_since = None;
        } else {
          let since = *self.beam_clear_since.get_or_insert(now);
          if has_elapsed(now - since, seconds(feeder::OUTTAKE_CLEAR_SECONDS)) {
            self.should_command_stop = true;
          }
        }
      },
      // Shooting never finishes by itself; callers bound it with a timeout.
      FeedMode::Shoot => {
        if self.note_detected() && self.note_has_left(now) {
          self.beam.set(false);
        }
      },
    }

    self.motor.set(MotorControl::Percent(self.mode.speed()));
    self.motor.update(now);
  }

  fn reset_integral(&mut self) {
    self.motor.reset_integral();
  }

  fn burn_to_flash(&mut self) -> Result<(), HardwareError> {
    self.motor.burn_to_flash()
  }
}

#[cfg(test)]
mod tests {
  use std::rc::Rc;

  use robot_cmd::{hardware::{MemoryFlash, SimDigitalInput}, prelude::*, units::{millisecond, Time}};

  use super::{FeedMode, Feeder};

  fn tick(n: usize) -> Time {
    (n as f64 * 20.0) * millisecond
  }

  fn feeder() -> (Feeder, SimDigitalInput) {
    let beam = SimDigitalInput::new();
    (Feeder::new(Rc::new(MemoryFlash::new()), beam.clone()).unwrap(), beam)
  }

  #[test]
  fn test_intake_stops_on_note() {
    let (mut feeder, beam) = feeder();
    feeder.set_feed_mode(FeedMode::Intake);
    feeder.periodic(tick(0));
    assert!(!feeder.should_command_stop());

    beam.set(true);
    feeder.periodic(tick(1));
    assert!(feeder.should_command_stop());

    feeder.set_feed_mode(FeedMode::Hp);
    assert!(!feeder.should_command_stop());
  }

  #[test]
  fn test_outtake_waits_for_clear_beam() {
    let (mut feeder, beam) = feeder();
    beam.set(true);
    feeder.periodic(tick(0));
    feeder.set_feed_mode(FeedMode::Outtake);

    // Note leaves after 0.1 s, then the beam must stay clear for 0.25 s.
    let mut stopped_at = None;
    for i in 1..40 {
      feeder.periodic(tick(i));
      if feeder.should_command_stop() {
        stopped_at = Some(i);
        break;
      }
    }
    assert!(!beam.get());
    assert_eq!(stopped_at, Some(5 + 13));
  }

  #[test]
  fn test_shoot_never_stops() {
    let (mut feeder, beam) = feeder();
    beam.set(true);
    feeder.set_feed_mode(FeedMode::Shoot);
    for i in 0..100 {
      feeder.periodic(tick(i));
    }
    assert!(!beam.get());
    assert!(!feeder.should_command_stop());
    assert_eq!(feeder.output(), 1.0);
  }
}
