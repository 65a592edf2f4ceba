use robot_cmd::{
  prelude::*,
  units::{motion::AngularVelocity, Time},
};

use crate::subsystems::{FeedMode, Feeder, Shooter};

/// Spins the flywheel to a setpoint, finishing once it is within tolerance. The flywheel
/// keeps the setpoint afterwards.
pub struct ToRPM {
  shooter: Handle<Shooter>,
  setpoint: Setpoint<AngularVelocity>,
}

impl ToRPM {
  pub fn new<S: Into<Setpoint<AngularVelocity>>>(shooter: Handle<Shooter>, setpoint: S) -> Self {
    Self { shooter, setpoint: setpoint.into() }
  }
}

impl Command for ToRPM {
  fn initialize(&mut self, _now: Time) {
    self.shooter.borrow_mut().set_rpm(self.setpoint.clone());
  }

  fn is_finished(&self) -> bool {
    self.shooter.borrow().at_rpm()
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.shooter.id()])
  }

  fn name(&self) -> String {
    "ToRPM".into()
  }
}

/// Puts the feeder in a mode until the feeder reports the job done, then turns it off.
pub struct Feed {
  feeder: Handle<Feeder>,
  mode: FeedMode,
}

impl Feed {
  pub fn new(feeder: Handle<Feeder>, mode: FeedMode) -> Self {
    Self { feeder, mode }
  }
}

impl Command for Feed {
  fn initialize(&mut self, _now: Time) {
    self.feeder.borrow_mut().set_feed_mode(self.mode);
  }

  fn is_finished(&self) -> bool {
    self.feeder.borrow().should_command_stop()
  }

  fn end(&mut self, _interrupted: bool) {
    self.feeder.borrow_mut().set_feed_mode(FeedMode::Off);
  }

  fn requirements(&self) -> Requirements {
    Requirements::from([self.feeder.id()])
  }

  fn name(&self) -> String {
    match self.mode {
      FeedMode::Off => "FeedOff".into(),
      FeedMode::Hp => "FeedSource".into(),
      FeedMode::Intake => "FeedIn".into(),
      FeedMode::Outtake => "FeedOut".into(),
      FeedMode::Shoot => "ShootFeed".into(),
    }
  }
}

/// Draws a note in from the intake until the beam sees it.
pub fn feed_in(feeder: Handle<Feeder>) -> Feed {
  Feed::new(feeder, FeedMode::Intake)
}

/// Pushes a note back out until the beam has been clear for a moment.
pub fn feed_out(feeder: Handle<Feeder>) -> Feed {
  Feed::new(feeder, FeedMode::Outtake)
}

/// Takes a note from the human player station through the shooter.
pub fn feed_source(feeder: Handle<Feeder>) -> Feed {
  Feed::new(feeder, FeedMode::Hp)
}

/// Drives the note into the flywheel. Never finishes on its own, so always bound it with a
/// timeout.
pub fn shoot_feed(feeder: Handle<Feeder>) -> Feed {
  Feed::new(feeder, FeedMode::Shoot)
}
