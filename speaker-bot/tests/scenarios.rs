use std::rc::Rc;

use approx::assert_relative_eq;
use robot_cmd::{
  command::ParallelGroup,
  dashboard::Dashboard,
  ds::{ControlMode, RobotControlState},
  geometry::Pose2d,
  hardware::MemoryFlash,
  input::xbox::{axes, buttons},
  prelude::*,
  units::{degree, meter, millisecond, motion::rpm, Time},
};
use speaker_bot::{
  commands::arm::{ManualArm, ToAngle},
  config::RobotConfig,
  constants::lights,
  container::RobotContainer,
  robot::Robot,
  subsystems::FeedMode,
};

struct Sim {
  robot: Robot,
  flash: Rc<MemoryFlash>,
  n: usize,
}

impl Sim {
  fn new() -> Self {
    let flash = Rc::new(MemoryFlash::new());
    let container = RobotContainer::new(RobotConfig::default(), flash.clone(), Dashboard::new()).unwrap();
    Self { robot: Robot::new(container), flash, n: 0 }
  }

  fn c(&self) -> &RobotContainer {
    &self.robot.container
  }

  fn now(&self) -> Time {
    (self.n as f64 * 20.0) * millisecond
  }

  fn step(&mut self, state: &RobotControlState) {
    let now = self.now();
    self.robot.tick(state, now).unwrap();
    self.n += 1;
  }

  fn teleop(&mut self) {
    self.step(&RobotControlState::enabled(ControlMode::Teleop));
  }

  fn disabled(&mut self) {
    self.step(&RobotControlState::disabled());
  }

  fn holder(&self, id: SubsystemId) -> Option<String> {
    self.c().scheduler.requiring(id).map(|c| c.borrow().name())
  }
}

#[test]
fn test_subwoofer_shot() {
  let mut sim = Sim::new();
  sim.teleop();
  assert_eq!(sim.holder("arm").as_deref(), Some("ManualArm"));

  sim.c().operator_hid.set_button(buttons::RIGHT_BUMPER, true);
  sim.teleop();
  sim.c().operator_hid.set_button(buttons::RIGHT_BUMPER, false);

  assert_eq!(sim.holder("arm").as_deref(), Some("Subwoofer shot"));
  assert_eq!(sim.c().lights.borrow().color(), lights::RED);
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 48.5 * degree);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 4500.0 * rpm);

  let mut spin_up = 0;
  while sim.c().feeder.borrow().feed_mode() != FeedMode::Shoot {
    sim.teleop();
    spin_up += 1;
    assert!(spin_up < 200, "never started feeding");
  }
  assert_eq!(sim.c().lights.borrow().color(), lights::BLUE);
  assert_relative_eq!(sim.c().arm.borrow().angle(), 48.5 * degree, epsilon = 1.0 * degree);

  let mut feeding = 0;
  while sim.c().feeder.borrow().feed_mode() == FeedMode::Shoot {
    feeding += 1;
    sim.teleop();
  }
  assert_eq!(feeding, 50);

  // Idle takes over in the tick the feed times out.
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 10.0 * degree);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);

  for _ in 0..200 {
    sim.teleop();
  }
  assert_eq!(sim.holder("arm").as_deref(), Some("ManualArm"));
  assert_eq!(sim.holder("shooter"), None);
  assert!(sim.c().arm.borrow().at_setpoint());
  assert!(sim.c().shooter.borrow().at_rpm());
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);
}

#[test]
fn test_releasing_aimed_shot_idles_in_same_tick() {
  let mut sim = Sim::new();
  sim.teleop();

  sim.c().operator_hid.set_axis(axes::RIGHT_TRIGGER, 1.0);
  for _ in 0..5 {
    sim.teleop();
  }
  assert_eq!(sim.holder("shooter").as_deref(), Some("Aimed shot"));
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 4700.0 * rpm);
  // Five and a half metres from the speaker, past the end of the shot table.
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 23.0 * degree);

  sim.c().operator_hid.set_axis(axes::RIGHT_TRIGGER, 0.0);
  sim.teleop();

  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 10.0 * degree);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);
  assert_eq!(sim.holder("arm").as_deref(), Some("ParallelGroup"));
  assert_eq!(sim.holder("shooter").as_deref(), Some("ParallelGroup"));
  assert_eq!(sim.c().feeder.borrow().feed_mode(), FeedMode::Off);
}

#[test]
fn test_preempted_shot_leaves_subsystems_to_the_newcomer() {
  let mut sim = Sim::new();
  sim.teleop();

  sim.c().operator_hid.set_axis(axes::RIGHT_TRIGGER, 1.0);
  sim.teleop();
  sim.teleop();
  assert_eq!(sim.holder("arm").as_deref(), Some("Aimed shot"));

  sim.c().operator_hid.set_axis(axes::LEFT_TRIGGER, 1.0);
  sim.teleop();

  assert_eq!(sim.holder("arm").as_deref(), Some("Eject note"));
  assert_eq!(sim.holder("shooter"), None);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);
  assert!(!sim.c().scheduler.scheduled_names().contains(&"ParallelGroup".to_owned()));
}

#[test]
fn test_subwoofer_shot_preempted_during_spin_up() {
  let mut sim = Sim::new();
  sim.teleop();

  sim.c().operator_hid.set_button(buttons::RIGHT_BUMPER, true);
  sim.teleop();
  sim.c().operator_hid.set_button(buttons::RIGHT_BUMPER, false);
  sim.teleop();
  assert_eq!(sim.holder("shooter").as_deref(), Some("Subwoofer shot"));
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 4500.0 * rpm);

  sim.c().operator_hid.set_axis(axes::LEFT_TRIGGER, 1.0);
  sim.teleop();

  assert_eq!(sim.holder("arm").as_deref(), Some("Eject note"));
  assert_eq!(sim.holder("shooter"), None);
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 10.0 * degree);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);
}

#[test]
fn test_disabling_mid_subwoofer_shot_idles() {
  let mut sim = Sim::new();
  sim.teleop();

  sim.c().operator_hid.set_button(buttons::RIGHT_BUMPER, true);
  sim.teleop();
  sim.c().operator_hid.set_button(buttons::RIGHT_BUMPER, false);
  sim.teleop();
  assert_eq!(sim.holder("arm").as_deref(), Some("Subwoofer shot"));

  sim.disabled();
  assert!(sim.c().scheduler.scheduled_names().is_empty());
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 10.0 * degree);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);
}

#[test]
fn test_driver_bindings() {
  let mut sim = Sim::new();
  sim.teleop();
  assert_eq!(sim.holder("drive").as_deref(), Some("TeleopSwerve"));

  sim.c().driver_hid.set_button(buttons::X, true);
  sim.teleop();
  assert_eq!(sim.holder("drive").as_deref(), Some("SnapTo(Left)"));
  for _ in 0..100 {
    sim.teleop();
  }
  // Snapped, finished and handed back to the sticks while still held.
  assert_relative_eq!(sim.c().swerve.borrow().heading(), 90.0 * degree, epsilon = 2.0 * degree);
  assert_eq!(sim.holder("drive").as_deref(), Some("TeleopSwerve"));

  sim.c().driver_hid.set_button(buttons::X, false);
  sim.c().driver_hid.set_button(buttons::BACK, true);
  sim.teleop();
  assert_relative_eq!(sim.c().swerve.borrow().heading(), 0.0 * degree);
}

#[test]
fn test_intake_sequence_lights() {
  let mut sim = Sim::new();
  sim.teleop();

  sim.c().driver_hid.set_button(buttons::RIGHT_BUMPER, true);
  sim.teleop();
  assert_eq!(sim.c().lights.borrow().color(), lights::RED);
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 15.0 * degree);

  for _ in 0..100 {
    sim.teleop();
  }
  assert_eq!(sim.c().feeder.borrow().feed_mode(), FeedMode::Intake);
  assert!(sim.c().intake.borrow().percent() > 0.0);

  sim.c().intake_beam.set(true);
  sim.teleop();
  assert_eq!(sim.c().lights.borrow().color(), lights::GREEN);

  sim.c().feeder_beam.set(true);
  sim.teleop();
  sim.teleop();
  sim.teleop();
  assert_eq!(sim.c().lights.borrow().color(), lights::BLUE);
  assert_eq!(sim.c().feeder.borrow().feed_mode(), FeedMode::Off);
  assert_eq!(sim.c().intake.borrow().percent(), 0.0);
}

#[test]
fn test_reset_pose() {
  let mut sim = Sim::new();
  sim.teleop();
  sim.c().swerve.borrow_mut().set_pose(Pose2d::new(3.0 * meter, 2.0 * meter, 45.0 * degree));

  let c = &mut sim.robot.container;
  assert!(c.buttons.press("Reset Pose", &mut c.scheduler).unwrap());
  assert_eq!(sim.c().swerve.borrow().pose(), Pose2d::origin());

  sim.teleop();
  assert_relative_eq!(sim.c().swerve.borrow().pose().x, 0.0 * meter);
  assert_relative_eq!(sim.c().swerve.borrow().heading(), 0.0 * degree);
}

#[test]
fn test_burn_to_flash_while_disabled() {
  let mut sim = Sim::new();
  sim.disabled();

  let c = &mut sim.robot.container;
  assert!(!c.buttons.press("Arm up", &mut c.scheduler).unwrap());
  assert!(c.buttons.press("burn to flash", &mut c.scheduler).unwrap());

  assert_eq!(sim.flash.writes(), 9);
  assert_eq!(sim.flash.devices(), vec![
    "arm", "climber", "feeder", "intake", "shooter",
    "swerve_bl_drive", "swerve_br_drive", "swerve_fl_drive", "swerve_fr_drive",
  ]);
  assert!(matches!(
    c.buttons.press("Self destruct", &mut c.scheduler),
    Err(CommandError::UnknownDashboardCommand(_))
  ));
}

#[test]
fn test_disable_cancels_and_lights_go_red() {
  let mut sim = Sim::new();
  sim.teleop();
  sim.c().operator_hid.set_axis(axes::RIGHT_TRIGGER, 1.0);
  sim.teleop();
  assert_eq!(sim.holder("arm").as_deref(), Some("Aimed shot"));

  sim.disabled();
  assert_eq!(sim.robot.mode(), Some(ControlMode::Disabled));
  assert!(sim.c().scheduler.scheduled_names().is_empty());
  assert_eq!(sim.c().lights.borrow().color(), lights::RED);
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 10.0 * degree);

  sim.teleop();
  assert!(sim.c().lights.borrow().buffer().iter().all(|c| *c == lights::OFF));
}

#[test]
fn test_conflicting_bindings_rejected() {
  let mut sim = Sim::new();
  let arm = sim.c().arm.clone();
  let scheduler = &mut sim.robot.container.scheduler;

  let mut table = BindingTable::new();
  table.on_true(Trigger::new("operator.right_bumper", || false), ToAngle::new(arm.clone(), 80.0 * degree));
  assert_eq!(scheduler.install_bindings(table), Err(CommandError::ConflictingBindings {
    trigger: "operator.right_bumper".to_owned(),
    first: "ToAngle".to_owned(),
    second: "Subwoofer shot".to_owned(),
    subsystem: "arm",
  }));

  let mut table = BindingTable::new();
  table.on_false(Trigger::new("operator.right_bumper", || false), ToAngle::new(arm.clone(), 80.0 * degree));
  assert!(scheduler.install_bindings(table).is_ok());

  let group: ParallelGroup = parallel![ToAngle::new(arm.clone(), 80.0 * degree), ManualArm::new(arm.clone(), || 0.0)];
  let mut table = BindingTable::new();
  table.on_true(Trigger::new("operator.x", || false), group);
  assert_eq!(scheduler.install_bindings(table), Err(CommandError::ConflictingRequirements {
    group: "ParallelGroup".to_owned(),
    subsystem: "arm",
  }));
}

#[test]
fn test_autos_from_deploy_dir() {
  let mut sim = Sim::new();
  assert_eq!(sim.c().chooser.options(), vec!["None".to_owned(), "Subwoofer Two Shot".to_owned()]);
  assert!(sim.c().autonomous_command().unwrap().is_none());

  sim.c().dashboard.put_string("autos/selected", "Subwoofer Two Shot");
  sim.disabled();
  sim.step(&RobotControlState::enabled(ControlMode::Autonomous));

  let pose = sim.c().swerve.borrow().pose();
  assert_relative_eq!(pose.x, 1.3 * meter, epsilon = 1e-6 * meter);
  assert_relative_eq!(pose.y, 5.55 * meter, epsilon = 1e-6 * meter);
  assert_eq!(sim.holder("shooter").as_deref(), Some("Subwoofer Two Shot"));
  assert_eq!(sim.c().lights.borrow().color(), lights::SHOOT_RED);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 4500.0 * rpm);
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 48.5 * degree, epsilon = 0.01 * degree);

  // Teleop cancels the auto mid-shot, which idles the arm and flywheel.
  sim.teleop();
  assert_eq!(sim.holder("shooter").as_deref(), Some("ParallelGroup"));
  assert_eq!(sim.holder("arm").as_deref(), Some("ParallelGroup"));
  assert_eq!(sim.holder("drive").as_deref(), Some("TeleopSwerve"));
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 10.0 * degree);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);
}

#[test]
fn test_disabling_mid_auto_shot_idles() {
  let mut sim = Sim::new();
  sim.c().dashboard.put_string("autos/selected", "Subwoofer Two Shot");
  sim.disabled();
  for _ in 0..4 {
    sim.step(&RobotControlState::enabled(ControlMode::Autonomous));
  }
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 4500.0 * rpm);

  sim.disabled();
  assert!(sim.c().scheduler.scheduled_names().is_empty());
  assert_relative_eq!(sim.c().arm.borrow().setpoint(), 10.0 * degree);
  assert_relative_eq!(sim.c().shooter.borrow().setpoint(), 2000.0 * rpm);
}
