use std::rc::Rc;

use log::{error, info};
use robot_cmd::{
  auto::{load_autos, AutoChooser, NamedCommands},
  command::InstantCommand,
  dashboard::{CommandButtons, Dashboard, GenericPublisher},
  hardware::{FlashStore, SimDigitalInput},
  input::{hid::SimHID, xbox::{axes, CommandXbox}},
  prelude::*,
  units::{degree, motion::rpm, QuantityBase},
};

use crate::{
  commands::{
    arm::{ManualArm, ToAngle, ToDistanceAngle},
    climber::{ClimbTo, ClimberManual},
    drive::{reset_pose, zero_gyro, DriveToPose, SnapMode, SnapTo, TeleopSwerve},
    idle_command, idle_on_interrupt,
    intake::{IntakeIn, Outake, WaitForIntakeBeam},
    lights::solid_color,
    shooter::{feed_in, feed_out, feed_source, shoot_feed, ToRPM},
  },
  config::RobotConfig,
  constants::{self, arm, arm_min, lights, seconds, shooter},
  subsystems::{Arm, Climber, Feeder, Intake, Lights, Shooter, Swerve},
};

/// Owns every subsystem and the scheduler, and wires operator input, autos and dashboard
/// buttons to commands.
pub struct RobotContainer {
  pub config: RobotConfig,
  pub dashboard: Dashboard,
  pub scheduler: CommandScheduler,

  pub driver_hid: SimHID,
  pub operator_hid: SimHID,
  driver: CommandXbox<SimHID>,
  operator: CommandXbox<SimHID>,

  pub swerve: Handle<Swerve>,
  pub lights: Handle<Lights>,
  pub intake: Handle<Intake>,
  pub shooter: Handle<Shooter>,
  pub feeder: Handle<Feeder>,
  pub arm: Handle<Arm>,
  pub climber: Handle<Climber>,

  pub intake_beam: SimDigitalInput,
  pub feeder_beam: SimDigitalInput,

  pub named: NamedCommands,
  pub chooser: AutoChooser,
  pub buttons: CommandButtons,
}

impl RobotContainer {
  pub fn new(config: RobotConfig, flash: Rc<dyn FlashStore>, dashboard: Dashboard) -> anyhow::Result<Self> {
    let driver_hid = SimHID::new(config.driver_port, "driver", 10, 6, 1);
    let operator_hid = SimHID::new(config.operator_port, "operator", 10, 6, 1);
    let intake_beam = SimDigitalInput::new();
    let feeder_beam = SimDigitalInput::new();

    let swerve = Handle::new(Swerve::new(flash.clone())?);
    let lights = Handle::new(Lights::new(config.led_count));
    let intake = Handle::new(Intake::new(flash.clone(), intake_beam.clone())?);
    let shooter = Handle::new(Shooter::new(flash.clone())?);
    let feeder = Handle::new(Feeder::new(flash.clone(), feeder_beam.clone())?);
    let arm = Handle::new(Arm::new(flash.clone())?);
    let climber = Handle::new(Climber::new(flash)?);

    let mut scheduler = CommandScheduler::new();
    scheduler.register_subsystem(&swerve)?;
    scheduler.register_subsystem(&lights)?;
    scheduler.register_subsystem(&intake)?;
    scheduler.register_subsystem(&shooter)?;
    scheduler.register_subsystem(&feeder)?;
    scheduler.register_subsystem(&arm)?;
    scheduler.register_subsystem(&climber)?;

    let named = Self::named_commands(&swerve, &lights, &intake, &shooter, &feeder, &arm, scheduler.handle());
    let chooser = AutoChooser::new(dashboard.clone(), load_autos(&config.autos_dir)?, &named);

    let mut container = Self {
      driver: CommandXbox::new("driver", driver_hid.clone()),
      operator: CommandXbox::new("operator", operator_hid.clone()),
      driver_hid,
      operator_hid,
      swerve,
      lights,
      intake,
      shooter,
      feeder,
      arm,
      climber,
      intake_beam,
      feeder_beam,
      named,
      chooser,
      buttons: CommandButtons::new(dashboard.clone()),
      scheduler,
      dashboard,
      config,
    };

    container.configure_button_bindings()?;
    container.configure_test_commands();

    Ok(container)
  }

  pub fn idle(&self) -> impl Command {
    idle_command(&self.arm, &self.shooter)
  }

  fn configure_button_bindings(&mut self) -> Result<(), CommandError> {
    let (driver, operator) = (self.driver.clone(), self.operator.clone());
    let (swerve, lights, intake) = (&self.swerve, &self.lights, &self.intake);
    let (shooter, feeder, arm, climber) = (&self.shooter, &self.feeder, &self.arm, &self.climber);

    self.scheduler.set_default_command(arm.id(), ManualArm::new(arm.clone(), operator.axis(axes::LEFT_Y)))?;
    self.scheduler.set_default_command(climber.id(), ClimberManual::new(climber.clone(), operator.axis(axes::RIGHT_Y)))?;

    let (left_y, left_x, right_x) = (driver.axis(axes::LEFT_Y), driver.axis(axes::LEFT_X), driver.axis(axes::RIGHT_X));
    let robot_centric = driver.right_trigger();
    self.scheduler.set_default_command(swerve.id(), TeleopSwerve::new(
      swerve.clone(),
      move || -left_y(),
      move || -left_x(),
      move || -right_x(),
      move || robot_centric.get(),
    ))?;

    let mut table = BindingTable::new();

    /* Driver */
    table
      .while_true(driver.x(), SnapTo::new(swerve.clone(), SnapMode::Left))
      .while_true(driver.b(), SnapTo::new(swerve.clone(), SnapMode::Right))
      .while_true(driver.y(), SnapTo::new(swerve.clone(), SnapMode::Forward))
      .while_true(driver.a(), SnapTo::new(swerve.clone(), SnapMode::Backward))
      .on_true(driver.back(), zero_gyro(swerve.clone()))
      .while_true(driver.pov_right(), DriveToPose::new(swerve.clone(), constants::amp()))
      .while_true(driver.right_bumper(), sequence![
        solid_color(lights.clone(), lights::RED),
        ToAngle::new(arm.clone(), arm::INTAKE_DEGREES * degree),
        parallel![
          feed_in(feeder.clone()).deadline_with(IntakeIn::new(intake.clone())),
          sequence![
            WaitForIntakeBeam::new(intake.clone()),
            solid_color(lights.clone(), lights::GREEN),
          ],
        ],
        solid_color(lights.clone(), lights::BLUE),
      ].with_name("Intake note"));

    /* Operator */
    table
      .while_true(operator.right_trigger(), sequence![
        parallel![
          ToDistanceAngle::new(swerve.clone(), arm.clone()),
          ToRPM::new(shooter.clone(), shooter::AIMED_RPM * rpm),
          SnapTo::new(swerve.clone(), SnapMode::Speaker),
          feed_in(feeder.clone()).deadline_with(IntakeIn::new(intake.clone())),
        ],
        shoot_feed(feeder.clone()).with_timeout(seconds(shooter::AIMED_FEED_SECONDS)),
        self.idle(),
      ].handle_interrupt(idle_on_interrupt(arm, shooter, self.scheduler.handle())).with_name("Aimed shot"))
      .while_true(operator.left_trigger(), sequence![
        solid_color(lights.clone(), lights::RED),
        ToAngle::new(arm.clone(), arm_min()),
        solid_color(lights.clone(), lights::BLUE),
        feed_out(feeder.clone()),
      ].with_name("Eject note"))
      .while_true(operator.b(), SnapTo::holding(swerve.clone(), SnapMode::Speaker))
      .while_true(operator.a(), sequence![
        solid_color(lights.clone(), lights::RED),
        feed_in(feeder.clone()).deadline_with(IntakeIn::new(intake.clone())),
        solid_color(lights.clone(), lights::BLUE),
      ].with_name("Feed in"))
      .on_true(operator.right_bumper(), sequence![
        parallel![
          solid_color(lights.clone(), lights::RED),
          ToAngle::new(arm.clone(), arm::SUBWOOFER_DEGREES * degree),
          ToRPM::new(shooter.clone(), shooter::SUBWOOFER_RPM * rpm),
        ],
        solid_color(lights.clone(), lights::BLUE),
        shoot_feed(feeder.clone()).with_timeout(seconds(shooter::SUBWOOFER_FEED_SECONDS)),
        self.idle(),
      ].handle_interrupt(idle_on_interrupt(arm, shooter, self.scheduler.handle())).with_name("Subwoofer shot"));

    self.scheduler.install_bindings(table)
  }

  /// Commands autos can refer to by name.
  fn named_commands(
    swerve: &Handle<Swerve>,
    lights: &Handle<Lights>,
    intake: &Handle<Intake>,
    shooter: &Handle<Shooter>,
    feeder: &Handle<Feeder>,
    arm: &Handle<Arm>,
    handle: SchedulerHandle,
  ) -> NamedCommands {
    let mut named = NamedCommands::new();

    let (s, l, sh, f, a) = (swerve.clone(), lights.clone(), shooter.clone(), feeder.clone(), arm.clone());
    named.register("shoot", move || {
      sequence![
        parallel![
          SnapTo::new(s.clone(), SnapMode::Speaker),
          solid_color(l.clone(), lights::SHOOT_RED),
          ToRPM::new(sh.clone(), shooter::SUBWOOFER_RPM * rpm),
          ToDistanceAngle::new(s.clone(), a.clone()),
        ],
        solid_color(l.clone(), lights::SHOOT_GREEN),
        shoot_feed(f.clone()).with_timeout(seconds(shooter::AUTO_FEED_SECONDS)),
      ].handle_interrupt(idle_on_interrupt(&a, &sh, handle.clone())).with_name("shoot").boxed()
    });

    let (f, i) = (feeder.clone(), intake.clone());
    named.register("intake", move || {
      feed_in(f.clone()).deadline_with(IntakeIn::new(i.clone())).with_name("intake").boxed()
    });

    let (f, i) = (feeder.clone(), intake.clone());
    named.register("outtake", move || {
      feed_out(f.clone()).deadline_with(Outake::new(i.clone())).with_name("outtake").boxed()
    });

    let f = feeder.clone();
    named.register("source", move || feed_source(f.clone()).boxed());

    named
  }

  fn configure_test_commands(&mut self) {
    self.buttons.put("Arm up", ToAngle::new(self.arm.clone(), arm::TEST_UP_DEGREES * degree));
    self.buttons.put("Arm down", ToAngle::new(self.arm.clone(), arm::TEST_DOWN_DEGREES * degree));
    self.buttons.put("Shooter test command", sequence![
      ToRPM::new(self.shooter.clone(), shooter::TEST_RPM * rpm),
      shoot_feed(self.feeder.clone()).with_timeout(seconds(shooter::TEST_FEED_SECONDS)),
      ToRPM::new(self.shooter.clone(), shooter::TEST_END_RPM * rpm),
    ]);
    self.buttons.put("Feed IN", feed_in(self.feeder.clone()));
    self.buttons.put("Feed OUT", feed_out(self.feeder.clone()));
    self.buttons.put("Climber extend", ClimbTo::extend(self.climber.clone()));
    self.buttons.put("Climber retract", ClimbTo::retract(self.climber.clone()));

    let (swerve, arm, shooter, intake, feeder, climber) = (
      self.swerve.clone(), self.arm.clone(), self.shooter.clone(),
      self.intake.clone(), self.feeder.clone(), self.climber.clone(),
    );
    self.buttons.put("burn to flash", InstantCommand::new(move || {
      let results = [
        (swerve.id(), swerve.borrow_mut().burn_to_flash()),
        (arm.id(), arm.borrow_mut().burn_to_flash()),
        (shooter.id(), shooter.borrow_mut().burn_to_flash()),
        (intake.id(), intake.borrow_mut().burn_to_flash()),
        (feeder.id(), feeder.borrow_mut().burn_to_flash()),
        (climber.id(), climber.borrow_mut().burn_to_flash()),
      ];
      for (id, result) in results {
        match result {
          Ok(()) => info!("Burned {} to flash", id),
          Err(e) => error!("Could not burn {} to flash: {}", id, e),
        }
      }
    }, &[]).with_name("burn to flash").ignoring_disable());

    self.buttons.put("Reset Pose", reset_pose(self.swerve.clone()));
  }

  /// Called every tick while disabled.
  pub fn disabled_actions(&self) {
    self.arm.borrow_mut().reset_integral();
    self.shooter.borrow_mut().reset_integral();
    self.feeder.borrow_mut().reset_integral();
  }

  pub fn teleop_init(&self) {
    self.lights.borrow_mut().clear_buffer();
  }

  pub fn disabled_init(&self) {
    self.lights.borrow_mut().set_color(lights::RED);
  }

  /// The routine picked on the dashboard, starting with a reset to its starting pose. `None`
  /// when no auto is selected.
  pub fn autonomous_command(&self) -> Result<Option<Box<dyn Command>>, CommandError> {
    let Some(routine) = self.chooser.selected() else {
      info!("No auto selected");
      return Ok(None);
    };

    let command = routine.build(&self.named)?;
    match routine.starting_pose() {
      Some(pose) => {
        let swerve = self.swerve.clone();
        let reset = InstantCommand::new(move || swerve.borrow_mut().set_pose(pose), &[]);
        Ok(Some(reset.and_then(command).with_name(&routine.name).boxed()))
      },
      None => Ok(Some(command)),
    }
  }

  pub fn telemetry(&self) {
    let joystick = self.operator.axis(axes::LEFT_X);
    self.dashboard.topic("joystick").publish::<f64>().set(joystick());
    self.dashboard.topic("Arm Angle").publish::<f64>().set(self.arm.borrow().setpoint().to::<degree>());
    self.buttons.publish_running(&self.scheduler);
  }
}
