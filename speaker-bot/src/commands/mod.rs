pub mod arm;
pub mod climber;
pub mod drive;
pub mod intake;
pub mod lights;
pub mod shooter;

use robot_cmd::{command::ParallelGroup, prelude::*};

use crate::{
  constants::{arm_min, idle_rpm},
  subsystems::{Arm, Shooter},
};

/// Arm down, flywheel at idle. Everything that shoots falls back to this.
pub fn idle_command(arm: &Handle<Arm>, shooter: &Handle<Shooter>) -> ParallelGroup {
  parallel![
    arm::ToAngle::new(arm.clone(), arm_min()),
    shooter::ToRPM::new(shooter.clone(), idle_rpm()),
  ]
}

/// Puts both mechanisms in the idle configuration straight away, for use inside interrupt
/// handlers where the idle command can only be scheduled for after the tick.
pub fn idle_now(arm: &Handle<Arm>, shooter: &Handle<Shooter>) {
  arm.borrow_mut().set_angle(arm_min());
  shooter.borrow_mut().set_rpm(idle_rpm());
}

/// Interrupt handler for the shot composites. The mechanisms are put in the idle
/// configuration at once, then the idle command is queued to hold them there, unless
/// whatever interrupted the shot has claimed them.
pub fn idle_on_interrupt(arm: &Handle<Arm>, shooter: &Handle<Shooter>, handle: SchedulerHandle) -> impl FnMut() + 'static {
  let (arm, shooter) = (arm.clone(), shooter.clone());
  move || {
    idle_now(&arm, &shooter);
    handle.schedule_fallback(idle_command(&arm, &shooter));
  }
}
