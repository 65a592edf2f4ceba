use std::{cell::{Cell, RefCell}, rc::Rc};

use mockall::{automock, Sequence};
use robot_cmd::{
  command::{InstantCommand, MockCommand, RunCommand, WaitUntilCommand},
  dashboard::{CommandButtons, Dashboard},
  prelude::*,
  units::{millisecond, Time},
};

#[automock]
pub trait InterruptNotifier {
  fn interrupted(&self) -> ();
}

#[derive(NamedSubsystem, Default)]
struct Arm {
  periodic_calls: usize,
}

impl Subsystem for Arm {
  fn periodic(&mut self, _now: Time) {
    self.periodic_calls += 1;
  }
}

#[derive(NamedSubsystem, Default)]
struct Shooter;

impl Subsystem for Shooter {}

fn tick(n: usize) -> Time {
  (n as f64 * 20.0) * millisecond
}

fn button(name: &str) -> (Rc<Cell<bool>>, Trigger) {
  let state = Rc::new(Cell::new(false));
  let s2 = state.clone();
  (state, Trigger::new(name, move || s2.get()))
}

fn scheduler() -> (CommandScheduler, Handle<Arm>, Handle<Shooter>) {
  let arm = Handle::new(Arm::default());
  let shooter = Handle::new(Shooter);
  let mut scheduler = CommandScheduler::new();
  scheduler.register_subsystem(&arm).unwrap();
  scheduler.register_subsystem(&shooter).unwrap();
  scheduler.set_enabled(true);
  (scheduler, arm, shooter)
}

fn forever(requires: &[SubsystemId]) -> RunCommand {
  RunCommand::new(|| (), requires)
}

#[test]
fn test_while_true_runs_until_release_then_default_resumes() {
  let (mut scheduler, arm, _) = scheduler();
  let default = scheduler.set_default_command(arm.id(), forever(&["arm"]).with_name("ManualArm")).unwrap();

  let (a, trigger) = button("operator.a");
  let held = forever(&["arm"]).with_name("Held").into_ref();
  let mut table = BindingTable::new();
  table.bind_ref(trigger, robot_cmd::trigger::BindingKind::WhileTrue, held.clone());
  scheduler.install_bindings(table).unwrap();

  scheduler.run(tick(0));
  assert!(scheduler.is_scheduled(&default));

  a.set(true);
  scheduler.run(tick(1));
  assert!(scheduler.is_scheduled(&held));
  assert!(!scheduler.is_scheduled(&default));

  scheduler.run(tick(2));
  assert!(scheduler.is_scheduled(&held));

  a.set(false);
  scheduler.run(tick(3));
  assert!(!scheduler.is_scheduled(&held));
  assert!(scheduler.is_scheduled(&default));
  assert_eq!(arm.borrow().periodic_calls, 4);
}

#[test]
fn test_toggle_and_on_false() {
  let (mut scheduler, _, _) = scheduler();

  let (y, toggle) = button("operator.y");
  let (x, release) = button("operator.x");
  let toggled = forever(&["arm"]).into_ref();
  let released = Rc::new(Cell::new(0));
  let r2 = released.clone();

  let mut table = BindingTable::new();
  table.bind_ref(toggle, robot_cmd::trigger::BindingKind::ToggleOnTrue, toggled.clone());
  table.on_false(release, InstantCommand::new(move || r2.set(r2.get() + 1), &["shooter"]));
  scheduler.install_bindings(table).unwrap();

  y.set(true);
  scheduler.run(tick(0));
  assert!(scheduler.is_scheduled(&toggled));

  y.set(false);
  scheduler.run(tick(1));
  assert!(scheduler.is_scheduled(&toggled));

  y.set(true);
  scheduler.run(tick(2));
  assert!(!scheduler.is_scheduled(&toggled));

  x.set(true);
  scheduler.run(tick(3));
  assert_eq!(released.get(), 0);
  x.set(false);
  scheduler.run(tick(4));
  assert_eq!(released.get(), 1);
}

#[test]
fn test_same_edge_bindings_must_not_share_subsystems() {
  let (mut scheduler, _, _) = scheduler();
  let (_, first) = button("operator.right_bumper");
  let (_, second) = button("operator.right_bumper");

  let mut table = BindingTable::new();
  table.on_true(first, forever(&["arm"]).with_name("Up"));
  table.while_true(second, forever(&["arm", "shooter"]).with_name("Shoot"));

  assert_eq!(
    scheduler.install_bindings(table).err(),
    Some(CommandError::ConflictingBindings {
      trigger: "operator.right_bumper".to_owned(),
      first: "Up".to_owned(),
      second: "Shoot".to_owned(),
      subsystem: "arm",
    })
  );
}

#[test]
fn test_opposite_edges_may_share_subsystems() {
  let (mut scheduler, _, _) = scheduler();
  let (_, first) = button("operator.left_trigger");
  let (_, second) = button("operator.left_trigger");

  let mut table = BindingTable::new();
  table.on_true(first, forever(&["arm"]));
  table.on_false(second, forever(&["arm"]));
  assert!(scheduler.install_bindings(table).is_ok());
}

#[test]
fn test_bound_groups_are_validated() {
  let (mut scheduler, _, _) = scheduler();
  let (_, trigger) = button("driver.a");

  let mut table = BindingTable::new();
  table.while_true(trigger, parallel![forever(&["arm"]), forever(&["arm"])]);
  assert!(matches!(
    scheduler.install_bindings(table),
    Err(CommandError::ConflictingRequirements { subsystem: "arm", .. })
  ));
}

#[test]
fn test_unregistered_subsystem_rejected() {
  let (mut scheduler, _, _) = scheduler();
  let (_, trigger) = button("driver.a");

  let mut table = BindingTable::new();
  table.on_true(trigger, forever(&["climber"]).with_name("Climb"));
  assert_eq!(
    scheduler.install_bindings(table).err(),
    Some(CommandError::UnregisteredSubsystem { command: "Climb".to_owned(), subsystem: "climber" })
  );
}

#[test]
fn test_interrupt_handler_runs_on_every_interruption_path() {
  let mut notifier = MockInterruptNotifier::new();
  notifier.expect_interrupted().times(4).return_const(());
  let notifier = Rc::new(notifier);

  let (mut scheduler, _, _) = scheduler();
  let (a, trigger) = button("operator.a");

  let n2 = notifier.clone();
  let guarded = forever(&["arm"]).handle_interrupt(move || n2.interrupted()).into_ref();
  let mut table = BindingTable::new();
  table.bind_ref(trigger, robot_cmd::trigger::BindingKind::WhileTrue, guarded.clone());
  scheduler.install_bindings(table).unwrap();

  // Binding release
  a.set(true);
  scheduler.run(tick(0));
  a.set(false);
  scheduler.run(tick(1));

  // Preemption
  a.set(true);
  scheduler.run(tick(2));
  scheduler.schedule_command(forever(&["arm"]));
  assert!(!scheduler.is_scheduled(&guarded));
  a.set(false);
  scheduler.run(tick(3));

  // Disable
  a.set(true);
  scheduler.run(tick(4));
  scheduler.set_enabled(false);
  scheduler.run(tick(5));
  scheduler.set_enabled(true);
  a.set(false);
  scheduler.run(tick(6));

  // Explicit cancel
  a.set(true);
  scheduler.run(tick(7));
  scheduler.cancel(&guarded);
}

#[test]
fn test_interrupt_handler_skipped_on_completion() {
  let mut notifier = MockInterruptNotifier::new();
  notifier.expect_interrupted().never();
  let notifier = Rc::new(notifier);

  let (mut scheduler, _, _) = scheduler();
  let done = Rc::new(Cell::new(false));
  let d2 = done.clone();
  let n2 = notifier.clone();
  let command = WaitUntilCommand::new(move || d2.get())
    .handle_interrupt(move || n2.interrupted())
    .into_ref();

  scheduler.schedule(&command);
  scheduler.run(tick(0));
  done.set(true);
  scheduler.run(tick(1));
  assert!(!scheduler.is_scheduled(&command));
}

#[test]
fn test_cancelling_group_interrupts_nested_handler() {
  let mut notifier = MockInterruptNotifier::new();
  notifier.expect_interrupted().once().return_const(());
  let notifier = Rc::new(notifier);

  let (mut scheduler, _, _) = scheduler();
  let n2 = notifier.clone();
  let group = sequence![
    forever(&["arm"]).handle_interrupt(move || n2.interrupted()),
    forever(&["shooter"]),
  ].into_ref();

  scheduler.schedule(&group);
  scheduler.run(tick(0));
  scheduler.cancel(&group);
}

#[test]
fn test_handle_requests_apply_after_execute() {
  let (mut scheduler, _, _) = scheduler();
  let handle = scheduler.handle();
  let order = Rc::new(RefCell::new(vec![]));

  let o2 = order.clone();
  let o3 = order.clone();
  let queued = InstantCommand::new(move || o3.borrow_mut().push("queued"), &["shooter"]).into_ref();
  let q2 = queued.clone();
  let requester = InstantCommand::new(
    move || {
      o2.borrow_mut().push("requester");
      handle.schedule(&q2);
    },
    &["arm"],
  );

  scheduler.schedule_command(requester);
  assert_eq!(*order.borrow(), vec!["requester"]);
  assert_eq!(scheduler.handle().pending(), 1);

  scheduler.run(tick(0));
  assert_eq!(*order.borrow(), vec!["requester", "queued"]);
  assert_eq!(scheduler.handle().pending(), 0);
}

#[test]
fn test_fallback_respects_newer_claims() {
  let (mut scheduler, arm, _) = scheduler();
  let default = scheduler.set_default_command(arm.id(), forever(&["arm"])).unwrap();
  scheduler.run(tick(0));
  assert!(scheduler.is_scheduled(&default));

  let handle = scheduler.handle();
  let idle_runs = Rc::new(Cell::new(0));

  // Default holds the arm: the fallback replaces it.
  let i2 = idle_runs.clone();
  handle.schedule_fallback(InstantCommand::new(move || i2.set(i2.get() + 1), &["arm"]));
  scheduler.run(tick(1));
  assert_eq!(idle_runs.get(), 1);

  // A newcomer holds the arm: the fallback is dropped.
  let newcomer = scheduler.schedule_command(forever(&["arm"])).unwrap();
  let i3 = idle_runs.clone();
  handle.schedule_fallback(InstantCommand::new(move || i3.set(i3.get() + 1), &["arm"]));
  scheduler.run(tick(2));
  assert_eq!(idle_runs.get(), 1);
  assert!(scheduler.is_scheduled(&newcomer));
}

#[test]
fn test_lifecycle_order() {
  let (mut scheduler, _, _) = scheduler();
  let mut seq = Sequence::new();
  let mut mock = MockCommand::new();
  mock.expect_name().return_const("Mock".to_owned());
  mock.expect_requirements().returning(|| ["arm"].into_iter().collect());
  mock.expect_runs_when_disabled().return_const(false);
  mock.expect_interruption_behavior().return_const(InterruptionBehavior::CancelSelf);
  mock.expect_validate().returning(|| Ok(()));

  mock.expect_initialize().once().in_sequence(&mut seq).return_const(());
  mock.expect_execute().once().in_sequence(&mut seq).return_const(());
  mock.expect_is_finished().once().in_sequence(&mut seq).return_const(true);
  mock.expect_end().once().with(mockall::predicate::eq(false)).in_sequence(&mut seq).return_const(());

  scheduler.schedule_command(mock).unwrap();
  scheduler.run(tick(0));
  scheduler.run(tick(1));
}

#[test]
fn test_dashboard_buttons() {
  let (mut scheduler, _, _) = scheduler();
  scheduler.set_enabled(false);
  let dashboard = Dashboard::new();
  let mut buttons = CommandButtons::new(dashboard.clone());

  let burned = Rc::new(Cell::new(false));
  let b2 = burned.clone();
  buttons.put("burn to flash", InstantCommand::new(move || b2.set(true), &[]).ignoring_disable());
  buttons.put("Arm up", forever(&["arm"]));

  assert_eq!(buttons.press("burn to flash", &mut scheduler), Ok(true));
  assert!(burned.get());
  assert_eq!(buttons.press("Arm up", &mut scheduler), Ok(false));
  assert_eq!(
    buttons.press("Arm sideways", &mut scheduler),
    Err(CommandError::UnknownDashboardCommand("Arm sideways".to_owned()))
  );
  assert_eq!(dashboard.get_bool("Arm up/running"), Some(false));
}
