use std::{
  error::Error,
  fmt,
  future::Future,
  sync::{atomic::{AtomicBool, AtomicUsize, Ordering}, Arc},
  time::Duration,
};

use env_logger::fmt::Color;
use log::{error, info, warn};

use crate::{time::micros, units::Time};

#[derive(Clone, Debug)]
pub struct RobotState {
  pub(crate) inner: Arc<AtomicBool>,
}

impl RobotState {
  pub fn new() -> Self {
    Self { inner: Arc::new(AtomicBool::new(true)) }
  }

  pub fn running(&self) -> bool {
    self.inner.load(Ordering::Relaxed)
  }

  pub fn stop(&self) {
    self.inner.store(false, Ordering::Relaxed)
  }
}

impl Default for RobotState {
  fn default() -> Self {
    Self::new()
  }
}

#[macro_export]
macro_rules! robot_main {
  ($func:ident) => {
    pub fn main() {
      $crate::start::init_all($func);
    }
  };
  (async $func:ident) => {
    pub fn main() {
      $crate::start::init_all(|running: $crate::start::RobotState| {
        let fut = $func(running.clone());
        $crate::start::run_async(running, fut)
      });
    }
  };
}

pub type RobotResult = Result<(), Box<dyn Error>>;

pub fn init_all<F: FnOnce(RobotState) -> RobotResult>(f: F) {
  log_init();

  info!("**** Running Robot ****");

  match f(RobotState::new()) {
    Ok(()) => warn!("Robot Exited Gracefully"),
    Err(e) => error!("Robot Error: {}", e),
  }
}

/// Drives an async robot program on a current-thread runtime until it returns, the running
/// flag is cleared, or the process receives Ctrl-C.
pub fn run_async<F: Future<Output = RobotResult>>(running: RobotState, fut: F) -> RobotResult {
  let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

  runtime.block_on(async move {
    tokio::select! {
      result = fut => result,
      _ = async {
        loop {
          if !running.running() {
            return;
          }
          tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
      } => Ok(()),
      _ = tokio::signal::ctrl_c() => {
        warn!("Interrupted, stopping robot");
        running.stop();
        Ok(())
      }
    }
  })
}

/// Calls `tick` once per `period` until the running flag is cleared. The time handed to
/// `tick` is `n * period` from the first tick, so a simulated match is deterministic; with
/// `realtime` the loop is also paced to the wall clock.
pub async fn periodic_loop<F>(state: &RobotState, period: Time, realtime: bool, mut tick: F) -> RobotResult
where
  F: FnMut(Time) -> RobotResult,
{
  let mut interval = tokio::time::interval(Duration::from_micros(micros(period).max(1) as u64));
  interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

  let mut n = 0u64;
  while state.running() {
    if realtime {
      interval.tick().await;
    } else {
      tokio::task::yield_now().await;
    }
    tick(period * n as f64)?;
    n += 1;
  }
  Ok(())
}

static MAX_MODULE_WIDTH: AtomicUsize = AtomicUsize::new(0);

fn max_target_width(target: &str) -> usize {
  let max_width = MAX_MODULE_WIDTH.load(Ordering::Relaxed);
  if max_width < target.len() {
    MAX_MODULE_WIDTH.store(target.len(), Ordering::Relaxed);
    target.len()
  } else {
    max_width
  }
}

struct Padded<T> {
  value: T,
  width: usize,
}

impl<T: fmt::Display> fmt::Display for Padded<T> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{: <width$}", self.value, width = self.width)
  }
}

/// Info by default, overridable through `RUST_LOG`. Safe to call more than once.
pub fn log_init() {
  let _ = env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .target(env_logger::Target::Stdout)
    .format(|f, record| {
      use std::io::Write;
      let target = record.target();
      let max_width = max_target_width(target);
      let level = f.default_styled_level(record.level());
      let mut message_style = f.style();

      match record.level() {
        log::Level::Error => { message_style.set_bold(true).set_color(Color::Red); },
        log::Level::Warn => { message_style.set_color(Color::Yellow); },
        _ => ()
      };

      let mut style = f.style();
      let target = style.set_bold(true).value(Padded {
        value: target,
        width: max_width,
      });

      let time = f.timestamp_millis();

      writeln!(f, " {} {:>5} {} > {}", time, level, target, message_style.value(format!("{}", record.args())))
    })
    .try_init();
}
