use std::time::{SystemTime, UNIX_EPOCH};

use crate::units::{microsecond, QuantityBase, Time};

/// Wall clock time at the 1us resolution the scheduler works in.
pub fn now() -> Time {
  let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_micros()).unwrap_or(0);
  Time::new::<microsecond>(now as f64)
}

/// Rounds a time to whole microseconds. Durations are compared in this form so that a
/// 1 s timeout made of fifty 20 ms ticks is not lost to float drift.
pub fn micros(time: Time) -> i64 {
  time.to::<microsecond>().round() as i64
}

/// True once `elapsed` has reached `duration`, compared at microsecond resolution.
pub fn has_elapsed(elapsed: Time, duration: Time) -> bool {
  micros(elapsed) >= micros(duration)
}
