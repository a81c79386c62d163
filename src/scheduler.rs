//! Scheduler port
//!
//! A [`Scheduler`] runs a [`Task`] after an optional delay on its own
//! execution context and hands back a [`TaskHandle`]. Releasing the handle
//! before the task starts prevents it from running.
//!
//! Provided schedulers:
//!
//! - [`TestScheduler`]: virtual time, driven explicitly from tests
//! - `ThreadPoolScheduler` (`futures-scheduler`): futures thread pool with
//!   `futures-time` sleeps, plus a process-wide shared instance
//! - `TokioScheduler` (`tokio-scheduler`): spawns onto a tokio runtime

mod task;
mod test_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use std::time::{Duration, Instant};

pub use task::{Task, TaskHandle};
pub use test_scheduler::TestScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::{PoolConfig, ThreadPoolScheduler};
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

use crate::error::ScheduleError;

/// A Scheduler orders tasks and runs them on its own execution context.
pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Run `task` once `delay` has elapsed.
  ///
  /// The task never runs synchronously inside this call, not even for a
  /// `None` or zero delay. Releasing the returned handle before the task
  /// starts keeps it from running; releasing it afterwards has no effect on
  /// that run.
  fn schedule<S: Send + 'static>(
    &self,
    task: Task<S>,
    delay: Option<Duration>,
  ) -> Result<TaskHandle, ScheduleError>;

  /// The scheduler's notion of the current time, used to turn an absolute
  /// [`DueTime`] into a delay.
  fn now(&self) -> Instant { Instant::now() }
}

/// When a deferred action should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueTime {
  /// A duration from the moment of subscription.
  After(Duration),
  /// An absolute instant. Instants in the past mean "as soon as possible".
  At(Instant),
}

impl DueTime {
  /// The delay left until this due time, measured from `now`.
  pub fn delay_from(self, now: Instant) -> Duration {
    match self {
      DueTime::After(delay) => delay,
      DueTime::At(at) => at.saturating_duration_since(now),
    }
  }
}

impl From<Duration> for DueTime {
  #[inline]
  fn from(delay: Duration) -> Self { DueTime::After(delay) }
}

impl From<Instant> for DueTime {
  #[inline]
  fn from(at: Instant) -> Self { DueTime::At(at) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn relative_due_time_ignores_clock() {
    let now = Instant::now();
    let due = DueTime::from(Duration::from_millis(30));
    assert_eq!(due.delay_from(now), Duration::from_millis(30));
    assert_eq!(due.delay_from(now + Duration::from_secs(10)), Duration::from_millis(30));
  }

  #[test]
  fn absolute_due_time() {
    let now = Instant::now();
    let due = DueTime::from(now + Duration::from_secs(3));
    assert_eq!(due.delay_from(now), Duration::from_secs(3));
    assert_eq!(due.delay_from(now + Duration::from_secs(1)), Duration::from_secs(2));
  }

  #[test]
  fn past_instant_saturates_to_zero() {
    let now = Instant::now();
    let due = DueTime::At(now);
    assert_eq!(due.delay_from(now + Duration::from_secs(5)), Duration::ZERO);
  }
}
