//! Error types raised while scheduling and subscribing.
//!
//! - [`ScheduleError`]: a scheduler could not accept a task.
//! - [`SubscribeError`]: the subscribe protocol failed, either because the
//!   source refused the observer or because a scheduler rejected the work.

use thiserror::Error;

/// Errors produced when a [`Scheduler`](crate::scheduler::Scheduler) cannot
/// take a task.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScheduleError {
  /// No async runtime is reachable from the calling context.
  #[error("no async runtime is available to schedule on")]
  NoRuntime,

  /// The executor refused the task, typically because it is shutting down.
  #[error("scheduler rejected the task: {0}")]
  Rejected(#[from] futures::task::SpawnError),

  /// The worker pool backing the scheduler could not be started.
  #[error("failed to start the worker pool: {0}")]
  Pool(#[from] std::io::Error),
}

impl ScheduleError {
  /// Returns a short stable label (snake_case) for use in logs.
  ///
  /// ```
  /// use rxdelay::error::ScheduleError;
  ///
  /// assert_eq!(ScheduleError::NoRuntime.as_label(), "schedule_no_runtime");
  /// ```
  pub fn as_label(&self) -> &'static str {
    match self {
      ScheduleError::NoRuntime => "schedule_no_runtime",
      ScheduleError::Rejected(_) => "schedule_rejected",
      ScheduleError::Pool(_) => "schedule_pool_failed",
    }
  }
}

/// Failure of [`Observable::actual_subscribe`].
///
/// A `Source` failure belongs to the stream and is meant for the observer's
/// error channel. A `Schedule` failure belongs to the caller that asked for
/// the subscription.
///
/// [`Observable::actual_subscribe`]: crate::observable::Observable::actual_subscribe
#[derive(Error, Debug)]
pub enum SubscribeError<E> {
  /// The upstream source failed to establish the subscription.
  #[error("upstream subscribe failed")]
  Source(E),

  /// A scheduler involved in the subscription rejected its task.
  #[error(transparent)]
  Schedule(#[from] ScheduleError),
}

impl<E> SubscribeError<E> {
  /// Returns the upstream error if this is a `Source` failure.
  ///
  /// ```rust
  /// use rxdelay::prelude::*;
  ///
  /// let err: SubscribeError<&str> = SubscribeError::Source("refused");
  /// assert_eq!(err.into_source(), Some("refused"));
  ///
  /// let err: SubscribeError<&str> = ScheduleError::NoRuntime.into();
  /// assert_eq!(err.into_source(), None);
  /// ```
  pub fn into_source(self) -> Option<E> {
    match self {
      SubscribeError::Source(err) => Some(err),
      SubscribeError::Schedule(_) => None,
    }
  }
}
