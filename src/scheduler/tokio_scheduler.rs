use tokio::runtime::Handle;

use super::{task::delayed_task, Duration, Scheduler, Task, TaskHandle};
use crate::error::ScheduleError;

/// Scheduler that spawns tasks onto a tokio runtime.
///
/// The runtime must have its time driver enabled when delays are used.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { Self { handle } }

  /// Bind to the runtime of the calling context.
  ///
  /// Fails with [`ScheduleError::NoRuntime`] outside a tokio runtime, before
  /// anything is scheduled.
  pub fn try_current() -> Result<Self, ScheduleError> {
    Handle::try_current()
      .map(Self::new)
      .map_err(|_| ScheduleError::NoRuntime)
  }
}

impl Scheduler for TokioScheduler {
  fn schedule<S: Send + 'static>(
    &self,
    task: Task<S>,
    delay: Option<Duration>,
  ) -> Result<TaskHandle, ScheduleError> {
    let handle = TaskHandle::new();
    // The sleep is created inside the spawned future: tokio timers can only
    // be built within the runtime context.
    let sleep = delay.map(|d| async move { tokio::time::sleep(d).await });
    tracing::trace!(?delay, "spawning task on tokio runtime");
    self
      .handle
      .spawn(delayed_task(task, sleep, handle.clone()));
    Ok(handle)
  }
}
