use futures::{executor::ThreadPool, task::SpawnExt};
use once_cell::sync::OnceCell;

use super::{task::delayed_task, Duration, Scheduler, Task, TaskHandle};
use crate::error::ScheduleError;

static DEFAULT_POOL: OnceCell<ThreadPoolScheduler> = OnceCell::new();

/// Settings for the worker pool behind a [`ThreadPoolScheduler`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
  /// Number of worker threads. `None` uses one per CPU.
  pub pool_size: Option<usize>,
  /// Prefix for worker thread names; the worker index is appended.
  pub name_prefix: String,
}

impl Default for PoolConfig {
  fn default() -> Self { Self { pool_size: None, name_prefix: "rxdelay-worker-".to_owned() } }
}

impl PoolConfig {
  pub fn pool_size(mut self, size: usize) -> Self {
    self.pool_size = Some(size);
    self
  }

  pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.name_prefix = prefix.into();
    self
  }
}

/// Scheduler that runs tasks on a futures [`ThreadPool`], sleeping with
/// `futures-time` timers.
#[derive(Clone, Debug)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  pub fn new(pool: ThreadPool) -> Self { Self { pool } }

  /// Start a dedicated worker pool.
  pub fn with_config(config: &PoolConfig) -> Result<Self, ScheduleError> {
    let mut builder = ThreadPool::builder();
    builder.name_prefix(config.name_prefix.clone());
    if let Some(size) = config.pool_size {
      builder.pool_size(size);
    }
    let pool = builder.create()?;
    tracing::debug!(pool_size = ?config.pool_size, prefix = %config.name_prefix, "started worker pool");
    Ok(Self { pool })
  }

  /// The process-wide scheduler used by `try_delay_subscription*`.
  ///
  /// The pool is started on first use with [`PoolConfig::default`] and
  /// shared afterwards. Fails if the pool cannot be started.
  pub fn shared() -> Result<Self, ScheduleError> {
    DEFAULT_POOL
      .get_or_try_init(|| Self::with_config(&PoolConfig::default()))
      .cloned()
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule<S: Send + 'static>(
    &self,
    task: Task<S>,
    delay: Option<Duration>,
  ) -> Result<TaskHandle, ScheduleError> {
    let handle = TaskHandle::new();
    let sleep = delay.map(|d| futures_time::task::sleep(futures_time::time::Duration::from(d)));
    tracing::trace!(?delay, "spawning task on worker pool");
    self
      .pool
      .spawn(delayed_task(task, sleep, handle.clone()))?;
    Ok(handle)
  }
}
