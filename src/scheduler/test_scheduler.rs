//! Test Scheduler for deterministic testing of delayed subscriptions.
//!
//! Provides virtual time that only advances when explicitly instructed, so a
//! test can place a cancel exactly before or after a due time.
//!
//! # Usage
//!
//! ```rust
//! use rxdelay::prelude::*;
//!
//! // Initialize the test scheduler (required before use)
//! TestScheduler::init();
//!
//! let _sub = observable::of(42)
//!   .delay_subscription(Duration::from_millis(100), TestScheduler)
//!   .subscribe(|v: i32| println!("{}", v))
//!   .unwrap();
//!
//! // Advance virtual time to trigger the delayed subscription
//! TestScheduler::advance_by(Duration::from_millis(100));
//!
//! // Or execute all pending tasks
//! TestScheduler::flush();
//! ```
//!
//! # Thread Safety
//!
//! TestScheduler uses thread-local storage, so each thread has its own
//! independent virtual time and task queue. Tasks run on the thread that
//! calls `advance_by` or `flush`.

use std::{cell::RefCell, cmp::Ordering, collections::BinaryHeap, time::Instant};

use super::{Duration, Scheduler, Task, TaskHandle};
use crate::error::ScheduleError;

struct TestSchedulerState {
  epoch: Instant,
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
  initialized: bool,
}

impl Default for TestSchedulerState {
  fn default() -> Self {
    Self {
      epoch: Instant::now(),
      virtual_time: Duration::ZERO,
      task_queue: BinaryHeap::new(),
      next_task_id: 0,
      initialized: false,
    }
  }
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Box<dyn FnOnce()>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

thread_local! {
  static TEST_SCHEDULER_STATE: RefCell<TestSchedulerState>
    = RefCell::new(TestSchedulerState::default());
}

/// A virtual time scheduler for deterministic testing.
///
/// This is a zero-sized type that accesses thread-local state.
/// All instances in the same thread share the same virtual time and task queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct TestScheduler;

impl TestScheduler {
  /// Initialize or reset the test scheduler state.
  ///
  /// Resets virtual time to zero, drops every queued task and moves the
  /// virtual epoch to the current wall-clock instant.
  pub fn init() {
    TEST_SCHEDULER_STATE.with(|state| {
      *state.borrow_mut() = TestSchedulerState { initialized: true, ..Default::default() };
    });
  }

  fn ensure_initialized() {
    TEST_SCHEDULER_STATE.with(|state| {
      assert!(
        state.borrow().initialized,
        "TestScheduler::init() must be called before using the scheduler"
      );
    });
  }

  /// Virtual time elapsed since `init()`.
  ///
  /// # Panics
  ///
  /// Panics if `init()` has not been called first.
  pub fn elapsed() -> Duration {
    Self::ensure_initialized();
    TEST_SCHEDULER_STATE.with(|state| state.borrow().virtual_time)
  }

  /// Number of queued tasks that have not been cancelled.
  ///
  /// # Panics
  ///
  /// Panics if `init()` has not been called first.
  pub fn pending_count() -> usize {
    Self::ensure_initialized();
    TEST_SCHEDULER_STATE.with(|state| {
      state
        .borrow()
        .task_queue
        .iter()
        .filter(|t| !t.handle.is_cancelled())
        .count()
    })
  }

  fn pop_due(target_time: Option<Duration>) -> Option<ScheduledTask> {
    TEST_SCHEDULER_STATE.with(|state| {
      let mut state = state.borrow_mut();
      let due = state
        .task_queue
        .peek()
        .map_or(false, |peek| target_time.map_or(true, |limit| peek.scheduled_time <= limit));
      if !due {
        return None;
      }
      let scheduled_task = state.task_queue.pop()?;
      if scheduled_task.scheduled_time > state.virtual_time {
        state.virtual_time = scheduled_task.scheduled_time;
      }
      Some(scheduled_task)
    })
  }

  fn execute_tasks_until(target_time: Option<Duration>) {
    // The state borrow is released before a task runs, so tasks may schedule
    // more work.
    while let Some(ScheduledTask { task, handle, .. }) = Self::pop_due(target_time) {
      if !handle.is_cancelled() {
        task();
      }
      handle.finish();
    }
  }

  /// Advance virtual time by the specified duration and execute due tasks.
  ///
  /// Tasks are executed in order of their scheduled time, with FIFO ordering
  /// for tasks scheduled at the same time. Cancelled tasks are discarded.
  ///
  /// # Panics
  ///
  /// Panics if `init()` has not been called first.
  pub fn advance_by(duration: Duration) {
    Self::ensure_initialized();
    let target_time = TEST_SCHEDULER_STATE.with(|state| state.borrow().virtual_time + duration);

    Self::execute_tasks_until(Some(target_time));

    TEST_SCHEDULER_STATE.with(|state| {
      state.borrow_mut().virtual_time = target_time;
    });
  }

  /// Execute all pending tasks by advancing time to each task's scheduled time.
  ///
  /// # Panics
  ///
  /// Panics if `init()` has not been called first.
  pub fn flush() {
    Self::ensure_initialized();
    Self::execute_tasks_until(None);
  }
}

impl Scheduler for TestScheduler {
  fn schedule<S: Send + 'static>(
    &self,
    task: Task<S>,
    delay: Option<Duration>,
  ) -> Result<TaskHandle, ScheduleError> {
    TestScheduler::ensure_initialized();
    let handle = TaskHandle::new();

    TEST_SCHEDULER_STATE.with(|state| {
      let mut state = state.borrow_mut();
      let scheduled_time = state.virtual_time + delay.unwrap_or(Duration::ZERO);
      let task_id = state.next_task_id;
      state.next_task_id += 1;

      tracing::trace!(?scheduled_time, task_id, "queueing task on test scheduler");
      state.task_queue.push(ScheduledTask {
        scheduled_time,
        task_id,
        task: Box::new(move || task.run()),
        handle: handle.clone(),
      });
    });

    Ok(handle)
  }

  fn now(&self) -> Instant {
    TEST_SCHEDULER_STATE.with(|state| {
      let state = state.borrow();
      state.epoch + state.virtual_time
    })
  }
}
