use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};
#[cfg(any(feature = "futures-scheduler", feature = "tokio-scheduler"))]
use std::{
  future::Future,
  panic::{self, AssertUnwindSafe},
  pin::Pin,
  task::{Context, Poll},
};

use futures::task::AtomicWaker;
#[cfg(any(feature = "futures-scheduler", feature = "tokio-scheduler"))]
use pin_project_lite::pin_project;

use crate::subscription::Subscription;

/// A unit of work: an owned state and a plain function that consumes it.
///
/// Using a `fn` pointer instead of a closure keeps everything the work needs
/// in `state`, spelled out as a type.
pub struct Task<S> {
  state: S,
  handler: fn(S),
}

impl<S> Task<S> {
  pub fn new(state: S, handler: fn(S)) -> Self { Self { state, handler } }

  pub fn run(self) { (self.handler)(self.state) }
}

struct TaskState {
  cancelled: AtomicBool,
  finished: AtomicBool,
  waker: AtomicWaker,
}

/// Handle to a scheduled [`Task`].
///
/// Unsubscribing marks the task cancelled and wakes its driver so a pending
/// timer is dropped promptly. Clones share state.
#[derive(Clone)]
pub struct TaskHandle(Arc<TaskState>);

impl TaskHandle {
  pub fn new() -> Self {
    Self(Arc::new(TaskState {
      cancelled: AtomicBool::new(false),
      finished: AtomicBool::new(false),
      waker: AtomicWaker::new(),
    }))
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) }

  #[inline]
  pub fn is_finished(&self) -> bool { self.0.finished.load(Ordering::Acquire) }

  pub(crate) fn finish(&self) { self.0.finished.store(true, Ordering::Release); }
}

impl Default for TaskHandle {
  fn default() -> Self { Self::new() }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) {
    if !self.0.cancelled.swap(true, Ordering::AcqRel) && !self.is_finished() {
      tracing::debug!("cancelling scheduled task");
    }
    self.0.waker.wake();
  }

  fn is_closed(&self) -> bool { self.is_finished() || self.is_cancelled() }
}

#[cfg(any(feature = "futures-scheduler", feature = "tokio-scheduler"))]
pin_project! {
    /// Drives a scheduled future until it completes or its handle is
    /// cancelled, then marks the handle finished.
    pub(crate) struct Cancellable<F> {
        #[pin]
        future: F,
        handle: TaskHandle,
    }
}

#[cfg(any(feature = "futures-scheduler", feature = "tokio-scheduler"))]
impl<F: Future<Output = ()>> Future for Cancellable<F> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.project();
    // The waker must be registered before the flag is read, otherwise a
    // cancel landing in between would never wake this task.
    this.handle.0.waker.register(cx.waker());
    if this.handle.is_cancelled() {
      this.handle.finish();
      return Poll::Ready(());
    }
    match this.future.poll(cx) {
      Poll::Ready(()) => {
        this.handle.finish();
        Poll::Ready(())
      }
      Poll::Pending => Poll::Pending,
    }
  }
}

/// Builds the future an executor-backed scheduler spawns: wait on `sleep`,
/// then run `task` unless `handle` was cancelled meanwhile.
#[cfg(any(feature = "futures-scheduler", feature = "tokio-scheduler"))]
pub(crate) fn delayed_task<S, Sl>(
  task: Task<S>,
  sleep: Option<Sl>,
  handle: TaskHandle,
) -> Cancellable<impl Future<Output = ()>>
where
  Sl: Future,
{
  let c_handle = handle.clone();
  let future = async move {
    if let Some(sleep) = sleep {
      sleep.await;
    }
    if !c_handle.is_cancelled() {
      run_guarded(task);
    }
  };
  Cancellable { future, handle }
}

/// Runs `task` on a worker without letting a panic escape into the executor.
#[cfg(any(feature = "futures-scheduler", feature = "tokio-scheduler"))]
fn run_guarded<S>(task: Task<S>) {
  if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
    tracing::error!(
      panic = crate::subscription::panic_message(&*payload),
      "scheduled task panicked"
    );
  }
}
