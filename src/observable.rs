//! Observable protocol and operator entry points.
//!
//! [`Observable::actual_subscribe`] is the raw protocol: it reports failures
//! to the caller. [`subscribe_safe`] and [`ObservableExt::subscribe`] layer
//! the safe convention on top, where a source failure is delivered through
//! the observer's error channel.

mod of;
pub use of::*;

use crate::{
  error::{ScheduleError, SubscribeError},
  observer::Observer,
  ops::delay_subscription::DelaySubscriptionOp,
  rc::MutArc,
  scheduler::{DueTime, Duration, Instant, Scheduler},
  subscription::{Subscription, SubscriptionWrapper},
};
#[cfg(feature = "futures-scheduler")]
use crate::scheduler::ThreadPoolScheduler;

/// A source of notifications that can be subscribed with an observer of type
/// `O`.
pub trait Observable<Item, Err, O> {
  type Unsub: Subscription;

  /// Subscribe `observer` to this source.
  ///
  /// On `Err` the observer has not been notified. Callers that want the
  /// error delivered to the observer use [`subscribe_safe`].
  fn actual_subscribe(self, observer: O) -> Result<Self::Unsub, SubscribeError<Err>>;
}

/// Subscribe `source` so that an upstream subscribe failure reaches
/// `observer.error` instead of the caller.
///
/// The observer is handed upstream through a shared [`MutArc`] slot, which
/// keeps it reachable after a failed subscribe. Returns `Ok(None)` when the
/// failure was delivered to the observer, and `Err` only when a scheduler
/// rejected the work.
pub fn subscribe_safe<Item, Err, O, S>(
  source: S,
  observer: O,
) -> Result<Option<S::Unsub>, ScheduleError>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, MutArc<Option<O>>>,
{
  let observer = MutArc::own(Some(observer));
  match source.actual_subscribe(observer.clone()) {
    Ok(unsub) => Ok(Some(unsub)),
    Err(SubscribeError::Source(err)) => {
      tracing::debug!("upstream subscribe failed, forwarding the error to the observer");
      Observer::<Item, Err>::error(observer, err);
      Ok(None)
    }
    Err(SubscribeError::Schedule(err)) => Err(err),
  }
}

pub trait ObservableExt<Item, Err>: Sized {
  /// Delay the subscription to this observable by `dur`, measured from the
  /// moment of subscription, using `scheduler`.
  ///
  /// Releasing the returned subscription before `dur` elapses means the
  /// source is never subscribed.
  ///
  /// If the source itself runs on a scheduler that rejects work once the
  /// delay has elapsed, the subscription is closed and the observer gets no
  /// terminal notification; the rejection is only logged.
  ///
  /// ```rust
  /// use rxdelay::prelude::*;
  ///
  /// TestScheduler::init();
  /// let sub = observable::of(1)
  ///   .delay_subscription(Duration::from_secs(5), TestScheduler)
  ///   .subscribe(|v: i32| println!("{}", v))
  ///   .unwrap();
  ///
  /// TestScheduler::advance_by(Duration::from_secs(2));
  /// sub.unsubscribe();
  /// assert_eq!(TestScheduler::pending_count(), 0);
  /// ```
  fn delay_subscription<SD>(self, dur: Duration, scheduler: SD) -> DelaySubscriptionOp<Self, SD>
  where
    SD: Scheduler,
  {
    DelaySubscriptionOp::new(self, DueTime::After(dur), scheduler)
  }

  /// Delay the subscription to this observable until `at`, using
  /// `scheduler`. An instant already in the past subscribes as soon as the
  /// scheduler runs the task.
  fn delay_subscription_at<SD>(self, at: Instant, scheduler: SD) -> DelaySubscriptionOp<Self, SD>
  where
    SD: Scheduler,
  {
    DelaySubscriptionOp::new(self, DueTime::At(at), scheduler)
  }

  /// [`delay_subscription`](ObservableExt::delay_subscription) on the
  /// process-wide [`ThreadPoolScheduler`].
  ///
  /// Fails before any timer exists if the shared pool cannot be started.
  #[cfg(feature = "futures-scheduler")]
  fn try_delay_subscription(
    self,
    dur: Duration,
  ) -> Result<DelaySubscriptionOp<Self, ThreadPoolScheduler>, ScheduleError> {
    Ok(self.delay_subscription(dur, ThreadPoolScheduler::shared()?))
  }

  /// [`delay_subscription_at`](ObservableExt::delay_subscription_at) on the
  /// process-wide [`ThreadPoolScheduler`].
  #[cfg(feature = "futures-scheduler")]
  fn try_delay_subscription_at(
    self,
    at: Instant,
  ) -> Result<DelaySubscriptionOp<Self, ThreadPoolScheduler>, ScheduleError> {
    Ok(self.delay_subscription_at(at, ThreadPoolScheduler::shared()?))
  }

  /// Subscribe `observer`, delivering a source failure to its error channel.
  ///
  /// Returns `Err` only when a scheduler rejected the subscription; the
  /// observer is dropped unnotified in that case.
  #[allow(clippy::type_complexity)]
  fn subscribe<O>(
    self,
    observer: O,
  ) -> Result<
    SubscriptionWrapper<Option<<Self as Observable<Item, Err, MutArc<Option<O>>>>::Unsub>>,
    ScheduleError,
  >
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, MutArc<Option<O>>>,
  {
    subscribe_safe::<Item, Err, O, Self>(self, observer).map(SubscriptionWrapper)
  }
}
