//! Delay the subscription to a source until a due time.
//!
//! Every subscription goes through the following states:
//!
//! - `Pending`: the composite exists and the task is scheduled
//! - `Firing`: the task is subscribing upstream
//! - `Subscribed`: the upstream subscription is held by the composite
//! - `Released`: terminal, reachable from any of the above
//!
//! The scheduled task's handle and the upstream subscription are both added
//! to the same [`CompositeSubscription`], so releasing it is correct at any
//! point without knowing which state it is in.

use crate::{
  error::SubscribeError,
  observable::{subscribe_safe, Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::{DueTime, Scheduler, Task},
  subscription::{CompositeSubscription, Subscription},
};

#[derive(Debug, Clone)]
pub struct DelaySubscriptionOp<S, SD> {
  pub(crate) source: S,
  pub(crate) due: DueTime,
  pub(crate) scheduler: SD,
}

impl<S, SD> DelaySubscriptionOp<S, SD> {
  pub fn new(source: S, due: DueTime, scheduler: SD) -> Self { Self { source, due, scheduler } }

  /// When the upstream subscription is due, as given to the operator.
  ///
  /// ```rust
  /// use rxdelay::prelude::*;
  ///
  /// let op = observable::of(1).delay_subscription(Duration::from_secs(2), TestScheduler);
  /// assert_eq!(op.due_time(), DueTime::After(Duration::from_secs(2)));
  /// ```
  #[inline]
  pub fn due_time(&self) -> DueTime { self.due }
}

/// Everything the scheduled task needs, owned.
struct DelayedSubscribe<S, O> {
  source: S,
  observer: O,
  subscription: CompositeSubscription,
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for DelaySubscriptionOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, MutArc<Option<O>>> + Send + 'static,
  S::Unsub: Send + 'static,
  SD: Scheduler,
{
  type Unsub = CompositeSubscription;

  fn actual_subscribe(self, observer: O) -> Result<Self::Unsub, SubscribeError<Err>> {
    let Self { source, due, scheduler } = self;
    let delay = due.delay_from(scheduler.now());
    let subscription = CompositeSubscription::default();

    let state = DelayedSubscribe { source, observer, subscription: subscription.clone() };
    tracing::trace!(?delay, "scheduling delayed subscription");
    let handle = scheduler.schedule(
      Task::new(state, delayed_subscribe::<Item, Err, O, S>),
      Some(delay),
    )?;
    subscription.add(handle);

    Ok(subscription)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for DelaySubscriptionOp<S, SD> where
  S: ObservableExt<Item, Err>
{
}

fn delayed_subscribe<Item, Err, O, S>(state: DelayedSubscribe<S, O>)
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, MutArc<Option<O>>>,
  S::Unsub: Send + 'static,
{
  let DelayedSubscribe { source, observer, subscription } = state;
  if subscription.is_closed() {
    tracing::debug!("delayed subscription released before its due time");
    return;
  }

  tracing::debug!("due time reached, subscribing upstream");
  match subscribe_safe::<Item, Err, O, S>(source, observer) {
    // If a release raced with the subscribe above, `add` releases the
    // upstream subscription on the spot.
    Ok(Some(upstream)) => subscription.add(upstream),
    Ok(None) => {}
    Err(err) => {
      tracing::warn!(
        error = %err,
        label = err.as_label(),
        "scheduler rejected the upstream subscription"
      );
      subscription.unsubscribe();
    }
  }
}
