//! Subscription protocol
//!
//! A [`Subscription`] is the releasable handle returned from subscribing. It
//! is consumed by [`Subscription::unsubscribe`], so one handle cannot be
//! released twice.

mod boxed;
mod composite;

pub use boxed::*;
pub(crate) use composite::panic_message;
pub use composite::*;

/// Handle to an active effect (a subscription, a scheduled task) that must be
/// released to stop that effect.
pub trait Subscription {
  /// Stop the effect this handle represents and release its resources.
  fn unsubscribe(self);

  /// Returns `true` once there is nothing left to release.
  fn is_closed(&self) -> bool;
}

/// Unit subscription is always closed.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

/// `None` stands for a subscription that never got established.
impl<U: Subscription> Subscription for Option<U> {
  #[inline]
  fn unsubscribe(self) {
    if let Some(inner) = self {
      inner.unsubscribe()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().map_or(true, |s| s.is_closed()) }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
pub struct SubscriptionWrapper<T: Subscription>(pub(crate) T);

impl<T: Subscription> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> { SubscriptionGuard(Some(self.0)) }

  /// Consumes this wrapper and returns the underlying subscription.
  ///
  /// ```rust
  /// use rxdelay::prelude::*;
  ///
  /// TestScheduler::init();
  /// let composite: Option<CompositeSubscription> = observable::of(1)
  ///   .delay_subscription(Duration::from_secs(1), TestScheduler)
  ///   .subscribe(|_: i32| {})
  ///   .unwrap()
  ///   .into_inner();
  /// assert!(!composite.is_closed());
  /// ```
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: Subscription> Subscription for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(self) { self.0.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }

  /// Disarms the guard and hands the subscription back.
  ///
  /// ```rust
  /// use rxdelay::prelude::*;
  ///
  /// let composite = CompositeSubscription::default();
  /// let guard = SubscriptionGuard::new(composite.clone());
  /// let kept = guard.release();
  /// assert!(!composite.is_closed());
  /// kept.unsubscribe();
  /// assert!(composite.is_closed());
  /// ```
  pub fn release(mut self) -> Option<T> { self.0.take() }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.unsubscribe()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn option_subscription() {
    let none: Option<CompositeSubscription> = None;
    assert!(none.is_closed());
    none.unsubscribe();

    let inner = CompositeSubscription::default();
    let some = Some(inner.clone());
    assert!(!some.is_closed());
    some.unsubscribe();
    assert!(inner.is_closed());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let composite = CompositeSubscription::default();
    {
      let _guard = SubscriptionWrapper(composite.clone()).unsubscribe_when_dropped();
      assert!(!composite.is_closed());
    }
    assert!(composite.is_closed());
  }

  #[test]
  fn released_guard_keeps_subscription() {
    let composite = CompositeSubscription::default();
    let guard = SubscriptionGuard::new(composite.clone());
    let inner = guard.release();
    assert!(!composite.is_closed());
    inner.unsubscribe();
    assert!(composite.is_closed());
  }
}
