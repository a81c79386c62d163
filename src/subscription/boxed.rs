use super::Subscription;

/// Helper trait for calling unsubscribe on boxed trait objects
///
/// Since `Subscription::unsubscribe(self)` requires `Sized`, we need this
/// workaround trait to enable `Box<dyn Subscription>` to call unsubscribe.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription that can be released from any thread.
///
/// [`CompositeSubscription`](super::CompositeSubscription) stores its
/// children as `BoxedSubscriptionSend` so heterogeneous handles (a scheduled
/// task, an upstream subscription) can be released together.
pub struct BoxedSubscriptionSend(Box<dyn BoxedSubscriptionInner + Send>);

impl BoxedSubscriptionSend {
  /// Create a new thread-safe boxed subscription from any Send subscription
  /// type.
  #[inline]
  pub fn new(subscription: impl Subscription + Send + 'static) -> Self {
    Self(Box::new(subscription))
  }
}

impl Subscription for BoxedSubscriptionSend {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}
