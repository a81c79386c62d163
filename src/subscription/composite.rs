//! CompositeSubscription: release a group of subscriptions as one.
//!
//! The composite closes the race between a cancel and a subscription that is
//! still being created on another thread: whatever is added after the
//! composite was released is released on the spot instead of being stored.

use std::{
  any::Any,
  fmt::{Debug, Formatter},
  panic::{self, AssertUnwindSafe},
  sync::Arc,
};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{BoxedSubscriptionSend, Subscription};

type Teardown = SmallVec<[BoxedSubscriptionSend; 2]>;

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: Teardown,
}

/// A subscription that owns other subscriptions and releases them together.
///
/// Clones share state. Every subscription handed to [`add`] is released
/// exactly once: either by the first [`unsubscribe`], or immediately inside
/// `add` when the composite was already released.
///
/// ```rust
/// use rxdelay::prelude::*;
///
/// let composite = CompositeSubscription::default();
/// let child = CompositeSubscription::default();
/// composite.add(child.clone());
///
/// composite.clone().unsubscribe();
/// assert!(child.is_closed());
///
/// // Late additions are released right away.
/// let late = CompositeSubscription::default();
/// composite.add(late.clone());
/// assert!(late.is_closed());
/// ```
///
/// [`add`]: CompositeSubscription::add
/// [`unsubscribe`]: Subscription::unsubscribe
#[derive(Clone, Default)]
pub struct CompositeSubscription(Arc<Mutex<Inner>>);

impl CompositeSubscription {
  /// Hand `subscription` over to this composite.
  ///
  /// A concurrent `unsubscribe` either sees the new child or `add` sees the
  /// composite closed and releases the child itself. Children that already
  /// report closed are pruned on the way. Children are only queried with no
  /// lock held, so composites may contain each other.
  pub fn add<S: Subscription + Send + 'static>(&self, subscription: S) {
    if self.is_same(&subscription) {
      return;
    }

    let mut teardown = {
      let mut inner = self.0.lock();
      if inner.closed {
        drop(inner);
        tracing::trace!("composite already released, releasing late subscription");
        subscription.unsubscribe();
        return;
      }
      std::mem::take(&mut inner.teardown)
    };
    teardown.retain(|s| !s.is_closed());
    teardown.push(BoxedSubscriptionSend::new(subscription));

    let mut inner = self.0.lock();
    if inner.closed {
      // Released while pruning: what was taken out is still ours to release.
      drop(inner);
      release_all(teardown);
    } else {
      teardown.extend(inner.teardown.drain(..));
      inner.teardown = teardown;
    }
  }

  /// Number of children currently held.
  pub fn len(&self) -> usize { self.0.lock().teardown.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn is_same(&self, other: &dyn Any) -> bool {
    other
      .downcast_ref::<Self>()
      .map_or(false, |other| Arc::ptr_eq(&self.0, &other.0))
  }
}

impl Subscription for CompositeSubscription {
  /// Releases every child outside the lock. A child that panics does not stop
  /// its siblings from being released; the first panic is resumed once all
  /// of them are done.
  fn unsubscribe(self) {
    let teardown = {
      let mut inner = self.0.lock();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    release_all(teardown);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().closed }
}

impl Debug for CompositeSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.lock();
    f.debug_struct("CompositeSubscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

fn release_all(teardown: Teardown) {
  let mut first_panic = None;
  for subscription in teardown {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| subscription.unsubscribe())) {
      tracing::error!(panic = panic_message(&*payload), "releasing a child subscription panicked");
      first_panic.get_or_insert(payload);
    }
  }
  if let Some(payload) = first_panic {
    panic::resume_unwind(payload);
  }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
  if let Some(msg) = payload.downcast_ref::<&'static str>() {
    msg
  } else if let Some(msg) = payload.downcast_ref::<String>() {
    msg.as_str()
  } else {
    "<non-string panic payload>"
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
  };

  use super::*;

  /// Counts how many times it was released.
  #[derive(Clone, Default)]
  struct Counted(Arc<AtomicUsize>);

  impl Counted {
    fn releases(&self) -> usize { self.0.load(Ordering::SeqCst) }
  }

  impl Subscription for Counted {
    fn unsubscribe(self) { self.0.fetch_add(1, Ordering::SeqCst); }

    fn is_closed(&self) -> bool { self.releases() > 0 }
  }

  struct Exploding;

  impl Subscription for Exploding {
    fn unsubscribe(self) { panic!("release failed") }

    fn is_closed(&self) -> bool { false }
  }

  #[test]
  fn add_then_release() {
    let composite = CompositeSubscription::default();
    let a = Counted::default();
    let b = Counted::default();
    composite.add(a.clone());
    composite.add(b.clone());
    assert_eq!(composite.len(), 2);

    composite.clone().unsubscribe();
    assert!(composite.is_closed());
    assert!(composite.is_empty());
    assert_eq!(a.releases(), 1);
    assert_eq!(b.releases(), 1);
  }

  #[test]
  fn add_after_release_is_released_immediately() {
    let composite = CompositeSubscription::default();
    composite.clone().unsubscribe();

    let late = Counted::default();
    composite.add(late.clone());
    assert_eq!(late.releases(), 1);
    assert!(composite.is_empty());
  }

  #[test]
  fn release_is_idempotent() {
    let composite = CompositeSubscription::default();
    let a = Counted::default();
    composite.add(a.clone());

    composite.clone().unsubscribe();
    composite.clone().unsubscribe();
    composite.unsubscribe();
    assert_eq!(a.releases(), 1);
  }

  #[test]
  fn closed_children_are_pruned() {
    let composite = CompositeSubscription::default();
    let done = Counted::default();
    composite.add(done.clone());
    done.clone().unsubscribe();

    composite.add(Counted::default());
    assert_eq!(composite.len(), 1);
  }

  #[test]
  fn adding_itself_is_ignored() {
    let composite = CompositeSubscription::default();
    composite.add(composite.clone());
    assert!(composite.is_empty());
  }

  #[test]
  fn panicking_child_does_not_leak_siblings() {
    let composite = CompositeSubscription::default();
    let before = Counted::default();
    let after = Counted::default();
    composite.add(before.clone());
    composite.add(Exploding);
    composite.add(after.clone());

    let c_composite = composite.clone();
    let res = panic::catch_unwind(AssertUnwindSafe(move || c_composite.unsubscribe()));

    assert!(res.is_err());
    assert!(composite.is_closed());
    assert_eq!(before.releases(), 1);
    assert_eq!(after.releases(), 1);
  }

  #[test]
  fn concurrent_add_and_release_never_leaks() {
    for _ in 0..200 {
      let composite = CompositeSubscription::default();
      let children: Vec<Counted> = (0..8).map(|_| Counted::default()).collect();

      let adders: Vec<_> = children
        .iter()
        .cloned()
        .map(|child| {
          let composite = composite.clone();
          thread::spawn(move || composite.add(child))
        })
        .collect();
      let releaser = {
        let composite = composite.clone();
        thread::spawn(move || composite.unsubscribe())
      };

      for t in adders {
        t.join().unwrap();
      }
      releaser.join().unwrap();

      for child in &children {
        assert_eq!(child.releases(), 1);
      }
    }
  }

  #[test]
  fn composites_holding_each_other_add_concurrently() {
    let a = CompositeSubscription::default();
    let b = CompositeSubscription::default();
    a.add(b.clone());
    b.add(a.clone());

    let workers: Vec<_> = [(a.clone(), b.clone()), (b.clone(), a.clone())]
      .into_iter()
      .map(|(target, other)| {
        thread::spawn(move || {
          for _ in 0..1000 {
            target.add(other.clone());
            target.add(Counted::default());
          }
        })
      })
      .collect();
    for t in workers {
      t.join().unwrap();
    }

    a.clone().unsubscribe();
    assert!(a.is_closed());
    assert!(b.is_closed());
  }

  #[test]
  fn panic_message_reads_payloads() {
    let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
    assert_eq!(panic_message(&*payload), "static");
    let payload = panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
    assert_eq!(panic_message(&*payload), "owned");
  }
}
