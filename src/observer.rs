//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use std::convert::Infallible;

use crate::rc::{MutArc, RcDeref, RcDerefMut};

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: Err);

  /// Handle completion of the observable
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Returns `true` if the observer will not accept more values.
  fn is_closed(&self) -> bool;
}

impl<Item, F> Observer<Item, Infallible> for F
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, value: Item) { self(value) }

  #[inline]
  fn error(self, _: Infallible) {}

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// A shared observer slot.
///
/// Every clone feeds the same observer. The first terminal notification takes
/// the observer out of the slot, so later `next`/`error`/`complete` calls from
/// any clone are ignored and at most one terminal event is delivered.
impl<Item, Err, O> Observer<Item, Err> for MutArc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.rc_deref_mut().as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: Err) {
    let observer = self.rc_deref_mut().take();
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    let observer = self.rc_deref_mut().take();
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self
      .rc_deref()
      .as_ref()
      .map_or(true, |o| o.is_closed())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct Record {
    values: Vec<i32>,
  }

  struct RecordObserver(MutArc<Record>, MutArc<Vec<&'static str>>);

  impl Observer<i32, &'static str> for RecordObserver {
    fn next(&mut self, value: i32) { self.0.rc_deref_mut().values.push(value); }

    fn error(self, err: &'static str) { self.1.rc_deref_mut().push(err); }

    fn complete(self) { self.1.rc_deref_mut().push("complete"); }

    fn is_closed(&self) -> bool { false }
  }

  #[test]
  fn closure_observer_receives_values() {
    let mut seen = vec![];
    {
      let mut observer = |v: i32| seen.push(v);
      Observer::<i32, Infallible>::next(&mut observer, 1);
      Observer::<i32, Infallible>::next(&mut observer, 2);
      assert!(!Observer::<i32, Infallible>::is_closed(&observer));
    }
    assert_eq!(seen, vec![1, 2]);
  }

  #[test]
  fn shared_slot_delivers_single_terminal() {
    let record = MutArc::own(Record::default());
    let terminals = MutArc::own(vec![]);
    let slot = MutArc::own(Some(RecordObserver(record.clone(), terminals.clone())));

    let mut a = slot.clone();
    let b = slot.clone();
    a.next(1);
    b.error("boom");
    a.next(2);
    assert!(a.is_closed());
    a.complete();

    assert_eq!(record.rc_deref().values, vec![1]);
    assert_eq!(*terminals.rc_deref(), vec!["boom"]);
  }
}
