use std::convert::Infallible;

use crate::{
  error::SubscribeError,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Creates an observable that emits a single `value` and completes,
/// synchronously inside the subscribe call.
///
/// ```rust
/// use rxdelay::prelude::*;
///
/// let mut seen = None;
/// observable::of(7).subscribe(|v: i32| seen = Some(v)).unwrap();
/// assert_eq!(seen, Some(7));
/// ```
pub fn of<Item>(value: Item) -> ObservableOf<Item> { ObservableOf(value) }

#[derive(Clone, Debug)]
pub struct ObservableOf<Item>(Item);

impl<Item, O> Observable<Item, Infallible, O> for ObservableOf<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Result<Self::Unsub, SubscribeError<Infallible>> {
    if !observer.is_closed() {
      observer.next(self.0);
      observer.complete();
    }
    Ok(())
  }
}

impl<Item> ObservableExt<Item, Infallible> for ObservableOf<Item> {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    rc::{MutArc, RcDeref, RcDerefMut},
    subscription::Subscription,
  };

  #[test]
  fn emits_value_then_completes() {
    let values = MutArc::own(vec![]);
    let c_values = values.clone();
    let sub = of(1)
      .subscribe(move |v: i32| c_values.rc_deref_mut().push(v))
      .unwrap();

    assert_eq!(*values.rc_deref(), vec![1]);
    assert!(sub.is_closed());
  }
}
