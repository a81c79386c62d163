use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

pub trait RcDeref {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a>;
}

pub trait RcDerefMut {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a>;
}

/// Shared, lock-protected value that can cross threads.
///
/// `MutArc<Option<O>>` is the slot the delayed subscription hands upstream in
/// place of the downstream observer: the observer can be taken back out to
/// deliver an error when the upstream subscribe fails.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }
}

impl<T> From<T> for MutArc<T> {
  #[inline]
  fn from(v: T) -> Self { Self::own(v) }
}

impl<T> RcDeref for MutArc<T> {
  type Target<'a>
  where
    Self: 'a,
  = MutexGuard<'a, T>;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a> { self.0.lock() }
}

impl<T> RcDerefMut for MutArc<T> {
  type Target<'a>
  where
    Self: 'a,
  = MutexGuard<'a, T>;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a> { self.0.lock() }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_the_value() {
    let a = MutArc::own(1);
    let b = a.clone();
    *b.rc_deref_mut() += 1;
    assert_eq!(*a.rc_deref(), 2);
    assert_eq!(*MutArc::own(2).rc_deref(), 2);
  }
}
