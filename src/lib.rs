//! # rxdelay: delayed subscription for Reactive Extensions
//!
//! Defers the subscription to an upstream observable until a relative
//! duration elapses or an absolute instant is reached, and releases every
//! resource it created no matter how the timer, the upstream subscribe and a
//! downstream cancel interleave.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxdelay::prelude::*;
//!
//! TestScheduler::init();
//!
//! let sub = observable::of(42)
//!   .delay_subscription(Duration::from_secs(5), TestScheduler)
//!   .subscribe(|v: i32| println!("Value: {}", v))
//!   .unwrap();
//!
//! // Nothing has been subscribed upstream yet.
//! TestScheduler::advance_by(Duration::from_secs(2));
//!
//! // Cancel before the due time: upstream is never touched.
//! sub.unsubscribe();
//! TestScheduler::flush();
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A source that can be subscribed with an observer |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`CompositeSubscription`] | Releases a group of subscriptions, including ones added late |
//! | [`Scheduler`] | Runs a [`Task`] after a delay, cancellable through its [`TaskHandle`] |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `ThreadPoolScheduler` backed by the
//!   futures thread pool, and the `try_delay_subscription*` operators that use
//!   it as the process-wide default scheduler
//! - **`timer`** (default): `futures-time` sleeps used by the thread pool
//! - **`tokio-scheduler`**: `TokioScheduler` spawning onto a tokio runtime
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`CompositeSubscription`]: subscription::CompositeSubscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`Task`]: scheduler::Task
//! [`TaskHandle`]: scheduler::TaskHandle

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subscription;

pub use prelude::*;
