pub use crate::error::{ScheduleError, SubscribeError};
pub use crate::observable::{self, subscribe_safe, Observable, ObservableExt, ObservableOf};
pub use crate::observer::Observer;
pub use crate::ops::delay_subscription::DelaySubscriptionOp;
pub use crate::rc::{MutArc, RcDeref, RcDerefMut};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::{PoolConfig, ThreadPoolScheduler};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::scheduler::{
  DueTime, Duration, Instant, Scheduler, Task, TaskHandle, TestScheduler,
};
pub use crate::subscription::*;
