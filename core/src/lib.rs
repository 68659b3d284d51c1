// src/lib.rs

//! Storefront core: the periodic order auto-confirmation sweep.
//!
//! The crate provides:
//!  - The order/user/notification data model, including normalisation of
//!    creation timestamps that arrive in different shapes.
//!  - `OrderStore`, `UserStore`, and `NotificationTransport` traits, the only
//!    way the sweep touches the outside world.
//!  - A pure composer for status-update emails and a dispatcher that never
//!    lets a transport failure escape.
//!  - `AutoConfirmSweep`, which confirms pending orders older than a threshold
//!    with per-order failure isolation and bounded concurrency.
//!  - `SweepScheduler`, a fixed-interval driver with a per-run timeout.
//!  - In-memory stores and a recording transport with fault injection.

pub mod clock;
pub mod error;
pub mod memory;
pub mod model;
pub mod notify;
pub mod scheduler;
pub mod store;
pub mod sweep;

// --- Re-exports for the Public API ---

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::error::{StoreError, StoreResult, SweepError, SweepResult, TimestampError};
pub use crate::model::{
  format_amount, NewOrder, Notification, Order, OrderStatus, OrderTimestamp, PendingOrder, UnknownStatus,
  UserContact,
};
pub use crate::notify::{
  compose_status_update, DeliveryReceipt, DispatchOutcome, Dispatcher, Envelope, NotificationOutcome,
  NotificationTransport, OrderRef, StatusNotifier, StatusUpdate,
};
pub use crate::scheduler::SweepScheduler;
pub use crate::store::{OrderStore, UserStore};
pub use crate::sweep::{report_outcome, AutoConfirmSweep, LoggingReporter, RunReporter, SweepConfig, SweepReport};

/*
    Wiring:
    1. Implement `OrderStore` and `UserStore` over your datastore (or use `memory`).
    2. Implement `NotificationTransport` for your mail provider and wrap it in a
       `Dispatcher` with the sender address.
    3. Build an `AutoConfirmSweep` with a `SweepConfig`.
    4. Either call `sweep.invoke(reporter)` from an external scheduler, or hand
       the sweep to `SweepScheduler::spawn` with a shutdown future.
*/
