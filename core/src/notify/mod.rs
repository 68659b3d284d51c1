// core/src/notify/mod.rs

//! Turning a status change into an email and handing it to a transport.

pub mod compose;
pub mod dispatch;
pub mod notifier;

pub use compose::{compose_status_update, StatusUpdate};
pub use dispatch::{DeliveryReceipt, DispatchOutcome, Dispatcher, Envelope, NotificationTransport};
pub use notifier::{NotificationOutcome, OrderRef, StatusNotifier};
