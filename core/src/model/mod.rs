// core/src/model/mod.rs

//! Plain data carried between the stores, the sweep, and the notifier.

pub mod notification;
pub mod order;
pub mod user;

pub use notification::{format_amount, Notification};
pub use order::{NewOrder, Order, OrderStatus, OrderTimestamp, PendingOrder, UnknownStatus};
pub use user::UserContact;
