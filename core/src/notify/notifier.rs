// core/src/notify/notifier.rs

use chrono::Datelike;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::compose::{compose_status_update, StatusUpdate};
use super::dispatch::{DispatchOutcome, Dispatcher};
use crate::clock::Clock;
use crate::store::UserStore;

/// What happened when we tried to tell a customer about a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
  Sent,
  /// No user record for the order's owner.
  RecipientMissing,
  LookupFailed,
  DispatchFailed,
}

impl NotificationOutcome {
  pub fn as_str(&self) -> &'static str {
    match self {
      NotificationOutcome::Sent => "sent",
      NotificationOutcome::RecipientMissing => "recipient_missing",
      NotificationOutcome::LookupFailed => "lookup_failed",
      NotificationOutcome::DispatchFailed => "dispatch_failed",
    }
  }
}

/// The order fields a status email needs.
#[derive(Debug, Clone, Copy)]
pub struct OrderRef<'a> {
  pub order_id: Uuid,
  pub user_id: Uuid,
  pub total_amount_cents: i64,
  pub currency: &'a str,
}

/// Looks up the owner of an order, renders the email, and dispatches it.
/// Every failure is logged and folded into the returned outcome.
#[derive(Clone)]
pub struct StatusNotifier {
  users: Arc<dyn UserStore>,
  dispatcher: Dispatcher,
  clock: Arc<dyn Clock>,
}

impl StatusNotifier {
  pub fn new(users: Arc<dyn UserStore>, dispatcher: Dispatcher, clock: Arc<dyn Clock>) -> Self {
    Self {
      users,
      dispatcher,
      clock,
    }
  }

  #[instrument(
    name = "notifier::notify",
    skip(self, order, status),
    fields(order_id = %order.order_id, user_id = %order.user_id, status = %status)
  )]
  pub async fn notify(&self, order: OrderRef<'_>, status: &str) -> NotificationOutcome {
    let contact = match self.users.get_contact(order.user_id).await {
      Ok(Some(contact)) => contact,
      Ok(None) => {
        warn!("No user record for order owner; skipping notification.");
        return NotificationOutcome::RecipientMissing;
      }
      Err(e) => {
        warn!(error = %e, "User lookup failed; skipping notification.");
        return NotificationOutcome::LookupFailed;
      }
    };

    let notification = compose_status_update(
      &StatusUpdate {
        customer_name: &contact.name,
        order_id: order.order_id,
        status,
        total_amount_cents: order.total_amount_cents,
        currency: order.currency,
      },
      self.clock.now().year(),
    );
    debug!(subject = %notification.subject, "Composed status notification.");

    match self.dispatcher.dispatch(&contact.email, &notification).await {
      DispatchOutcome::Sent(_) => NotificationOutcome::Sent,
      DispatchOutcome::Failed { .. } => NotificationOutcome::DispatchFailed,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::ManualClock;
  use crate::memory::{InMemoryUserStore, RecordingTransport};
  use chrono::{TimeZone, Utc};

  fn notifier(users: Arc<InMemoryUserStore>, transport: Arc<RecordingTransport>) -> StatusNotifier {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2031, 6, 1, 0, 0, 0).unwrap()));
    StatusNotifier::new(users, Dispatcher::new(transport, "shop@example.com"), clock)
  }

  fn order_for(user_id: Uuid) -> OrderRef<'static> {
    OrderRef {
      order_id: Uuid::new_v4(),
      user_id,
      total_amount_cents: 50000,
      currency: "INR",
    }
  }

  #[tokio::test]
  async fn sends_to_the_owner_with_clock_year() {
    let users = Arc::new(InMemoryUserStore::new());
    let transport = Arc::new(RecordingTransport::default());
    let user_id = users.add("Ravi", "ravi@example.com");

    let outcome = notifier(users, transport.clone()).notify(order_for(user_id), "Shipped").await;

    assert_eq!(outcome, NotificationOutcome::Sent);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ravi@example.com");
    assert!(sent[0].html_body.contains("2031"));
  }

  #[tokio::test]
  async fn missing_and_failing_users_skip_dispatch() {
    let users = Arc::new(InMemoryUserStore::new());
    let transport = Arc::new(RecordingTransport::default());
    let broken = users.add("Broken", "broken@example.com");
    users.fail_lookup_for(broken);
    let n = notifier(users, transport.clone());

    assert_eq!(
      n.notify(order_for(Uuid::new_v4()), "Confirmed").await,
      NotificationOutcome::RecipientMissing
    );
    assert_eq!(n.notify(order_for(broken), "Confirmed").await, NotificationOutcome::LookupFailed);
    assert_eq!(transport.attempts(), 0);
  }

  #[tokio::test]
  async fn dispatch_failure_is_reported_not_raised() {
    let users = Arc::new(InMemoryUserStore::new());
    let transport = Arc::new(RecordingTransport::default());
    let user_id = users.add("Meera", "meera@example.com");
    transport.fail_for("meera@example.com");

    let outcome = notifier(users, transport.clone()).notify(order_for(user_id), "Confirmed").await;

    assert_eq!(outcome, NotificationOutcome::DispatchFailed);
    assert_eq!(transport.attempts(), 1);
  }
}
