// core/src/notify/dispatch.rs

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::model::Notification;

/// A fully addressed message as handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
  pub from: String,
  pub to: String,
  pub subject: String,
  pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
  pub message_id: String,
}

/// The outbound email (or other channel) integration.
///
/// Implementations make one attempt per call and report failure through the
/// returned error; they do not retry.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
  async fn send(&self, envelope: &Envelope) -> anyhow::Result<DeliveryReceipt>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
  Sent(DeliveryReceipt),
  Failed { reason: String },
}

impl DispatchOutcome {
  pub fn is_sent(&self) -> bool {
    matches!(self, DispatchOutcome::Sent(_))
  }
}

/// Wraps a transport so that callers never see a transport error.
#[derive(Clone)]
pub struct Dispatcher {
  transport: Arc<dyn NotificationTransport>,
  sender: String,
}

impl Dispatcher {
  pub fn new(transport: Arc<dyn NotificationTransport>, sender: impl Into<String>) -> Self {
    Self {
      transport,
      sender: sender.into(),
    }
  }

  pub fn sender(&self) -> &str {
    &self.sender
  }

  #[instrument(name = "dispatcher::dispatch", skip(self, notification), fields(to = %to))]
  pub async fn dispatch(&self, to: &str, notification: &Notification) -> DispatchOutcome {
    if to.trim().is_empty() {
      warn!(subject = %notification.subject, "Refusing to dispatch notification without a recipient address.");
      return DispatchOutcome::Failed {
        reason: "empty recipient address".to_string(),
      };
    }

    let envelope = Envelope {
      from: self.sender.clone(),
      to: to.trim().to_string(),
      subject: notification.subject.clone(),
      html_body: notification.html_body.clone(),
    };

    match self.transport.send(&envelope).await {
      Ok(receipt) => {
        info!(message_id = %receipt.message_id, subject = %envelope.subject, "Notification dispatched.");
        DispatchOutcome::Sent(receipt)
      }
      Err(e) => {
        warn!(error = %e, subject = %envelope.subject, "Notification dispatch failed; not retrying.");
        DispatchOutcome::Failed { reason: e.to_string() }
      }
    }
  }
}

impl std::fmt::Debug for Dispatcher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Dispatcher").field("sender", &self.sender).finish()
  }
}
