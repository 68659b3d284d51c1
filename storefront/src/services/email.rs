// storefront/src/services/email.rs
use async_trait::async_trait;
use std::time::Duration;
use storefront_core::{DeliveryReceipt, Envelope, NotificationTransport};
use tracing::{info, warn};

/// Development transport: logs the message instead of delivering it.
///
/// Subjects containing "fail_test" are rejected so the failure path can be
/// exercised end to end.
#[derive(Debug, Clone)]
pub struct LogEmailTransport {
  latency: Duration,
}

impl LogEmailTransport {
  pub fn new(latency: Duration) -> Self {
    Self { latency }
  }
}

impl Default for LogEmailTransport {
  fn default() -> Self {
    Self::new(Duration::from_millis(20))
  }
}

#[async_trait]
impl NotificationTransport for LogEmailTransport {
  async fn send(&self, envelope: &Envelope) -> anyhow::Result<DeliveryReceipt> {
    info!(
      "Simulating sending email: To='{}', From='{}', Subject='{}'",
      envelope.to, envelope.from, envelope.subject
    );
    tokio::time::sleep(self.latency).await; // Simulate network latency

    if envelope.subject.to_lowercase().contains("fail_test") {
      warn!("Simulated email failure for subject: {}", envelope.subject);
      anyhow::bail!("Simulated email send failure");
    }

    let body_preview = envelope.html_body.chars().take(50).collect::<String>() + "...";
    let message_id = format!("log_email_{}", uuid::Uuid::new_v4());
    info!(body_preview = %body_preview, "Email logged. Message ID: {}", message_id);

    Ok(DeliveryReceipt { message_id })
  }
}
