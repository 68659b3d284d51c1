// core/src/model/notification.rs

use serde::Serialize;

/// A rendered message, ready to hand to a transport. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
  pub subject: String,
  pub html_body: String,
}

/// Renders an amount held in minor units, e.g. `50000, "INR"` as `INR 500.00`.
pub fn format_amount(amount_cents: i64, currency: &str) -> String {
  let sign = if amount_cents < 0 { "-" } else { "" };
  let abs = amount_cents.unsigned_abs();
  format!("{} {}{}.{:02}", currency, sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn formats_whole_and_fractional_amounts() {
    assert_eq!(format_amount(50000, "INR"), "INR 500.00");
    assert_eq!(format_amount(1999, "USD"), "USD 19.99");
    assert_eq!(format_amount(5, "EUR"), "EUR 0.05");
    assert_eq!(format_amount(-250, "USD"), "USD -2.50");
  }
}
