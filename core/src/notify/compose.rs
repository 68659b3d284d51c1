// core/src/notify/compose.rs

//! Rendering of order status emails. Pure: no I/O, no clock reads.

use uuid::Uuid;

use crate::model::{format_amount, Notification, OrderStatus};

const STORE_NAME: &str = "Storefront";

/// Inputs for one status email.
///
/// `status` is a free-form label rather than an `OrderStatus` so that labels
/// this build does not know about still render.
#[derive(Debug, Clone)]
pub struct StatusUpdate<'a> {
  pub customer_name: &'a str,
  pub order_id: Uuid,
  pub status: &'a str,
  pub total_amount_cents: i64,
  pub currency: &'a str,
}

struct Template {
  subject: &'static str,
  headline: &'static str,
  message: &'static str,
}

fn template_for(status: OrderStatus) -> Template {
  match status {
    OrderStatus::Pending => Template {
      subject: "We received your order",
      headline: "Order received",
      message: "We have received your order and will confirm it shortly.",
    },
    OrderStatus::Confirmed => Template {
      subject: "Your order is confirmed",
      headline: "Order confirmed",
      message: "Good news! Your order has been confirmed and will be prepared for dispatch.",
    },
    OrderStatus::Processing => Template {
      subject: "Your order is being processed",
      headline: "Order processing",
      message: "Your order is being packed and will ship soon.",
    },
    OrderStatus::Shipped => Template {
      subject: "Your order has shipped",
      headline: "Order shipped",
      message: "Your order is on its way.",
    },
    OrderStatus::Delivered => Template {
      subject: "Your order was delivered",
      headline: "Order delivered",
      message: "Your order has been delivered. We hope you enjoy it!",
    },
    OrderStatus::Cancelled => Template {
      subject: "Your order was cancelled",
      headline: "Order cancelled",
      message: "Your order has been cancelled. Any payment taken will be refunded.",
    },
  }
}

/// Builds the subject and HTML body for a status update.
///
/// Always returns non-empty fields. The subject always carries the order id.
pub fn compose_status_update(update: &StatusUpdate<'_>, footer_year: i32) -> Notification {
  let (subject_line, headline, message) = match update.status.parse::<OrderStatus>() {
    Ok(status) => {
      let t = template_for(status);
      (t.subject.to_string(), t.headline.to_string(), t.message.to_string())
    }
    Err(_) => {
      let label = if update.status.trim().is_empty() {
        "updated".to_string()
      } else {
        escape_html(update.status.trim())
      };
      (
        "Your order status has changed".to_string(),
        "Order update".to_string(),
        format!("The status of your order is now '{}'.", label),
      )
    }
  };

  let name = if update.customer_name.trim().is_empty() {
    "there".to_string()
  } else {
    escape_html(update.customer_name.trim())
  };
  let total = escape_html(&format_amount(update.total_amount_cents, update.currency));

  let subject = format!("{}: {} (Order #{})", STORE_NAME, subject_line, update.order_id);
  let html_body = format!(
    concat!(
      "<html><body>",
      "<h2>{headline}</h2>",
      "<p>Hi {name},</p>",
      "<p>{message}</p>",
      "<table>",
      "<tr><td>Order</td><td>#{order_id}</td></tr>",
      "<tr><td>Total</td><td>{total}</td></tr>",
      "</table>",
      "<p>Thank you for shopping with {store}.</p>",
      "<footer>&copy; {year} {store}</footer>",
      "</body></html>"
    ),
    headline = headline,
    name = name,
    message = message,
    order_id = update.order_id,
    total = total,
    store = STORE_NAME,
    year = footer_year,
  );

  Notification { subject, html_body }
}

fn escape_html(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}
