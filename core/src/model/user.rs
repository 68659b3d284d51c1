// core/src/model/user.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a user record needed to address a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContact {
  pub id: Uuid,
  pub name: String,
  pub email: String,
}
