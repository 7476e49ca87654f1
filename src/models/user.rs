use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    /// UPI address used to receive money. Required before this user can be
    /// the payee of a UPI payment.
    pub upi_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
