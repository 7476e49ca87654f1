use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::HisaabError;

pub mod in_memory;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PaymentRequest,
    PaymentConfirmed,
    PaymentRejected,
}

/// An event pushed to a user after a ledger action.
#[derive(Clone, Debug, Serialize)]
pub struct Notification {
    /// Recipient.
    pub user_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub message: String,
    pub payload: Value,
}

/// Delivery channel for [`Notification`]s.
///
/// Delivery is fire-and-forget from the ledger's point of view: the service
/// logs failures and completes the ledger operation regardless.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), HisaabError>;
}
