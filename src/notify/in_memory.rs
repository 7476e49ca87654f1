use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::HisaabError;
use crate::notify::{Notification, Notifier};

/// Records notifications instead of delivering them. Cloning shares the
/// underlying buffer, so tests can keep a handle and inspect what the
/// service sent.
#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        InMemoryNotifier::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, user_id: Uuid) -> Vec<Notification> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|notification| notification.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), HisaabError> {
        self.sent.write().await.push(notification);
        Ok(())
    }
}
