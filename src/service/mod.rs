use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants::{MAX_AMOUNT, MAX_TEXT_LENGTH};
use crate::error::HisaabError;
use crate::ledger::round2;
use crate::membership::Membership;
use crate::models::User;
use crate::notify::{Notification, Notifier};
use crate::storage::Storage;
use rust_decimal::Decimal;

pub mod expenses;
pub mod payments;
pub mod settlements;

pub use expenses::ExpenseDraft;
pub use settlements::{
    ExpenseSettlementView, GlobalSettlementView, GroupSettlementView, NamedTransfer, TransferParty,
    UserSettlementView,
};

/// Core ledger service: expense recording, settlement planning, and the
/// payment lifecycle, generic over its storage, membership, and
/// notification collaborators.
pub struct HisaabService<S: Storage, M: Membership, N: Notifier> {
    storage: S,
    membership: M,
    notifier: N,
}

impl<S: Storage, M: Membership, N: Notifier> HisaabService<S, M, N> {
    pub fn new(storage: S, membership: M, notifier: N) -> Self {
        info!("Initializing HisaabService");
        HisaabService {
            storage,
            membership,
            notifier,
        }
    }

    /// The membership registry this service consults.
    pub fn membership(&self) -> &M {
        &self.membership
    }

    /// The notification channel this service delivers through.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub async fn register_user(
        &self,
        name: String,
        username: String,
        email: String,
        upi_id: Option<String>,
    ) -> Result<User, HisaabError> {
        info!("Registering user with email: {}", email);
        Self::validate_text("name", &name)?;
        Self::validate_text("username", &username)?;
        if !email.contains('@') {
            return Err(HisaabError::invalid_input("email", "not a valid email address"));
        }

        let user = User {
            id: Uuid::new_v4(),
            name,
            username,
            email,
            upi_id,
            created_at: Utc::now(),
        };
        self.storage.create_user(user).await
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, HisaabError> {
        self.storage.get_user(user_id).await
    }

    /// Looks up a user that must exist.
    pub(crate) async fn require_user(&self, user_id: Uuid) -> Result<User, HisaabError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or(HisaabError::UserNotFound(user_id))
    }

    /// Delivers a notification without letting a delivery failure fail the
    /// surrounding ledger operation.
    pub(crate) async fn notify_quietly(&self, notification: Notification) {
        if let Err(err) = self.notifier.notify(notification).await {
            warn!("Notification delivery failed: {}", err);
        }
    }

    pub(crate) fn validate_text(field: &str, value: &str) -> Result<(), HisaabError> {
        if value.trim().is_empty() {
            return Err(HisaabError::invalid_input(field, "must not be empty"));
        }
        if value.len() > MAX_TEXT_LENGTH {
            return Err(HisaabError::invalid_input(
                field,
                format!("must not exceed {} characters", MAX_TEXT_LENGTH),
            ));
        }
        Ok(())
    }

    pub(crate) fn validate_amount(field: &str, amount: Decimal) -> Result<(), HisaabError> {
        if amount <= Decimal::ZERO {
            return Err(HisaabError::invalid_input(field, "must be positive"));
        }
        if amount > MAX_AMOUNT {
            return Err(HisaabError::invalid_input(
                field,
                format!("must not exceed {}", MAX_AMOUNT),
            ));
        }
        if round2(amount) != amount {
            return Err(HisaabError::invalid_input(
                field,
                "must not have more than two decimal places",
            ));
        }
        Ok(())
    }
}
