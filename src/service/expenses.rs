use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::error::HisaabError;
use crate::ledger::compute_splits;
use crate::membership::Membership;
use crate::models::{Expense, Participant, ShareStatus, SplitPolicy};
use crate::notify::Notifier;
use crate::service::HisaabService;
use crate::storage::Storage;

/// Expense input as it reaches the service, already normalized by the API
/// boundary.
#[derive(Clone, Debug)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub paid_by: Uuid,
    pub group_id: Option<Uuid>,
    pub split_policy: SplitPolicy,
    pub participants: Vec<Participant>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl<S: Storage, M: Membership, N: Notifier> HisaabService<S, M, N> {
    /// Records an expense with its frozen split.
    ///
    /// `actor_id` is the user entering the expense; they may only split
    /// with their friends, and may record an expense paid by someone else
    /// only when that payer is also a friend. The payer's own split entry
    /// is settled from the start.
    pub async fn create_expense(&self, actor_id: Uuid, draft: ExpenseDraft) -> Result<Expense, HisaabError> {
        info!(
            "User {} creating expense '{}' for {}",
            actor_id, draft.description, draft.amount
        );
        Self::validate_text("description", &draft.description)?;
        Self::validate_amount("amount", draft.amount)?;
        self.require_user(actor_id).await?;
        self.require_user(draft.paid_by).await?;

        if draft.paid_by != actor_id
            && !self
                .membership
                .is_authorized_participant(actor_id, draft.paid_by)
                .await?
        {
            return Err(HisaabError::Forbidden(format!(
                "You can only record expenses paid by friends; {} is not in your friend list",
                draft.paid_by
            )));
        }

        let splits = if draft.split_policy == SplitPolicy::None {
            Vec::new()
        } else {
            self.validate_participants(actor_id, &draft.participants).await?;
            let mut splits = compute_splits(draft.amount, draft.split_policy, &draft.participants)?;
            // The payer never owes themselves.
            for entry in &mut splits {
                if entry.user_id == draft.paid_by {
                    entry.status = ShareStatus::Paid;
                }
            }
            splits
        };

        let expense = Expense {
            id: Uuid::new_v4(),
            description: draft.description,
            amount: draft.amount,
            currency: draft.currency.unwrap_or_else(|| CONFIG.default_currency.clone()),
            paid_by: draft.paid_by,
            group_id: draft.group_id,
            split_policy: draft.split_policy,
            splits,
            category: draft.category.unwrap_or_else(|| "other".to_string()),
            notes: draft.notes.unwrap_or_default(),
            created_at: Utc::now(),
        };

        let created = self.storage.create_expense(expense).await?;
        debug!("Expense created with id: {}", created.id);
        Ok(created)
    }

    async fn validate_participants(&self, actor_id: Uuid, participants: &[Participant]) -> Result<(), HisaabError> {
        if participants.is_empty() {
            return Err(HisaabError::invalid_input(
                "splits",
                "split participants are required for shared expenses",
            ));
        }

        let mut seen = HashSet::new();
        for participant in participants {
            if !seen.insert(participant.user_id) {
                return Err(HisaabError::invalid_input(
                    "splits",
                    format!("participant {} appears more than once", participant.user_id),
                ));
            }
            self.require_user(participant.user_id).await?;
            if participant.user_id != actor_id
                && !self
                    .membership
                    .is_authorized_participant(actor_id, participant.user_id)
                    .await?
            {
                return Err(HisaabError::Forbidden(format!(
                    "You can only split with friends; {} is not in your friend list",
                    participant.user_id
                )));
            }
        }
        Ok(())
    }

    pub async fn get_expense(&self, expense_id: Uuid) -> Result<Expense, HisaabError> {
        self.storage
            .get_expense(expense_id)
            .await?
            .ok_or(HisaabError::ExpenseNotFound(expense_id))
    }

    pub async fn group_expenses(&self, group_id: Uuid) -> Result<Vec<Expense>, HisaabError> {
        self.storage.expenses_for_group(group_id).await
    }

    /// Expenses the user paid for or participates in.
    pub async fn user_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, HisaabError> {
        self.require_user(user_id).await?;
        self.storage.expenses_involving(user_id).await
    }

    /// Marks the acting user's own share on an expense as paid, for
    /// settlements that happen outside any recorded payment.
    pub async fn mark_share_paid(&self, expense_id: Uuid, actor_id: Uuid) -> Result<Expense, HisaabError> {
        info!("User {} marking their share on expense {} paid", actor_id, expense_id);
        self.require_user(actor_id).await?;
        self.storage.mark_share_paid(expense_id, actor_id).await
    }
}
