use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// How an expense is divided among its participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Personal expense with no split entries.
    None,
    Equal,
    Percentage,
    Custom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    Pending,
    Paid,
}

/// One participant's share of an expense, frozen at creation time.
/// Balances and payments always read `final_share`, never recompute it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SplitEntry {
    pub user_id: Uuid,
    /// Requested percentage, kept for percentage splits.
    pub percentage: Option<Decimal>,
    /// Requested amount, kept for custom splits.
    pub amount: Option<Decimal>,
    /// The rounded amount this participant owes.
    pub final_share: Decimal,
    pub status: ShareStatus,
}

/// Split input as it reaches the calculator. The API boundary normalizes
/// bare user ids and detailed objects into this one shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    pub user_id: Uuid,
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
}

impl Participant {
    pub fn new(user_id: Uuid) -> Self {
        Participant {
            user_id,
            percentage: None,
            amount: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    /// The user who fronted the money.
    pub paid_by: Uuid,
    pub group_id: Option<Uuid>,
    pub split_policy: SplitPolicy,
    pub splits: Vec<SplitEntry>,
    pub category: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// The split entry belonging to `user_id`, if they take part in this
    /// expense's split.
    pub fn split_for(&self, user_id: Uuid) -> Option<&SplitEntry> {
        self.splits.iter().find(|entry| entry.user_id == user_id)
    }

    /// `user_id`'s frozen share when it is still unpaid.
    pub fn unpaid_share_for(&self, user_id: Uuid) -> Option<Decimal> {
        self.split_for(user_id)
            .filter(|entry| entry.status == ShareStatus::Pending)
            .map(|entry| entry.final_share)
    }

    /// True when `user_id` paid this expense or appears in its split.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.paid_by == user_id || self.split_for(user_id).is_some()
    }
}
