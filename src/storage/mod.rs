use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::HisaabError;
use crate::models::{Expense, Payment, User};

pub mod in_memory;

/// Persistence boundary for the ledger.
///
/// The compound payment methods (`create_payment`, `submit_payment_proof`,
/// `finalize_payment`, `mark_share_paid`) are transactional: each one
/// re-checks its preconditions and applies all of its writes atomically, so
/// two racing callers can never both succeed and a failed call leaves
/// storage untouched.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, HisaabError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, HisaabError>;

    async fn create_expense(&self, expense: Expense) -> Result<Expense, HisaabError>;
    async fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>, HisaabError>;
    /// Fetches the given expenses; ids that do not exist fail the call.
    async fn get_expenses(&self, expense_ids: &[Uuid]) -> Result<Vec<Expense>, HisaabError>;
    async fn list_expenses(&self) -> Result<Vec<Expense>, HisaabError>;
    async fn expenses_for_group(&self, group_id: Uuid) -> Result<Vec<Expense>, HisaabError>;
    /// Expenses the user paid for or participates in.
    async fn expenses_involving(&self, user_id: Uuid) -> Result<Vec<Expense>, HisaabError>;
    /// Marks `user_id`'s split entry on the expense as paid. Fails with
    /// `Forbidden` when the user has no entry and `InvalidState` when the
    /// entry is already paid.
    async fn mark_share_paid(&self, expense_id: Uuid, user_id: Uuid) -> Result<Expense, HisaabError>;

    /// Inserts a payment after re-verifying, under the write lock, that
    /// every related expense still carries an unpaid payer share and that
    /// those shares still sum to the payment amount. A mismatch means a
    /// concurrent payment won the race and yields `Conflict`.
    async fn create_payment(&self, payment: Payment) -> Result<Payment, HisaabError>;
    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, HisaabError>;
    /// Attaches proof to a UPI payment and moves it to `Pending`. Fails
    /// with `InvalidState` once the payment is finalized.
    async fn submit_payment_proof(
        &self,
        payment_id: Uuid,
        transaction_id: String,
        screenshot_url: Option<String>,
    ) -> Result<Payment, HisaabError>;
    /// Settles a pending payment: `verified` moves it to `Confirmed` and
    /// marks the payer's share on every related expense paid in the same
    /// step, otherwise it moves to `Rejected`. Only `Pending` payments can
    /// be finalized; a share already settled by another payment aborts the
    /// whole call with `Conflict` before anything is written.
    async fn finalize_payment(
        &self,
        payment_id: Uuid,
        verified: bool,
        decided_at: DateTime<Utc>,
    ) -> Result<Payment, HisaabError>;
    async fn pending_payments_by_payer(&self, user_id: Uuid) -> Result<Vec<Payment>, HisaabError>;
    async fn pending_payments_by_payee(&self, user_id: Uuid) -> Result<Vec<Payment>, HisaabError>;
}
