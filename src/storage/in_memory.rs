use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::HisaabError;
use crate::models::{Expense, Payment, PaymentStatus, ShareStatus, User};
use crate::storage::Storage;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    expenses: HashMap<Uuid, Expense>,
    payments: HashMap<Uuid, Payment>,
}

/// In-memory [`Storage`] backend.
///
/// A single lock guards all collections, which is what makes the compound
/// payment operations transactional here: every precondition check inside
/// them runs before any write, within one lock scope. Cloning shares the
/// underlying state.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    state: Arc<RwLock<State>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

fn sorted_by_creation(mut expenses: Vec<Expense>) -> Vec<Expense> {
    expenses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    expenses
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, HisaabError> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|existing| existing.email == user.email || existing.username == user.username)
        {
            return Err(HisaabError::invalid_input(
                "email",
                "a user with this email or username already exists",
            ));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, HisaabError> {
        let state = self.state.read().await;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn create_expense(&self, expense: Expense) -> Result<Expense, HisaabError> {
        let mut state = self.state.write().await;
        state.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>, HisaabError> {
        let state = self.state.read().await;
        Ok(state.expenses.get(&expense_id).cloned())
    }

    async fn get_expenses(&self, expense_ids: &[Uuid]) -> Result<Vec<Expense>, HisaabError> {
        let state = self.state.read().await;
        expense_ids
            .iter()
            .map(|id| {
                state
                    .expenses
                    .get(id)
                    .cloned()
                    .ok_or(HisaabError::ExpenseNotFound(*id))
            })
            .collect()
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, HisaabError> {
        let state = self.state.read().await;
        Ok(sorted_by_creation(state.expenses.values().cloned().collect()))
    }

    async fn expenses_for_group(&self, group_id: Uuid) -> Result<Vec<Expense>, HisaabError> {
        let state = self.state.read().await;
        Ok(sorted_by_creation(
            state
                .expenses
                .values()
                .filter(|expense| expense.group_id == Some(group_id))
                .cloned()
                .collect(),
        ))
    }

    async fn expenses_involving(&self, user_id: Uuid) -> Result<Vec<Expense>, HisaabError> {
        let state = self.state.read().await;
        Ok(sorted_by_creation(
            state
                .expenses
                .values()
                .filter(|expense| expense.involves(user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn mark_share_paid(&self, expense_id: Uuid, user_id: Uuid) -> Result<Expense, HisaabError> {
        let mut state = self.state.write().await;
        let expense = state
            .expenses
            .get_mut(&expense_id)
            .ok_or(HisaabError::ExpenseNotFound(expense_id))?;
        let entry = expense
            .splits
            .iter_mut()
            .find(|entry| entry.user_id == user_id)
            .ok_or_else(|| HisaabError::Forbidden(format!("User {} is not part of this split", user_id)))?;
        if entry.status == ShareStatus::Paid {
            return Err(HisaabError::InvalidState(
                "This share is already marked as paid".to_string(),
            ));
        }
        entry.status = ShareStatus::Paid;
        Ok(expense.clone())
    }

    async fn create_payment(&self, payment: Payment) -> Result<Payment, HisaabError> {
        let mut state = self.state.write().await;

        // The caller computed the amount from a snapshot; re-verify it
        // against current state before the insert becomes visible.
        let mut unpaid_total = Decimal::ZERO;
        for expense_id in &payment.related_expenses {
            let expense = state
                .expenses
                .get(expense_id)
                .ok_or(HisaabError::ExpenseNotFound(*expense_id))?;
            let share = expense.unpaid_share_for(payment.payer).ok_or_else(|| {
                HisaabError::Conflict(format!(
                    "Share on expense {} was settled while creating this payment",
                    expense_id
                ))
            })?;
            unpaid_total += share;
        }
        if !payment.related_expenses.is_empty() && unpaid_total != payment.amount {
            return Err(HisaabError::Conflict(format!(
                "Unpaid total changed to {} while creating this payment",
                unpaid_total
            )));
        }

        state.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_payment(&self, payment_id: Uuid) -> Result<Option<Payment>, HisaabError> {
        let state = self.state.read().await;
        Ok(state.payments.get(&payment_id).cloned())
    }

    async fn submit_payment_proof(
        &self,
        payment_id: Uuid,
        transaction_id: String,
        screenshot_url: Option<String>,
    ) -> Result<Payment, HisaabError> {
        let mut state = self.state.write().await;
        let payment = state
            .payments
            .get_mut(&payment_id)
            .ok_or(HisaabError::PaymentNotFound(payment_id))?;
        if payment.status.is_terminal() {
            return Err(HisaabError::InvalidState(format!(
                "Payment {} is already {}",
                payment_id, payment.status
            )));
        }
        payment.transaction_id = Some(transaction_id);
        payment.screenshot_url = screenshot_url;
        payment.status = PaymentStatus::Pending;
        Ok(payment.clone())
    }

    async fn finalize_payment(
        &self,
        payment_id: Uuid,
        verified: bool,
        decided_at: DateTime<Utc>,
    ) -> Result<Payment, HisaabError> {
        let mut state = self.state.write().await;

        let payment = state
            .payments
            .get(&payment_id)
            .cloned()
            .ok_or(HisaabError::PaymentNotFound(payment_id))?;
        if payment.status != PaymentStatus::Pending {
            return Err(HisaabError::InvalidState(format!(
                "Payment {} is {} and cannot be finalized",
                payment_id, payment.status
            )));
        }

        if verified {
            // Check every share before touching any of them; a conflict
            // must leave storage exactly as it was.
            for expense_id in &payment.related_expenses {
                let expense = state
                    .expenses
                    .get(expense_id)
                    .ok_or(HisaabError::ExpenseNotFound(*expense_id))?;
                match expense.split_for(payment.payer) {
                    Some(entry) if entry.status == ShareStatus::Pending => {}
                    Some(_) => {
                        return Err(HisaabError::Conflict(format!(
                            "Share on expense {} was already settled by another payment",
                            expense_id
                        )));
                    }
                    None => {
                        return Err(HisaabError::Storage(format!(
                            "payment {} references expense {} without a share for its payer",
                            payment_id, expense_id
                        )));
                    }
                }
            }

            for expense_id in payment.related_expenses.clone() {
                if let Some(expense) = state.expenses.get_mut(&expense_id) {
                    if let Some(entry) = expense.splits.iter_mut().find(|e| e.user_id == payment.payer) {
                        entry.status = ShareStatus::Paid;
                    }
                }
            }
        }

        let stored = state
            .payments
            .get_mut(&payment_id)
            .ok_or(HisaabError::PaymentNotFound(payment_id))?;
        if verified {
            stored.status = PaymentStatus::Confirmed;
            stored.confirmed_at = Some(decided_at);
        } else {
            stored.status = PaymentStatus::Rejected;
        }
        Ok(stored.clone())
    }

    async fn pending_payments_by_payer(&self, user_id: Uuid) -> Result<Vec<Payment>, HisaabError> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|payment| payment.payer == user_id && payment.status == PaymentStatus::Pending)
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(payments)
    }

    async fn pending_payments_by_payee(&self, user_id: Uuid) -> Result<Vec<Payment>, HisaabError> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state
            .payments
            .values()
            .filter(|payment| payment.payee == user_id && payment.status == PaymentStatus::Pending)
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMethod, SplitEntry, SplitPolicy};
    use rust_decimal_macros::dec;

    fn expense(paid_by: Uuid, debtor: Uuid, share: Decimal) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            description: "test".to_string(),
            amount: share,
            currency: "INR".to_string(),
            paid_by,
            group_id: None,
            split_policy: SplitPolicy::Custom,
            splits: vec![SplitEntry {
                user_id: debtor,
                percentage: None,
                amount: Some(share),
                final_share: share,
                status: ShareStatus::Pending,
            }],
            category: "other".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    fn payment(payer: Uuid, payee: Uuid, amount: Decimal, related: Vec<Uuid>) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            payer,
            payee,
            amount,
            method: PaymentMethod::Cash,
            status: PaymentStatus::Pending,
            related_expenses: related,
            transaction_id: None,
            screenshot_url: None,
            note: String::new(),
            group_id: None,
            created_at: Utc::now(),
            confirmed_at: None,
        }
    }

    #[tokio::test]
    async fn insert_conflicts_when_a_share_was_settled_in_between() {
        let storage = InMemoryStorage::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let owed = expense(alice, bob, dec!(20.00));
        storage.create_expense(owed.clone()).await.unwrap();
        // Built from a snapshot taken before the share was settled.
        let stale = payment(bob, alice, dec!(20.00), vec![owed.id]);

        storage.mark_share_paid(owed.id, bob).await.unwrap();

        let result = storage.create_payment(stale.clone()).await;
        assert!(matches!(result, Err(HisaabError::Conflict(_))));
        assert!(storage.get_payment(stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_conflicts_when_the_unpaid_total_changed() {
        let storage = InMemoryStorage::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let owed = expense(alice, bob, dec!(20.00));
        storage.create_expense(owed.clone()).await.unwrap();
        // The amount no longer matches what the shares add up to.
        let skewed = payment(bob, alice, dec!(25.00), vec![owed.id]);

        let result = storage.create_payment(skewed.clone()).await;
        assert!(matches!(result, Err(HisaabError::Conflict(_))));
        assert!(storage.get_payment(skewed.id).await.unwrap().is_none());
    }
}
