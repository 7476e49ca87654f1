use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::HisaabError;
use crate::ledger::{aggregate, round2};
use crate::membership::Membership;
use crate::models::{Payment, PaymentMethod, PaymentStatus};
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::service::HisaabService;
use crate::storage::Storage;

impl<S: Storage, M: Membership, N: Notifier> HisaabService<S, M, N> {
    /// Creates one payment covering the payer's unpaid shares across the
    /// given expenses.
    ///
    /// Expenses not paid for by `payee_id`, and shares already settled, are
    /// skipped rather than rejected; the payment covers whatever remains.
    /// UPI payments start as `Created` and wait for proof, cash payments go
    /// straight to `Pending` for the payee's confirmation.
    pub async fn create_payment(
        &self,
        payer_id: Uuid,
        payee_id: Uuid,
        expense_ids: Vec<Uuid>,
        method: PaymentMethod,
        note: Option<String>,
    ) -> Result<Payment, HisaabError> {
        info!(
            "User {} creating a {} payment to {} over {} expense(s)",
            payer_id,
            method,
            payee_id,
            expense_ids.len()
        );
        if expense_ids.is_empty() {
            return Err(HisaabError::invalid_input(
                "expense_ids",
                "at least one expense id is required",
            ));
        }
        if payer_id == payee_id {
            return Err(HisaabError::invalid_input(
                "payee_id",
                "cannot create a payment to yourself",
            ));
        }
        self.require_user(payer_id).await?;
        let payee = self.require_user(payee_id).await?;

        let expenses = self.storage.get_expenses(&expense_ids).await?;
        let mut related = Vec::new();
        let mut total = Decimal::ZERO;
        for expense in &expenses {
            if expense.paid_by != payee_id {
                continue;
            }
            if let Some(share) = expense.unpaid_share_for(payer_id) {
                related.push(expense.id);
                total += share;
            }
        }
        if related.is_empty() || total <= Decimal::ZERO {
            return Err(HisaabError::InvalidState(
                "No unpaid shares owed to this payee across the given expenses".to_string(),
            ));
        }

        let status = match method {
            PaymentMethod::Upi => {
                if payee.upi_id.is_none() {
                    return Err(HisaabError::invalid_input(
                        "payee_id",
                        format!("payee {} has no UPI address configured", payee.username),
                    ));
                }
                PaymentStatus::Created
            }
            PaymentMethod::Cash => PaymentStatus::Pending,
            // Manual records what was settled outside the app; it cannot
            // drive the confirmation flow.
            PaymentMethod::Manual => {
                return Err(HisaabError::invalid_input(
                    "method",
                    "manual payments cannot be created through the payment flow",
                ));
            }
        };

        let payment = Payment {
            id: Uuid::new_v4(),
            payer: payer_id,
            payee: payee_id,
            amount: round2(total),
            method,
            status,
            related_expenses: related,
            transaction_id: None,
            screenshot_url: None,
            note: note.unwrap_or_default(),
            group_id: None,
            created_at: Utc::now(),
            confirmed_at: None,
        };

        let created = self.storage.create_payment(payment).await?;
        debug!("Payment {} created as {}", created.id, created.status);
        Ok(created)
    }

    /// Attaches the payer's UPI proof and hands the payment to the payee
    /// for confirmation.
    pub async fn submit_payment_proof(
        &self,
        payment_id: Uuid,
        actor_id: Uuid,
        transaction_id: String,
        screenshot_url: Option<String>,
    ) -> Result<Payment, HisaabError> {
        info!("User {} submitting proof for payment {}", actor_id, payment_id);
        Self::validate_text("transaction_id", &transaction_id)?;

        let payment = self
            .storage
            .get_payment(payment_id)
            .await?
            .ok_or(HisaabError::PaymentNotFound(payment_id))?;
        if payment.payer != actor_id {
            return Err(HisaabError::Forbidden(
                "Only the payer can submit proof for this payment".to_string(),
            ));
        }
        if payment.method != PaymentMethod::Upi {
            return Err(HisaabError::InvalidState(
                "Proof can only be submitted for UPI payments".to_string(),
            ));
        }

        self.storage
            .submit_payment_proof(payment_id, transaction_id, screenshot_url)
            .await
    }

    /// The payee's verdict on a pending payment. Confirming also marks the
    /// payer's share on every related expense paid, atomically; rejecting
    /// leaves the shares untouched. Either way the payer is notified.
    pub async fn confirm_payment(&self, payment_id: Uuid, actor_id: Uuid, verified: bool) -> Result<Payment, HisaabError> {
        info!(
            "User {} {} payment {}",
            actor_id,
            if verified { "confirming" } else { "rejecting" },
            payment_id
        );
        let payment = self
            .storage
            .get_payment(payment_id)
            .await?
            .ok_or(HisaabError::PaymentNotFound(payment_id))?;
        if payment.payee != actor_id {
            return Err(HisaabError::Forbidden(
                "Only the payee can confirm or reject this payment".to_string(),
            ));
        }

        let finalized = self.storage.finalize_payment(payment_id, verified, Utc::now()).await?;

        let (kind, message) = if verified {
            (NotificationKind::PaymentConfirmed, "Your payment has been confirmed.")
        } else {
            (
                NotificationKind::PaymentRejected,
                "Your payment was rejected. Please check your proof.",
            )
        };
        self.notify_quietly(Notification {
            user_id: finalized.payer,
            sender_id: Some(actor_id),
            kind,
            message: message.to_string(),
            payload: json!({ "payment_id": finalized.id, "amount": finalized.amount }),
        })
        .await;

        Ok(finalized)
    }

    /// Asks `target_id` to pay what they owe the requester.
    ///
    /// With a group, the requested amount is the smaller of what the target
    /// owes and what the group owes the requester, both taken from the
    /// group's net balances. Without a group it is the sum of the target's
    /// unpaid shares on expenses the requester paid for. The request is a
    /// cash-method payment already pending the target's action.
    pub async fn request_money(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
        group_id: Option<Uuid>,
        note: Option<String>,
    ) -> Result<Payment, HisaabError> {
        info!("User {} requesting money from {}", requester_id, target_id);
        if requester_id == target_id {
            return Err(HisaabError::invalid_input(
                "target_id",
                "cannot request money from yourself",
            ));
        }
        let requester = self.require_user(requester_id).await?;
        self.require_user(target_id).await?;

        let amount = match group_id {
            Some(group_id) => self.group_dues(group_id, requester_id, target_id).await?,
            None => self.direct_dues(requester_id, target_id).await?,
        };

        let request = Payment {
            id: Uuid::new_v4(),
            payer: target_id,
            payee: requester_id,
            amount: round2(amount),
            method: PaymentMethod::Cash,
            status: PaymentStatus::Pending,
            related_expenses: Vec::new(),
            transaction_id: None,
            screenshot_url: None,
            note: note.unwrap_or_else(|| {
                if group_id.is_some() {
                    "Payment request".to_string()
                } else {
                    "Instant payment request".to_string()
                }
            }),
            group_id,
            created_at: Utc::now(),
            confirmed_at: None,
        };
        let created = self.storage.create_payment(request).await?;

        self.notify_quietly(Notification {
            user_id: target_id,
            sender_id: Some(requester_id),
            kind: NotificationKind::PaymentRequest,
            message: format!("{} requested {}", requester.name, created.amount),
            payload: json!({ "payment_id": created.id, "amount": created.amount }),
        })
        .await;

        Ok(created)
    }

    /// What `target` owes within the group, capped by what the group owes
    /// the requester.
    async fn group_dues(&self, group_id: Uuid, requester_id: Uuid, target_id: Uuid) -> Result<Decimal, HisaabError> {
        let requester_is_member = self.membership().is_group_member(group_id, requester_id).await?;
        let target_is_member = self.membership().is_group_member(group_id, target_id).await?;
        if !requester_is_member || !target_is_member {
            return Err(HisaabError::invalid_input(
                "group_id",
                "both users must be members of the group",
            ));
        }

        let expenses = self.storage.expenses_for_group(group_id).await?;
        let balances = aggregate(&expenses);
        let target_balance = balances.get(&target_id).copied().unwrap_or_default();
        if target_balance >= Decimal::ZERO {
            return Err(HisaabError::InvalidState(
                "This member does not owe anything in the group".to_string(),
            ));
        }
        let requester_balance = balances.get(&requester_id).copied().unwrap_or_default();

        let amount = (-target_balance).min(requester_balance.max(Decimal::ZERO));
        if amount <= Decimal::ZERO {
            return Err(HisaabError::InvalidState(
                "Nothing in the group is owed to you".to_string(),
            ));
        }
        Ok(amount)
    }

    /// The target's unpaid shares on expenses the requester paid for.
    async fn direct_dues(&self, requester_id: Uuid, target_id: Uuid) -> Result<Decimal, HisaabError> {
        if !self
            .membership()
            .is_authorized_participant(requester_id, target_id)
            .await?
        {
            return Err(HisaabError::Forbidden(
                "You can only request money from friends".to_string(),
            ));
        }

        let expenses = self.storage.expenses_involving(target_id).await?;
        let amount: Decimal = expenses
            .iter()
            .filter(|expense| expense.paid_by == requester_id)
            .filter_map(|expense| expense.unpaid_share_for(target_id))
            .sum();
        if amount <= Decimal::ZERO {
            return Err(HisaabError::InvalidState(
                "This friend does not owe you anything".to_string(),
            ));
        }
        Ok(amount)
    }

    pub async fn get_payment(&self, payment_id: Uuid) -> Result<Payment, HisaabError> {
        self.storage
            .get_payment(payment_id)
            .await?
            .ok_or(HisaabError::PaymentNotFound(payment_id))
    }

    /// Pending payments the user is expected to pay.
    pub async fn incoming_requests(&self, user_id: Uuid) -> Result<Vec<Payment>, HisaabError> {
        self.require_user(user_id).await?;
        self.storage.pending_payments_by_payer(user_id).await
    }

    /// Pending payments awaiting the user's confirmation as payee.
    pub async fn outgoing_requests(&self, user_id: Uuid) -> Result<Vec<Payment>, HisaabError> {
        self.require_user(user_id).await?;
        self.storage.pending_payments_by_payee(user_id).await
    }
}
