use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Cash,
    /// Settled outside the app, recorded after the fact.
    Manual,
}

/// Lifecycle of a payment record.
///
/// `Created` means a UPI intent was handed to the payer and proof is still
/// outstanding. `Pending` means the payment awaits the payee's verdict,
/// either because proof was submitted or because it is a cash payment or
/// money request. `Confirmed` and `Rejected` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Pending,
    Confirmed,
    Rejected,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed | PaymentStatus::Rejected)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Manual => "manual",
        };
        write!(f, "{}", s)
    }
}

/// A settling payment from `payer` to `payee`, covering the payer's unpaid
/// shares on `related_expenses`, or nothing but an amount when it is a
/// free-standing money request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub payer: Uuid,
    pub payee: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub related_expenses: Vec<Uuid>,
    /// UPI transaction reference submitted as proof.
    pub transaction_id: Option<String>,
    pub screenshot_url: Option<String>,
    pub note: String,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}
