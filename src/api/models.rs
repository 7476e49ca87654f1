use axum::{Json, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::HisaabError;
use crate::models::{Participant, PaymentMethod, SplitPolicy};

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub upi_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFriendshipRequest {
    pub user_id: Uuid,
    pub friend_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub member_ids: Vec<Uuid>,
    pub created_by_id: Uuid,
}

/// A split participant, either a bare user id or an object carrying the
/// percentage or amount the split policy needs.
#[derive(Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ParticipantInput {
    Id(Uuid),
    Detailed {
        user_id: Uuid,
        #[serde(default)]
        percentage: Option<Decimal>,
        #[serde(default)]
        amount: Option<Decimal>,
    },
}

impl From<ParticipantInput> for Participant {
    fn from(input: ParticipantInput) -> Self {
        match input {
            ParticipantInput::Id(user_id) => Participant::new(user_id),
            ParticipantInput::Detailed {
                user_id,
                percentage,
                amount,
            } => Participant {
                user_id,
                percentage,
                amount,
            },
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateExpenseRequest {
    pub description: String,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub paid_by_id: Uuid,
    pub group_id: Option<Uuid>,
    pub split_policy: SplitPolicy,
    #[serde(default)]
    pub split_details: Vec<ParticipantInput>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkSharePaidRequest {
    pub user_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub expense_ids: Vec<Uuid>,
    pub method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitProofRequest {
    pub user_id: Uuid,
    pub transaction_id: String,
    pub screenshot_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    pub user_id: Uuid,
    pub verified: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct RequestMoneyRequest {
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub group_id: Option<Uuid>,
    pub note: Option<String>,
}

/// Query parameters for the payment request listings.
#[derive(Deserialize)]
pub struct RequestListQuery {
    pub user_id: Uuid,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for HisaabError to implement IntoResponse
pub struct ApiError(pub HisaabError);

impl From<HisaabError> for ApiError {
    fn from(err: HisaabError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            HisaabError::InvalidInput { .. } | HisaabError::InvalidState(_) => StatusCode::BAD_REQUEST,
            HisaabError::UserNotFound(_)
            | HisaabError::ExpenseNotFound(_)
            | HisaabError::PaymentNotFound(_)
            | HisaabError::GroupNotFound(_)
            | HisaabError::NoExpenses(_) => StatusCode::NOT_FOUND,
            HisaabError::Forbidden(_) => StatusCode::FORBIDDEN,
            HisaabError::Conflict(_) => StatusCode::CONFLICT,
            HisaabError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
