use crate::{
    api::models::*,
    error::HisaabError,
    membership::{Membership, in_memory::InMemoryMembership},
    models::{Expense, Group, Payment, User},
    notify::in_memory::InMemoryNotifier,
    service::{
        ExpenseDraft, ExpenseSettlementView, GlobalSettlementView, GroupSettlementView, HisaabService,
        UserSettlementView,
    },
    storage::in_memory::InMemoryStorage,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;
use utoipa_swagger_ui::SwaggerUi;

/// Concrete service wiring used by the HTTP binary.
pub type AppService = HisaabService<InMemoryStorage, InMemoryMembership, InMemoryNotifier>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AppService>,
}

// Define API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", axum::routing::post(create_user))
        .route("/users/{user_id}", axum::routing::get(get_user))
        .route("/friends", axum::routing::post(create_friendship))
        .route("/groups", axum::routing::post(create_group))
        .route("/groups/{group_id}", axum::routing::get(get_group))
        .route("/expenses", axum::routing::post(create_expense))
        .route("/expenses/{expense_id}", axum::routing::get(get_expense))
        .route("/expenses/{expense_id}/pay", axum::routing::post(mark_share_paid))
        .route(
            "/expenses/{expense_id}/settlement",
            axum::routing::get(expense_settlement),
        )
        .route("/expenses/group/{group_id}", axum::routing::get(group_expenses))
        .route("/expenses/user/{user_id}", axum::routing::get(user_expenses))
        .route("/settlements/global", axum::routing::get(global_settlement))
        .route("/settlements/group/{group_id}", axum::routing::get(group_settlement))
        .route("/settlements/user/{user_id}", axum::routing::get(user_settlement))
        .route("/payments", axum::routing::post(create_payment))
        .route("/payments/request", axum::routing::post(request_money))
        .route("/payments/incoming", axum::routing::get(incoming_requests))
        .route("/payments/outgoing", axum::routing::get(outgoing_requests))
        .route("/payments/{payment_id}", axum::routing::get(get_payment))
        .route("/payments/{payment_id}/proof", axum::routing::post(submit_payment_proof))
        .route("/payments/{payment_id}/confirm", axum::routing::post(confirm_payment))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", super::openapi::ApiDoc::openapi()))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .service
        .register_user(req.name, req.username, req.email, req.upi_id)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "ID of the user to retrieve")
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .service
        .get_user(user_id)
        .await?
        .ok_or(HisaabError::UserNotFound(user_id))?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/friends",
    request_body = CreateFriendshipRequest,
    responses(
        (status = 201, description = "Friendship recorded"),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_friendship(
    State(state): State<AppState>,
    Json(req): Json<CreateFriendshipRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .get_user(req.user_id)
        .await?
        .ok_or(HisaabError::UserNotFound(req.user_id))?;
    state
        .service
        .get_user(req.friend_id)
        .await?
        .ok_or(HisaabError::UserNotFound(req.friend_id))?;
    state
        .service
        .membership()
        .add_friendship(req.user_id, req.friend_id)
        .await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created successfully", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Member is not a friend of the creator", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    state
        .service
        .get_user(req.created_by_id)
        .await?
        .ok_or(HisaabError::UserNotFound(req.created_by_id))?;

    // Groups can only be formed out of the creator's friends.
    for member_id in &req.member_ids {
        state
            .service
            .get_user(*member_id)
            .await?
            .ok_or(HisaabError::UserNotFound(*member_id))?;
        if *member_id != req.created_by_id
            && !state
                .service
                .membership()
                .is_authorized_participant(req.created_by_id, *member_id)
                .await?
        {
            return Err(HisaabError::Forbidden(format!(
                "{} is not in your friend list",
                member_id
            ))
            .into());
        }
    }

    let group = state
        .service
        .membership()
        .create_group(req.name, req.member_ids, req.created_by_id)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}",
    params(
        ("group_id" = Uuid, Path, description = "ID of the group to retrieve")
    ),
    responses(
        (status = 200, description = "Group retrieved successfully", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
    let group = state
        .service
        .membership()
        .get_group(group_id)
        .await
        .ok_or(HisaabError::GroupNotFound(group_id))?;
    Ok(Json(group))
}

#[utoipa::path(
    post,
    path = "/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense created successfully", body = Expense),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Participant is not a friend of the creator", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_expense(
    State(state): State<AppState>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let draft = ExpenseDraft {
        description: req.description,
        amount: req.amount,
        currency: req.currency,
        paid_by: req.paid_by_id,
        group_id: req.group_id,
        split_policy: req.split_policy,
        participants: req.split_details.into_iter().map(Into::into).collect(),
        category: req.category,
        notes: req.notes,
    };
    let expense = state.service.create_expense(req.created_by_id, draft).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/expenses/{expense_id}",
    params(
        ("expense_id" = Uuid, Path, description = "ID of the expense to retrieve")
    ),
    responses(
        (status = 200, description = "Expense retrieved successfully", body = Expense),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state.service.get_expense(expense_id).await?;
    Ok(Json(expense))
}

#[utoipa::path(
    post,
    path = "/expenses/{expense_id}/pay",
    request_body = MarkSharePaidRequest,
    params(
        ("expense_id" = Uuid, Path, description = "Expense whose share is being settled")
    ),
    responses(
        (status = 200, description = "Share marked as paid", body = Expense),
        (status = 400, description = "Share already paid", body = ErrorResponse),
        (status = 403, description = "User is not part of this split", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn mark_share_paid(
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
    Json(req): Json<MarkSharePaidRequest>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state.service.mark_share_paid(expense_id, req.user_id).await?;
    Ok(Json(expense))
}

#[utoipa::path(
    get,
    path = "/expenses/{expense_id}/settlement",
    params(
        ("expense_id" = Uuid, Path, description = "Expense to preview settlement for")
    ),
    responses(
        (status = 200, description = "Settlement preview for the expense", body = ExpenseSettlementView),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn expense_settlement(
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseSettlementView>, ApiError> {
    let view = state.service.expense_settlement(expense_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/expenses/group/{group_id}",
    params(
        ("group_id" = Uuid, Path, description = "Group whose expenses to list")
    ),
    responses(
        (status = 200, description = "Expenses in the group", body = Vec<Expense>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn group_expenses(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state.service.group_expenses(group_id).await?;
    Ok(Json(expenses))
}

#[utoipa::path(
    get,
    path = "/expenses/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User whose expenses to list")
    ),
    responses(
        (status = 200, description = "Expenses the user is involved in", body = Vec<Expense>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn user_expenses(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state.service.user_expenses(user_id).await?;
    Ok(Json(expenses))
}

#[utoipa::path(
    get,
    path = "/settlements/global",
    responses(
        (status = 200, description = "Settlement plan across all expenses", body = GlobalSettlementView),
        (status = 404, description = "No expenses found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn global_settlement(State(state): State<AppState>) -> Result<Json<GlobalSettlementView>, ApiError> {
    let view = state.service.global_settlement().await?;
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/settlements/group/{group_id}",
    params(
        ("group_id" = Uuid, Path, description = "Group to plan settlement for")
    ),
    responses(
        (status = 200, description = "Settlement plan for the group", body = GroupSettlementView),
        (status = 404, description = "No expenses found in this group", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn group_settlement(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupSettlementView>, ApiError> {
    let view = state.service.group_settlement(group_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/settlements/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User to plan settlement for")
    ),
    responses(
        (status = 200, description = "The user's balance and settling transfers", body = UserSettlementView),
        (status = 404, description = "User or expenses not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn user_settlement(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserSettlementView>, ApiError> {
    let view = state.service.user_settlement(user_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created", body = Payment),
        (status = 400, description = "Bad request or nothing to pay", body = ErrorResponse),
        (status = 404, description = "User or expense not found", body = ErrorResponse),
        (status = 409, description = "A concurrent payment settled these shares first", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = state
        .service
        .create_payment(req.payer_id, req.payee_id, req.expense_ids, req.method, req.note)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    post,
    path = "/payments/request",
    request_body = RequestMoneyRequest,
    responses(
        (status = 201, description = "Money request created", body = Payment),
        (status = 400, description = "Nothing is owed", body = ErrorResponse),
        (status = 403, description = "Target is not a friend", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn request_money(
    State(state): State<AppState>,
    Json(req): Json<RequestMoneyRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = state
        .service
        .request_money(req.requester_id, req.target_id, req.group_id, req.note)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/payments/incoming",
    params(
        ("user_id" = Uuid, Query, description = "User whose incoming requests to list")
    ),
    responses(
        (status = 200, description = "Pending payments the user must pay", body = Vec<Payment>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn incoming_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = state.service.incoming_requests(query.user_id).await?;
    Ok(Json(payments))
}

#[utoipa::path(
    get,
    path = "/payments/outgoing",
    params(
        ("user_id" = Uuid, Query, description = "User whose outgoing requests to list")
    ),
    responses(
        (status = 200, description = "Pending payments awaiting the user's confirmation", body = Vec<Payment>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn outgoing_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = state.service.outgoing_requests(query.user_id).await?;
    Ok(Json(payments))
}

#[utoipa::path(
    get,
    path = "/payments/{payment_id}",
    params(
        ("payment_id" = Uuid, Path, description = "ID of the payment to retrieve")
    ),
    responses(
        (status = 200, description = "Payment retrieved successfully", body = Payment),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state.service.get_payment(payment_id).await?;
    Ok(Json(payment))
}

#[utoipa::path(
    post,
    path = "/payments/{payment_id}/proof",
    request_body = SubmitProofRequest,
    params(
        ("payment_id" = Uuid, Path, description = "Payment the proof belongs to")
    ),
    responses(
        (status = 200, description = "Proof recorded, payment pending confirmation", body = Payment),
        (status = 400, description = "Payment already finalized or not UPI", body = ErrorResponse),
        (status = 403, description = "Only the payer can submit proof", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn submit_payment_proof(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(req): Json<SubmitProofRequest>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state
        .service
        .submit_payment_proof(payment_id, req.user_id, req.transaction_id, req.screenshot_url)
        .await?;
    Ok(Json(payment))
}

#[utoipa::path(
    post,
    path = "/payments/{payment_id}/confirm",
    request_body = ConfirmPaymentRequest,
    params(
        ("payment_id" = Uuid, Path, description = "Payment to confirm or reject")
    ),
    responses(
        (status = 200, description = "Payment finalized", body = Payment),
        (status = 400, description = "Payment is not pending", body = ErrorResponse),
        (status = 403, description = "Only the payee can confirm", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 409, description = "A share was settled by another payment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn confirm_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state
        .service
        .confirm_payment(payment_id, req.user_id, req.verified)
        .await?;
    Ok(Json(payment))
}
