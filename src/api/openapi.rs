use utoipa::OpenApi;

use crate::{
    api::models::{
        ConfirmPaymentRequest, CreateExpenseRequest, CreateFriendshipRequest, CreateGroupRequest,
        CreatePaymentRequest, CreateUserRequest, ErrorResponse, MarkSharePaidRequest, ParticipantInput,
        RequestMoneyRequest, SubmitProofRequest,
    },
    ledger::Transfer,
    models::{Expense, Group, Payment, PaymentMethod, PaymentStatus, ShareStatus, SplitEntry, SplitPolicy, User},
    service::{
        ExpenseSettlementView, GlobalSettlementView, GroupSettlementView, NamedTransfer, TransferParty,
        UserSettlementView,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_user,
        super::handlers::get_user,
        super::handlers::create_friendship,
        super::handlers::create_group,
        super::handlers::get_group,
        super::handlers::create_expense,
        super::handlers::get_expense,
        super::handlers::mark_share_paid,
        super::handlers::expense_settlement,
        super::handlers::group_expenses,
        super::handlers::user_expenses,
        super::handlers::global_settlement,
        super::handlers::group_settlement,
        super::handlers::user_settlement,
        super::handlers::create_payment,
        super::handlers::request_money,
        super::handlers::incoming_requests,
        super::handlers::outgoing_requests,
        super::handlers::get_payment,
        super::handlers::submit_payment_proof,
        super::handlers::confirm_payment
    ),
    components(schemas(
        CreateUserRequest,
        CreateFriendshipRequest,
        CreateGroupRequest,
        CreateExpenseRequest,
        ParticipantInput,
        MarkSharePaidRequest,
        CreatePaymentRequest,
        SubmitProofRequest,
        ConfirmPaymentRequest,
        RequestMoneyRequest,
        ErrorResponse,
        User,
        Group,
        Expense,
        SplitEntry,
        ShareStatus,
        SplitPolicy,
        Payment,
        PaymentMethod,
        PaymentStatus,
        Transfer,
        TransferParty,
        NamedTransfer,
        GlobalSettlementView,
        GroupSettlementView,
        UserSettlementView,
        ExpenseSettlementView
    )),
    info(
        title = "Hisaab API",
        description = "API for shared expense tracking and settlement",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
