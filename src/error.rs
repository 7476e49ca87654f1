use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the ledger service and its storage backends.
#[derive(Error, Debug)]
pub enum HisaabError {
    /// Malformed or missing request data. The caller can correct and retry.
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Referenced user does not exist.
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    /// Referenced expense does not exist.
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    /// Referenced payment does not exist.
    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),

    /// Referenced group does not exist.
    #[error("Group {0} not found")]
    GroupNotFound(Uuid),

    /// The requested settlement scope contains no expenses at all.
    #[error("{0}")]
    NoExpenses(String),

    /// The acting user is not the payer, payee, or participant the
    /// operation requires.
    #[error("{0}")]
    Forbidden(String),

    /// The record exists but is not in a state that permits this
    /// operation, or the operation has nothing left to act on.
    #[error("{0}")]
    InvalidState(String),

    /// A concurrent mutation invalidated this operation between its
    /// validation and its write.
    #[error("{0}")]
    Conflict(String),

    /// Storage backend failure or corrupted stored data.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl HisaabError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        HisaabError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
