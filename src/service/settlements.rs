use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::HisaabError;
use crate::ledger::{Transfer, aggregate, plan};
use crate::membership::Membership;
use crate::models::Expense;
use crate::notify::Notifier;
use crate::service::HisaabService;
use crate::storage::Storage;

/// One side of a settling transfer, with display fields resolved.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TransferParty {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

/// A planned transfer decorated with user names for display.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct NamedTransfer {
    pub from: TransferParty,
    pub to: TransferParty,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct GlobalSettlementView {
    pub transfers: Vec<NamedTransfer>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct GroupSettlementView {
    pub group_id: Uuid,
    pub transfers: Vec<NamedTransfer>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct UserSettlementView {
    pub user_id: Uuid,
    /// The user's net position: positive is owed to them, negative they owe.
    pub balance: Decimal,
    /// Only the planned transfers that involve this user.
    pub transfers: Vec<NamedTransfer>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ExpenseSettlementView {
    pub expense: Expense,
    pub transfers: Vec<NamedTransfer>,
}

impl<S: Storage, M: Membership, N: Notifier> HisaabService<S, M, N> {
    /// Settlement plan across every expense in the ledger.
    pub async fn global_settlement(&self) -> Result<GlobalSettlementView, HisaabError> {
        let expenses = self.storage.list_expenses().await?;
        if expenses.is_empty() {
            return Err(HisaabError::NoExpenses("No expenses found".to_string()));
        }
        let transfers = self.plan_transfers(&expenses).await?;
        Ok(GlobalSettlementView { transfers })
    }

    /// Settlement plan over one group's expenses.
    pub async fn group_settlement(&self, group_id: Uuid) -> Result<GroupSettlementView, HisaabError> {
        let expenses = self.storage.expenses_for_group(group_id).await?;
        if expenses.is_empty() {
            return Err(HisaabError::NoExpenses("No expenses found in this group".to_string()));
        }
        let transfers = self.plan_transfers(&expenses).await?;
        Ok(GroupSettlementView { group_id, transfers })
    }

    /// The user's net position and the planned transfers that involve them.
    pub async fn user_settlement(&self, user_id: Uuid) -> Result<UserSettlementView, HisaabError> {
        self.require_user(user_id).await?;
        let expenses = self.storage.expenses_involving(user_id).await?;
        if expenses.is_empty() {
            return Err(HisaabError::NoExpenses("No expenses found for this user".to_string()));
        }

        let balances = aggregate(&expenses);
        let balance = balances.get(&user_id).copied().unwrap_or_default();
        let transfers = plan(&balances)
            .into_iter()
            .filter(|transfer| transfer.from == user_id || transfer.to == user_id)
            .collect::<Vec<_>>();
        debug!("User {} settles through {} transfer(s)", user_id, transfers.len());

        Ok(UserSettlementView {
            user_id,
            balance,
            transfers: self.name_transfers(transfers).await?,
        })
    }

    /// How a single expense would settle on its own.
    pub async fn expense_settlement(&self, expense_id: Uuid) -> Result<ExpenseSettlementView, HisaabError> {
        let expense = self.get_expense(expense_id).await?;
        let balances = aggregate(std::slice::from_ref(&expense));
        let transfers = self.name_transfers(plan(&balances)).await?;
        Ok(ExpenseSettlementView { expense, transfers })
    }

    async fn plan_transfers(&self, expenses: &[Expense]) -> Result<Vec<NamedTransfer>, HisaabError> {
        let balances = aggregate(expenses);
        self.name_transfers(plan(&balances)).await
    }

    async fn name_transfers(&self, transfers: Vec<Transfer>) -> Result<Vec<NamedTransfer>, HisaabError> {
        let named = transfers.into_iter().map(|transfer| async move {
            Ok(NamedTransfer {
                from: self.transfer_party(transfer.from).await?,
                to: self.transfer_party(transfer.to).await?,
                amount: transfer.amount,
            })
        });
        futures::future::try_join_all(named).await
    }

    async fn transfer_party(&self, user_id: Uuid) -> Result<TransferParty, HisaabError> {
        let user = self.require_user(user_id).await?;
        Ok(TransferParty {
            id: user.id,
            name: user.name,
            username: user.username,
        })
    }
}
