mod settlement_tests;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::membership::in_memory::InMemoryMembership;
use crate::models::{Expense, Participant, SplitPolicy, User};
use crate::notify::in_memory::InMemoryNotifier;
use crate::service::{ExpenseDraft, HisaabService};
use crate::storage::in_memory::InMemoryStorage;

pub type TestService = HisaabService<InMemoryStorage, InMemoryMembership, InMemoryNotifier>;

pub fn create_test_service() -> TestService {
    let storage = InMemoryStorage::new();
    let membership = InMemoryMembership::new();
    let notifier = InMemoryNotifier::new();
    HisaabService::new(storage, membership, notifier)
}

pub async fn register_test_user(service: &TestService, name: &str) -> User {
    service
        .register_user(
            name.to_string(),
            name.to_lowercase(),
            format!("{}@example.com", name.to_lowercase()),
            Some(format!("{}@upi", name.to_lowercase())),
        )
        .await
        .unwrap()
}

/// Registers one user per name and makes everyone friends with everyone.
pub async fn register_friends(service: &TestService, names: &[&str]) -> Vec<User> {
    let mut users = Vec::new();
    for name in names {
        users.push(register_test_user(service, name).await);
    }
    for i in 0..users.len() {
        for j in (i + 1)..users.len() {
            service
                .membership()
                .add_friendship(users[i].id, users[j].id)
                .await
                .unwrap();
        }
    }
    users
}

/// Creates an equal-split expense paid and entered by `paid_by`.
pub async fn create_equal_expense(
    service: &TestService,
    paid_by: Uuid,
    participants: &[Uuid],
    amount: Decimal,
) -> Expense {
    create_equal_group_expense(service, paid_by, participants, amount, None).await
}

pub async fn create_equal_group_expense(
    service: &TestService,
    paid_by: Uuid,
    participants: &[Uuid],
    amount: Decimal,
    group_id: Option<Uuid>,
) -> Expense {
    service
        .create_expense(
            paid_by,
            ExpenseDraft {
                description: "Test expense".to_string(),
                amount,
                currency: None,
                paid_by,
                group_id,
                split_policy: SplitPolicy::Equal,
                participants: participants.iter().map(|&id| Participant::new(id)).collect(),
                category: None,
                notes: None,
            },
        )
        .await
        .unwrap()
}
