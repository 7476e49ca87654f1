use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::error::HisaabError;
use crate::tests::{create_equal_expense, create_equal_group_expense, create_test_service, register_friends};

#[tokio::test]
async fn global_settlement_names_both_parties() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob", "Carol"]).await;
    let (alice, bob, carol) = (users[0].id, users[1].id, users[2].id);

    // Carol fronts everything; Alice and Bob each owe her.
    create_equal_expense(&service, carol, &[alice, bob, carol], dec!(90.00)).await;

    let view = service.global_settlement().await.unwrap();
    assert_eq!(view.transfers.len(), 2);
    for transfer in &view.transfers {
        assert_eq!(transfer.to.id, carol);
        assert_eq!(transfer.to.name, "Carol");
        assert_eq!(transfer.amount, dec!(30.00));
    }
    let payers: Vec<Uuid> = view.transfers.iter().map(|t| t.from.id).collect();
    assert!(payers.contains(&alice));
    assert!(payers.contains(&bob));
}

#[tokio::test]
async fn settlement_matches_largest_first() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob", "Carol"]).await;
    let (alice, bob, carol) = (users[0].id, users[1].id, users[2].id);

    // Balances come out as Alice -50, Bob -30, Carol +80.
    create_equal_expense(&service, carol, &[alice], dec!(50.00)).await;
    create_equal_expense(&service, carol, &[bob], dec!(30.00)).await;

    let view = service.global_settlement().await.unwrap();
    assert_eq!(view.transfers.len(), 2);
    assert_eq!(view.transfers[0].from.id, alice);
    assert_eq!(view.transfers[0].amount, dec!(50.00));
    assert_eq!(view.transfers[1].from.id, bob);
    assert_eq!(view.transfers[1].amount, dec!(30.00));

    let settled: rust_decimal::Decimal = view.transfers.iter().map(|t| t.amount).sum();
    assert_eq!(settled, dec!(80.00));
}

#[tokio::test]
async fn group_settlement_ignores_outside_expenses() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob"]).await;
    let (alice, bob) = (users[0].id, users[1].id);

    let group = service
        .membership()
        .create_group("Flat".to_string(), vec![alice, bob], alice)
        .await
        .unwrap();

    create_equal_group_expense(&service, alice, &[alice, bob], dec!(100.00), Some(group.id)).await;
    // Outside the group, Bob fronts a bigger amount; it must not offset
    // the group plan.
    create_equal_expense(&service, bob, &[alice, bob], dec!(300.00)).await;

    let view = service.group_settlement(group.id).await.unwrap();
    assert_eq!(view.group_id, group.id);
    assert_eq!(view.transfers.len(), 1);
    assert_eq!(view.transfers[0].from.id, bob);
    assert_eq!(view.transfers[0].to.id, alice);
    assert_eq!(view.transfers[0].amount, dec!(50.00));
}

#[tokio::test]
async fn user_settlement_reports_net_position() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob", "Carol"]).await;
    let (alice, bob, carol) = (users[0].id, users[1].id, users[2].id);

    create_equal_expense(&service, alice, &[alice, bob], dec!(60.00)).await;
    create_equal_expense(&service, carol, &[alice, carol], dec!(20.00)).await;

    let view = service.user_settlement(alice).await.unwrap();
    // Owed 30 by Bob, owes 10 to Carol.
    assert_eq!(view.balance, dec!(20.00));
    assert!(view.transfers.iter().all(|t| t.from.id == alice || t.to.id == alice));
}

#[tokio::test]
async fn settled_ledger_plans_no_transfers() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob"]).await;
    let (alice, bob) = (users[0].id, users[1].id);

    // Perfectly offsetting expenses.
    create_equal_expense(&service, alice, &[alice, bob], dec!(50.00)).await;
    create_equal_expense(&service, bob, &[alice, bob], dec!(50.00)).await;

    let view = service.global_settlement().await.unwrap();
    assert!(view.transfers.is_empty());
}

#[tokio::test]
async fn empty_scopes_surface_no_expenses() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob"]).await;
    let alice = users[0].id;

    assert!(matches!(
        service.global_settlement().await,
        Err(HisaabError::NoExpenses(_))
    ));
    assert!(matches!(
        service.group_settlement(Uuid::new_v4()).await,
        Err(HisaabError::NoExpenses(_))
    ));
    assert!(matches!(
        service.user_settlement(alice).await,
        Err(HisaabError::NoExpenses(_))
    ));
}

#[tokio::test]
async fn expense_settlement_covers_one_expense() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob", "Carol"]).await;
    let (alice, bob, carol) = (users[0].id, users[1].id, users[2].id);

    let expense = create_equal_expense(&service, alice, &[alice, bob, carol], dec!(100.00)).await;

    let view = service.expense_settlement(expense.id).await.unwrap();
    assert_eq!(view.expense.id, expense.id);
    assert_eq!(view.transfers.len(), 2);
    let total: rust_decimal::Decimal = view.transfers.iter().map(|t| t.amount).sum();
    assert_eq!(total, dec!(66.66));
    assert!(view.transfers.iter().all(|t| t.to.id == alice));
}

#[tokio::test]
async fn plans_are_stable_across_reads() {
    let service = create_test_service();
    let users = register_friends(&service, &["Alice", "Bob", "Carol", "Dave"]).await;
    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

    create_equal_expense(&service, ids[0], &ids, dec!(97.31)).await;
    create_equal_expense(&service, ids[1], &ids[..3], dec!(41.50)).await;

    let first = service.global_settlement().await.unwrap();
    let second = service.global_settlement().await.unwrap();

    assert_eq!(first.transfers.len(), second.transfers.len());
    for (a, b) in first.transfers.iter().zip(&second.transfers) {
        assert_eq!(a.from.id, b.from.id);
        assert_eq!(a.to.id, b.to.id);
        assert_eq!(a.amount, b.amount);
    }
}
