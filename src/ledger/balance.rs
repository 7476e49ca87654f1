use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ledger::round2;
use crate::models::Expense;

/// Folds a set of expenses into net per-user balances.
///
/// Positive means the ledger owes the user, negative means the user owes the
/// ledger. Every split entry subtracts its frozen `final_share` from that
/// participant and the full amount is credited to the payer, so a payer who
/// is also a participant nets out their own share. Share status is ignored:
/// balances always derive from the frozen shares, and confirmed payments are
/// reflected by the payment records, not by rewriting history.
///
/// Users whose balance lands on exactly zero are omitted, which makes the
/// fold insensitive to zero-amount no-op expenses. The `BTreeMap` keeps the
/// output ordered by user id for deterministic downstream planning.
pub fn aggregate(expenses: &[Expense]) -> BTreeMap<Uuid, Decimal> {
    let mut balances: BTreeMap<Uuid, Decimal> = BTreeMap::new();

    for expense in expenses {
        for entry in &expense.splits {
            let balance = balances.entry(entry.user_id).or_insert(Decimal::ZERO);
            *balance = round2(*balance - entry.final_share);
        }
        let payer = balances.entry(expense.paid_by).or_insert(Decimal::ZERO);
        *payer = round2(*payer + expense.amount);
    }

    balances.retain(|_, balance| !balance.is_zero());
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShareStatus, SplitEntry, SplitPolicy};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn expense(paid_by: Uuid, amount: Decimal, shares: &[(Uuid, Decimal)]) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            description: "test".to_string(),
            amount,
            currency: "INR".to_string(),
            paid_by,
            group_id: None,
            split_policy: SplitPolicy::Custom,
            splits: shares
                .iter()
                .map(|&(user_id, final_share)| SplitEntry {
                    user_id,
                    percentage: None,
                    amount: Some(final_share),
                    final_share,
                    status: ShareStatus::Pending,
                })
                .collect(),
            category: "other".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn payer_nets_out_their_own_share() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let expenses = [expense(a, dec!(100.00), &[(a, dec!(50.00)), (b, dec!(50.00))])];

        let balances = aggregate(&expenses);
        assert_eq!(balances.get(&a), Some(&dec!(50.00)));
        assert_eq!(balances.get(&b), Some(&dec!(-50.00)));
    }

    #[test]
    fn balances_sum_to_zero_across_expenses() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let expenses = [
            expense(a, dec!(100.00), &[(a, dec!(33.34)), (b, dec!(33.33)), (c, dec!(33.33))]),
            expense(b, dec!(45.50), &[(a, dec!(22.75)), (b, dec!(22.75))]),
            expense(c, dec!(10.01), &[(b, dec!(10.01))]),
        ];

        let balances = aggregate(&expenses);
        let total: Decimal = balances.values().copied().sum();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let expenses = [
            expense(a, dec!(80.00), &[(a, dec!(40.00)), (b, dec!(40.00))]),
            expense(b, dec!(15.00), &[(a, dec!(15.00))]),
        ];

        assert_eq!(aggregate(&expenses), aggregate(&expenses));
    }

    #[test]
    fn zero_amount_expense_changes_nothing() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let base = vec![expense(a, dec!(60.00), &[(b, dec!(30.00)), (c, dec!(30.00))])];
        let mut with_noop = base.clone();
        with_noop.push(expense(c, dec!(0.00), &[]));

        assert_eq!(aggregate(&base), aggregate(&with_noop));
    }

    #[test]
    fn unrelated_users_never_appear() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let outsider = Uuid::new_v4();
        let expenses = [expense(a, dec!(20.00), &[(b, dec!(20.00))])];

        let balances = aggregate(&expenses);
        assert!(!balances.contains_key(&outsider));
        assert_eq!(balances.len(), 2);
    }

    #[test]
    fn paid_shares_still_count_toward_balances() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut e = expense(a, dec!(30.00), &[(b, dec!(30.00))]);
        e.splits[0].status = ShareStatus::Paid;

        let balances = aggregate(std::slice::from_ref(&e));
        assert_eq!(balances.get(&b), Some(&dec!(-30.00)));
    }
}
