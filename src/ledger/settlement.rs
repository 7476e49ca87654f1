use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{BALANCE_DEAD_ZONE, MIN_TRANSFER};
use crate::ledger::round2;

/// One planned settling payment: `from` pays `to` `amount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transfer {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: Decimal,
}

/// Computes a plan of transfers that settles the given net balances.
///
/// Greedy largest-first matching: the biggest debtor pays the biggest
/// creditor the smaller of the two outstanding amounts, repeating until one
/// side is exhausted. Equal amounts tie-break on ascending user id, so the
/// plan is fully deterministic. Balances within the dead zone around zero
/// are rounding noise and settle to nothing, and no transfer below one cent
/// is ever emitted.
///
/// The plan is advisory. It never mutates expenses or payments, and the sum
/// paid by each debtor matches their negative balance to within a cent.
pub fn plan(balances: &BTreeMap<Uuid, Decimal>) -> Vec<Transfer> {
    let mut debtors: Vec<(Uuid, Decimal)> = Vec::new();
    let mut creditors: Vec<(Uuid, Decimal)> = Vec::new();

    // Classify on the raw balances; rounding happens only on emitted
    // transfers, so nothing inside the dead zone can round up into debt.
    for (&user_id, &balance) in balances {
        if balance < -BALANCE_DEAD_ZONE {
            debtors.push((user_id, -balance));
        } else if balance > BALANCE_DEAD_ZONE {
            creditors.push((user_id, balance));
        }
    }

    debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    creditors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.min(creditors[j].1);

        if amount >= MIN_TRANSFER {
            transfers.push(Transfer {
                from: debtors[i].0,
                to: creditors[j].0,
                amount: round2(amount),
            });
        }

        debtors[i].1 -= amount;
        creditors[j].1 -= amount;

        if debtors[i].1 <= BALANCE_DEAD_ZONE {
            i += 1;
        }
        if creditors[j].1 <= BALANCE_DEAD_ZONE {
            j += 1;
        }
    }

    transfers
}
