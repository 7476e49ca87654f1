//! Pure ledger arithmetic: split computation, balance aggregation, and
//! settlement planning. Nothing here touches storage; every function maps
//! an immutable snapshot to a value, so callers can retry or replan freely.

pub mod balance;
pub mod settlement;
pub mod split;

pub use balance::aggregate;
pub use settlement::{Transfer, plan};
pub use split::compute_splits;

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to two decimal places, half away from zero. Every monetary value
/// the ledger produces goes through this one function.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::round2;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
        assert_eq!(round2(dec!(-2.675)), dec!(-2.68));
        assert_eq!(round2(dec!(33.333333)), dec!(33.33));
        assert_eq!(round2(dec!(0.005)), dec!(0.01));
    }
}
