use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Allowed drift when validating that percentage or custom splits add up.
/// Covers sub-cent rounding in client-supplied values.
pub const SPLIT_TOLERANCE: Decimal = dec!(0.005);

/// Net balances within this band of zero are treated as settled. Slightly
/// below one cent so that accumulated rounding noise never produces a
/// transfer.
pub const BALANCE_DEAD_ZONE: Decimal = dec!(0.009);

/// Smallest transfer the settlement planner will emit.
pub const MIN_TRANSFER: Decimal = dec!(0.01);

/// Percentage splits must add up to this.
pub const FULL_PERCENT: Decimal = dec!(100);

/// Upper bound for a single expense amount.
pub const MAX_AMOUNT: Decimal = dec!(1000000);

/// Maximum length for free-text fields such as descriptions and notes.
pub const MAX_TEXT_LENGTH: usize = 255;
