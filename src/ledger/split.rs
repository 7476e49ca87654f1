use rust_decimal::Decimal;
use uuid::Uuid;

use crate::constants::{FULL_PERCENT, SPLIT_TOLERANCE};
use crate::error::HisaabError;
use crate::ledger::round2;
use crate::models::{Participant, ShareStatus, SplitEntry, SplitPolicy};

/// Computes the frozen per-participant shares for an expense.
///
/// Deterministic: the same amount, policy, and participant order always
/// yield the same entries. Shares always sum exactly to `amount`; for equal
/// splits the rounding remainder lands on the first participant. All
/// entries come back `Pending`, the caller decides which are already
/// settled.
pub fn compute_splits(
    amount: Decimal,
    policy: SplitPolicy,
    participants: &[Participant],
) -> Result<Vec<SplitEntry>, HisaabError> {
    match policy {
        SplitPolicy::None => Ok(Vec::new()),
        SplitPolicy::Equal => equal_splits(amount, participants),
        SplitPolicy::Percentage => percentage_splits(amount, participants),
        SplitPolicy::Custom => custom_splits(amount, participants),
    }
}

fn equal_splits(amount: Decimal, participants: &[Participant]) -> Result<Vec<SplitEntry>, HisaabError> {
    if participants.is_empty() {
        return Err(HisaabError::invalid_input(
            "splits",
            "an equal split needs at least one participant",
        ));
    }

    let count = Decimal::from(participants.len() as u64);
    let share = round2(amount / count);
    // Whatever rounding left over, positive or negative, goes to the first
    // participant so the shares reproduce the amount exactly.
    let remainder = round2(amount - share * count);

    Ok(participants
        .iter()
        .enumerate()
        .map(|(index, participant)| SplitEntry {
            user_id: participant.user_id,
            percentage: None,
            amount: None,
            final_share: if index == 0 { round2(share + remainder) } else { share },
            status: ShareStatus::Pending,
        })
        .collect())
}

fn percentage_splits(amount: Decimal, participants: &[Participant]) -> Result<Vec<SplitEntry>, HisaabError> {
    let mut shares: Vec<(Uuid, Decimal)> = Vec::with_capacity(participants.len());
    for participant in participants {
        let percentage = participant.percentage.ok_or_else(|| {
            HisaabError::invalid_input(
                "splits",
                format!("participant {} is missing a percentage", participant.user_id),
            )
        })?;
        shares.push((participant.user_id, percentage));
    }

    let total_percent: Decimal = shares.iter().map(|(_, percentage)| *percentage).sum();
    if (total_percent - FULL_PERCENT).abs() > SPLIT_TOLERANCE {
        return Err(HisaabError::invalid_input(
            "splits",
            format!("split percentages add up to {}, expected 100", total_percent),
        ));
    }

    Ok(shares
        .into_iter()
        .map(|(user_id, percentage)| SplitEntry {
            user_id,
            percentage: Some(percentage),
            amount: None,
            final_share: round2(amount * percentage / FULL_PERCENT),
            status: ShareStatus::Pending,
        })
        .collect())
}

fn custom_splits(amount: Decimal, participants: &[Participant]) -> Result<Vec<SplitEntry>, HisaabError> {
    let mut shares: Vec<(Uuid, Decimal)> = Vec::with_capacity(participants.len());
    for participant in participants {
        let supplied = participant.amount.ok_or_else(|| {
            HisaabError::invalid_input(
                "splits",
                format!("participant {} is missing an amount", participant.user_id),
            )
        })?;
        shares.push((participant.user_id, supplied));
    }

    let total: Decimal = shares.iter().map(|(_, supplied)| *supplied).sum();
    if (total - amount).abs() > SPLIT_TOLERANCE {
        return Err(HisaabError::invalid_input(
            "splits",
            format!("custom amounts add up to {}, expected {}", total, amount),
        ));
    }

    Ok(shares
        .into_iter()
        .map(|(user_id, supplied)| SplitEntry {
            user_id,
            percentage: None,
            amount: Some(supplied),
            final_share: round2(supplied),
            status: ShareStatus::Pending,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn participants(count: usize) -> Vec<Participant> {
        (0..count).map(|_| Participant::new(Uuid::new_v4())).collect()
    }

    fn with_percentages(percentages: &[Decimal]) -> Vec<Participant> {
        percentages
            .iter()
            .map(|&percentage| Participant {
                user_id: Uuid::new_v4(),
                percentage: Some(percentage),
                amount: None,
            })
            .collect()
    }

    fn with_amounts(amounts: &[Decimal]) -> Vec<Participant> {
        amounts
            .iter()
            .map(|&amount| Participant {
                user_id: Uuid::new_v4(),
                percentage: None,
                amount: Some(amount),
            })
            .collect()
    }

    #[test]
    fn equal_split_gives_remainder_to_first_participant() {
        let people = participants(3);
        let splits = compute_splits(dec!(100.00), SplitPolicy::Equal, &people).unwrap();

        assert_eq!(splits[0].final_share, dec!(33.34));
        assert_eq!(splits[1].final_share, dec!(33.33));
        assert_eq!(splits[2].final_share, dec!(33.33));
        let total: Decimal = splits.iter().map(|s| s.final_share).sum();
        assert_eq!(total, dec!(100.00));
    }

    #[test]
    fn equal_split_handles_negative_remainder() {
        // 100.01 / 3 rounds up to 33.34, so the first participant absorbs
        // the negative correction.
        let people = participants(3);
        let splits = compute_splits(dec!(100.01), SplitPolicy::Equal, &people).unwrap();

        assert_eq!(splits[0].final_share, dec!(33.33));
        assert_eq!(splits[1].final_share, dec!(33.34));
        assert_eq!(splits[2].final_share, dec!(33.34));
        let total: Decimal = splits.iter().map(|s| s.final_share).sum();
        assert_eq!(total, dec!(100.01));
    }

    #[test]
    fn equal_split_with_exact_division() {
        let people = participants(4);
        let splits = compute_splits(dec!(90.00), SplitPolicy::Equal, &people).unwrap();
        assert!(splits.iter().all(|s| s.final_share == dec!(22.50)));
    }

    #[test]
    fn equal_split_rejects_empty_participants() {
        let result = compute_splits(dec!(50.00), SplitPolicy::Equal, &[]);
        assert!(matches!(result, Err(HisaabError::InvalidInput { .. })));
    }

    #[test]
    fn percentage_split_requires_total_of_one_hundred() {
        let short = with_percentages(&[dec!(50), dec!(49.99)]);
        assert!(matches!(
            compute_splits(dec!(200.00), SplitPolicy::Percentage, &short),
            Err(HisaabError::InvalidInput { .. })
        ));

        let over = with_percentages(&[dec!(50), dec!(50.01)]);
        assert!(matches!(
            compute_splits(dec!(200.00), SplitPolicy::Percentage, &over),
            Err(HisaabError::InvalidInput { .. })
        ));

        let exact = with_percentages(&[dec!(50), dec!(50)]);
        let splits = compute_splits(dec!(200.00), SplitPolicy::Percentage, &exact).unwrap();
        assert_eq!(splits[0].final_share, dec!(100.00));
        assert_eq!(splits[1].final_share, dec!(100.00));
    }

    #[test]
    fn percentage_split_rounds_each_share() {
        let people = with_percentages(&[dec!(33.33), dec!(33.33), dec!(33.34)]);
        let splits = compute_splits(dec!(100.00), SplitPolicy::Percentage, &people).unwrap();

        assert_eq!(splits[0].final_share, dec!(33.33));
        assert_eq!(splits[1].final_share, dec!(33.33));
        assert_eq!(splits[2].final_share, dec!(33.34));
    }

    #[test]
    fn percentage_split_rejects_missing_percentage() {
        let mut people = with_percentages(&[dec!(60)]);
        people.push(Participant::new(Uuid::new_v4()));
        assert!(matches!(
            compute_splits(dec!(100.00), SplitPolicy::Percentage, &people),
            Err(HisaabError::InvalidInput { .. })
        ));
    }

    #[test]
    fn custom_split_accepts_totals_within_tolerance() {
        let people = with_amounts(&[dec!(50.00), dec!(49.996)]);
        let splits = compute_splits(dec!(100.00), SplitPolicy::Custom, &people).unwrap();
        assert_eq!(splits[1].final_share, dec!(50.00));
    }

    #[test]
    fn custom_split_rejects_mismatched_totals() {
        let people = with_amounts(&[dec!(50.00), dec!(49.98)]);
        assert!(matches!(
            compute_splits(dec!(100.00), SplitPolicy::Custom, &people),
            Err(HisaabError::InvalidInput { .. })
        ));
    }

    #[test]
    fn custom_split_rejects_missing_amount() {
        let mut people = with_amounts(&[dec!(70.00)]);
        people.push(Participant::new(Uuid::new_v4()));
        assert!(matches!(
            compute_splits(dec!(100.00), SplitPolicy::Custom, &people),
            Err(HisaabError::InvalidInput { .. })
        ));
    }

    #[test]
    fn none_policy_produces_no_entries() {
        let people = participants(2);
        let splits = compute_splits(dec!(40.00), SplitPolicy::None, &people).unwrap();
        assert!(splits.is_empty());
    }

    #[test]
    fn splits_are_deterministic_for_identical_input() {
        let people = participants(3);
        let first = compute_splits(dec!(77.77), SplitPolicy::Equal, &people).unwrap();
        let second = compute_splits(dec!(77.77), SplitPolicy::Equal, &people).unwrap();
        assert_eq!(first, second);
    }
}
