//! Pari-mutuel settlement arithmetic.
//!
//! All monetary amounts are integers in the smallest token unit, odds
//! are basis-100 (100 = 1.00x) and fee rates are basis points. Every
//! division is floor division; no floating point anywhere.

use crate::error::PoolError;
use crate::storage::{BPS_DENOMINATOR, ODDS_BASIS};

/// Maximum bettor-side stake a pool can accept while remaining solvent:
///
///   max_bettor_stake = total_creator_side * 100 / (odds - 100)
///
/// At this bound the worst case for the creator side,
/// total_bettor * odds / 100, never exceeds the funds deposited on both
/// sides combined.
pub fn max_bettor_stake(total_creator_side: i128, odds: u32) -> Result<i128, PoolError> {
    if (odds as i128) <= ODDS_BASIS {
        return Err(PoolError::InvalidOdds);
    }
    if total_creator_side < 0 {
        return Err(PoolError::InvalidAmount);
    }

    total_creator_side
        .checked_mul(ODDS_BASIS)
        .ok_or(PoolError::Overflow)?
        .checked_div(odds as i128 - ODDS_BASIS)
        .ok_or(PoolError::Overflow)
}

/// Gross fixed-odds payout for a winning bettor: stake * odds / 100.
/// Independent of every other bettor's stake.
pub fn bettor_gross_payout(stake: i128, odds: u32) -> Result<i128, PoolError> {
    if (odds as i128) <= ODDS_BASIS {
        return Err(PoolError::InvalidOdds);
    }
    if stake < 0 {
        return Err(PoolError::InvalidAmount);
    }

    stake
        .checked_mul(odds as i128)
        .ok_or(PoolError::Overflow)?
        .checked_div(ODDS_BASIS)
        .ok_or(PoolError::Overflow)
}

/// Fee charged on bettor profit. Principal is never taxed.
pub fn fee_on_profit(profit: i128, fee_bps: i128) -> Result<i128, PoolError> {
    if !(0..=BPS_DENOMINATOR).contains(&fee_bps) {
        return Err(PoolError::InvalidFeeRate);
    }
    if profit < 0 {
        return Err(PoolError::InvalidAmount);
    }

    profit
        .checked_mul(fee_bps)
        .ok_or(PoolError::Overflow)?
        .checked_div(BPS_DENOMINATOR)
        .ok_or(PoolError::Overflow)
}

/// Payout for a creator-side contributor when the creator side wins:
/// own principal plus a share of the losing bettor stake proportional
/// to the contributor's share of the creator side. Rounding residue
/// stays in the contract.
pub fn creator_side_payout(
    stake: i128,
    total_creator_side: i128,
    total_bettor: i128,
) -> Result<i128, PoolError> {
    if total_creator_side <= 0 || stake < 0 || total_bettor < 0 {
        return Err(PoolError::InvalidAmount);
    }

    let bonus = total_bettor
        .checked_mul(stake)
        .ok_or(PoolError::Overflow)?
        .checked_div(total_creator_side)
        .ok_or(PoolError::Overflow)?;

    stake.checked_add(bonus).ok_or(PoolError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_spot_checks() {
        // 100 creator-side units at barely-above-even odds carry a huge
        // bettor side: 100 * 100 / 1 = 10000.
        assert_eq!(max_bettor_stake(100, 101).unwrap(), 10_000);

        // 200 at 2.00x: 200 * 100 / 100 = 200.
        assert_eq!(max_bettor_stake(200, 200).unwrap(), 200);
    }

    #[test]
    fn test_capacity_floor_division() {
        // 100 * 100 / 3 = 3333 (floor)
        assert_eq!(max_bettor_stake(100, 103).unwrap(), 3_333);
    }

    #[test]
    fn test_capacity_monotone_in_creator_stake() {
        let mut prev = 0;
        for creator_side in [10, 100, 1_000, 10_000, 100_000] {
            let cap = max_bettor_stake(creator_side, 150).unwrap();
            assert!(cap >= prev, "capacity shrank: {} < {}", cap, prev);
            prev = cap;
        }
    }

    #[test]
    fn test_capacity_rejects_even_odds() {
        assert!(matches!(max_bettor_stake(100, 100), Err(PoolError::InvalidOdds)));
        assert!(matches!(max_bettor_stake(100, 0), Err(PoolError::InvalidOdds)));
    }

    #[test]
    fn test_capacity_overflow_guard() {
        let result = max_bettor_stake(i128::MAX / 2, 101);
        assert!(matches!(result, Err(PoolError::Overflow)));
    }

    #[test]
    fn test_fixed_odds_payout() {
        // x=10 at o=150 pays 15 gross.
        assert_eq!(bettor_gross_payout(10, 150).unwrap(), 15);
        assert_eq!(bettor_gross_payout(1_000, 101).unwrap(), 1_010);
        // Floor: 3 * 150 / 100 = 4
        assert_eq!(bettor_gross_payout(3, 150).unwrap(), 4);
    }

    #[test]
    fn test_fee_on_profit() {
        assert_eq!(fee_on_profit(500, 500).unwrap(), 25);
        // Truncates to zero on dust-level profit
        assert_eq!(fee_on_profit(19, 500).unwrap(), 0);
        assert_eq!(fee_on_profit(100, 0).unwrap(), 0);
    }

    #[test]
    fn test_fee_rate_out_of_range() {
        assert!(matches!(
            fee_on_profit(100, BPS_DENOMINATOR + 1),
            Err(PoolError::InvalidFeeRate)
        ));
        assert!(matches!(fee_on_profit(100, -1), Err(PoolError::InvalidFeeRate)));
    }

    #[test]
    fn test_proportional_creator_side_payout() {
        // Creator 100, LP1 50, LP2 30 against 150 of bettor stake:
        // bonus shares are 150 * stake / 180, floored.
        assert_eq!(creator_side_payout(100, 180, 150).unwrap(), 100 + 83);
        assert_eq!(creator_side_payout(50, 180, 150).unwrap(), 50 + 41);
        assert_eq!(creator_side_payout(30, 180, 150).unwrap(), 30 + 25);
    }

    #[test]
    fn test_proportional_payout_distributes_at_most_bettor_stake() {
        let stakes = [100i128, 50, 30];
        let total_creator: i128 = stakes.iter().sum();
        let total_bettor = 150i128;

        let paid: i128 = stakes
            .iter()
            .map(|s| creator_side_payout(*s, total_creator, total_bettor).unwrap())
            .sum();
        assert!(paid <= total_creator + total_bettor);
    }

    #[test]
    fn test_proportional_payout_no_bettors() {
        // No-bets refund path: every contributor gets exactly their
        // principal back.
        assert_eq!(creator_side_payout(70, 100, 0).unwrap(), 70);
    }

    #[test]
    fn test_proportional_payout_rejects_empty_creator_side() {
        assert!(matches!(
            creator_side_payout(10, 0, 150),
            Err(PoolError::InvalidAmount)
        ));
    }

    #[test]
    fn test_solvency_at_capacity() {
        // When the bettor side is filled exactly to capacity, the gross
        // fixed-odds payout never exceeds total deposits.
        for (creator_side, odds) in [(100i128, 101u32), (200, 200), (1_000, 350), (7, 9_999)] {
            let cap = max_bettor_stake(creator_side, odds).unwrap();
            let gross = bettor_gross_payout(cap, odds).unwrap();
            assert!(
                gross <= creator_side + cap,
                "insolvent at creator_side={} odds={}: {} > {}",
                creator_side,
                odds,
                gross,
                creator_side + cap
            );
        }
    }
}
