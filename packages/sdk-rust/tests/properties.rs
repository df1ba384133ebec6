//! Property tests for the quoting, accrual and penalty arithmetic.
//!
//! Increase cases: PROPTEST_CASES=1000 cargo test -p farmcalc-sdk --test properties

use farmcalc_sdk::*;
use proptest::prelude::*;

const FEE_BPS: u64 = 30;

fn dec(v: u64) -> Decimal {
    Decimal::from(v)
}

fn farm(last_block_update: u64, reward_per_block: u64, planned_blocks: u64, claimed: u64, staked: u64) -> FarmState {
    FarmState {
        last_block_update,
        accumulated_reward_per_share: dec(0),
        reward_per_block:             dec(reward_per_block),
        total_planned_blocks:         dec(planned_blocks),
        claimed_rewards_paid:         dec(claimed),
        claimed_rewards_unpaid:       dec(0),
        total_staked_lp:              dec(staked),
        penalty_fee_percentage:       dec(0),
        penalty_period_seconds:       0,
    }
}

// ============================================================================
// Swap quoter
// ============================================================================

proptest! {
    #[test]
    fn output_is_monotonic_in_input(
        reserve_in in 1u64..1_000_000_000_000,
        reserve_out in 1u64..1_000_000_000_000,
        a in 0u64..1_000_000_000_000,
        b in 0u64..1_000_000_000_000,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let out_lo = quote_output_for_input(&dec(reserve_in), &dec(reserve_out), &dec(lo), &dec(FEE_BPS)).unwrap();
        let out_hi = quote_output_for_input(&dec(reserve_in), &dec(reserve_out), &dec(hi), &dec(FEE_BPS)).unwrap();
        prop_assert!(out_lo <= out_hi);
        prop_assert!(!out_lo.is_negative());
        prop_assert!(out_hi < dec(reserve_out));
    }

    #[test]
    fn zero_input_quotes_zero(
        reserve_in in 1u64..u64::MAX,
        reserve_out in 1u64..u64::MAX,
        fee_bps in 0u64..10_000,
    ) {
        let out = quote_output_for_input(&dec(reserve_in), &dec(reserve_out), &dec(0), &dec(fee_bps)).unwrap();
        prop_assert!(out.is_zero());
    }

    /// Small trades (well below `fee · reserve_out`) round-trip to no more than the original input.
    #[test]
    fn reverse_quote_never_exceeds_input(
        reserve_in in 1_000_000_000u64..1_000_000_000_000,
        reserve_out in 1_000_000_000u64..1_000_000_000_000,
        permille in 1u64..1_000,
    ) {
        let amount_in = (reserve_in / 1_000_000 * permille).max(1_000_000);
        let out = quote_output_for_input(&dec(reserve_in), &dec(reserve_out), &dec(amount_in), &dec(FEE_BPS)).unwrap();
        let back = quote_input_for_output(&dec(reserve_in), &dec(reserve_out), &out, &dec(FEE_BPS)).unwrap();
        prop_assert!(back <= dec(amount_in), "in={} out={} back={}", amount_in, out, back);
    }

    #[test]
    fn required_input_is_never_negative(
        reserve_in in 1u64..1_000_000_000_000,
        reserve_out in 1u64..1_000_000_000_000,
        amount_out in 0u64..1_000_000_000_000,
    ) {
        match quote_input_for_output(&dec(reserve_in), &dec(reserve_out), &dec(amount_out), &dec(FEE_BPS)) {
            Ok(amount_in) => prop_assert!(!amount_in.is_negative()),
            Err(Error::InsufficientLiquidity { .. }) => prop_assert!(amount_out >= reserve_out / 2),
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    #[test]
    fn slippage_extremes(amount in 0u64..u64::MAX) {
        prop_assert_eq!(apply_slippage_tolerance(&dec(amount), &dec(0)).unwrap(), dec(amount));
        prop_assert!(apply_slippage_tolerance(&dec(amount), &dec(1)).unwrap().is_zero());
    }
}

// ============================================================================
// Reward accrual
// ============================================================================

proptest! {
    #[test]
    fn accumulator_never_decreases_with_height(
        reward_per_block in 1u64..1_000_000,
        planned_blocks in 1u64..100_000,
        staked in 1u64..1_000_000_000_000,
        h1 in 0u64..200_000,
        h2 in 0u64..200_000,
    ) {
        let f = farm(0, reward_per_block, planned_blocks, 0, staked);
        let (lo, hi) = if h1 <= h2 { (h1, h2) } else { (h2, h1) };
        let acc_lo = project_accumulated_reward_per_share(&f, lo).unwrap();
        let acc_hi = project_accumulated_reward_per_share(&f, hi).unwrap();
        prop_assert!(acc_lo <= acc_hi);
    }

    #[test]
    fn emission_never_exceeds_remaining_budget(
        reward_per_block in 1u64..1_000_000,
        planned_blocks in 1u64..100_000,
        claimed_blocks in 0u64..100_000,
        height in 0u64..300_000,
    ) {
        let claimed_blocks = claimed_blocks.min(planned_blocks);
        let f = farm(0, reward_per_block, planned_blocks, claimed_blocks * reward_per_block, 1);
        let emitted = emission_since_update(&f, height);
        prop_assert!(&emitted + &f.claimed_total() <= f.planned_total());
        prop_assert!(!emitted.is_negative());
    }

    #[test]
    fn pending_is_zero_at_checkpoint(
        acc in 0u64..u64::MAX,
        balance in 0u64..u64::MAX,
    ) {
        let record = DelegatorRecord {
            lp_token_balance: dec(balance),
            accumulated_reward_per_share_start: dec(acc),
            last_update: 0,
        };
        prop_assert!(pending_reward(Some(&record), &dec(acc)).is_zero());
    }
}

// ============================================================================
// Penalty
// ============================================================================

proptest! {
    #[test]
    fn zero_period_is_never_within_penalty(last_update in any::<i64>(), now in any::<i64>()) {
        prop_assert!(!is_within_penalty_period(last_update, 0, now));
        prop_assert_eq!(remaining_penalty_seconds(last_update, 0, now), 0);
    }

    #[test]
    fn remaining_seconds_agree_with_window(
        last_update in 0i64..2_000_000_000,
        period in 1u64..10_000_000,
        elapsed in -1_000_000i64..20_000_000,
    ) {
        let now = last_update + elapsed;
        let within = is_within_penalty_period(last_update, period, now);
        let remaining = remaining_penalty_seconds(last_update, period, now);
        prop_assert_eq!(within, remaining > 0);
        prop_assert!(remaining <= period + 1_000_000);
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_one_unit_swap() {
    let out = quote_output_for_input(&dec(1_000_000_000), &dec(2_000_000_000), &dec(1_000_000), &dec(FEE_BPS)).unwrap();
    assert_eq!(out, dec(1_992_013));
}

#[test]
fn scenario_emission_cap() {
    let f = farm(1_000, 1_000, 100, 0, 1_000_000);
    assert_eq!(emission_since_update(&f, 1_150), dec(100_000));
}

#[test]
fn scenario_penalty_countdown() {
    let now = 1_625_140_800;
    assert_eq!(remaining_penalty_seconds(now - 3600, 86_400, now), 82_800);
    assert_eq!(format_countdown(82_800), "23:00:00");
}
