//! Farm reward accrual and APR.
//!
//! Mirrors the farm contract's block-paced linear emission and its
//! accumulated-reward-per-share bookkeeping:
//!
//! ```text
//! reward       = min(blocks_elapsed × reward_per_block, planned_total − claimed)   once the budget is hit
//! acc_per_share = acc_per_share + ⌊reward × SCALING_FACTOR / total_staked_lp⌋
//! pending      = ⌊(acc_per_share − acc_per_share_start) × lp_balance / SCALING_FACTOR⌋
//! ```
//!
//! A farm with nothing staked has no defined per-share accrual: every function
//! here reports [`Error::NoStakedLiquidity`] for it rather than returning the
//! previous accumulator.

use log::{debug, warn};

use crate::decimal::Decimal;
use crate::error::{Error, Result};
use crate::params::{AprDenomination, NetworkParams};
use crate::state::{DelegatorRecord, FarmState, PoolReserves};

/// Fixed-point scale of `accumulated_reward_per_share`.
pub const SCALING_FACTOR: u64 = 1_000_000;

/// Reward emitted between `farm.last_block_update` and `current_block`, capped
/// at what remains of the planned budget.
pub fn emission_since_update(farm: &FarmState, current_block: u64) -> Decimal {
    let blocks_elapsed = match current_block.checked_sub(farm.last_block_update) {
        Some(blocks) => blocks,
        None => {
            warn!(
                "block head {current_block} is behind farm update {}; treating as no emission",
                farm.last_block_update
            );
            0
        }
    };

    let outstanding = Decimal::from(blocks_elapsed) * &farm.reward_per_block;
    let claimed = farm.claimed_total();
    let planned = farm.planned_total();

    if &outstanding + &claimed <= planned {
        return outstanding;
    }

    let remaining = planned - claimed;
    if remaining.is_negative() {
        warn!("{}", Error::StaleSnapshotInconsistency(format!("remaining planned rewards ({remaining})")));
        return Decimal::zero();
    }
    remaining
}

/// Accumulator value the contract would hold if it accrued at `current_block`.
pub fn project_accumulated_reward_per_share(farm: &FarmState, current_block: u64) -> Result<Decimal> {
    if farm.total_staked_lp.is_zero() {
        return Err(Error::NoStakedLiquidity);
    }
    let reward = emission_since_update(farm, current_block);
    let increment = (reward * Decimal::from(SCALING_FACTOR))
        .checked_div(&farm.total_staked_lp)?
        .floor();
    Ok(&farm.accumulated_reward_per_share + increment)
}

/// Unclaimed reward, in reward-token smallest units.
///
/// A missing record (never staked) earns exactly zero. A negative result means
/// the snapshot is inconsistent; it is logged and reported as zero.
pub fn pending_reward(delegator: Option<&DelegatorRecord>, projected_acc_per_share: &Decimal) -> Decimal {
    match checked_pending_reward(delegator, projected_acc_per_share) {
        Ok(reward) => reward,
        Err(e) => {
            warn!("{e}; reporting zero pending reward");
            Decimal::zero()
        }
    }
}

/// Like [`pending_reward`] but surfaces `StaleSnapshotInconsistency` instead of clamping.
pub fn checked_pending_reward(
    delegator: Option<&DelegatorRecord>,
    projected_acc_per_share: &Decimal,
) -> Result<Decimal> {
    let Some(record) = delegator else {
        return Ok(Decimal::zero());
    };
    let per_share = projected_acc_per_share - &record.accumulated_reward_per_share_start;
    let reward = (per_share * &record.lp_token_balance)
        .checked_div(&SCALING_FACTOR.into())?
        .floor();
    if reward.is_negative() {
        return Err(Error::StaleSnapshotInconsistency(format!("pending reward ({reward})")));
    }
    Ok(reward)
}

/// Annual percentage rate of the farm.
///
/// `reward_per_block × blocks_per_year / (total_staked_lp × reserve / lp_total_supply) × 100`,
/// where `reserve` is the base or token reserve per `params.apr_denomination`.
pub fn estimate_apr(
    farm:            &FarmState,
    pool:            &PoolReserves,
    lp_total_supply: &Decimal,
    params:          &NetworkParams,
) -> Result<Decimal> {
    if farm.total_staked_lp.is_zero() {
        return Err(Error::NoStakedLiquidity);
    }

    let blocks_per_year = params.blocks_per_year()?;
    let yearly_emission = &farm.reward_per_block * &blocks_per_year;

    let reserve = match params.apr_denomination {
        AprDenomination::Base  => &pool.base_reserve,
        AprDenomination::Token => &pool.token_reserve,
    };
    let staked_value = (&farm.total_staked_lp * reserve).checked_div(lp_total_supply)?;
    let apr = (&yearly_emission * Decimal::from(100u32)).checked_div(&staked_value)?;

    debug!(
        "apr: reward_per_block={} blocks_per_year={} total_staked={} reserve={} lp_total_supply={} \
         yearly_emission={} staked_value={} apr={}",
        farm.reward_per_block, blocks_per_year, farm.total_staked_lp, reserve, lp_total_supply,
        yearly_emission, staked_value, apr,
    );
    Ok(apr)
}
