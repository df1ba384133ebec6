//! Farm figures for display.
//!
//! This is where calculation errors stop: anything the formulas cannot
//! produce (empty farm, drained pool, zero block time) becomes `None`, which
//! callers render as "N/A". All amounts are in smallest units.

use log::debug;
use serde::Serialize;

use crate::decimal::Decimal;
use crate::error::Result;
use crate::params::NetworkParams;
use crate::penalty::PenaltyTerms;
use crate::rewards::{estimate_apr, pending_reward, project_accumulated_reward_per_share};
use crate::state::{BlockHead, FarmStorage, PoolStorage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PenaltyStatus {
    pub fee_percentage:               Decimal,
    pub period:                       String,
    /// Withdrawing now would be charged.
    pub applies:                      bool,
    pub remaining_seconds:            u64,
    /// Fee withheld if the whole stake were withdrawn now.
    pub withdrawal_fee_on_full_stake: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmSummary {
    pub block_level:      u64,
    pub total_staked:     Decimal,
    pub apr:              Option<Decimal>,
    pub personal_stake:   Decimal,
    pub unclaimed_reward: Option<Decimal>,
    pub penalty:          PenaltyStatus,
}

impl FarmSummary {
    /// `delegator` is the viewing address, if a wallet is connected.
    pub fn compute(
        storage:   &FarmStorage,
        pool:      &PoolStorage,
        delegator: Option<&str>,
        head:      &BlockHead,
        params:    &NetworkParams,
    ) -> Self {
        let farm = &storage.farm;
        let record = delegator.and_then(|address| storage.delegator(address));

        let apr = available("apr", estimate_apr(farm, &pool.reserves, &pool.lp_total_supply, params));

        let unclaimed_reward = match record {
            None => Some(Decimal::zero()),
            Some(r) => available("accrual", project_accumulated_reward_per_share(farm, head.level))
                .map(|acc| pending_reward(Some(r), &acc)),
        };

        let personal_stake = record.map(|r| r.lp_token_balance.clone()).unwrap_or_default();
        let terms: PenaltyTerms = farm.penalty();
        let penalty = PenaltyStatus {
            fee_percentage:               terms.fee_percentage.clone(),
            period:                       terms.describe_period(),
            applies:                      terms.penalty_applies(record, head.timestamp),
            remaining_seconds:            terms.penalty_remaining_seconds(record, head.timestamp),
            withdrawal_fee_on_full_stake: terms.withdrawal_fee(&personal_stake, record, head.timestamp),
        };

        Self {
            block_level: head.level,
            total_staked: farm.total_staked_lp.clone(),
            apr,
            personal_stake,
            unclaimed_reward,
            penalty,
        }
    }
}

fn available<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{what} unavailable: {e}");
            None
        }
    }
}
