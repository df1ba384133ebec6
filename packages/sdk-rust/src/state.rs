//! Chain snapshot types and their decoding.
//!
//! The chain-storage reader hands us JSON documents shaped like the contract
//! storage (camelCase farm storage, snake_case DEX storage, a block header).
//! Each `parse_*` function decodes one of them into an immutable snapshot.
//! Snapshots are replaced wholesale on every read; nothing here mutates them.

use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::error::{Error, Result};
use crate::penalty::PenaltyTerms;

/// Default LP fee: 0.30 %
pub const FEE_RATE_DEFAULT_BPS: u32 = 30;

// ─── Pool ─────────────────────────────────────────────────────────────────────

/// Two-asset AMM pool reserves, in smallest units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolReserves {
    /// Native-asset reserve.
    pub base_reserve:  Decimal,
    /// Token reserve, scaled by the token's decimal count.
    pub token_reserve: Decimal,
    /// Fee taken from swap inputs, in basis points.
    pub fee_rate_bps:  Decimal,
}

/// DEX storage as needed off-chain: reserves plus outstanding LP supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStorage {
    pub reserves:        PoolReserves,
    pub lp_total_supply: Decimal,
}

#[derive(Deserialize)]
struct RawDexStorage {
    storage: RawDexInner,
}

#[derive(Deserialize)]
struct RawDexInner {
    tez_pool:     Decimal,
    token_pool:   Decimal,
    total_supply: Decimal,
    #[serde(default)]
    fee_rate_bps: Option<Decimal>,
}

/// Decode a DEX storage document: `{"storage": {"tez_pool", "token_pool", "total_supply"}}`.
pub fn parse_pool_storage(json: &str) -> Result<PoolStorage> {
    let raw: RawDexStorage = from_json(json)?;
    let inner = raw.storage;
    for (path, value) in [
        ("storage.tez_pool", &inner.tez_pool),
        ("storage.token_pool", &inner.token_pool),
        ("storage.total_supply", &inner.total_supply),
    ] {
        non_negative(path, value)?;
    }
    Ok(PoolStorage {
        reserves: PoolReserves {
            base_reserve:  inner.tez_pool,
            token_reserve: inner.token_pool,
            fee_rate_bps:  inner.fee_rate_bps.unwrap_or_else(|| FEE_RATE_DEFAULT_BPS.into()),
        },
        lp_total_supply: inner.total_supply,
    })
}

// ─── Farm ─────────────────────────────────────────────────────────────────────

/// Global accounting of the farm contract at `last_block_update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmState {
    pub last_block_update:            u64,
    /// Cumulative reward per staked LP unit, scaled by `rewards::SCALING_FACTOR`.
    pub accumulated_reward_per_share: Decimal,
    pub reward_per_block:             Decimal,
    pub total_planned_blocks:         Decimal,
    pub claimed_rewards_paid:         Decimal,
    pub claimed_rewards_unpaid:       Decimal,
    pub total_staked_lp:              Decimal,
    pub penalty_fee_percentage:       Decimal,
    pub penalty_period_seconds:       u64,
}

impl FarmState {
    /// `reward_per_block × total_planned_blocks`: the farm's whole reward budget.
    pub fn planned_total(&self) -> Decimal {
        &self.reward_per_block * &self.total_planned_blocks
    }

    /// Rewards already accounted for on-chain, paid or not.
    pub fn claimed_total(&self) -> Decimal {
        &self.claimed_rewards_paid + &self.claimed_rewards_unpaid
    }

    pub fn penalty(&self) -> PenaltyTerms {
        PenaltyTerms {
            fee_percentage: self.penalty_fee_percentage.clone(),
            period_seconds: self.penalty_period_seconds,
        }
    }
}

/// One user's stake position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegatorRecord {
    pub lp_token_balance:                  Decimal,
    /// Global per-share accumulator at the user's last deposit or claim.
    pub accumulated_reward_per_share_start: Decimal,
    /// Unix seconds of the last deposit or claim.
    pub last_update:                       i64,
}

/// Farm storage: global state plus every delegator's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmStorage {
    pub farm:       FarmState,
    pub delegators: HashMap<String, DelegatorRecord>,
}

impl FarmStorage {
    /// `None` means the address has never staked.
    pub fn delegator(&self, address: &str) -> Option<&DelegatorRecord> {
        self.delegators.get(address)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFarmStorage {
    farm:                  RawFarm,
    farm_lp_token_balance: Decimal,
    #[serde(default)]
    delegators:            HashMap<String, RawDelegator>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFarm {
    last_block_update:            Decimal,
    accumulated_reward_per_share: Decimal,
    planned_rewards:              RawPlannedRewards,
    claimed_rewards:              RawClaimedRewards,
    #[serde(default)]
    penalty:                      RawPenalty,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlannedRewards {
    reward_per_block: Decimal,
    total_blocks:     Decimal,
}

#[derive(Deserialize)]
struct RawClaimedRewards {
    paid:   Decimal,
    unpaid: Decimal,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawPenalty {
    fee_percentage: Decimal,
    period_seconds: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDelegator {
    lp_token_balance:                  Decimal,
    accumulated_reward_per_share_start: Decimal,
    last_update:                       RawTimestamp,
}

/// Tezos-style RPCs return RFC 3339 strings; indexers often return unix seconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Unix(i64),
    Text(String),
}

impl RawTimestamp {
    fn to_unix(&self, path: &str) -> Result<i64> {
        match self {
            RawTimestamp::Unix(secs) => Ok(*secs),
            RawTimestamp::Text(text) => {
                if let Ok(secs) = text.parse::<i64>() {
                    return Ok(secs);
                }
                DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.timestamp())
                    .map_err(|e| Error::ParseError { path: path.to_string(), reason: e.to_string() })
            }
        }
    }
}

/// Decode a farm storage document.
pub fn parse_farm_storage(json: &str) -> Result<FarmStorage> {
    let raw: RawFarmStorage = from_json(json)?;
    let f = raw.farm;

    for (path, value) in [
        ("farm.accumulatedRewardPerShare", &f.accumulated_reward_per_share),
        ("farm.plannedRewards.rewardPerBlock", &f.planned_rewards.reward_per_block),
        ("farm.plannedRewards.totalBlocks", &f.planned_rewards.total_blocks),
        ("farm.claimedRewards.paid", &f.claimed_rewards.paid),
        ("farm.claimedRewards.unpaid", &f.claimed_rewards.unpaid),
        ("farm.penalty.feePercentage", &f.penalty.fee_percentage),
        ("farmLpTokenBalance", &raw.farm_lp_token_balance),
    ] {
        non_negative(path, value)?;
    }

    let farm = FarmState {
        last_block_update:            whole_u64("farm.lastBlockUpdate", &f.last_block_update)?,
        accumulated_reward_per_share: f.accumulated_reward_per_share,
        reward_per_block:             f.planned_rewards.reward_per_block,
        total_planned_blocks:         f.planned_rewards.total_blocks,
        claimed_rewards_paid:         f.claimed_rewards.paid,
        claimed_rewards_unpaid:       f.claimed_rewards.unpaid,
        total_staked_lp:              raw.farm_lp_token_balance,
        penalty_fee_percentage:       f.penalty.fee_percentage,
        penalty_period_seconds:       whole_u64("farm.penalty.periodSeconds", &f.penalty.period_seconds)?,
    };

    let mut delegators = HashMap::with_capacity(raw.delegators.len());
    for (address, d) in raw.delegators {
        let path = format!("delegators.{address}");
        non_negative(&format!("{path}.lpTokenBalance"), &d.lp_token_balance)?;
        let last_update = d.last_update.to_unix(&format!("{path}.lastUpdate"))?;
        delegators.insert(address, DelegatorRecord {
            lp_token_balance:                  d.lp_token_balance,
            accumulated_reward_per_share_start: d.accumulated_reward_per_share_start,
            last_update,
        });
    }

    Ok(FarmStorage { farm, delegators })
}

// ─── Block header ─────────────────────────────────────────────────────────────

/// Height and time of the chain head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHead {
    pub level:     u64,
    /// Unix seconds.
    pub timestamp: i64,
}

#[derive(Deserialize)]
struct RawBlockHead {
    level:     u64,
    timestamp: RawTimestamp,
}

/// Decode a block header document: `{"level": 1500000, "timestamp": "2021-07-01T00:00:00Z"}`.
pub fn parse_block_head(json: &str) -> Result<BlockHead> {
    let raw: RawBlockHead = from_json(json)?;
    Ok(BlockHead { level: raw.level, timestamp: raw.timestamp.to_unix("timestamp")? })
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| Error::ParseError {
        path:   format!("line {} column {}", e.line(), e.column()),
        reason: e.to_string(),
    })
}

fn non_negative(path: &str, value: &Decimal) -> Result<()> {
    if value.is_negative() {
        return Err(Error::ParseError { path: path.to_string(), reason: format!("negative value {value}") });
    }
    Ok(())
}

fn whole_u64(path: &str, value: &Decimal) -> Result<u64> {
    value.to_u64().ok_or_else(|| Error::ParseError {
        path:   path.to_string(),
        reason: format!("expected a non-negative integer, got {value}"),
    })
}
