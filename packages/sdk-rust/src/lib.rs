//! farmcalc Rust SDK
//!
//! Off-chain replica of a constant-product DEX pool and its yield farm.
//! Quotes swaps, projects unclaimed farm rewards between on-chain accruals,
//! estimates APR and evaluates the early-withdrawal penalty from immutable
//! chain snapshots, with no network access and no floating point.
//!
//! # Quick Start
//!
//! ```rust
//! use farmcalc_sdk::{
//!     parse_block_head, parse_farm_storage, parse_pool_storage, quote_exact_in, Decimal,
//!     FarmSummary, NetworkParams, SwapDirection,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = parse_pool_storage(
//!     r#"{"storage": {"tez_pool": "1000000000", "token_pool": "2000000000", "total_supply": "8000000"}}"#,
//! )?;
//!
//! // 1. Quote selling one base unit with 0.5% slippage tolerance
//! let amount_in: Decimal = "1000000".parse()?;
//! let slippage: Decimal = "0.005".parse()?;
//! let quote = quote_exact_in(&pool.reserves, SwapDirection::BaseToToken, &amount_in, &slippage)?;
//! assert_eq!(quote.output_amount.to_string(), "1992013");
//! assert_eq!(quote.minimum_output_after_slippage.to_string(), "1982052");
//!
//! // 2. Farm figures for a connected address
//! let farm = parse_farm_storage(r#"{
//!     "farm": {
//!         "lastBlockUpdate": "1500000",
//!         "accumulatedRewardPerShare": "2500",
//!         "plannedRewards": { "rewardPerBlock": "1000", "totalBlocks": "100" },
//!         "claimedRewards": { "paid": "0", "unpaid": "0" },
//!         "penalty": { "feePercentage": "5", "periodSeconds": "86400" }
//!     },
//!     "farmLpTokenBalance": "4000000",
//!     "delegators": {
//!         "tz1alice": {
//!             "lpTokenBalance": "1000000",
//!             "accumulatedRewardPerShareStart": "2000",
//!             "lastUpdate": "2021-07-01T12:00:00Z"
//!         }
//!     }
//! }"#)?;
//! let head = parse_block_head(r#"{"level": 1500010, "timestamp": "2021-07-01T13:00:00Z"}"#)?;
//!
//! let summary = FarmSummary::compute(&farm, &pool, Some("tz1alice"), &head, &NetworkParams::default());
//! assert_eq!(summary.unclaimed_reward.map(|r| r.to_string()).as_deref(), Some("3000"));
//! assert_eq!(summary.penalty.remaining_seconds, 82_800);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Overview
//!
//! | Function | Description |
//! |--------|-------------|
//! | [`quote_output_for_input`] | Constant-product output for an input, floored |
//! | [`quote_input_for_output`] | Required input for an output, rounded up |
//! | [`apply_slippage_tolerance`] | Minimum-output bound for a swap |
//! | [`project_accumulated_reward_per_share`] | Accumulator at the current block |
//! | [`pending_reward`] | A delegator's unclaimed reward |
//! | [`estimate_apr`] | Farm APR in pool-reserve terms |
//! | [`is_within_penalty_period`] | Early-withdrawal window check |
//! | [`FarmSummary::compute`] | Every farm figure, errors resolved to `None` |

pub mod decimal;
pub mod error;
pub mod params;
pub mod penalty;
pub mod position;
pub mod quote;
pub mod rewards;
pub mod state;
pub mod summary;

pub use decimal::Decimal;
pub use error::{Error, Result};
pub use params::{AprDenomination, NetworkParams};
pub use penalty::{format_countdown, is_within_penalty_period, remaining_penalty_seconds, PenaltyTerms};
pub use position::{to_base_units, MAX_TOKEN_DECIMALS, to_display_units, validate_deposit, validate_withdraw};
pub use quote::{
    apply_slippage_tolerance, quote_exact_in, quote_exact_out, quote_input_for_output,
    quote_output_for_input, spot_price, Quote, SwapDirection,
};
pub use rewards::{
    checked_pending_reward, emission_since_update, estimate_apr, pending_reward,
    project_accumulated_reward_per_share, SCALING_FACTOR,
};
pub use state::{
    parse_block_head, parse_farm_storage, parse_pool_storage, BlockHead, DelegatorRecord,
    FarmState, FarmStorage, PoolReserves, PoolStorage,
};
pub use summary::{FarmSummary, PenaltyStatus};
