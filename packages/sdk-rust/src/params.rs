//! Network and farm constants that vary per deployment.
//!
//! Nothing chain-specific is hard-coded in the formulas: the block interval,
//! token decimals and APR denomination are all carried here so the same
//! arithmetic can be checked against any chain's block time.

use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::error::Result;

/// Seconds in a 365-day year.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Which pool reserve the staked LP value is expressed in when computing APR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AprDenomination {
    /// Value staked LP in the pool's native/base asset.
    #[default]
    Base,
    /// Value staked LP in the pool's token, for farms that pay rewards in that token.
    Token,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Nominal block interval of the chain.
    pub block_time_seconds: u64,
    /// Decimal places of the LP token.
    pub lp_token_decimals:  u32,
    /// Decimal places of the farm's reward token.
    pub reward_token_decimals: u32,
    pub apr_denomination:   AprDenomination,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            block_time_seconds:    30,
            lp_token_decimals:     6,
            reward_token_decimals: 8,
            apr_denomination:      AprDenomination::Base,
        }
    }
}

impl NetworkParams {
    /// `SECONDS_PER_YEAR / block_time_seconds`, fractional when the year is not a
    /// whole number of blocks.
    pub fn blocks_per_year(&self) -> Result<Decimal> {
        Decimal::from(SECONDS_PER_YEAR).checked_div(&Decimal::from(self.block_time_seconds))
    }
}
