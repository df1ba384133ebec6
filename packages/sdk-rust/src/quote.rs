//! Constant-product swap quoting.
//!
//! Mirrors the pool contract's `x · y = k` pricing with the LP fee taken from
//! the input, so off-chain quotes match what the pool will pay out. Outputs are
//! floored and required inputs are rounded up: a quote never rounds in the
//! trader's favour, because it is used to set a transaction's minimum-output
//! bound.

use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::error::{Error, Result};
use crate::position::to_display_units;
use crate::state::PoolReserves;

// ─── Constants ────────────────────────────────────────────────────────────────

/// Basis-point denominator for the LP fee.
pub const BPS_DENOMINATOR: u32 = 10_000;

// ─── Primitives ───────────────────────────────────────────────────────────────

/// `fee_rate_bps / 10_000`, validated to lie in `[0, 1)`.
fn fee_fraction(fee_rate_bps: &Decimal) -> Result<Decimal> {
    let fee = fee_rate_bps.checked_div(&BPS_DENOMINATOR.into())?;
    if fee.is_negative() || fee >= Decimal::one() {
        return Err(Error::InvalidArgument(format!("fee_rate_bps {fee_rate_bps} must be in [0, 10000)")));
    }
    Ok(fee)
}

/// Both reserves must hold at least one smallest unit.
fn ensure_initialized(reserve_in: &Decimal, reserve_out: &Decimal) -> Result<()> {
    let unit = Decimal::one();
    if reserve_in < &unit || reserve_out < &unit {
        return Err(Error::PoolUninitialized);
    }
    Ok(())
}

fn ensure_non_negative(name: &str, amount: &Decimal) -> Result<()> {
    if amount.is_negative() {
        return Err(Error::InvalidArgument(format!("{name} must not be negative, got {amount}")));
    }
    Ok(())
}

/// Output received for `amount_in`:
/// `floor((1 − fee)·amount_in·reserve_out / (reserve_in + (1 − fee)·amount_in))`.
pub fn quote_output_for_input(
    reserve_in:   &Decimal,
    reserve_out:  &Decimal,
    amount_in:    &Decimal,
    fee_rate_bps: &Decimal,
) -> Result<Decimal> {
    ensure_initialized(reserve_in, reserve_out)?;
    ensure_non_negative("amount_in", amount_in)?;
    if amount_in.is_zero() {
        return Ok(Decimal::zero());
    }

    let net_in = (Decimal::one() - fee_fraction(fee_rate_bps)?) * amount_in;
    let out = (&net_in * reserve_out).checked_div(&(reserve_in + &net_in))?;
    Ok(out.floor().max(Decimal::zero()))
}

/// Input required to receive `amount_out`:
/// `ceil((1 + fee)·amount_out·reserve_in / (reserve_out − (1 + fee)·amount_out))`.
///
/// Fails with `InsufficientLiquidity` when `(1 + fee)·amount_out >= reserve_out`.
pub fn quote_input_for_output(
    reserve_in:   &Decimal,
    reserve_out:  &Decimal,
    amount_out:   &Decimal,
    fee_rate_bps: &Decimal,
) -> Result<Decimal> {
    ensure_initialized(reserve_in, reserve_out)?;
    ensure_non_negative("amount_out", amount_out)?;
    if amount_out.is_zero() {
        return Ok(Decimal::zero());
    }

    let gross_out = (Decimal::one() + fee_fraction(fee_rate_bps)?) * amount_out;
    if &gross_out >= reserve_out {
        return Err(Error::InsufficientLiquidity {
            requested: amount_out.to_string(),
            available: reserve_out.to_string(),
        });
    }
    let amount_in = (&gross_out * reserve_in).checked_div(&(reserve_out - &gross_out))?;
    Ok(amount_in.ceil())
}

/// `floor(amount · (1 − tolerance))`, `tolerance` as a ratio in `[0, 1]`.
pub fn apply_slippage_tolerance(amount: &Decimal, tolerance: &Decimal) -> Result<Decimal> {
    if tolerance.is_negative() || tolerance > &Decimal::one() {
        return Err(Error::InvalidArgument(format!("slippage tolerance {tolerance} must be in [0, 1]")));
    }
    Ok((amount * (Decimal::one() - tolerance)).floor().max(Decimal::zero()))
}

// ─── Quote ────────────────────────────────────────────────────────────────────

/// Which side of the pool the trader sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwapDirection {
    /// Sell the native/base asset, receive the token.
    BaseToToken,
    /// Sell the token, receive the native/base asset.
    TokenToBase,
}

impl SwapDirection {
    /// `(reserve_in, reserve_out)` for this direction.
    pub fn reserves<'a>(&self, pool: &'a PoolReserves) -> (&'a Decimal, &'a Decimal) {
        match self {
            SwapDirection::BaseToToken => (&pool.base_reserve, &pool.token_reserve),
            SwapDirection::TokenToBase => (&pool.token_reserve, &pool.base_reserve),
        }
    }
}

/// A transient swap quote, recomputed on every input change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub direction:                     SwapDirection,
    pub input_amount:                  Decimal,
    pub output_amount:                 Decimal,
    /// Output per unit of input, in smallest units (spot price for a zero input).
    pub implied_price:                 Decimal,
    /// The minimum-output parameter to submit with the swap.
    pub minimum_output_after_slippage: Decimal,
    /// Pure curve movement: `net_in / (reserve_in + net_in) × 100`.
    pub price_impact_pct:              Decimal,
}

/// Quote for selling exactly `amount_in`.
pub fn quote_exact_in(
    pool:      &PoolReserves,
    direction: SwapDirection,
    amount_in: &Decimal,
    slippage:  &Decimal,
) -> Result<Quote> {
    let (reserve_in, reserve_out) = direction.reserves(pool);
    let output_amount = quote_output_for_input(reserve_in, reserve_out, amount_in, &pool.fee_rate_bps)?;
    build_quote(pool, direction, amount_in.clone(), output_amount, slippage)
}

/// Quote for receiving exactly `amount_out`; the input is what must be sold.
pub fn quote_exact_out(
    pool:       &PoolReserves,
    direction:  SwapDirection,
    amount_out: &Decimal,
    slippage:   &Decimal,
) -> Result<Quote> {
    let (reserve_in, reserve_out) = direction.reserves(pool);
    let input_amount = quote_input_for_output(reserve_in, reserve_out, amount_out, &pool.fee_rate_bps)?;
    build_quote(pool, direction, input_amount, amount_out.clone(), slippage)
}

fn build_quote(
    pool:          &PoolReserves,
    direction:     SwapDirection,
    input_amount:  Decimal,
    output_amount: Decimal,
    slippage:      &Decimal,
) -> Result<Quote> {
    let (reserve_in, reserve_out) = direction.reserves(pool);

    let implied_price = if input_amount.is_zero() {
        reserve_out.checked_div(reserve_in)?
    } else {
        output_amount.checked_div(&input_amount)?
    };

    let net_in = (Decimal::one() - fee_fraction(&pool.fee_rate_bps)?) * &input_amount;
    let price_impact_pct = (&net_in * Decimal::from(100u32)).checked_div(&(reserve_in + &net_in))?;

    let minimum_output_after_slippage = apply_slippage_tolerance(&output_amount, slippage)?;

    Ok(Quote {
        direction,
        input_amount,
        output_amount,
        implied_price,
        minimum_output_after_slippage,
        price_impact_pct,
    })
}

/// Price of one whole input-side unit in whole output-side units:
/// `(reserve_out / 10^decimals_out) / (reserve_in / 10^decimals_in)`.
pub fn spot_price(
    pool:          &PoolReserves,
    direction:     SwapDirection,
    decimals_in:   u32,
    decimals_out:  u32,
) -> Result<Decimal> {
    let (reserve_in, reserve_out) = direction.reserves(pool);
    ensure_initialized(reserve_in, reserve_out)?;
    to_display_units(reserve_out, decimals_out)?.checked_div(&to_display_units(reserve_in, decimals_in)?)
}
