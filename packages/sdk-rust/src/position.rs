//! Amount conversion and deposit/withdraw checks for a farm position.

use crate::decimal::Decimal;
use crate::error::{Error, Result};

/// Most decimal places a token may declare.
pub const MAX_TOKEN_DECIMALS: u32 = 36;

/// `decimals` as a shift exponent, rejecting anything above [`MAX_TOKEN_DECIMALS`].
pub(crate) fn decimal_places(decimals: u32) -> Result<i32> {
    match i32::try_from(decimals) {
        Ok(places) if decimals <= MAX_TOKEN_DECIMALS => Ok(places),
        _ => Err(Error::InvalidArgument(format!(
            "token decimals {decimals} exceeds the maximum of {MAX_TOKEN_DECIMALS}"
        ))),
    }
}

/// Display amount (e.g. `10.3`) → smallest units (`10_300_000` at 6 decimals), floored.
pub fn to_base_units(display: &Decimal, decimals: u32) -> Result<Decimal> {
    Ok(display.shifted_by(decimal_places(decimals)?).floor())
}

/// Smallest units → display amount.
pub fn to_display_units(base: &Decimal, decimals: u32) -> Result<Decimal> {
    Ok(base.shifted_by(-decimal_places(decimals)?))
}

/// A deposit must be positive and within the user's LP balance.
pub fn validate_deposit(amount: &Decimal, max_deposit: &Decimal) -> Result<()> {
    validate_bounded("deposit", amount, max_deposit, "available LP balance")
}

/// A withdrawal must be positive and within the user's stake.
pub fn validate_withdraw(amount: &Decimal, personal_stake: &Decimal) -> Result<()> {
    validate_bounded("withdrawal", amount, personal_stake, "staked balance")
}

fn validate_bounded(what: &str, amount: &Decimal, bound: &Decimal, bound_name: &str) -> Result<()> {
    if !amount.is_positive() {
        return Err(Error::InvalidArgument(format!("{what} amount must be greater than zero")));
    }
    if amount > bound {
        return Err(Error::InvalidArgument(format!("{what} amount {amount} exceeds {bound_name} {bound}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn converts_between_units() {
        assert_eq!(to_base_units(&d("10.3"), 6).unwrap(), d("10300000"));
        assert_eq!(to_base_units(&d("0.0000019"), 6).unwrap(), d("1"));
        assert_eq!(to_display_units(&d("10300000"), 6).unwrap(), d("10.3"));
        assert_eq!(to_display_units(&d("1"), MAX_TOKEN_DECIMALS).unwrap(), d("1e-36"));
    }

    #[test]
    fn rejects_out_of_range_decimals() {
        for decimals in [MAX_TOKEN_DECIMALS + 1, 1 << 31, u32::MAX] {
            assert!(matches!(to_base_units(&d("1"), decimals), Err(Error::InvalidArgument(_))), "{decimals}");
            assert!(matches!(to_display_units(&d("1"), decimals), Err(Error::InvalidArgument(_))), "{decimals}");
        }
    }

    #[test]
    fn deposit_bounds() {
        assert!(validate_deposit(&d("5"), &d("5")).is_ok());
        assert!(validate_deposit(&d("0"), &d("5")).is_err());
        assert!(validate_deposit(&d("5.000001"), &d("5")).is_err());
    }

    #[test]
    fn withdraw_bounds() {
        assert!(validate_withdraw(&d("1"), &d("1000000")).is_ok());
        assert!(validate_withdraw(&d("-1"), &d("1000000")).is_err());
        assert!(validate_withdraw(&d("1000001"), &d("1000000")).is_err());
    }
}
