//! Arbitrary-precision fixed-point decimal.
//!
//! Every reserve, balance, accumulator and reward flowing through the SDK is a
//! [`Decimal`]: a signed big-integer mantissa scaled by a power of ten. Add,
//! subtract and multiply are exact. Division is the only lossy operation; it
//! keeps [`DIV_PRECISION`] fractional digits, truncates, and reports a zero
//! divisor as [`Error::DivisionByZero`] instead of producing `Infinity`/`NaN`.
//! There is no `Div`; use [`Decimal::checked_div`].

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Fractional digits kept by [`Decimal::checked_div`].
pub const DIV_PRECISION: u32 = 36;

/// Largest decimal exponent accepted when parsing (`1e4096`).
const MAX_EXPONENT: i32 = 4096;

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

/// `mantissa × 10^-scale`.
#[derive(Clone, Debug)]
pub struct Decimal {
    mantissa: BigInt,
    scale:    u32,
}

impl Decimal {
    /// Build `mantissa × 10^-scale`.
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Self { mantissa: mantissa.into(), scale }
    }

    pub fn zero() -> Self {
        Self::new(0u8, 0)
    }

    pub fn one() -> Self {
        Self::new(1u8, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa.is_positive()
    }

    /// True when the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.scale == 0 || self.mantissa.is_multiple_of(&pow10(self.scale))
    }

    pub fn abs(&self) -> Decimal {
        Self::new(self.mantissa.abs(), self.scale)
    }

    /// Divide, keeping [`DIV_PRECISION`] fractional digits (truncated toward zero).
    pub fn checked_div(&self, rhs: &Decimal) -> Result<Decimal> {
        if rhs.is_zero() {
            return Err(Error::DivisionByZero);
        }
        // (ma·10^-sa) / (mb·10^-sb) = ma·10^(sb+P) / (mb·10^sa) · 10^-P
        let numerator   = &self.mantissa * pow10(rhs.scale + DIV_PRECISION);
        let denominator = &rhs.mantissa * pow10(self.scale);
        Ok(Self::new(numerator / denominator, DIV_PRECISION).normalized())
    }

    /// Exact multiplication by `10^exp` (`exp` may be negative).
    pub fn shifted_by(&self, exp: i32) -> Decimal {
        let shifted = if exp >= 0 {
            let exp = exp.unsigned_abs();
            if exp <= self.scale {
                Self::new(self.mantissa.clone(), self.scale - exp)
            } else {
                Self::new(&self.mantissa * pow10(exp - self.scale), 0)
            }
        } else {
            Self::new(self.mantissa.clone(), self.scale + exp.unsigned_abs())
        };
        shifted.normalized()
    }

    /// Largest integer `<= self`.
    pub fn floor(&self) -> Decimal {
        if self.scale == 0 {
            return self.clone();
        }
        Self::new(self.mantissa.div_floor(&pow10(self.scale)), 0)
    }

    /// Smallest integer `>= self`.
    pub fn ceil(&self) -> Decimal {
        -(-self).floor()
    }

    /// Truncate (toward zero) to `dp` fractional digits.
    pub fn trunc_dp(&self, dp: u32) -> Decimal {
        if self.scale <= dp {
            return self.clone();
        }
        Self::new(&self.mantissa / pow10(self.scale - dp), dp).normalized()
    }

    /// Round half away from zero to `dp` fractional digits.
    pub fn round_dp(&self, dp: u32) -> Decimal {
        if self.scale <= dp {
            return self.clone();
        }
        let divisor = pow10(self.scale - dp);
        let (mut q, r) = self.mantissa.div_rem(&divisor);
        if r.abs() * 2u8 >= divisor {
            if self.mantissa.is_negative() {
                q -= 1u8;
            } else {
                q += 1u8;
            }
        }
        Self::new(q, dp).normalized()
    }

    /// The value as `u64`, if it is a non-negative integer in range.
    pub fn to_u64(&self) -> Option<u64> {
        if !self.is_integer() {
            return None;
        }
        (&self.mantissa / pow10(self.scale)).to_u64()
    }

    /// The value as `i64`, if it is an integer in range.
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        (&self.mantissa / pow10(self.scale)).to_i64()
    }

    /// Mantissa at a scale `>= self.scale`.
    fn rescaled(&self, scale: u32) -> BigInt {
        &self.mantissa * pow10(scale - self.scale)
    }

    /// Strip trailing fractional zeros.
    fn normalized(mut self) -> Self {
        if self.mantissa.is_zero() {
            self.scale = 0;
            return self;
        }
        let ten = BigInt::from(10u8);
        while self.scale > 0 {
            let (q, r) = self.mantissa.div_rem(&ten);
            if !r.is_zero() {
                break;
            }
            self.mantissa = q;
            self.scale -= 1;
        }
        self
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

// ─── Ordering ─────────────────────────────────────────────────────────────────

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.rescaled(scale).cmp(&other.rescaled(scale))
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

// ─── Arithmetic ───────────────────────────────────────────────────────────────

fn add_impl(a: &Decimal, b: &Decimal) -> Decimal {
    let scale = a.scale.max(b.scale);
    Decimal::new(a.rescaled(scale) + b.rescaled(scale), scale)
}

fn sub_impl(a: &Decimal, b: &Decimal) -> Decimal {
    let scale = a.scale.max(b.scale);
    Decimal::new(a.rescaled(scale) - b.rescaled(scale), scale)
}

fn mul_impl(a: &Decimal, b: &Decimal) -> Decimal {
    Decimal::new(&a.mantissa * &b.mantissa, a.scale + b.scale).normalized()
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident, $inner:ident) => {
        impl $imp<Decimal> for Decimal {
            type Output = Decimal;
            fn $method(self, rhs: Decimal) -> Decimal {
                $inner(&self, &rhs)
            }
        }
        impl<'a> $imp<&'a Decimal> for Decimal {
            type Output = Decimal;
            fn $method(self, rhs: &'a Decimal) -> Decimal {
                $inner(&self, rhs)
            }
        }
        impl<'a> $imp<Decimal> for &'a Decimal {
            type Output = Decimal;
            fn $method(self, rhs: Decimal) -> Decimal {
                $inner(self, &rhs)
            }
        }
        impl<'a, 'b> $imp<&'b Decimal> for &'a Decimal {
            type Output = Decimal;
            fn $method(self, rhs: &'b Decimal) -> Decimal {
                $inner(self, rhs)
            }
        }
    };
}

forward_binop!(Add, add, add_impl);
forward_binop!(Sub, sub, sub_impl);
forward_binop!(Mul, mul, mul_impl);

impl Neg for Decimal {
    type Output = Decimal;
    fn neg(self) -> Decimal {
        Decimal::new(-self.mantissa, self.scale)
    }
}

impl<'a> Neg for &'a Decimal {
    type Output = Decimal;
    fn neg(self) -> Decimal {
        Decimal::new(-&self.mantissa, self.scale)
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Decimal {
            fn from(v: $t) -> Self {
                Decimal::new(v, 0)
            }
        })*
    };
}

from_int!(u8, u16, u32, u64, u128, usize, i32, i64, i128);

// ─── Text ─────────────────────────────────────────────────────────────────────

impl FromStr for Decimal {
    type Err = Error;

    /// Accepts `[+-]digits[.digits][e[+-]digits]`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidDecimal(s.to_string());
        let trimmed = s.trim();

        let (body, exp) = match trimmed.find(['e', 'E']) {
            Some(i) => {
                let exp: i32 = trimmed[i + 1..].parse().map_err(|_| invalid())?;
                (&trimmed[..i], exp)
            }
            None => (trimmed, 0),
        };
        if exp.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
            return Err(invalid());
        }

        let (negative, digits) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body.strip_prefix('+').unwrap_or(body)),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let mut mantissa: BigInt = format!("{int_part}{frac_part}").parse().map_err(|_| invalid())?;
        if negative {
            mantissa = -mantissa;
        }
        let scale = u32::try_from(frac_part.len()).map_err(|_| invalid())?;
        Ok(Decimal::new(mantissa, scale).shifted_by(exp))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.clone().normalized();
        if n.scale == 0 {
            return write!(f, "{}", n.mantissa);
        }
        let scale = n.scale as usize;
        let mut digits = n.mantissa.abs().to_string();
        if digits.len() <= scale {
            digits = format!("{}{digits}", "0".repeat(scale + 1 - digits.len()));
        }
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        let sign = if n.mantissa.is_negative() { "-" } else { "" };
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

// ─── Serde ────────────────────────────────────────────────────────────────────

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct DecimalVisitor;

impl<'de> de::Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Decimal, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Decimal, E> {
        Ok(v.into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Decimal, E> {
        Ok(v.into())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Decimal, E> {
        Ok(v.into())
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<Decimal, E> {
        Ok(v.into())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Decimal, E> {
        Err(E::custom(format!(
            "float {v} would lose precision; pass the amount as a string"
        )))
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}
