//! Early-withdrawal penalty evaluation.
//!
//! A withdrawal within `period_seconds` of the delegator's last deposit or
//! claim pays `fee_percentage` of the withdrawn amount. A zero fee percentage
//! switches the feature off entirely.

use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::state::DelegatorRecord;

/// `now < last_update + period_seconds`. Always false for a zero-length period.
pub fn is_within_penalty_period(last_update: i64, period_seconds: u64, now: i64) -> bool {
    period_seconds > 0 && (now as i128) < last_update as i128 + period_seconds as i128
}

/// `max(0, last_update + period_seconds - now)`.
pub fn remaining_penalty_seconds(last_update: i64, period_seconds: u64, now: i64) -> u64 {
    if period_seconds == 0 {
        return 0;
    }
    let remaining = last_update as i128 + period_seconds as i128 - now as i128;
    remaining.clamp(0, u64::MAX as i128) as u64
}

/// The farm's penalty configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyTerms {
    pub fee_percentage: Decimal,
    pub period_seconds: u64,
}

impl PenaltyTerms {
    pub fn is_enabled(&self) -> bool {
        self.fee_percentage.is_positive()
    }

    /// Whether withdrawing now would be charged. `None` (never staked) is never charged.
    pub fn penalty_applies(&self, delegator: Option<&DelegatorRecord>, now: i64) -> bool {
        match delegator {
            Some(d) if self.is_enabled() => is_within_penalty_period(d.last_update, self.period_seconds, now),
            _ => false,
        }
    }

    pub fn penalty_remaining_seconds(&self, delegator: Option<&DelegatorRecord>, now: i64) -> u64 {
        match delegator {
            Some(d) if self.is_enabled() => remaining_penalty_seconds(d.last_update, self.period_seconds, now),
            _ => 0,
        }
    }

    /// Fee withheld from a withdrawal of `amount` made now, floored to whole units.
    pub fn withdrawal_fee(&self, amount: &Decimal, delegator: Option<&DelegatorRecord>, now: i64) -> Decimal {
        if !self.penalty_applies(delegator, now) {
            return Decimal::zero();
        }
        (amount * &self.fee_percentage.shifted_by(-2)).floor()
    }

    /// `"1 day"`, `"3 days"`, `"12 hours"`.
    pub fn describe_period(&self) -> String {
        if self.period_seconds % 86_400 == 0 {
            let days = self.period_seconds / 86_400;
            if days == 1 {
                "1 day".to_string()
            } else {
                format!("{days} days")
            }
        } else {
            // hours, truncated to 4 places
            let hours = Decimal::from(u128::from(self.period_seconds) * 10_000 / 3600).shifted_by(-4);
            if hours == Decimal::one() {
                "1 hour".to_string()
            } else {
                format!("{hours} hours")
            }
        }
    }
}

/// Countdown as `H:MM:SS`.
pub fn format_countdown(total_seconds: u64) -> String {
    let hours   = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_625_140_800;

    fn terms(fee: u32, period: u64) -> PenaltyTerms {
        PenaltyTerms { fee_percentage: Decimal::from(fee), period_seconds: period }
    }

    fn staked_at(last_update: i64) -> DelegatorRecord {
        DelegatorRecord {
            lp_token_balance: Decimal::from(1_000_000u32),
            accumulated_reward_per_share_start: Decimal::zero(),
            last_update,
        }
    }

    #[test]
    fn one_hour_into_a_day_long_period() {
        assert!(is_within_penalty_period(NOW - 3600, 86_400, NOW));
        assert_eq!(remaining_penalty_seconds(NOW - 3600, 86_400, NOW), 82_800);
    }

    #[test]
    fn period_boundary_is_exclusive() {
        assert!(!is_within_penalty_period(NOW - 86_400, 86_400, NOW));
        assert_eq!(remaining_penalty_seconds(NOW - 86_400, 86_400, NOW), 0);
        assert_eq!(remaining_penalty_seconds(NOW - 90_000, 86_400, NOW), 0);
    }

    #[test]
    fn zero_period_never_penalises() {
        for now in [NOW - 10, NOW, NOW + 10] {
            assert!(!is_within_penalty_period(NOW, 0, now));
            assert_eq!(remaining_penalty_seconds(NOW, 0, now), 0);
        }
    }

    #[test]
    fn zero_fee_disables_penalty() {
        let free = terms(0, 86_400);
        let alice = staked_at(NOW - 60);
        assert!(!free.penalty_applies(Some(&alice), NOW));
        assert_eq!(free.penalty_remaining_seconds(Some(&alice), NOW), 0);
        assert!(free.withdrawal_fee(&Decimal::from(1000u32), Some(&alice), NOW).is_zero());
    }

    #[test]
    fn never_staked_is_never_penalised() {
        let t = terms(5, 86_400);
        assert!(!t.penalty_applies(None, NOW));
        assert_eq!(t.penalty_remaining_seconds(None, NOW), 0);
    }

    #[test]
    fn withdrawal_fee_is_floored_percentage() {
        let t = terms(5, 86_400);
        let alice = staked_at(NOW - 60);
        assert_eq!(t.withdrawal_fee(&Decimal::from(1_999u32), Some(&alice), NOW), Decimal::from(99u32));
        assert!(t.withdrawal_fee(&Decimal::from(1_999u32), Some(&alice), NOW + 86_400).is_zero());
    }

    #[test]
    fn describes_period() {
        assert_eq!(terms(5, 86_400).describe_period(), "1 day");
        assert_eq!(terms(5, 3 * 86_400).describe_period(), "3 days");
        assert_eq!(terms(5, 12 * 3600).describe_period(), "12 hours");
        assert_eq!(terms(5, 5400).describe_period(), "1.5 hours");
        assert_eq!(terms(5, 3600).describe_period(), "1 hour");
        assert_eq!(terms(5, 1000).describe_period(), "0.2777 hours");
        assert_eq!(terms(5, u64::MAX).describe_period(), format!("{} hours", Decimal::from(u128::from(u64::MAX) * 10_000 / 3600).shifted_by(-4)));
    }

    #[test]
    fn formats_countdown() {
        assert_eq!(format_countdown(82_800), "23:00:00");
        assert_eq!(format_countdown(3_725), "1:02:05");
        assert_eq!(format_countdown(0), "0:00:00");
    }
}
