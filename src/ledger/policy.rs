use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};

/// How the daily allowance is derived: a savings percentage carved off the
/// payday income, or a flat fixed limit. Exactly one mode is active; setting
/// one clears the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub savings_percentage: Decimal,
    #[serde(default)]
    pub fixed_daily_limit: Option<Decimal>,
    #[serde(default)]
    pub surplus_enabled: bool,
    #[serde(default = "Policy::default_distribution_days")]
    pub surplus_distribution_days: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            savings_percentage: Decimal::ZERO,
            fixed_daily_limit: None,
            surplus_enabled: false,
            surplus_distribution_days: Self::default_distribution_days(),
        }
    }
}

impl Policy {
    /// Sets the savings percentage, clamped to `[0, 100]`, and switches the
    /// policy to percentage mode.
    pub fn set_savings_percentage(&mut self, percentage: Decimal) {
        self.savings_percentage = percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        self.fixed_daily_limit = None;
    }

    /// Sets a fixed daily limit and switches the policy to fixed mode.
    pub fn set_fixed_daily_limit(&mut self, limit: Decimal) -> Result<()> {
        if limit <= Decimal::ZERO {
            return Err(TrackerError::Validation(format!(
                "fixed daily limit must be positive, got {limit}"
            )));
        }
        self.fixed_daily_limit = Some(limit);
        self.savings_percentage = Decimal::ZERO;
        Ok(())
    }

    /// Enables or disables deficit smoothing; the window is clamped to at
    /// least one day.
    pub fn set_surplus_settings(&mut self, enabled: bool, distribution_days: u32) {
        self.surplus_enabled = enabled;
        self.surplus_distribution_days = distribution_days.max(1);
    }

    /// Smoothing window length, guarded against a zero value arriving from a
    /// hand-edited document.
    pub fn distribution_days(&self) -> u32 {
        self.surplus_distribution_days.max(1)
    }

    pub fn default_distribution_days() -> u32 {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percentage_clears_fixed_limit() {
        let mut policy = Policy::default();
        policy.set_fixed_daily_limit(dec!(25)).unwrap();
        policy.set_savings_percentage(dec!(20));
        assert_eq!(policy.savings_percentage, dec!(20));
        assert!(policy.fixed_daily_limit.is_none());
    }

    #[test]
    fn fixed_limit_clears_percentage() {
        let mut policy = Policy::default();
        policy.set_savings_percentage(dec!(20));
        policy.set_fixed_daily_limit(dec!(25)).unwrap();
        assert_eq!(policy.fixed_daily_limit, Some(dec!(25)));
        assert_eq!(policy.savings_percentage, Decimal::ZERO);
    }

    #[test]
    fn percentage_is_clamped() {
        let mut policy = Policy::default();
        policy.set_savings_percentage(dec!(150));
        assert_eq!(policy.savings_percentage, dec!(100));
        policy.set_savings_percentage(dec!(-3));
        assert_eq!(policy.savings_percentage, Decimal::ZERO);
    }

    #[test]
    fn non_positive_fixed_limit_is_rejected() {
        let mut policy = Policy::default();
        assert!(policy.set_fixed_daily_limit(Decimal::ZERO).is_err());
        assert!(policy.set_fixed_daily_limit(dec!(-5)).is_err());
    }

    #[test]
    fn distribution_days_clamped_to_one() {
        let mut policy = Policy::default();
        policy.set_surplus_settings(true, 0);
        assert_eq!(policy.surplus_distribution_days, 1);
    }
}
