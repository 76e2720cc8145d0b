//! Numeric guards shared by the metrics and the waterfall engine.
//!
//! Every operation that could overflow or divide by zero goes through the
//! checked `Decimal` API and yields `None` instead of panicking. `None` is
//! the non-finite value of this crate: it is replaced by zero at the output
//! boundary by [`safe_round`], or carried explicitly through [`MetricValue`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FundWaterfallError;
use crate::types::{Percent, Rate};
use crate::FundWaterfallResult;

/// Decimal places kept on every reported metric.
pub const OUTPUT_DP: u32 = 2;

/// Round to [`OUTPUT_DP`] places, treating a non-finite value as zero.
pub fn safe_round(value: Option<Decimal>) -> Decimal {
    match value {
        Some(v) => v.round_dp(OUTPUT_DP),
        None => Decimal::ZERO,
    }
}

/// `numerator / denominator`, or `None` when the denominator is zero or the
/// quotient overflows.
pub fn checked_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// 8 -> 0.08
pub fn percent_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

pub fn floor_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Sum that pins at `Decimal::MAX`/`MIN` instead of overflowing.
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Percent inputs (rates, ratios, carry) must lie in `[0, 100]`.
pub(crate) fn check_percent(field: &str, value: Percent) -> FundWaterfallResult<()> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(FundWaterfallError::invalid(
            field,
            format!("must be between 0 and 100 (got {value})"),
        ));
    }
    Ok(())
}

/// A metric together with how trustworthy it is.
///
/// `Computed` values are exact for the method used. `Fallback` values are
/// usable approximations (the IRR closed form, a non-converged Newton
/// iterate). `Unreachable` marks a payback that never happens within the
/// horizon; `Invalid` marks inputs the metric cannot be defined for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricValue {
    Computed { value: Decimal },
    Fallback { value: Decimal, reason: String },
    Unreachable { reason: String },
    Invalid { reason: String },
}

impl MetricValue {
    pub fn computed(value: Decimal) -> Self {
        MetricValue::Computed { value }
    }

    pub fn fallback(value: Decimal, reason: impl Into<String>) -> Self {
        MetricValue::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        MetricValue::Unreachable {
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        MetricValue::Invalid {
            reason: reason.into(),
        }
    }

    /// The numeric value, if the metric has one.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            MetricValue::Computed { value } | MetricValue::Fallback { value, .. } => Some(*value),
            MetricValue::Unreachable { .. } | MetricValue::Invalid { .. } => None,
        }
    }

    /// The value to display: metrics without a value show as zero.
    pub fn display_value(&self) -> Decimal {
        safe_round(self.value())
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, MetricValue::Computed { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            MetricValue::Computed { .. } => None,
            MetricValue::Fallback { reason, .. }
            | MetricValue::Unreachable { reason }
            | MetricValue::Invalid { reason } => Some(reason),
        }
    }

    /// Apply [`safe_round`] to the carried value.
    pub fn rounded(self) -> Self {
        match self {
            MetricValue::Computed { value } => MetricValue::Computed {
                value: safe_round(Some(value)),
            },
            MetricValue::Fallback { value, reason } => MetricValue::Fallback {
                value: safe_round(Some(value)),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_sum_pins_at_max() {
        assert_eq!(saturating_sum([dec!(1), dec!(2.5)]), dec!(3.5));
        assert_eq!(saturating_sum([Decimal::MAX, Decimal::MAX]), Decimal::MAX);
        assert_eq!(saturating_sum([]), Decimal::ZERO);
    }

    #[test]
    fn test_safe_round_non_finite_is_zero() {
        assert_eq!(safe_round(None), Decimal::ZERO);
        assert_eq!(safe_round(Some(dec!(1.23456))), dec!(1.23));
    }

    #[test]
    fn test_safe_round_bankers_midpoint() {
        assert_eq!(safe_round(Some(dec!(0.125))), dec!(0.12));
        assert_eq!(safe_round(Some(dec!(0.135))), dec!(0.14));
    }

    #[test]
    fn test_checked_ratio_guards_zero() {
        assert_eq!(checked_ratio(dec!(10), Decimal::ZERO), None);
        assert_eq!(checked_ratio(dec!(10), dec!(4)), Some(dec!(2.5)));
        assert_eq!(checked_ratio(Decimal::MAX, dec!(0.1)), None);
    }

    #[test]
    fn test_metric_value_accessors() {
        let m = MetricValue::fallback(dec!(3.14159), "closed form");
        assert_eq!(m.value(), Some(dec!(3.14159)));
        assert_eq!(m.display_value(), dec!(3.14));
        assert_eq!(m.reason(), Some("closed form"));
        assert!(!m.is_computed());

        let u = MetricValue::unreachable("never");
        assert_eq!(u.value(), None);
        assert_eq!(u.display_value(), Decimal::ZERO);
    }

    #[test]
    fn test_rounded_keeps_tag() {
        let m = MetricValue::computed(dec!(10.005)).rounded();
        assert_eq!(m, MetricValue::computed(dec!(10.00)));
        let i = MetricValue::invalid("bad").rounded();
        assert_eq!(i, MetricValue::invalid("bad"));
    }

    #[test]
    fn test_metric_value_serializes_tagged() {
        let json = serde_json::to_value(MetricValue::computed(dec!(1.1))).unwrap();
        assert_eq!(json["status"], "computed");
        assert_eq!(json["value"], "1.1");
    }
}
