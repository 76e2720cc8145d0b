use rust_decimal::Decimal;

use crate::numeric::{checked_ratio, MetricValue};
use crate::types::Money;

/// Distributions to Paid-In capital: Σcash_flows / investment.
pub fn dpi(cash_flows: &[Money], initial_investment: Money) -> MetricValue {
    if initial_investment <= Decimal::ZERO {
        return MetricValue::invalid("DPI requires a positive investment");
    }

    let ratio = cash_flows
        .iter()
        .try_fold(Decimal::ZERO, |acc, cf| acc.checked_add(*cf))
        .and_then(|total| checked_ratio(total, initial_investment));

    match ratio {
        Some(v) => MetricValue::computed(v),
        None => MetricValue::invalid("total distributions overflowed"),
    }
}
