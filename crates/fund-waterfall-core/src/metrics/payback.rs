use rust_decimal::{Decimal, MathematicalOps};

use crate::numeric::{checked_ratio, percent_to_rate, MetricValue};
use crate::types::{Money, Percent};

/// Years until cumulative flows recover `investment`, interpolating linearly
/// inside the crossing year: `k + (investment - cumulative_before_k) / cf_k`,
/// with `k` the number of whole years already elapsed.
fn interpolate_payback(flows: &[Money], investment: Money) -> MetricValue {
    if investment <= Decimal::ZERO {
        return MetricValue::invalid("payback requires a positive investment");
    }

    let mut cumulative = Decimal::ZERO;
    for (k, cf) in flows.iter().enumerate() {
        let Some(next) = cumulative.checked_add(*cf) else {
            return MetricValue::invalid("cumulative cash flow overflowed");
        };
        if next >= investment {
            let fraction = investment
                .checked_sub(cumulative)
                .and_then(|remaining| checked_ratio(remaining, *cf));
            return match fraction {
                Some(fraction) => MetricValue::computed(Decimal::from(k as u64) + fraction),
                None => MetricValue::invalid(format!("zero cash flow in crossing year {}", k + 1)),
            };
        }
        cumulative = next;
    }

    MetricValue::unreachable(format!(
        "cumulative cash flow {cumulative} never recovers the investment of {investment}"
    ))
}

/// Static (undiscounted) payback period in years.
pub fn static_payback(cash_flows: &[Money], investment: Money) -> MetricValue {
    interpolate_payback(cash_flows, investment)
}

/// `cf_k / (1 + d)^k` for years k = 1..N, `None` if any factor is unusable.
pub fn present_values(cash_flows: &[Money], discount_rate: Percent) -> Option<Vec<Money>> {
    let one_plus_d = Decimal::ONE + percent_to_rate(discount_rate);
    if one_plus_d <= Decimal::ZERO {
        return None;
    }
    cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| {
            let factor = one_plus_d.checked_powi(i as i64 + 1)?;
            checked_ratio(*cf, factor)
        })
        .collect()
}

/// Dynamic (discounted) payback period in years.
pub fn dynamic_payback(
    cash_flows: &[Money],
    investment: Money,
    discount_rate: Percent,
) -> MetricValue {
    match present_values(cash_flows, discount_rate) {
        Some(pv) => interpolate_payback(&pv, investment),
        None => MetricValue::invalid(format!(
            "discount rate {discount_rate}% gives unusable discount factors"
        )),
    }
}

/// Year-0 outlay followed by the running total after each year.
pub fn cumulative_cash_flows(cash_flows: &[Money], investment: Money) -> Vec<Money> {
    let mut running = -investment;
    let mut series = Vec::with_capacity(cash_flows.len() + 1);
    series.push(running);
    for cf in cash_flows {
        running = running.saturating_add(*cf);
        series.push(running);
    }
    series
}
