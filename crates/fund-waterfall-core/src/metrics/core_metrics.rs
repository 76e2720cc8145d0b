use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{irr, multiples, payback};
use crate::error::FundWaterfallError;
use crate::numeric::{check_percent, MetricValue};
use crate::types::{with_metadata, BasicParams, CashFlowSeries, ComputationOutput, Percent};
use crate::FundWaterfallResult;

/// Metrics-only request: no waterfall variant needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsInput {
    pub basic_params: BasicParams,
    pub cash_flows: CashFlowSeries,
    /// Discount rate for the dynamic payback, percent. Defaults to the hurdle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_discount_rate: Option<Percent>,
}

/// Headline return metrics attached to every waterfall result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreMetrics {
    /// Internal Rate of Return, percent
    pub irr: MetricValue,
    /// Distributions to Paid-In
    pub dpi: MetricValue,
    /// Undiscounted payback, years
    pub static_payback: MetricValue,
    /// Payback on flows discounted at the hurdle (or override), years
    pub dynamic_payback: MetricValue,
    /// Discount rate actually used for the dynamic payback, percent
    pub discount_rate: Percent,
}

impl CoreMetrics {
    /// Names and states of every metric that is not an exact computation.
    pub fn degraded(&self) -> Vec<(&'static str, &MetricValue)> {
        [
            ("irr", &self.irr),
            ("dpi", &self.dpi),
            ("static_payback", &self.static_payback),
            ("dynamic_payback", &self.dynamic_payback),
        ]
        .into_iter()
        .filter(|(_, m)| !m.is_computed())
        .collect()
    }
}

/// IRR, DPI and both payback periods, rounded at the output boundary.
pub fn calculate_core_metrics(
    params: &BasicParams,
    cash_flows: &CashFlowSeries,
    discount_override: Option<Percent>,
) -> CoreMetrics {
    let flows = cash_flows.as_slice();
    let investment = params.investment_amount;
    let discount_rate = discount_override.unwrap_or(params.hurdle_rate);

    CoreMetrics {
        irr: irr::irr(flows, investment).rounded(),
        dpi: multiples::dpi(flows, investment).rounded(),
        static_payback: payback::static_payback(flows, investment).rounded(),
        dynamic_payback: payback::dynamic_payback(flows, investment, discount_rate).rounded(),
        discount_rate,
    }
}

/// Compute the headline metrics alone and wrap them in the output envelope.
pub fn calculate_metrics(
    input: &MetricsInput,
) -> FundWaterfallResult<ComputationOutput<CoreMetrics>> {
    let start = Instant::now();
    let params = &input.basic_params;

    if params.investment_amount <= Decimal::ZERO {
        return Err(FundWaterfallError::invalid(
            "investment_amount",
            "Investment amount must be positive",
        ));
    }
    if input.cash_flows.is_empty() {
        return Err(FundWaterfallError::invalid(
            "cash_flows",
            "At least one cash flow is required",
        ));
    }
    if input.cash_flows.as_slice().iter().any(|cf| *cf < Decimal::ZERO) {
        return Err(FundWaterfallError::invalid(
            "cash_flows",
            "Cash flows cannot be negative",
        ));
    }
    check_percent("hurdle_rate", params.hurdle_rate)?;
    if let Some(rate) = input.dynamic_discount_rate {
        check_percent("dynamic_discount_rate", rate)?;
    }

    let metrics = calculate_core_metrics(params, &input.cash_flows, input.dynamic_discount_rate);
    let warnings: Vec<String> = metrics
        .degraded()
        .into_iter()
        .filter_map(|(name, m)| m.reason().map(|r| format!("{name}: {r}")))
        .collect();
    debug!("metrics for {}: {} degraded", params.investment_target, warnings.len());

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fund return metrics (IRR, DPI, static and dynamic payback)",
        &serde_json::json!({
            "investment_amount": params.investment_amount.to_string(),
            "periods": input.cash_flows.len(),
            "discount_rate_pct": metrics.discount_rate.to_string(),
        }),
        warnings,
        elapsed,
        metrics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> BasicParams {
        BasicParams {
            investment_target: "Metrics Fixture".into(),
            investment_amount: dec!(1000),
            investment_period: 3,
            hurdle_rate: dec!(8),
            management_carry: dec!(20),
        }
    }

    #[test]
    fn test_core_metrics_rounded() {
        let flows = CashFlowSeries::new(vec![dec!(200), dec!(300), dec!(600)]);
        let m = calculate_core_metrics(&params(), &flows, None);
        assert_eq!(m.dpi, MetricValue::computed(dec!(1.10)));
        assert_eq!(m.static_payback, MetricValue::computed(dec!(2.83)));
        assert_eq!(m.discount_rate, dec!(8));
        // Flows never recover 1000 once discounted at 8%
        assert!(matches!(m.dynamic_payback, MetricValue::Unreachable { .. }));
        let irr = m.irr.value().unwrap();
        assert_eq!(irr, irr.round_dp(2));
        assert!(irr > dec!(4) && irr < dec!(4.5));
    }

    #[test]
    fn test_discount_override() {
        let flows = CashFlowSeries::new(vec![dec!(200), dec!(300), dec!(600)]);
        let m = calculate_core_metrics(&params(), &flows, Some(Decimal::ZERO));
        assert_eq!(m.discount_rate, Decimal::ZERO);
        assert_eq!(m.dynamic_payback, m.static_payback);
    }

    #[test]
    fn test_degraded_lists_non_computed() {
        let flows = CashFlowSeries::new(vec![dec!(0), dec!(0), dec!(0)]);
        let m = calculate_core_metrics(&params(), &flows, None);
        let names: Vec<&str> = m.degraded().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["irr", "static_payback", "dynamic_payback"]);
    }

    #[test]
    fn test_calculate_metrics_envelope() {
        let input = MetricsInput {
            basic_params: params(),
            cash_flows: CashFlowSeries::new(vec![dec!(200), dec!(300), dec!(600)]),
            dynamic_discount_rate: None,
        };
        let out = calculate_metrics(&input).unwrap();
        assert_eq!(out.result.dpi, MetricValue::computed(dec!(1.10)));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].starts_with("dynamic_payback"));
        assert_eq!(out.assumptions["periods"], 3);
    }

    #[test]
    fn test_calculate_metrics_rejects_bad_input() {
        let mut input = MetricsInput {
            basic_params: params(),
            cash_flows: CashFlowSeries::new(vec![]),
            dynamic_discount_rate: None,
        };
        assert!(calculate_metrics(&input).is_err());

        input.cash_flows = CashFlowSeries::new(vec![dec!(100), dec!(-1)]);
        assert!(calculate_metrics(&input).is_err());

        input.cash_flows = CashFlowSeries::new(vec![dec!(100)]);
        input.dynamic_discount_rate = Some(dec!(150));
        assert!(calculate_metrics(&input).is_err());
    }
}
