use log::warn;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::numeric::{checked_ratio, MetricValue};
use crate::types::Money;

// The solver runs in f64: at the clamp bounds the discount factors
// (0.01^-t, 11^t) leave Decimal's ~7.9e28 range within 30 periods.
const INITIAL_GUESS: f64 = 0.10;
const CONVERGENCE_THRESHOLD: f64 = 1e-6;
const MAX_IRR_ITERATIONS: u32 = 100;
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

/// Net Present Value of a series of cash flows, index 0 undiscounted.
///
/// `rate <= -100%` has no discount factor and yields `+inf`; callers check
/// `is_finite()` on the result.
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    if rate <= -1.0 {
        return f64::INFINITY;
    }
    let one_plus_r = 1.0 + rate;
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / one_plus_r.powi(t as i32))
        .sum()
}

/// d(NPV)/d(rate) = Σ -t·cf / (1+r)^(t+1)
fn npv_derivative(rate: f64, cash_flows: &[f64]) -> f64 {
    if rate <= -1.0 {
        return f64::INFINITY;
    }
    let one_plus_r = 1.0 + rate;
    cash_flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| -(t as f64) * cf / one_plus_r.powi(t as i32 + 1))
        .sum()
}

/// Simple average-return approximation used when Newton-Raphson cannot be
/// trusted: `((Σcf / investment) - 1) / periods * 100`.
pub fn closed_form_irr(cash_flows: &[Money], initial_investment: Money) -> Option<Decimal> {
    let total = cash_flows
        .iter()
        .try_fold(Decimal::ZERO, |acc, cf| acc.checked_add(*cf))?;
    let multiple = checked_ratio(total, initial_investment)?;
    let periods = Decimal::from(cash_flows.len() as u64);
    checked_ratio(multiple - Decimal::ONE, periods)?.checked_mul(dec!(100))
}

fn fallback(cash_flows: &[Money], initial_investment: Money, reason: String) -> MetricValue {
    warn!("IRR falling back to closed-form approximation: {reason}");
    match closed_form_irr(cash_flows, initial_investment) {
        Some(value) => MetricValue::fallback(value, reason),
        None => MetricValue::invalid(format!("{reason}; closed-form approximation not finite")),
    }
}

/// `rate` as a Decimal percentage, `None` if it is not finite.
fn to_percent(rate: f64) -> Option<Decimal> {
    Decimal::from_f64(rate * 100.0)
}

/// Internal Rate of Return in percent, using Newton-Raphson on
/// `[-initial_investment] + cash_flows`.
///
/// Never fails: degenerate inputs produce `Invalid`, non-finite iterates
/// produce the closed-form `Fallback`, and a stalled or non-converged
/// iteration returns its last rate tagged as `Fallback`.
pub fn irr(cash_flows: &[Money], initial_investment: Money) -> MetricValue {
    if cash_flows.is_empty() || initial_investment <= Decimal::ZERO {
        return MetricValue::invalid(
            "IRR requires at least one cash flow and a positive investment",
        );
    }

    let total = cash_flows
        .iter()
        .try_fold(Decimal::ZERO, |acc, cf| acc.checked_add(*cf));
    match total {
        Some(t) if t > Decimal::ZERO => {}
        _ => {
            return fallback(
                cash_flows,
                initial_investment,
                "total cash flow is not positive".into(),
            )
        }
    }

    let full_flows: Option<Vec<f64>> = std::iter::once(-initial_investment)
        .chain(cash_flows.iter().copied())
        .map(|cf| cf.to_f64())
        .collect();
    let Some(full_flows) = full_flows else {
        return fallback(
            cash_flows,
            initial_investment,
            "cash flows not representable as f64".into(),
        );
    };

    let mut rate = INITIAL_GUESS;

    for i in 0..MAX_IRR_ITERATIONS {
        let npv_val = npv(rate, &full_flows);
        if !npv_val.is_finite() {
            return fallback(
                cash_flows,
                initial_investment,
                format!("NPV not finite at rate {rate} (iteration {i})"),
            );
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return match to_percent(rate) {
                Some(pct) => MetricValue::computed(pct),
                None => fallback(
                    cash_flows,
                    initial_investment,
                    format!("converged rate {rate} not finite"),
                ),
            };
        }

        let dnpv = npv_derivative(rate, &full_flows);
        if !dnpv.is_finite() {
            return fallback(
                cash_flows,
                initial_investment,
                format!("NPV derivative not finite at rate {rate} (iteration {i})"),
            );
        }

        if dnpv.abs() < CONVERGENCE_THRESHOLD {
            warn!("IRR derivative vanished at rate {rate} after {i} iterations");
            return last_iterate(
                cash_flows,
                initial_investment,
                rate,
                format!("NPV derivative vanished after {i} iterations"),
            );
        }

        let next = rate - npv_val / dnpv;
        if !next.is_finite() {
            return fallback(
                cash_flows,
                initial_investment,
                format!("Newton step not finite at rate {rate} (iteration {i})"),
            );
        }

        // Guard against divergence
        rate = next.clamp(MIN_RATE, MAX_RATE);
    }

    warn!("IRR did not converge after {MAX_IRR_ITERATIONS} iterations, last rate {rate}");
    last_iterate(
        cash_flows,
        initial_investment,
        rate,
        format!("did not converge after {MAX_IRR_ITERATIONS} iterations"),
    )
}

fn last_iterate(
    cash_flows: &[Money],
    initial_investment: Money,
    rate: f64,
    reason: String,
) -> MetricValue {
    match to_percent(rate) {
        Some(pct) => MetricValue::fallback(pct, reason),
        None => fallback(cash_flows, initial_investment, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_npv_basic() {
        let cfs = [-1000.0, 300.0, 400.0, 500.0];
        // -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((npv(0.10, &cfs) + 21.04).abs() < 0.01);
    }

    #[test]
    fn test_npv_zero_rate() {
        assert_eq!(npv(0.0, &[-100.0, 50.0, 50.0, 50.0]), 50.0);
    }

    #[test]
    fn test_npv_domain_guard() {
        assert!(!npv(-1.0, &[-100.0, 50.0]).is_finite());
        assert!(!npv(-1.5, &[-100.0, 50.0]).is_finite());
    }

    #[test]
    fn test_npv_finite_at_clamp_bounds_over_thirty_years() {
        let mut cfs = vec![-1000.0];
        cfs.extend([10.0; 30]);
        assert!(npv(MIN_RATE, &cfs).is_finite());
        assert!(npv(MAX_RATE, &cfs).is_finite());
        assert!(npv_derivative(MIN_RATE, &cfs).is_finite());
    }

    #[test]
    fn test_irr_even_flows() {
        // -1000, 400 x 3 => ~9.70%
        let result = irr(&[dec!(400), dec!(400), dec!(400)], dec!(1000));
        assert!(result.is_computed());
        assert_close(result.value().unwrap(), dec!(9.70), dec!(0.01));
    }

    #[test]
    fn test_irr_single_period_round_trip() {
        let result = irr(&[dec!(1150)], dec!(1000));
        assert!(result.is_computed());
        assert_close(result.value().unwrap(), dec!(15), dec!(0.0001));
    }

    #[test]
    fn test_irr_deep_loss_single_period() {
        // Recover only 15% of capital => -85%
        let result = irr(&[dec!(150)], dec!(1000));
        assert!(result.is_computed());
        assert_close(result.value().unwrap(), dec!(-85), dec!(0.0001));
    }

    #[test]
    fn test_irr_long_horizon_negative_rate() {
        // 10 a year for 20 years on 1000; Newton passes through the -99% clamp
        let result = irr(&[dec!(10); 20], dec!(1000));
        assert!(result.is_computed(), "IRR should converge: {result:?}");
        assert_close(result.value().unwrap(), dec!(-12.055), dec!(0.001));
    }

    #[test]
    fn test_irr_empty_or_bad_investment_is_invalid() {
        assert_eq!(irr(&[], dec!(1000)).display_value(), Decimal::ZERO);
        assert!(matches!(irr(&[], dec!(1000)), MetricValue::Invalid { .. }));
        assert!(matches!(
            irr(&[dec!(100)], Decimal::ZERO),
            MetricValue::Invalid { .. }
        ));
        assert!(matches!(
            irr(&[dec!(100)], dec!(-5)),
            MetricValue::Invalid { .. }
        ));
    }

    #[test]
    fn test_irr_zero_cash_flow_uses_closed_form() {
        // ((0 / 1000) - 1) / 4 * 100 = -25
        let result = irr(&[dec!(0), dec!(0), dec!(0), dec!(0)], dec!(1000));
        match result {
            MetricValue::Fallback { value, .. } => assert_eq!(value, dec!(-25)),
            other => panic!("Expected Fallback, got: {other:?}"),
        }
    }

    #[test]
    fn test_closed_form_formula() {
        // ((1500 / 1000) - 1) / 5 * 100 = 10
        let v = closed_form_irr(&[dec!(300); 5], dec!(1000)).unwrap();
        assert_eq!(v, dec!(10));
    }

    #[test]
    fn test_irr_rate_stays_in_clamp_range() {
        // A 50x single-period return is far outside [-99%, 1000%]
        let result = irr(&[dec!(50000)], dec!(1000));
        let v = result.value().unwrap();
        assert!(v <= dec!(1000));
        assert!(!result.is_computed());
    }
}
