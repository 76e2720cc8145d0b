use fund_waterfall_core::metrics::core_metrics::calculate_core_metrics;
use fund_waterfall_core::metrics::irr::{closed_form_irr, irr, npv};
use fund_waterfall_core::metrics::multiples::dpi;
use fund_waterfall_core::metrics::payback::{
    cumulative_cash_flows, dynamic_payback, present_values, static_payback,
};
use fund_waterfall_core::{BasicParams, CashFlowSeries, MetricValue};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{what}: expected ~{expected}, got {actual}"
    );
}

// ===========================================================================
// IRR
// ===========================================================================

#[test]
fn test_irr_ten_year_even_flows() {
    // 150 a year for ten years on 1000
    let flows = vec![dec!(150); 10];
    let result = irr(&flows, dec!(1000));
    assert!(result.is_computed(), "IRR should converge: {result:?}");
    assert_close(result.value().unwrap(), dec!(8.14), dec!(0.01), "IRR");
}

#[test]
fn test_irr_npv_is_zero_at_root() {
    let flows = vec![dec!(200), dec!(300), dec!(600)];
    let pct = irr(&flows, dec!(1000)).value().unwrap();
    let rate = (pct / dec!(100)).to_f64().unwrap();
    let residual = npv(rate, &[-1000.0, 200.0, 300.0, 600.0]);
    assert!(residual.abs() < 1e-5, "NPV at IRR: {residual}");
}

#[test]
fn test_irr_twenty_year_negative_rate_converges() {
    // 200 back on 1000 over twenty years: about -12.05% a year
    let result = irr(&[dec!(10); 20], dec!(1000));
    assert!(result.is_computed(), "IRR should converge: {result:?}");
    assert_close(result.value().unwrap(), dec!(-12.05), dec!(0.01), "IRR");
}

#[test]
fn test_irr_thirty_year_high_rate_converges() {
    // 1000 back each year on 1000 over thirty years: just under 100%
    let result = irr(&[dec!(1000); 30], dec!(1000));
    assert!(result.is_computed(), "IRR should converge: {result:?}");
    assert_close(result.value().unwrap(), dec!(100), dec!(0.01), "IRR");
}

#[test]
fn test_irr_total_loss_uses_closed_form() {
    let result = irr(&[Decimal::ZERO, Decimal::ZERO], dec!(1000));
    assert!(matches!(result, MetricValue::Fallback { .. }));
    // ((0 / 1000) - 1) / 2 periods = -50%
    assert_eq!(result.value(), Some(dec!(-50)));
}

#[test]
fn test_closed_form_is_average_excess_multiple() {
    let cf = closed_form_irr(&[dec!(600), dec!(600)], dec!(1000)).unwrap();
    assert_eq!(cf, dec!(10));
}

// ===========================================================================
// DPI
// ===========================================================================

#[test]
fn test_dpi_and_rounding_through_core_metrics() {
    let params = BasicParams {
        investment_target: "Metrics Fund".into(),
        investment_amount: dec!(3000),
        investment_period: 3,
        hurdle_rate: dec!(8),
        management_carry: dec!(20),
    };
    let flows = CashFlowSeries::new(vec![dec!(1000), dec!(1000), dec!(1500)]);
    let metrics = calculate_core_metrics(&params, &flows, None);

    // 3500 / 3000 = 1.1666.. -> 1.17
    assert_eq!(metrics.dpi, MetricValue::computed(dec!(1.17)));
    // 2 + 1000/1500 -> 2.67
    assert_eq!(metrics.static_payback, MetricValue::computed(dec!(2.67)));
    assert_eq!(metrics.discount_rate, dec!(8));
    assert!(metrics.dynamic_payback.value().is_none());
}

#[test]
fn test_dpi_rejects_zero_investment() {
    assert!(matches!(
        dpi(&[dec!(100)], Decimal::ZERO),
        MetricValue::Invalid { .. }
    ));
}

// ===========================================================================
// Payback
// ===========================================================================

#[test]
fn test_static_payback_crossing_in_year_one() {
    assert_eq!(
        static_payback(&[dec!(2000)], dec!(1000)),
        MetricValue::computed(dec!(0.5))
    );
}

#[test]
fn test_dynamic_payback_discounts_each_year() {
    let flows = vec![dec!(500), dec!(500), dec!(500)];
    let pv = present_values(&flows, dec!(10)).unwrap();
    assert_close(pv[0], dec!(454.545454), dec!(0.00001), "pv year 1");
    assert_close(pv[1], dec!(413.223140), dec!(0.00001), "pv year 2");

    let dynamic = dynamic_payback(&flows, dec!(1000), dec!(10));
    let stat = static_payback(&flows, dec!(1000));
    assert!(dynamic.value().unwrap() > stat.value().unwrap());
    assert_eq!(stat.value(), Some(dec!(2)));
}

#[test]
fn test_cumulative_series_starts_at_outlay() {
    let series = cumulative_cash_flows(&[dec!(400), dec!(700)], dec!(1000));
    assert_eq!(series, vec![dec!(-1000), dec!(-600), dec!(100)]);
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_irr_recovers_single_period_rate(
        rate_bp in -8_900i64..50_000,
        investment in 100u32..1_000_000,
    ) {
        let r = Decimal::new(rate_bp, 4);
        let inv = Decimal::from(investment);
        let flows = vec![inv * (Decimal::ONE + r)];

        let result = irr(&flows, inv);
        let pct = result.value().unwrap();
        prop_assert!(
            (pct - r * dec!(100)).abs() < dec!(0.0001),
            "r = {}, irr = {:?}", r, result
        );
    }

    #[test]
    fn prop_dpi_scales_linearly(
        flows in prop::collection::vec(0u32..1_000_000, 1..=30),
        investment in 1u32..10_000_000,
        k in 1u32..100,
    ) {
        let base: Vec<Decimal> = flows.iter().map(|f| Decimal::from(*f)).collect();
        let scaled: Vec<Decimal> = base.iter().map(|f| *f * Decimal::from(k)).collect();
        let inv = Decimal::from(investment);

        let d1 = dpi(&base, inv).value().unwrap();
        let dk = dpi(&scaled, inv).value().unwrap();
        prop_assert!((dk - d1 * Decimal::from(k)).abs() < dec!(0.000000000001));
    }

    #[test]
    fn prop_static_payback_monotone_in_investment(
        flows in prop::collection::vec(0u32..10_000, 1..=20),
        a in 1u32..100_000,
        b in 1u32..100_000,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let series: Vec<Decimal> = flows.iter().map(|f| Decimal::from(*f)).collect();

        let p_lo = static_payback(&series, Decimal::from(lo));
        let p_hi = static_payback(&series, Decimal::from(hi));
        match (p_lo.value(), p_hi.value()) {
            (Some(x), Some(y)) => prop_assert!(x <= y),
            // A larger investment can only become unreachable, never the reverse
            (None, Some(_)) => prop_assert!(false, "smaller investment unreachable"),
            _ => {}
        }
    }
}
