use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::record::{CalculationResult, PeriodRecord, Summary, TrancheBalance};
use super::steps::{Ledger, TrancheState};
use super::variants::WaterfallVariant;
use crate::error::FundWaterfallError;
use crate::metrics::core_metrics::calculate_core_metrics;
use crate::metrics::payback::cumulative_cash_flows;
use crate::numeric::{check_percent, checked_ratio, saturating_sum};
use crate::types::*;
use crate::FundWaterfallResult;

const MAX_INVESTMENT_PERIOD: u32 = 30;
/// Ceiling on the commitment and on total net cash flow. Thirty years of
/// 100% accruals on it stay far inside `Decimal`'s range.
const MAX_AMOUNT: Money = dec!(1000000000000000);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Everything one waterfall calculation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallInput {
    pub basic_params: BasicParams,
    /// Net cash flow per year, `investment_period` entries
    pub cash_flows: CashFlowSeries,
    pub variant: WaterfallVariant,
    /// Discount rate for the dynamic payback, percent. Defaults to the hurdle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_discount_rate: Option<Percent>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Entry checks. Nothing is allocated before these pass.
pub fn validate_inputs(
    params: &BasicParams,
    cash_flows: &CashFlowSeries,
    variant: &WaterfallVariant,
) -> FundWaterfallResult<()> {
    if params.investment_amount <= Decimal::ZERO {
        return Err(FundWaterfallError::invalid(
            "investment_amount",
            "Investment amount must be positive",
        ));
    }
    if params.investment_amount > MAX_AMOUNT {
        return Err(FundWaterfallError::invalid(
            "investment_amount",
            format!("Investment amount cannot exceed {MAX_AMOUNT}"),
        ));
    }
    if params.investment_period == 0 || params.investment_period > MAX_INVESTMENT_PERIOD {
        return Err(FundWaterfallError::invalid(
            "investment_period",
            format!("Investment period must be between 1 and {MAX_INVESTMENT_PERIOD} years"),
        ));
    }
    check_percent("hurdle_rate", params.hurdle_rate)?;
    check_percent("management_carry", params.management_carry)?;

    if cash_flows.len() != params.investment_period as usize {
        return Err(FundWaterfallError::invalid(
            "cash_flows",
            format!(
                "Expected {} annual cash flows, got {}",
                params.investment_period,
                cash_flows.len()
            ),
        ));
    }
    if let Some((i, cf)) = cash_flows
        .as_slice()
        .iter()
        .enumerate()
        .find(|(_, cf)| cf.is_sign_negative() && !cf.is_zero())
    {
        return Err(FundWaterfallError::invalid(
            "cash_flows",
            format!("Cash flow for year {} cannot be negative (got {cf})", i + 1),
        ));
    }
    if saturating_sum(cash_flows.as_slice().iter().copied()) > MAX_AMOUNT {
        return Err(FundWaterfallError::invalid(
            "cash_flows",
            format!("Total net cash flow cannot exceed {MAX_AMOUNT}"),
        ));
    }

    variant.validate()
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Allocate every period's net cash flow through `variant`'s priority order.
///
/// Pure: each call builds its own tranche ledger and returns a fresh result.
/// The only error is `InvalidParameters`, raised before any allocation.
pub fn allocate(
    params: &BasicParams,
    cash_flows: &CashFlowSeries,
    variant: &WaterfallVariant,
) -> FundWaterfallResult<CalculationResult> {
    allocate_with_discount(params, cash_flows, variant, None)
}

/// As [`allocate`], with an explicit discount rate for the dynamic payback.
pub fn allocate_with_discount(
    params: &BasicParams,
    cash_flows: &CashFlowSeries,
    variant: &WaterfallVariant,
    dynamic_discount_rate: Option<Percent>,
) -> FundWaterfallResult<CalculationResult> {
    if let Err(e) = validate_inputs(params, cash_flows, variant) {
        debug!("rejected {} calculation: {e}", variant.mode());
        return Err(e);
    }
    if let Some(rate) = dynamic_discount_rate {
        check_percent("dynamic_discount_rate", rate)?;
    }

    let structure = variant.structure(params);
    let steps = variant.steps(params);
    let mut ledger = Ledger::new(
        structure
            .iter()
            .map(|t| TrancheState::new(t.tranche, t.amount))
            .collect(),
    );
    let cumulative = cumulative_cash_flows(cash_flows.as_slice(), params.investment_amount);

    let mut records = Vec::with_capacity(cash_flows.len());
    for (i, cf) in cash_flows.as_slice().iter().enumerate() {
        let beginning_balances: Vec<TrancheBalance> =
            ledger.tranches().iter().map(TrancheBalance::from).collect();

        let allocation = ledger.run_period(&steps, *cf);
        let year = i as u32 + 1;
        debug!(
            "year {year}: cash {cf}, carry lp {} gp {}, undistributed {}",
            allocation.carry_lp, allocation.carry_gp, allocation.undistributed
        );

        records.push(PeriodRecord {
            year,
            net_cash_flow: *cf,
            distribution_rate: checked_ratio(*cf, params.investment_amount)
                .unwrap_or(Decimal::ZERO),
            beginning_balances,
            steps: PeriodRecord::step_amounts(&steps, &allocation.amounts),
            carry_lp: allocation.carry_lp,
            carry_gp: allocation.carry_gp,
            undistributed: allocation.undistributed,
            cumulative_cash_flow: cumulative[i + 1],
        });
    }

    let ending_balances = ledger.tranches().iter().map(TrancheBalance::from).collect();
    let summary = Summary::from_records(&steps, &records, ending_balances);
    let core_metrics = calculate_core_metrics(params, cash_flows, dynamic_discount_rate);

    Ok(CalculationResult {
        mode: variant.mode().to_string(),
        calculation_mode: variant.label().to_string(),
        investment_target: params.investment_target.clone(),
        structure,
        records,
        core_metrics,
        summary,
    })
}

/// Run a waterfall calculation and wrap it in the standard output envelope.
pub fn calculate_waterfall(
    input: &WaterfallInput,
) -> FundWaterfallResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = allocate_with_discount(
        &input.basic_params,
        &input.cash_flows,
        &input.variant,
        input.dynamic_discount_rate,
    )?;

    for (name, metric) in result.core_metrics.degraded() {
        if let Some(reason) = metric.reason() {
            warnings.push(format!("{name}: {reason}"));
        }
    }
    let outstanding = result.summary.ending_principal();
    if outstanding > Decimal::ZERO {
        warnings.push(format!(
            "Principal of {outstanding} remains outstanding after year {}",
            input.basic_params.investment_period
        ));
    }
    let unpaid_hurdle = result.summary.ending_accrued_hurdle();
    if unpaid_hurdle > Decimal::ZERO {
        warnings.push(format!("Accrued hurdle of {unpaid_hurdle} remains unpaid"));
    }
    if result.summary.total_undistributed > Decimal::ZERO {
        warnings.push(format!(
            "{} of net cash flow was left undistributed",
            result.summary.total_undistributed
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("Fund Distribution Waterfall ({})", input.variant.label()),
        &serde_json::json!({
            "investment_target": input.basic_params.investment_target,
            "investment_amount": input.basic_params.investment_amount.to_string(),
            "investment_period": input.basic_params.investment_period,
            "hurdle_rate_pct": input.basic_params.hurdle_rate.to_string(),
            "management_carry_pct": input.basic_params.management_carry.to_string(),
            "variant": input.variant,
        }),
        warnings,
        elapsed,
        result,
    ))
}
