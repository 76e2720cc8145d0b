use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fund_waterfall_core::metrics::core_metrics::{self, MetricsInput};
use fund_waterfall_core::{BasicParams, CashFlowSeries};

use crate::input;

/// Arguments for the metrics-only calculation
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial investment
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Annual net cash flows (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Hurdle rate, percent; also the default payback discount rate
    #[arg(long, default_value = "8")]
    pub hurdle: Decimal,

    /// Discount rate for the dynamic payback, percent
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let metrics_input: MetricsInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            let amount = args
                .amount
                .ok_or("--amount is required (or provide --input)")?;
            let cash_flows = args
                .cash_flows
                .ok_or("--cash-flows is required (or provide --input)")?;

            MetricsInput {
                basic_params: BasicParams {
                    investment_target: String::new(),
                    investment_amount: amount,
                    investment_period: cash_flows.len() as u32,
                    hurdle_rate: args.hurdle,
                    management_carry: Decimal::ZERO,
                },
                cash_flows: CashFlowSeries::new(cash_flows),
                dynamic_discount_rate: args.discount_rate,
            }
        }
    };

    let result = core_metrics::calculate_metrics(&metrics_input)?;
    Ok(serde_json::to_value(result)?)
}
