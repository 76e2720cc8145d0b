use clap::{Args, ValueEnum};
use log::debug;
use rust_decimal::Decimal;
use serde_json::Value;

use fund_waterfall_core::waterfall::{self, WaterfallInput, WaterfallVariant};
use fund_waterfall_core::{BasicParams, CashFlowSeries};

use crate::input;

/// Waterfall variant selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    FlatPriorityRepayment,
    FlatPeriodicDistribution,
    StructuredSeniorSubordinate,
    StructuredMezzanine,
    StructuredInterestPrincipal,
}

/// Arguments for a waterfall calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Waterfall variant
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Name of the investment
    #[arg(long, default_value = "Fund")]
    pub target: String,

    /// Committed investment amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Investment period in years (defaults to the number of cash flows)
    #[arg(long)]
    pub period: Option<u32>,

    /// Hurdle rate, percent
    #[arg(long, default_value = "8")]
    pub hurdle: Decimal,

    /// GP carry share, percent
    #[arg(long, default_value = "20")]
    pub carry: Decimal,

    /// Annual net cash flows (comma-separated, e.g. "200,300,600")
    #[arg(long, value_delimiter = ',')]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Periodic distribution rate for flat-periodic-distribution, percent
    #[arg(long)]
    pub periodic_rate: Option<Decimal>,

    /// Senior tranche share of the commitment, percent
    #[arg(long)]
    pub senior_ratio: Option<Decimal>,

    /// Mezzanine tranche share of the commitment, percent
    #[arg(long)]
    pub mezzanine_ratio: Option<Decimal>,

    /// Mezzanine hurdle rate, percent
    #[arg(long)]
    pub mezzanine_rate: Option<Decimal>,

    /// Subordinate periodic return rate, percent
    #[arg(long)]
    pub subordinate_rate: Option<Decimal>,

    /// Discount rate for the dynamic payback, percent (defaults to the hurdle)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wf_input: WaterfallInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => input_from_flags(args)?,
    };

    debug!(
        "{} over {} cash flows",
        wf_input.variant.mode(),
        wf_input.cash_flows.len()
    );
    let result = waterfall::calculate_waterfall(&wf_input)?;
    Ok(serde_json::to_value(result)?)
}

fn input_from_flags(args: CalculateArgs) -> Result<WaterfallInput, Box<dyn std::error::Error>> {
    let mode = args.mode.ok_or("--mode is required (or provide --input)")?;
    let amount = args
        .amount
        .ok_or("--amount is required (or provide --input)")?;
    let cash_flows = args
        .cash_flows
        .ok_or("--cash-flows is required (or provide --input)")?;

    let variant = match mode {
        Mode::FlatPriorityRepayment => WaterfallVariant::FlatPriorityRepayment,
        Mode::FlatPeriodicDistribution => WaterfallVariant::FlatPeriodicDistribution {
            periodic_rate: args
                .periodic_rate
                .ok_or("--periodic-rate is required for flat-periodic-distribution")?,
        },
        Mode::StructuredSeniorSubordinate => WaterfallVariant::StructuredSeniorSubordinate {
            senior_ratio: args
                .senior_ratio
                .ok_or("--senior-ratio is required for structured modes")?,
        },
        Mode::StructuredMezzanine => WaterfallVariant::StructuredMezzanine {
            senior_ratio: args
                .senior_ratio
                .ok_or("--senior-ratio is required for structured modes")?,
            mezzanine_ratio: args
                .mezzanine_ratio
                .ok_or("--mezzanine-ratio is required for structured-mezzanine")?,
            mezzanine_rate: args
                .mezzanine_rate
                .ok_or("--mezzanine-rate is required for structured-mezzanine")?,
        },
        Mode::StructuredInterestPrincipal => WaterfallVariant::StructuredInterestPrincipal {
            senior_ratio: args
                .senior_ratio
                .ok_or("--senior-ratio is required for structured modes")?,
            subordinate_rate: args
                .subordinate_rate
                .ok_or("--subordinate-rate is required for structured-interest-principal")?,
        },
    };

    let period = args.period.unwrap_or(cash_flows.len() as u32);

    Ok(WaterfallInput {
        basic_params: BasicParams {
            investment_target: args.target,
            investment_amount: amount,
            investment_period: period,
            hurdle_rate: args.hurdle,
            management_carry: args.carry,
        },
        cash_flows: CashFlowSeries::new(cash_flows),
        variant,
        dynamic_discount_rate: args.discount_rate,
    })
}
