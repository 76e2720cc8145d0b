use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates as entered by the user, in percent (8 = 8%).
pub type Percent = Decimal;

/// Investment-level parameters shared by every waterfall variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicParams {
    /// Free-form label of the investment
    pub investment_target: String,
    /// Capital committed at year 0
    pub investment_amount: Money,
    /// Number of annual periods (1..=30)
    pub investment_period: u32,
    /// Preferred return, percent per year
    pub hurdle_rate: Percent,
    /// Manager carried interest, percent of the residual
    pub management_carry: Percent,
}

/// Net cash flow per year, index 0 holding year 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashFlowSeries {
    pub flows: Vec<Money>,
}

impl CashFlowSeries {
    pub fn new(flows: Vec<Money>) -> Self {
        Self { flows }
    }

    pub fn as_slice(&self) -> &[Money] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl From<Vec<Money>> for CashFlowSeries {
    fn from(flows: Vec<Money>) -> Self {
        Self { flows }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
