pub mod engine;
pub mod record;
pub mod steps;
pub mod variants;

pub use engine::{allocate, allocate_with_discount, calculate_waterfall, WaterfallInput};
pub use record::{CalculationResult, PeriodRecord, Summary};
pub use variants::WaterfallVariant;
