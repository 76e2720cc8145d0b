pub mod error;
pub mod numeric;
pub mod types;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "waterfall")]
pub mod waterfall;

pub use error::FundWaterfallError;
pub use numeric::MetricValue;
pub use types::*;

/// Standard result type for all fund-waterfall operations
pub type FundWaterfallResult<T> = Result<T, FundWaterfallError>;
