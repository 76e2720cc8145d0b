pub mod core_metrics;
pub mod irr;
pub mod multiples;
pub mod payback;
