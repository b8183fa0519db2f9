pub mod aggregator;
pub mod config;
pub mod error;
pub mod flip;
pub mod flow;
pub mod greeks;
pub mod logging;
pub mod models;
pub mod normalizer;

// Re-exports for convenience
pub use aggregator::{aggregate, AtmInfo, ExposureRow, ExposureTable};
pub use config::{contract_spec, ContractSpec};
pub use error::AnalyzerError;
pub use flip::{detect, FlipType, FlipZone};
pub use flow::{analyze, DexBias, FlowMetrics, GexBias};
pub use models::{OptionChain, OptionData, OptionDetail, Records};
pub use normalizer::{normalize, select_expiry, time_to_expiry, NormalizedChain, StrikeQuote};
