pub mod analyzer;
pub mod images;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use analyzer::{AnalysisOutcome, ChartAnalyzer};
pub use images::decode_images;
