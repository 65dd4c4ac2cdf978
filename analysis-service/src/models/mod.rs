pub mod analysis;
pub mod report;

pub use analysis::{
    AnalysisMetadata, AnalyzeRequest, AnalyzeResponse, ChartImage, Timeframe, EXPECTED_IMAGE_COUNT,
};
pub use report::AnalysisReport;
