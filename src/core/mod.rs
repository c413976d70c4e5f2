pub mod analyzer;
pub mod classifier;
pub mod digest;
pub mod engine;
pub mod export;
pub mod parser;
pub mod pivot;
pub mod rate_limit;
pub mod report_text;
pub mod stats;

pub use crate::domain::model::{
    AnalysisResult, Bucket, CellValue, ColumnRole, ColumnStats, ParseResult, PivotTable, Record,
    Sheet, SheetAnalysis, SourceKind,
};
pub use crate::domain::ports::{ConfigProvider, NarrativeGenerator, RateLimitStore, Storage};
pub use crate::utils::error::Result;
