pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{InMemoryRateLimitStore, LocalStorage};
pub use core::{
    analyzer::Analyzer,
    engine::{Report, ReportEngine, Upload},
    export::ReportWriter,
    parser::parse,
    rate_limit::RateLimiter,
};
pub use domain::model::{AnalysisResult, ParseResult};
pub use utils::error::{InsightError, Result};
