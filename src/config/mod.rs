pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::narrative::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

pub const MEGABYTE: usize = 1024 * 1024;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sheet-insight")]
#[command(about = "Statistics, pivots and a written summary for CSV and Excel files")]
pub struct CliConfig {
    /// CSV, .xlsx or .xls file to analyze
    #[arg(short, long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub narrative_endpoint: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub narrative_model: String,

    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, help = "Skip the narrative call and use the fallback text")]
    pub no_narrative: bool,

    #[arg(long, default_value_t = 60)]
    pub timeout_seconds: u64,

    #[arg(long, default_value_t = 30, help = "Rows quoted in the narrative digest")]
    pub sample_rows: usize,

    #[arg(long, default_value_t = 20, help = "Files accepted per caller per minute")]
    pub rate_limit: usize,

    #[arg(long, default_value_t = 20)]
    pub max_file_mb: usize,

    #[arg(long, default_value = "local")]
    pub caller_id: String,

    /// TOML file that replaces the narrative, analysis, limit and output flags
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn narrative_endpoint(&self) -> &str {
        &self.narrative_endpoint
    }

    fn narrative_model(&self) -> &str {
        &self.narrative_model
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn narrative_enabled(&self) -> bool {
        !self.no_narrative
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn sample_rows(&self) -> usize {
        self.sample_rows
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn requests_per_minute(&self) -> usize {
        self.rate_limit
    }

    fn max_file_bytes(&self) -> usize {
        self.max_file_mb * MEGABYTE
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("caller_id", &self.caller_id)?;
        if self.narrative_enabled() {
            validation::validate_url("narrative_endpoint", &self.narrative_endpoint)?;
            validation::validate_non_empty_string("narrative_model", &self.narrative_model)?;
            validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        }
        validation::validate_range("sample_rows", self.sample_rows, 0, 500)?;
        validation::validate_positive_number("rate_limit", self.rate_limit, 1)?;
        validation::validate_range("max_file_mb", self.max_file_mb, 1, 100)?;
        Ok(())
    }
}
