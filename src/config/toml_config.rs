use crate::adapters::narrative::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::config::MEGABYTE;
use crate::core::analyzer::DEFAULT_SAMPLE_ROWS;
use crate::core::ConfigProvider;
use crate::utils::error::{InsightError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub narrative: NarrativeConfig,
    pub analysis: Option<AnalysisConfig>,
    pub limits: Option<LimitsConfig>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub sample_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub requests_per_minute: Option<usize>,
    pub max_file_mb: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InsightError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| InsightError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DEEPSEEK_API_KEY})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| InsightError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("output.path", &self.output.path)?;

        if self.narrative_enabled() {
            validation::validate_url("narrative.endpoint", self.narrative_endpoint())?;
            validation::validate_non_empty_string("narrative.model", self.narrative_model())?;
            validation::validate_range("narrative.timeout_seconds", self.timeout_seconds(), 1, 600)?;
        }

        // 明確啟用時必須提供金鑰
        if self.narrative.enabled == Some(true) {
            let key = self.api_key().map(str::to_string);
            validation::validate_required_field("narrative.api_key", &key)?;
        }

        validation::validate_range("analysis.sample_rows", self.sample_rows(), 0, 500)?;
        validation::validate_positive_number(
            "limits.requests_per_minute",
            self.requests_per_minute(),
            1,
        )?;
        validation::validate_range("limits.max_file_mb", self.max_file_bytes() / MEGABYTE, 1, 100)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn narrative_endpoint(&self) -> &str {
        self.narrative.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn narrative_model(&self) -> &str {
        self.narrative.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Unresolved `${VAR}` placeholders count as missing.
    fn api_key(&self) -> Option<&str> {
        self.narrative
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
    }

    fn narrative_enabled(&self) -> bool {
        self.narrative.enabled.unwrap_or(true)
    }

    fn timeout_seconds(&self) -> u64 {
        self.narrative.timeout_seconds.unwrap_or(60)
    }

    fn sample_rows(&self) -> usize {
        self.analysis
            .as_ref()
            .and_then(|a| a.sample_rows)
            .unwrap_or(DEFAULT_SAMPLE_ROWS)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn requests_per_minute(&self) -> usize {
        self.limits
            .as_ref()
            .and_then(|l| l.requests_per_minute)
            .unwrap_or(20)
    }

    fn max_file_bytes(&self) -> usize {
        self.limits
            .as_ref()
            .and_then(|l| l.max_file_mb)
            .unwrap_or(20)
            * MEGABYTE
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[narrative]
endpoint = "https://llm.example.com/v1"
model = "analyst-large"
api_key = "sk-test"
timeout_seconds = 15

[analysis]
sample_rows = 10

[limits]
requests_per_minute = 5
max_file_mb = 10

[output]
path = "./reports"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.narrative_endpoint(), "https://llm.example.com/v1");
        assert_eq!(config.narrative_model(), "analyst-large");
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.timeout_seconds(), 15);
        assert_eq!(config.sample_rows(), 10);
        assert_eq!(config.requests_per_minute(), 5);
        assert_eq!(config.max_file_bytes(), 10 * MEGABYTE);
        assert_eq!(config.output_path(), "./reports");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let toml_content = r#"
[narrative]

[output]
path = "./out"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.narrative_enabled());
        assert_eq!(config.narrative_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.narrative_model(), DEFAULT_MODEL);
        assert_eq!(config.api_key(), None);
        assert_eq!(config.sample_rows(), DEFAULT_SAMPLE_ROWS);
        assert_eq!(config.requests_per_minute(), 20);
        assert_eq!(config.max_file_bytes(), 20 * MEGABYTE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHEET_INSIGHT_TEST_KEY", "sk-from-env");

        let toml_content = r#"
[narrative]
api_key = "${SHEET_INSIGHT_TEST_KEY}"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key(), Some("sk-from-env"));

        std::env::remove_var("SHEET_INSIGHT_TEST_KEY");
    }

    #[test]
    fn test_unresolved_placeholder_is_missing_key() {
        let toml_content = r#"
[narrative]
enabled = true
api_key = "${SHEET_INSIGHT_UNSET_VARIABLE}"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key(), None);
        assert!(matches!(
            config.validate(),
            Err(InsightError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[narrative]
endpoint = "invalid-url"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[narrative]
enabled = false

[output]
path = "./file-output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(!config.narrative_enabled());
        assert_eq!(config.output_path(), "./file-output");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[narrative\n").unwrap_err();
        assert!(matches!(err, InsightError::ConfigValidationError { .. }));
    }
}
