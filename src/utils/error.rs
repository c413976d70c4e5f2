use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Failed to parse file: {message}")]
    Parse { message: String },

    #[error("Narrative generator unavailable: {message}")]
    NarrativeUnavailable { message: String },

    #[error("Too many requests from {caller}, retry after {retry_after_ms}ms")]
    AdmissionDenied { caller: String, retry_after_ms: u64 },

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Narrative,
    Admission,
    Network,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InsightError {
    pub fn parse(message: impl Into<String>) -> Self {
        InsightError::Parse {
            message: message.into(),
        }
    }

    pub fn narrative(message: impl Into<String>) -> Self {
        InsightError::NarrativeUnavailable {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            InsightError::Parse { .. } | InsightError::FileTooLarge { .. } => ErrorCategory::Input,
            InsightError::CsvError(_) => ErrorCategory::Input,
            InsightError::NarrativeUnavailable { .. } => ErrorCategory::Narrative,
            InsightError::AdmissionDenied { .. } => ErrorCategory::Admission,
            InsightError::ApiError(_) => ErrorCategory::Network,
            InsightError::ZipError(_)
            | InsightError::IoError(_)
            | InsightError::SerializationError(_) => ErrorCategory::Storage,
            InsightError::ConfigError { .. }
            | InsightError::InvalidConfigValueError { .. }
            | InsightError::MissingConfigError { .. }
            | InsightError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 可降級處理，不影響統計輸出
            InsightError::NarrativeUnavailable { .. } => ErrorSeverity::Low,
            InsightError::AdmissionDenied { .. } | InsightError::ApiError(_) => {
                ErrorSeverity::Medium
            }
            InsightError::Parse { .. }
            | InsightError::FileTooLarge { .. }
            | InsightError::CsvError(_) => ErrorSeverity::High,
            InsightError::ZipError(_)
            | InsightError::IoError(_)
            | InsightError::SerializationError(_) => ErrorSeverity::Critical,
            InsightError::ConfigError { .. }
            | InsightError::InvalidConfigValueError { .. }
            | InsightError::MissingConfigError { .. }
            | InsightError::ConfigValidationError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            InsightError::Parse { .. } | InsightError::CsvError(_) => {
                "Make sure the file is a valid CSV (UTF-8) or Excel (.xlsx, .xls) file with a header row and at least one data row".to_string()
            }
            InsightError::FileTooLarge { limit, .. } => {
                format!("Split the file into parts smaller than {} MB", limit / (1024 * 1024))
            }
            InsightError::NarrativeUnavailable { .. } => {
                "Check the narrative endpoint and API key; statistics are still available".to_string()
            }
            InsightError::AdmissionDenied { retry_after_ms, .. } => {
                format!("Wait {} seconds before sending another file", retry_after_ms.div_ceil(1000))
            }
            InsightError::ApiError(_) => "Check network connectivity and retry".to_string(),
            InsightError::ZipError(_)
            | InsightError::IoError(_)
            | InsightError::SerializationError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            InsightError::ConfigError { .. }
            | InsightError::InvalidConfigValueError { .. }
            | InsightError::MissingConfigError { .. }
            | InsightError::ConfigValidationError { .. } => {
                "Review the command line flags or configuration file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            InsightError::Parse { message } => {
                format!("Sorry, the file could not be read: {}", message)
            }
            InsightError::FileTooLarge { size, limit } => format!(
                "The file is too large ({:.1} MB, limit {:.1} MB)",
                *size as f64 / (1024.0 * 1024.0),
                *limit as f64 / (1024.0 * 1024.0)
            ),
            InsightError::AdmissionDenied { .. } => {
                "Too many files in a short time, please slow down".to_string()
            }
            InsightError::NarrativeUnavailable { .. } => {
                "The written summary is unavailable right now".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_high_severity_input() {
        let err = InsightError::parse("file is empty");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("file is empty"));
    }

    #[test]
    fn test_narrative_error_is_low_severity() {
        let err = InsightError::narrative("timeout");
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Narrative);
    }

    #[test]
    fn test_admission_denied_suggests_wait_in_seconds() {
        let err = InsightError::AdmissionDenied {
            caller: "42".to_string(),
            retry_after_ms: 1500,
        };
        assert_eq!(err.recovery_suggestion(), "Wait 2 seconds before sending another file");
    }
}
