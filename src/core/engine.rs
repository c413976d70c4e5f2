use crate::core::analyzer::Analyzer;
use crate::core::parser::parse;
use crate::core::rate_limit::RateLimiter;
use crate::core::{AnalysisResult, NarrativeGenerator, RateLimitStore, SourceKind};
use crate::utils::error::{InsightError, Result};
use chrono::{DateTime, Utc};
use std::time::Instant;

pub const DEFAULT_MAX_FILE_BYTES: usize = 20 * 1024 * 1024;

/// A file delivered by the transport on behalf of a caller.
#[derive(Debug, Clone)]
pub struct Upload {
    pub caller_id: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(caller_id: impl Into<String>, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            caller_id: caller_id.into(),
            filename: filename.into(),
            bytes,
        }
    }
}

/// Analysis plus the request details a renderer needs.
#[derive(Debug, Clone)]
pub struct Report {
    pub source_filename: String,
    pub kind: SourceKind,
    pub generated_at: DateTime<Utc>,
    pub analysis: AnalysisResult,
}

/// Runs one request: admission, size ceiling, parse, analyze.
pub struct ReportEngine<N: NarrativeGenerator, L: RateLimitStore> {
    analyzer: Analyzer<N>,
    limiter: RateLimiter<L>,
    max_file_bytes: usize,
}

impl<N: NarrativeGenerator, L: RateLimitStore> ReportEngine<N, L> {
    pub fn new(analyzer: Analyzer<N>, limiter: RateLimiter<L>) -> Self {
        Self {
            analyzer,
            limiter,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub async fn run(&self, upload: &Upload) -> Result<Report> {
        let admission = self.limiter.check(&upload.caller_id);
        if !admission.allowed {
            return Err(InsightError::AdmissionDenied {
                caller: upload.caller_id.clone(),
                retry_after_ms: admission.retry_after_ms.unwrap_or_default(),
            });
        }

        if upload.bytes.len() > self.max_file_bytes {
            return Err(InsightError::FileTooLarge {
                size: upload.bytes.len(),
                limit: self.max_file_bytes,
            });
        }

        let started = Instant::now();
        tracing::info!(
            "📊 Processing {} ({} bytes) for {}, {} request(s) left this minute",
            upload.filename,
            upload.bytes.len(),
            upload.caller_id,
            admission.remaining
        );

        let parsed = parse(&upload.bytes, &upload.filename)?;
        tracing::info!(
            "Parsed {} sheet(s), {} row(s) as {}",
            parsed.sheets.len(),
            parsed.total_rows(),
            parsed.kind
        );

        let analysis = self.analyzer.analyze(&parsed).await;
        tracing::info!(
            "✅ Analysis finished in {:?}: {} sheet(s), {} row(s)",
            started.elapsed(),
            analysis.total_sheets,
            analysis.total_rows
        );

        Ok(Report {
            source_filename: upload.filename.clone(),
            kind: parsed.kind,
            generated_at: Utc::now(),
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::InMemoryRateLimitStore;
    use crate::adapters::narrative::DisabledNarrator;
    use crate::core::analyzer::NARRATIVE_FALLBACK;

    fn engine(max_requests: usize) -> ReportEngine<DisabledNarrator, InMemoryRateLimitStore> {
        ReportEngine::new(
            Analyzer::new(DisabledNarrator::new("disabled in tests")),
            RateLimiter::new(InMemoryRateLimitStore::new(), max_requests),
        )
    }

    #[tokio::test]
    async fn test_run_produces_result() {
        let upload = Upload::new("chat-1", "sales.csv", b"region,sales\nE,10\nW,5\n".to_vec());
        let report = engine(5).run(&upload).await.unwrap();

        assert_eq!(report.source_filename, "sales.csv");
        assert_eq!(report.kind, SourceKind::Csv);
        assert_eq!(report.analysis.total_rows, 2);
        assert_eq!(report.analysis.narrative, NARRATIVE_FALLBACK);
    }

    #[tokio::test]
    async fn test_admission_denied_before_parsing() {
        let engine = engine(1);
        let good = Upload::new("chat-1", "sales.csv", b"a\n1\n".to_vec());
        assert!(engine.run(&good).await.is_ok());

        // an unparseable file would fail with Parse if the parser ran
        let bad = Upload::new("chat-1", "broken.csv", Vec::new());
        let err = engine.run(&bad).await.unwrap_err();
        assert!(matches!(err, InsightError::AdmissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_file_size_ceiling() {
        let engine = engine(5).with_max_file_bytes(8);
        let upload = Upload::new("chat-1", "big.csv", b"a,b\n1,2\n3,4\n".to_vec());
        let err = engine.run(&upload).await.unwrap_err();
        assert!(matches!(err, InsightError::FileTooLarge { size: 12, limit: 8 }));
    }

    #[tokio::test]
    async fn test_parse_error_propagates() {
        let upload = Upload::new("chat-1", "empty.csv", Vec::new());
        let err = engine(5).run(&upload).await.unwrap_err();
        assert!(matches!(err, InsightError::Parse { .. }));
    }
}
