use crate::core::classifier::classify;
use crate::core::digest::build_digest;
use crate::core::pivot::build_pivots;
use crate::core::stats::compute_stats;
use crate::core::{AnalysisResult, NarrativeGenerator, ParseResult, Sheet, SheetAnalysis};

pub const NARRATIVE_FALLBACK: &str = "narrative unavailable, see statistics";
pub const DEFAULT_SAMPLE_ROWS: usize = 30;

pub struct Analyzer<N: NarrativeGenerator> {
    narrator: N,
    sample_rows: usize,
}

impl<N: NarrativeGenerator> Analyzer<N> {
    pub fn new(narrator: N) -> Self {
        Self {
            narrator,
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }

    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }

    /// Statistics and pivots for every sheet, then a narrative over the digest.
    /// A failing narrator never fails the analysis.
    pub async fn analyze(&self, parse_result: &ParseResult) -> AnalysisResult {
        let per_sheet: Vec<SheetAnalysis> =
            parse_result.sheets.iter().map(analyze_sheet).collect();

        let digest = build_digest(parse_result, &per_sheet, self.sample_rows);
        tracing::debug!("Digest built ({} chars)", digest.len());

        let narrative = match self.narrator.generate(&digest).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Narrative generation failed, using fallback: {}", e);
                NARRATIVE_FALLBACK.to_string()
            }
        };

        AnalysisResult {
            total_sheets: per_sheet.len(),
            total_rows: parse_result.total_rows(),
            per_sheet,
            narrative,
        }
    }
}

pub fn analyze_sheet(sheet: &Sheet) -> SheetAnalysis {
    let classification = classify(sheet);
    let numeric = classification.numeric_columns();
    let categorical = classification.categorical_columns();

    let stats = compute_stats(&numeric);
    let pivots = build_pivots(&categorical, &numeric);

    tracing::debug!(
        "Sheet '{}': {} numeric, {} categorical, {} stats, {} pivots",
        sheet.name,
        numeric.len(),
        categorical.len(),
        stats.len(),
        pivots.len()
    );

    SheetAnalysis {
        sheet_name: sheet.name.clone(),
        stats,
        pivots,
    }
}
