use crate::core::AnalysisResult;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Chat platforms reject longer messages.
pub const MAX_MESSAGE_CHARS: usize = 4096;
const TRUNCATE_AT: usize = 4050;
const TRUNCATED_SUFFIX: &str = "\n\n... (truncated)";

/// Plain-text rendering of a report for chat delivery or the console.
pub fn format_text_report(result: &AnalysisResult, generated_at: DateTime<Utc>) -> String {
    let mut text = String::from("📊 DATA ANALYSIS REPORT\n\n");
    let _ = writeln!(
        text,
        "Sheets: {}, Rows: {}\n",
        result.total_sheets, result.total_rows
    );
    text.push_str(result.narrative.trim());
    text.push('\n');

    for sheet in &result.per_sheet {
        if sheet.stats.is_empty() && sheet.pivots.is_empty() {
            continue;
        }
        let _ = writeln!(text, "\n📄 {}", sheet.sheet_name);
        for stats in &sheet.stats {
            let _ = writeln!(
                text,
                "  • {}: min {:.2}, max {:.2}, mean {:.2}, median {:.2} (n={})",
                stats.column, stats.min, stats.max, stats.mean, stats.median, stats.count
            );
        }
        for pivot in &sheet.pivots {
            let _ = writeln!(text, "  ▸ {} ({} groups)", pivot.title, pivot.buckets.len());
        }
    }

    let _ = write!(
        text,
        "\n---\n📅 {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    truncate_message(text)
}

fn truncate_message(text: String) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text;
    }
    let mut truncated: String = text.chars().take(TRUNCATE_AT).collect();
    truncated.push_str(TRUNCATED_SUFFIX);
    truncated
}
