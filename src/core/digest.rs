use crate::core::{ParseResult, Record, SheetAnalysis};
use std::fmt::Write;

/// Render the plain-text summary handed to the narrative generator.
pub fn build_digest(
    parse_result: &ParseResult,
    per_sheet: &[SheetAnalysis],
    sample_rows: usize,
) -> String {
    let mut digest = String::from("DATA ANALYSIS\n\n");
    let _ = writeln!(digest, "Source: {}", parse_result.kind);
    let _ = writeln!(digest, "Total sheets: {}", parse_result.sheets.len());
    let _ = writeln!(digest, "Total rows: {}", parse_result.total_rows());

    for (sheet, analysis) in parse_result.sheets.iter().zip(per_sheet) {
        let _ = writeln!(digest, "\n=== Sheet: {} ===", sheet.name);
        let _ = writeln!(
            digest,
            "Rows: {}, Columns: {}",
            sheet.row_count(),
            sheet.column_count()
        );
        let _ = writeln!(digest, "Columns: {}", sheet.columns().join(", "));

        let sample = sheet.records.len().min(sample_rows);
        if sample > 0 {
            let _ = writeln!(digest, "\nSample ({} rows):", sample);
            for record in sheet.records.iter().take(sample) {
                let _ = writeln!(digest, "{}", record_json(record));
            }
        }

        if !analysis.stats.is_empty() {
            digest.push_str("\nSTATISTICS:\n");
            for stats in &analysis.stats {
                let _ = writeln!(
                    digest,
                    "  {}: Min={:.2}, Max={:.2}, Mean={:.2}, Median={:.2}",
                    stats.column, stats.min, stats.max, stats.mean, stats.median
                );
            }
        }

        if !analysis.pivots.is_empty() {
            digest.push_str("\nPIVOTS:\n");
            for pivot in &analysis.pivots {
                let means: Vec<String> = pivot
                    .buckets
                    .iter()
                    .map(|(category, bucket)| {
                        format!("{}={:.2} (n={})", category, bucket.mean, bucket.count)
                    })
                    .collect();
                let _ = writeln!(digest, "  {}: {}", pivot.title, means.join(", "));
            }
        }
    }

    digest
}

fn record_json(record: &Record) -> String {
    // serde_json::Map 預設會排序鍵，這裡保留表頭順序
    let fields: Vec<String> = record
        .fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}:{}",
                serde_json::Value::from(key.as_str()),
                serde_json::Value::from(value.as_str())
            )
        })
        .collect();
    format!("{{{}}}", fields.join(","))
}
