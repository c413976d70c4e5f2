use crate::core::engine::Report;
use crate::core::{AnalysisResult, SourceKind, Storage};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    source_filename: &'a str,
    kind: SourceKind,
    generated_at: DateTime<Utc>,
    total_sheets: usize,
    total_rows: usize,
}

/// Packs an analysis into `{stem}_report.zip` on the given storage.
pub struct ReportWriter<S: Storage> {
    storage: S,
    output_path: String,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S, output_path: impl Into<String>) -> Self {
        Self {
            storage,
            output_path: output_path.into(),
        }
    }

    pub fn archive_name(source_filename: &str) -> String {
        let stem = Path::new(source_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("upload");
        format!("{}_report.zip", stem)
    }

    pub async fn write(&self, report: &Report) -> Result<String> {
        let archive_name = Self::archive_name(&report.source_filename);
        let result = &report.analysis;
        let manifest = Manifest {
            source_filename: &report.source_filename,
            kind: report.kind,
            generated_at: report.generated_at,
            total_sheets: result.total_sheets,
            total_rows: result.total_rows,
        };

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>("manifest.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

            zip.start_file::<_, ()>("report.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(result)?.as_bytes())?;

            zip.start_file::<_, ()>("stats.csv", FileOptions::default())?;
            zip.write_all(&stats_csv(result)?)?;

            zip.start_file::<_, ()>("pivots.csv", FileOptions::default())?;
            zip.write_all(&pivots_csv(result)?)?;

            zip.start_file::<_, ()>("narrative.txt", FileOptions::default())?;
            zip.write_all(result.narrative.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing report archive ({} bytes)", zip_data.len());
        self.storage.write_file(&archive_name, &zip_data).await?;

        Ok(format!("{}/{}", self.output_path, archive_name))
    }
}

fn stats_csv(result: &AnalysisResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["sheet", "column", "count", "min", "max", "sum", "mean", "median"])?;

    for sheet in &result.per_sheet {
        for stats in &sheet.stats {
            writer.write_record([
                sheet.sheet_name.clone(),
                stats.column.clone(),
                stats.count.to_string(),
                stats.min.to_string(),
                stats.max.to_string(),
                stats.sum.to_string(),
                stats.mean.to_string(),
                stats.median.to_string(),
            ])?;
        }
    }

    into_bytes(writer)
}

fn pivots_csv(result: &AnalysisResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "sheet", "pivot", "category", "count", "sum", "mean", "min", "max", "median",
    ])?;

    for sheet in &result.per_sheet {
        for pivot in &sheet.pivots {
            for (category, bucket) in &pivot.buckets {
                writer.write_record([
                    sheet.sheet_name.clone(),
                    pivot.title.clone(),
                    category.clone(),
                    bucket.count.to_string(),
                    bucket.sum.to_string(),
                    bucket.mean.to_string(),
                    bucket.min.to_string(),
                    bucket.max.to_string(),
                    bucket.median.to_string(),
                ])?;
            }
        }
    }

    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::analyze_sheet;
    use crate::core::parser::parse;
    use crate::utils::error::InsightError;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                InsightError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn sample_report() -> Report {
        let parsed = parse(b"region,sales\nE,10\nE,20\nW,5\n", "q1.csv").unwrap();
        let per_sheet: Vec<_> = parsed.sheets.iter().map(analyze_sheet).collect();
        Report {
            source_filename: "q1.csv".to_string(),
            kind: parsed.kind,
            generated_at: Utc::now(),
            analysis: AnalysisResult {
                total_sheets: per_sheet.len(),
                total_rows: parsed.total_rows(),
                per_sheet,
                narrative: "East leads.".to_string(),
            },
        }
    }

    fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    type MockStorageWriter = ReportWriter<MockStorage>;

    #[test]
    fn test_archive_name() {
        assert_eq!(MockStorageWriter::archive_name("q1 sales.csv"), "q1 sales_report.zip");
        assert_eq!(MockStorageWriter::archive_name("book.xlsx"), "book_report.zip");
        assert_eq!(MockStorageWriter::archive_name(""), "upload_report.zip");
    }

    #[tokio::test]
    async fn test_write_report_archive() {
        let storage = MockStorage::new();
        let writer = ReportWriter::new(storage.clone(), "reports");
        let report = sample_report();

        let path = writer.write(&report).await.unwrap();
        assert_eq!(path, "reports/q1_report.zip");

        let zip_bytes = storage.get_file("q1_report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["manifest.json", "narrative.txt", "pivots.csv", "report.json", "stats.csv"]
        );

        let report: serde_json::Value =
            serde_json::from_str(&read_entry(&mut archive, "report.json")).unwrap();
        assert_eq!(report["narrative"], "East leads.");
        assert_eq!(report["perSheet"][0]["sheetName"], "q1");
        assert_eq!(report["perSheet"][0]["pivots"][0]["buckets"]["E"]["sum"], 30.0);

        let manifest: serde_json::Value =
            serde_json::from_str(&read_entry(&mut archive, "manifest.json")).unwrap();
        assert_eq!(manifest["sourceFilename"], "q1.csv");
        assert_eq!(manifest["kind"], "csv");
        assert_eq!(manifest["totalRows"], 3);

        let stats = read_entry(&mut archive, "stats.csv");
        let mut lines = stats.lines();
        assert_eq!(lines.next(), Some("sheet,column,count,min,max,sum,mean,median"));
        assert_eq!(lines.next(), Some("q1,sales,3,5,20,35,11.666666666666666,10"));

        let pivots = read_entry(&mut archive, "pivots.csv");
        assert!(pivots.contains("q1,region vs sales,E,2,30,15,10,20,15"));
        assert!(pivots.contains("q1,region vs sales,W,1,5,5,5,5,5"));

        assert_eq!(read_entry(&mut archive, "narrative.txt"), "East leads.");
    }
}
