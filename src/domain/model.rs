use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a sheet: column name to raw cell text, in header order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub records: Vec<Record>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// 欄位順序取自第一筆記錄（同一張表所有記錄的欄位一致）
    pub fn columns(&self) -> Vec<String> {
        self.records
            .first()
            .map(|record| record.columns().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.records.first().map(|r| r.fields.len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Spreadsheet,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Csv => write!(f, "csv"),
            SourceKind::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub kind: SourceKind,
    pub sheets: Vec<Sheet>,
}

impl ParseResult {
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(Sheet::row_count).sum()
    }
}

/// A cell after numeric coercion has been decided.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Numeric(f64),
    Text(String),
}

impl CellValue {
    pub fn resolve(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Numeric(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Numeric,
    Categorical,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTable {
    pub title: String,
    pub category_column: String,
    pub metric_column: String,
    pub buckets: BTreeMap<String, Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetAnalysis {
    pub sheet_name: String,
    pub stats: Vec<ColumnStats>,
    pub pivots: Vec<PivotTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub per_sheet: Vec<SheetAnalysis>,
    pub narrative: String,
    pub total_sheets: usize,
    pub total_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        Record::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_cell_value_resolution() {
        assert_eq!(CellValue::resolve(""), CellValue::Empty);
        assert_eq!(CellValue::resolve(" 12.5 "), CellValue::Numeric(12.5));
        assert_eq!(CellValue::resolve("-3"), CellValue::Numeric(-3.0));
        assert_eq!(CellValue::resolve("1e3"), CellValue::Numeric(1000.0));
        assert_eq!(CellValue::resolve("0x1F"), CellValue::Text("0x1F".to_string()));
        assert_eq!(CellValue::resolve("inf"), CellValue::Text("inf".to_string()));
        assert_eq!(CellValue::resolve("NaN"), CellValue::Text("NaN".to_string()));
        assert_eq!(CellValue::resolve("   "), CellValue::Text("   ".to_string()));
    }

    #[test]
    fn test_sheet_dimensions_are_derived_from_records() {
        let sheet = Sheet::new(
            "Data",
            vec![
                record(&[("a", "1"), ("b", "x")]),
                record(&[("a", "2"), ("b", "y")]),
            ],
        );
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.column_count(), 2);
        assert_eq!(sheet.columns(), vec!["a", "b"]);
        assert_eq!(sheet.records[1].get("b"), Some("y"));
        assert_eq!(sheet.records[1].get("c"), None);
    }

    #[test]
    fn test_analysis_result_field_names() {
        let result = AnalysisResult {
            per_sheet: vec![SheetAnalysis {
                sheet_name: "Sheet1".to_string(),
                stats: vec![],
                pivots: vec![PivotTable {
                    title: "region vs sales".to_string(),
                    category_column: "region".to_string(),
                    metric_column: "sales".to_string(),
                    buckets: BTreeMap::new(),
                }],
            }],
            narrative: "ok".to_string(),
            total_sheets: 1,
            total_rows: 3,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["perSheet"][0]["sheetName"], "Sheet1");
        assert_eq!(json["perSheet"][0]["pivots"][0]["categoryColumn"], "region");
        assert_eq!(json["totalSheets"], 1);
        assert_eq!(json["totalRows"], 3);
    }
}
