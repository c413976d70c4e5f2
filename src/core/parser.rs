use crate::core::{ParseResult, Record, Sheet, SourceKind};
use crate::utils::error::{InsightError, Result};
use calamine::{Reader, Xls, Xlsx};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Parse raw upload bytes into named sheets. The filename extension selects the
/// decoder: `.xlsx`/`.xls` go to the spreadsheet reader, everything else is CSV.
pub fn parse(bytes: &[u8], filename: &str) -> Result<ParseResult> {
    // 以字面副檔名判斷，".xlsx" 這種純副檔名檔名也算
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some(ext @ ("xlsx" | "xls")) => {
            tracing::debug!("Parsing {} as spreadsheet ({})", filename, ext);
            let sheets = parse_spreadsheet(bytes, ext)?;
            Ok(ParseResult {
                kind: SourceKind::Spreadsheet,
                sheets,
            })
        }
        _ => {
            tracing::debug!("Parsing {} as CSV", filename);
            let sheet = parse_csv(bytes, sheet_name_for(filename))?;
            Ok(ParseResult {
                kind: SourceKind::Csv,
                sheets: vec![sheet],
            })
        }
    }
}

fn sheet_name_for(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_SHEET_NAME)
}

pub fn parse_csv(bytes: &[u8], sheet_name: &str) -> Result<Sheet> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| InsightError::parse(format!("File is not valid UTF-8 text: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| InsightError::parse("File is empty"))?;
    let headers = unique_headers(tokenize_line(header_line).iter().map(|h| h.trim()));

    let records: Vec<Record> = lines
        .map(|line| {
            let tokens = tokenize_line(line);
            build_record(&headers, tokens.iter().map(|t| t.trim().to_string()))
        })
        .collect();

    if records.is_empty() {
        return Err(InsightError::parse("File has a header row but no data rows"));
    }

    tracing::debug!(
        "CSV sheet '{}': {} columns, {} rows",
        sheet_name,
        headers.len(),
        records.len()
    );

    Ok(Sheet::new(sheet_name, records))
}

/// Split one CSV line on commas that are outside double quotes. Every quote
/// character toggles quoting and is dropped; `""` is two toggles, not an
/// escaped quote.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => tokens.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    tokens.push(current);

    tokens
}

fn parse_spreadsheet(bytes: &[u8], extension: &str) -> Result<Vec<Sheet>> {
    let cursor = Cursor::new(bytes.to_vec());

    let worksheets = if extension == "xls" {
        let mut workbook: Xls<_> = Xls::new(cursor)
            .map_err(|e| InsightError::parse(format!("Failed to open XLS workbook: {}", e)))?;
        workbook.worksheets()
    } else {
        let mut workbook: Xlsx<_> = Xlsx::new(cursor)
            .map_err(|e| InsightError::parse(format!("Failed to open XLSX workbook: {}", e)))?;
        workbook.worksheets()
    };

    if worksheets.is_empty() {
        return Err(InsightError::parse("Workbook contains no sheets"));
    }

    let mut sheets = Vec::new();
    for (name, range) in worksheets {
        let mut rows = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.is_empty()));

        let Some(header_row) = rows.next() else {
            tracing::debug!("Skipping empty sheet '{}'", name);
            continue;
        };
        let headers = unique_headers(header_row.iter().map(String::as_str));
        let records: Vec<Record> = rows
            .map(|row| build_record(&headers, row.into_iter()))
            .collect();

        if records.is_empty() {
            tracing::debug!("Skipping sheet '{}' without data rows", name);
            continue;
        }

        tracing::debug!(
            "Spreadsheet sheet '{}': {} columns, {} rows",
            name,
            headers.len(),
            records.len()
        );
        sheets.push(Sheet::new(name, records));
    }

    if sheets.is_empty() {
        return Err(InsightError::parse("Every sheet in the workbook is empty"));
    }

    Ok(sheets)
}

/// Zip values against headers: missing trailing cells become "", extra cells are dropped.
fn build_record(headers: &[String], values: impl Iterator<Item = String>) -> Record {
    let mut values = values.fuse();
    let fields = headers
        .iter()
        .map(|header| (header.clone(), values.next().unwrap_or_default()))
        .collect();
    Record::new(fields)
}

/// 空白表頭命名為 __EMPTY，重複表頭加上 _1、_2 後綴
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for name in raw {
        let base = if name.is_empty() { "__EMPTY" } else { name };
        let mut candidate = base.to_string();
        let mut suffix = 0;
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", base, suffix);
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
