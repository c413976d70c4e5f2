use crate::core::{CellValue, ColumnRole, Sheet};
use std::collections::HashSet;

/// Distinct-value bounds (exclusive) for a column to count as categorical.
pub const MIN_CATEGORIES: usize = 1;
pub const MAX_CATEGORIES: usize = 20;

/// A sheet column with every cell coerced once.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub name: String,
    pub raw: Vec<String>,
    pub values: Vec<CellValue>,
    pub numeric_eligible: bool,
    pub categorical_eligible: bool,
}

impl ResolvedColumn {
    fn resolve(name: String, raw: Vec<String>) -> Self {
        let values: Vec<CellValue> = raw.iter().map(|cell| CellValue::resolve(cell)).collect();

        let non_empty = values.iter().filter(|v| !v.is_empty()).count();
        let numeric = values.iter().filter(|v| v.as_number().is_some()).count();
        let numeric_eligible = non_empty > 0 && numeric == non_empty;

        let distinct = raw.iter().map(String::as_str).collect::<HashSet<_>>().len();
        let categorical_eligible = distinct > MIN_CATEGORIES && distinct < MAX_CATEGORIES;

        Self {
            name,
            raw,
            values,
            numeric_eligible,
            categorical_eligible,
        }
    }

    /// Numeric wins over categorical when a column qualifies for both.
    pub fn role(&self) -> ColumnRole {
        if self.numeric_eligible {
            ColumnRole::Numeric
        } else if self.categorical_eligible {
            ColumnRole::Categorical
        } else {
            ColumnRole::Ignored
        }
    }

    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(CellValue::as_number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub columns: Vec<ResolvedColumn>,
}

impl Classification {
    pub fn roles(&self) -> Vec<(String, ColumnRole)> {
        self.columns
            .iter()
            .map(|column| (column.name.clone(), column.role()))
            .collect()
    }

    pub fn role(&self, column: &str) -> Option<ColumnRole> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(ResolvedColumn::role)
    }

    pub fn numeric_columns(&self) -> Vec<&ResolvedColumn> {
        self.columns.iter().filter(|c| c.numeric_eligible).collect()
    }

    pub fn categorical_columns(&self) -> Vec<&ResolvedColumn> {
        self.columns.iter().filter(|c| c.categorical_eligible).collect()
    }
}

pub fn classify(sheet: &Sheet) -> Classification {
    let columns = sheet
        .columns()
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let raw = sheet
                .records
                .iter()
                .map(|record| {
                    record
                        .fields
                        .get(index)
                        .map(|(_, value)| value.clone())
                        .unwrap_or_default()
                })
                .collect();
            ResolvedColumn::resolve(name, raw)
        })
        .collect();

    Classification { columns }
}
