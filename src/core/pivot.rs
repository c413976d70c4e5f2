use crate::core::classifier::ResolvedColumn;
use crate::core::stats::median;
use crate::core::{Bucket, PivotTable};
use std::collections::BTreeMap;

/// Fixed cap on pivots per sheet, applied after generation in column order.
pub const MAX_PIVOTS: usize = 5;

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    values: Vec<f64>,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.values.push(value);
    }

    fn finish(mut self) -> Bucket {
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Bucket {
            count: self.count,
            sum: self.sum,
            mean: self.sum / self.count as f64,
            min,
            max,
            median: median(&mut self.values),
        }
    }
}

/// Cross every categorical column with every numeric column (categorical
/// outer, numeric inner) and keep the first [`MAX_PIVOTS`] tables.
pub fn build_pivots(
    categorical_columns: &[&ResolvedColumn],
    numeric_columns: &[&ResolvedColumn],
) -> Vec<PivotTable> {
    categorical_columns
        .iter()
        .flat_map(|category| {
            numeric_columns
                .iter()
                .map(move |metric| pivot(category, metric))
        })
        .take(MAX_PIVOTS)
        .collect()
}

fn pivot(category: &ResolvedColumn, metric: &ResolvedColumn) -> PivotTable {
    let mut accumulators: BTreeMap<String, Accumulator> = BTreeMap::new();

    for (key, value) in category.raw.iter().zip(metric.values.iter()) {
        if key.is_empty() {
            continue;
        }
        let Some(number) = value.as_number() else {
            continue;
        };
        accumulators.entry(key.clone()).or_default().push(number);
    }

    let buckets = accumulators
        .into_iter()
        .map(|(key, acc)| (key, acc.finish()))
        .collect();

    PivotTable {
        title: format!("{} vs {}", category.name, metric.name),
        category_column: category.name.clone(),
        metric_column: metric.name.clone(),
        buckets,
    }
}
