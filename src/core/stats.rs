use crate::core::classifier::ResolvedColumn;
use crate::core::ColumnStats;

/// Descriptive statistics for each numeric column, in sheet order. Columns
/// without a single numeric cell are left out.
pub fn compute_stats(numeric_columns: &[&ResolvedColumn]) -> Vec<ColumnStats> {
    numeric_columns
        .iter()
        .filter_map(|column| {
            let values: Vec<f64> = column.numbers().collect();
            summarize(&column.name, values)
        })
        .collect()
}

fn summarize(column: &str, mut values: Vec<f64>) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let median = median(&mut values);

    Some(ColumnStats {
        column: column.to_string(),
        min,
        max,
        sum,
        mean: sum / count as f64,
        median,
        count,
    })
}

/// Median of a non-empty slice; sorts it in place.
pub(crate) fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::classify;
    use crate::core::{Record, Sheet};

    fn single_column(name: &str, cells: &[&str]) -> Sheet {
        let records = cells
            .iter()
            .map(|c| Record::new(vec![(name.to_string(), c.to_string())]))
            .collect();
        Sheet::new("test", records)
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [7.0]), 7.0);
    }

    #[test]
    fn test_stats_ignore_blank_cells() {
        let sheet = single_column("amount", &["10", "", "20", " 30 ", ""]);
        let classification = classify(&sheet);
        let stats = compute_stats(&classification.numeric_columns());

        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.column, "amount");
        assert_eq!(s.count, 3);
        assert_eq!(s.sum, 60.0);
        assert_eq!(s.mean, 20.0);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 30.0);
        assert_eq!(s.median, 20.0);
    }

    #[test]
    fn test_stats_keep_full_precision() {
        let sheet = single_column("ratio", &["0.1", "0.2", "0.4"]);
        let classification = classify(&sheet);
        let stats = compute_stats(&classification.numeric_columns());

        assert!((stats[0].mean - 0.7 / 3.0).abs() < 1e-12);
        assert_ne!(stats[0].mean, 0.23);
    }

    #[test]
    fn test_stats_follow_sheet_column_order() {
        let records = vec![
            Record::new(vec![
                ("b".to_string(), "1".to_string()),
                ("a".to_string(), "2".to_string()),
            ]),
            Record::new(vec![
                ("b".to_string(), "3".to_string()),
                ("a".to_string(), "4".to_string()),
            ]),
        ];
        let classification = classify(&Sheet::new("test", records));
        let stats = compute_stats(&classification.numeric_columns());

        let names: Vec<&str> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_negative_values() {
        let sheet = single_column("delta", &["-5", "-1", "-3"]);
        let classification = classify(&sheet);
        let stats = compute_stats(&classification.numeric_columns());
        assert_eq!(stats[0].min, -5.0);
        assert_eq!(stats[0].max, -1.0);
        assert_eq!(stats[0].median, -3.0);
    }
}
