use crate::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// In-memory tabular dataset: named feature columns plus one target vector,
/// row `i` of `features` paired with `targets[i]`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Array2<f64>,
    pub targets: Vec<f64>,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    fn subset(&self, indices: &[usize]) -> Result<Dataset> {
        let mut values = Vec::with_capacity(indices.len() * self.n_features());
        let mut targets = Vec::with_capacity(indices.len());
        for &i in indices {
            values.extend(self.features.row(i).iter().copied());
            targets.push(self.targets[i]);
        }
        let features = Array2::from_shape_vec((indices.len(), self.n_features()), values)
            .map_err(|e| Error::dataset(format!("failed to shape subset matrix: {e}")))?;
        Ok(Dataset {
            feature_names: self.feature_names.clone(),
            features,
            targets,
        })
    }
}

/// Reads a numeric CSV with a header row. The named target column becomes
/// `targets`; every other column becomes a feature, keeping the file's
/// column order.
pub async fn load_csv(path: &str, target_column: &str) -> Result<Dataset> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::dataset(format!("failed to read {path}: {e}")))?;
    let dataset = parse_csv(&raw, target_column)?;
    debug!(
        "Loaded {} rows with {} feature columns from {}",
        dataset.n_samples(),
        dataset.n_features(),
        path
    );
    Ok(dataset)
}

fn parse_csv(raw: &str, target_column: &str) -> Result<Dataset> {
    let mut lines = raw
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::dataset("dataset file is empty"))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let target_index = columns
        .iter()
        .position(|c| *c == target_column)
        .ok_or_else(|| Error::dataset(format!("target column '{target_column}' not found in header")))?;
    let feature_names: Vec<String> = columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target_index)
        .map(|(_, c)| c.to_string())
        .collect();

    let mut values = Vec::new();
    let mut targets = Vec::new();
    for (line_index, line) in lines {
        let line_no = line_index + 1;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns.len() {
            return Err(Error::dataset(format!(
                "line {line_no}: expected {} fields, found {}",
                columns.len(),
                fields.len()
            )));
        }
        for (i, field) in fields.iter().enumerate() {
            let value: f64 = field
                .parse()
                .map_err(|_| Error::dataset(format!("line {line_no}: '{field}' is not a number")))?;
            if !value.is_finite() {
                return Err(Error::dataset(format!(
                    "line {line_no}: non-finite value in column '{}'",
                    columns[i]
                )));
            }
            if i == target_index {
                targets.push(value);
            } else {
                values.push(value);
            }
        }
    }

    if targets.is_empty() {
        return Err(Error::dataset("dataset has a header but no data rows"));
    }

    let features = Array2::from_shape_vec((targets.len(), feature_names.len()), values)
        .map_err(|e| Error::dataset(format!("failed to shape feature matrix: {e}")))?;

    Ok(Dataset {
        feature_names,
        features,
        targets,
    })
}

/// Splits into `(train, test)` by a seeded shuffle. The test partition gets
/// `ceil(n * test_size)` rows, clamped so both partitions stay non-empty.
pub fn train_test_split(data: &Dataset, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::dataset(format!(
            "test_size must be strictly between 0 and 1, got {test_size}"
        )));
    }
    let n = data.n_samples();
    if n < 2 {
        return Err(Error::dataset("need at least 2 samples to split"));
    }

    let n_test = ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_indices, train_indices) = indices.split_at(n_test);
    Ok((data.subset(train_indices)?, data.subset(test_indices)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
a,target,b
1.0,10.0,2.0
3.0,30.0,4.0
5.0,50.0,6.0
";

    fn ramp_dataset(n: usize) -> Dataset {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Dataset {
            feature_names: vec!["x".to_string()],
            features: Array2::from_shape_vec((n, 1), values.clone()).unwrap(),
            targets: values,
        }
    }

    #[test]
    fn test_parse_excludes_target_and_keeps_column_order() {
        let data = parse_csv(SAMPLE, "target").unwrap();

        assert_eq!(data.feature_names, vec!["a", "b"]);
        assert_eq!(data.n_samples(), 3);
        assert_eq!(data.targets, vec![10.0, 30.0, 50.0]);
        assert_eq!(data.features[[0, 0]], 1.0);
        assert_eq!(data.features[[0, 1]], 2.0);
        assert_eq!(data.features[[2, 1]], 6.0);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let padded = "a,target\n\n1.0,2.0\n\n3.0,4.0\n\n";
        let data = parse_csv(padded, "target").unwrap();
        assert_eq!(data.n_samples(), 2);
    }

    #[test]
    fn test_parse_reports_ragged_row_with_line_number() {
        let ragged = "a,target\n1.0,2.0\n3.0\n";
        let message = parse_csv(ragged, "target").unwrap_err().to_string();
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("expected 2 fields"), "{message}");
    }

    #[test]
    fn test_parse_reports_non_numeric_field_with_line_number() {
        let bad = "a,target\n1.0,2.0\noops,4.0\n";
        let message = parse_csv(bad, "target").unwrap_err().to_string();
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("'oops'"), "{message}");
    }

    #[test]
    fn test_parse_rejects_non_finite_values() {
        let bad = "a,target\nNaN,2.0\n";
        let message = parse_csv(bad, "target").unwrap_err().to_string();
        assert!(message.contains("non-finite"), "{message}");
    }

    #[test]
    fn test_parse_rejects_missing_target_column() {
        let message = parse_csv(SAMPLE, "price").unwrap_err().to_string();
        assert!(message.contains("'price'"), "{message}");
    }

    #[test]
    fn test_parse_rejects_empty_input_and_header_only_input() {
        assert!(parse_csv("", "target").is_err());
        assert!(parse_csv("a,target\n", "target").is_err());
    }

    #[tokio::test]
    async fn test_load_csv_reports_missing_file() {
        let message = load_csv("/nonexistent/data.csv", "target")
            .await
            .unwrap_err()
            .to_string();
        assert!(message.contains("/nonexistent/data.csv"), "{message}");
    }

    #[test]
    fn test_split_sizes_follow_test_size() {
        let data = ramp_dataset(10);
        let (train, test) = train_test_split(&data, 0.2, 42).unwrap();
        assert_eq!(test.n_samples(), 2);
        assert_eq!(train.n_samples(), 8);
    }

    #[test]
    fn test_split_keeps_every_row_exactly_once() {
        let data = ramp_dataset(20);
        let (train, test) = train_test_split(&data, 0.3, 7).unwrap();

        let mut combined: Vec<f64> = train.targets.iter().chain(&test.targets).copied().collect();
        combined.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(combined, data.targets);
    }

    #[test]
    fn test_split_rows_stay_aligned_with_their_targets() {
        let data = ramp_dataset(12);
        let (train, test) = train_test_split(&data, 0.25, 3).unwrap();

        for part in [&train, &test] {
            for (i, &target) in part.targets.iter().enumerate() {
                assert_eq!(part.features[[i, 0]], target);
            }
        }
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let data = ramp_dataset(20);
        let (_, first) = train_test_split(&data, 0.2, 42).unwrap();
        let (_, second) = train_test_split(&data, 0.2, 42).unwrap();
        let (_, other_seed) = train_test_split(&data, 0.2, 43).unwrap();

        assert_eq!(first.targets, second.targets);
        assert_ne!(first.targets, other_seed.targets);
    }

    #[test]
    fn test_split_always_leaves_both_partitions_non_empty() {
        let data = ramp_dataset(3);
        let (train, test) = train_test_split(&data, 0.01, 1).unwrap();
        assert_eq!(test.n_samples(), 1);
        assert_eq!(train.n_samples(), 2);

        let (train, test) = train_test_split(&data, 0.99, 1).unwrap();
        assert_eq!(test.n_samples(), 2);
        assert_eq!(train.n_samples(), 1);
    }

    #[test]
    fn test_split_rejects_out_of_range_test_size() {
        let data = ramp_dataset(10);
        assert!(train_test_split(&data, 0.0, 1).is_err());
        assert!(train_test_split(&data, 1.0, 1).is_err());
        assert!(train_test_split(&data, -0.5, 1).is_err());
    }

    #[test]
    fn test_split_rejects_single_row_dataset() {
        let data = ramp_dataset(1);
        assert!(train_test_split(&data, 0.5, 1).is_err());
    }
}
