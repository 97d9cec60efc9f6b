use crate::{Error, Result};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const MIN_SAMPLES_SPLIT: usize = 2;

/// Knobs for [`RandomForestRegressor::fit`]. `random_state` seeds every
/// per-tree bootstrap sample, so a fixed value makes training fully
/// reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestHyperparams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub random_state: u64,
}

impl Default for ForestHyperparams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One CART regression tree stored as a flat node arena. Index 0 is the
/// root.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn fit(rows: &Array2<f64>, targets: &[f64], sample: &[usize], max_depth: usize) -> Self {
        let mut nodes = Vec::new();
        grow(rows, targets, sample, max_depth, &mut nodes);
        Self { nodes }
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Appends the subtree for `sample` to the arena and returns its root index.
fn grow(
    rows: &Array2<f64>,
    targets: &[f64],
    sample: &[usize],
    depth_left: usize,
    nodes: &mut Vec<TreeNode>,
) -> usize {
    let mean = sample.iter().map(|&i| targets[i]).sum::<f64>() / sample.len() as f64;

    let is_pure = sample.iter().all(|&i| targets[i] == targets[sample[0]]);
    if depth_left == 0 || sample.len() < MIN_SAMPLES_SPLIT || is_pure {
        nodes.push(TreeNode::Leaf { value: mean });
        return nodes.len() - 1;
    }

    let Some((feature, threshold)) = best_split(rows, targets, sample) else {
        nodes.push(TreeNode::Leaf { value: mean });
        return nodes.len() - 1;
    };

    let (left_sample, right_sample): (Vec<usize>, Vec<usize>) = sample
        .iter()
        .copied()
        .partition(|&i| rows[[i, feature]] <= threshold);

    // Reserve the parent slot before recursing so child indices land after it.
    let index = nodes.len();
    nodes.push(TreeNode::Leaf { value: mean });
    let left = grow(rows, targets, &left_sample, depth_left - 1, nodes);
    let right = grow(rows, targets, &right_sample, depth_left - 1, nodes);
    nodes[index] = TreeNode::Split {
        feature,
        threshold,
        left,
        right,
    };
    index
}

/// Exhaustive scan for the (feature, threshold) pair minimizing the summed
/// squared error of the two children. Candidate thresholds sit between
/// consecutive distinct feature values, so neither child can end up empty.
fn best_split(rows: &Array2<f64>, targets: &[f64], sample: &[usize]) -> Option<(usize, f64)> {
    let n = sample.len() as f64;
    let total_sum: f64 = sample.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = sample.iter().map(|&i| targets[i] * targets[i]).sum();

    let mut best: Option<(f64, usize, f64)> = None;

    for feature in 0..rows.ncols() {
        let mut order = sample.to_vec();
        order.sort_by(|&a, &b| {
            rows[[a, feature]]
                .partial_cmp(&rows[[b, feature]])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (rank, window) in order.windows(2).enumerate() {
            let y = targets[window[0]];
            left_sum += y;
            left_sq += y * y;

            let here = rows[[window[0], feature]];
            let next = rows[[window[1], feature]];
            if next <= here {
                continue;
            }

            let left_n = (rank + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.map_or(true, |(best_sse, _, _)| sse < best_sse) {
                let mut threshold = (here + next) / 2.0;
                // Midpoint can round up onto `next` for adjacent floats,
                // which would empty the right child.
                if threshold >= next {
                    threshold = here;
                }
                best = Some((sse, feature, threshold));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

/// Bagged ensemble of regression trees. Each tree is fitted on a bootstrap
/// sample drawn from a seed derived from `random_state` and the tree index,
/// and a prediction is the mean of the per-tree leaf values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_features: usize,
    params: ForestHyperparams,
}

impl RandomForestRegressor {
    pub fn fit(rows: &Array2<f64>, targets: &[f64], params: ForestHyperparams) -> Result<Self> {
        if rows.nrows() == 0 {
            return Err(Error::training("cannot fit a forest on an empty matrix"));
        }
        if rows.nrows() != targets.len() {
            return Err(Error::training(format!(
                "feature matrix has {} rows but {} targets were given",
                rows.nrows(),
                targets.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(Error::training("n_estimators must be at least 1"));
        }
        if params.max_depth == 0 {
            return Err(Error::training("max_depth must be at least 1"));
        }

        let n = rows.nrows();
        let trees = (0..params.n_estimators)
            .map(|tree_index| {
                let mut rng =
                    StdRng::seed_from_u64(params.random_state.wrapping_add(tree_index as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(rows, targets, &sample, params.max_depth)
            })
            .collect();

        Ok(Self {
            trees,
            n_features: rows.ncols(),
            params,
        })
    }

    pub fn predict(&self, rows: &Array2<f64>) -> Result<Vec<f64>> {
        if rows.ncols() != self.n_features {
            return Err(Error::prediction(format!(
                "forest was fitted on {} features but received {}",
                self.n_features,
                rows.ncols()
            )));
        }

        Ok(rows
            .outer_iter()
            .map(|row| {
                let total: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
                total / self.trees.len() as f64
            })
            .collect())
    }

    pub fn params(&self) -> ForestHyperparams {
        self.params
    }
}
