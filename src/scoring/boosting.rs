//! Gradient-boosted decision stumps with logistic loss.
//!
//! Each round fits one depth-1 split by a second-order (Newton) step on
//! histogram bins of the encoded columns. Stumps add up per column, which is
//! enough to carve each reading into an in-range band and a penalty outside.

use crate::error::{CropCareError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub rounds: usize,
    pub learning_rate: f64,
    /// Upper bound on candidate split points per column.
    pub max_bins: usize,
    pub l2_regularization: f64,
    /// Minimum hessian mass on each side of a split.
    pub min_child_weight: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            rounds: 300,
            learning_rate: 0.1,
            max_bins: 64,
            l2_regularization: 1.0,
            min_child_weight: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    pub column: usize,
    pub threshold: f64,
    /// Contribution when `x[column] <= threshold`.
    pub left: f64,
    pub right: f64,
}

impl Stump {
    fn value(&self, row: &[f64]) -> f64 {
        if row[self.column] <= self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedStumps {
    pub base_score: f64,
    pub learning_rate: f64,
    pub stumps: Vec<Stump>,
}

impl BoostedStumps {
    /// Log-odds of the positive class.
    pub fn raw_score(&self, row: &[f64]) -> f64 {
        self.base_score
            + self.learning_rate * self.stumps.iter().map(|s| s.value(row)).sum::<f64>()
    }

    pub fn probability(&self, row: &[f64]) -> f64 {
        sigmoid(self.raw_score(row))
    }

    pub fn max_column(&self) -> Option<usize> {
        self.stumps.iter().map(|s| s.column).max()
    }

    pub fn fit(rows: &[Vec<f64>], labels: &[u8], params: &BoostingParams) -> Result<Self> {
        if rows.is_empty() {
            return Err(CropCareError::EmptyDataset);
        }
        if rows.len() != labels.len() {
            return Err(CropCareError::Training(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let n = rows.len();
        let width = rows[0].len();
        let positives = labels.iter().filter(|l| **l == 1).count();
        if positives == 0 || positives == n {
            return Err(CropCareError::Training(
                "training rows contain a single class".into(),
            ));
        }

        let prior = positives as f64 / n as f64;
        let base_score = (prior / (1.0 - prior)).ln();
        let targets: Vec<f64> = labels.iter().map(|l| f64::from(*l)).collect();

        let columns: Vec<BinnedColumn> = (0..width)
            .map(|c| BinnedColumn::new(rows.iter().map(|r| r[c]), params.max_bins))
            .collect();

        let mut scores = vec![base_score; n];
        let mut gradients = vec![0.0; n];
        let mut hessians = vec![0.0; n];
        let mut stumps = Vec::with_capacity(params.rounds);

        for round in 0..params.rounds {
            for i in 0..n {
                let p = sigmoid(scores[i]);
                gradients[i] = p - targets[i];
                hessians[i] = (p * (1.0 - p)).max(1e-12);
            }

            let Some(split) = best_split(&columns, &gradients, &hessians, params) else {
                tracing::debug!("No further improving split after {} rounds", round);
                break;
            };

            let column = &columns[split.column];
            for (i, score) in scores.iter_mut().enumerate() {
                let leaf = if column.bins[i] as usize <= split.bin {
                    split.left
                } else {
                    split.right
                };
                *score += params.learning_rate * leaf;
            }

            stumps.push(Stump {
                column: split.column,
                threshold: column.thresholds[split.bin],
                left: split.left,
                right: split.right,
            });

            if (round + 1) % 50 == 0 {
                tracing::debug!(
                    "Boosting round {}: log loss {:.4}",
                    round + 1,
                    log_loss(&scores, &targets)
                );
            }
        }

        tracing::info!(
            "Fitted {} stumps on {} rows x {} columns",
            stumps.len(),
            n,
            width
        );

        Ok(Self {
            base_score,
            learning_rate: params.learning_rate,
            stumps,
        })
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn log_loss(scores: &[f64], targets: &[f64]) -> f64 {
    let total: f64 = scores
        .iter()
        .zip(targets)
        .map(|(s, y)| {
            let p = sigmoid(*s).clamp(1e-12, 1.0 - 1e-12);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / scores.len().max(1) as f64
}

/// A column reduced to bin indices. Bin `b < thresholds.len()` holds values
/// `<= thresholds[b]` (and above the previous threshold); the last bin holds
/// everything above the final threshold.
struct BinnedColumn {
    thresholds: Vec<f64>,
    bins: Vec<u16>,
}

impl BinnedColumn {
    fn new(values: impl Iterator<Item = f64>, max_bins: usize) -> Self {
        let values: Vec<f64> = values.collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let max_bins = max_bins.clamp(2, u16::MAX as usize);
        let n = sorted.len();
        let mut thresholds: Vec<f64> = (1..max_bins)
            .map(|k| sorted[(k * n / max_bins).min(n - 1)])
            .collect();
        thresholds.dedup();
        // a split at the maximum would leave the right side empty
        if let Some(max) = sorted.last() {
            thresholds.retain(|t| t < max);
        }

        let bins = values
            .iter()
            .map(|v| thresholds.partition_point(|t| t < v) as u16)
            .collect();

        Self { thresholds, bins }
    }
}

struct Split {
    column: usize,
    bin: usize,
    gain: f64,
    left: f64,
    right: f64,
}

fn best_split(
    columns: &[BinnedColumn],
    gradients: &[f64],
    hessians: &[f64],
    params: &BoostingParams,
) -> Option<Split> {
    let lambda = params.l2_regularization;
    let g_total: f64 = gradients.iter().sum();
    let h_total: f64 = hessians.iter().sum();
    let parent = g_total * g_total / (h_total + lambda);

    let mut best: Option<Split> = None;

    for (c, column) in columns.iter().enumerate() {
        if column.thresholds.is_empty() {
            continue;
        }

        let mut g_hist = vec![0.0; column.thresholds.len() + 1];
        let mut h_hist = vec![0.0; column.thresholds.len() + 1];
        for (i, bin) in column.bins.iter().enumerate() {
            g_hist[*bin as usize] += gradients[i];
            h_hist[*bin as usize] += hessians[i];
        }

        let (mut g_left, mut h_left) = (0.0, 0.0);
        for b in 0..column.thresholds.len() {
            g_left += g_hist[b];
            h_left += h_hist[b];
            let g_right = g_total - g_left;
            let h_right = h_total - h_left;
            if h_left < params.min_child_weight || h_right < params.min_child_weight {
                continue;
            }

            let gain = g_left * g_left / (h_left + lambda) + g_right * g_right / (h_right + lambda)
                - parent;
            if gain > 1e-12 && best.as_ref().map_or(true, |s| gain > s.gain) {
                best = Some(Split {
                    column: c,
                    bin: b,
                    gain,
                    left: -g_left / (h_left + lambda),
                    right: -g_right / (h_right + lambda),
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Label is 1 inside [40, 60] on column 1, column 0 is noise.
    fn band_data() -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..400 {
            let x = i as f64 / 4.0;
            rows.push(vec![(i % 7) as f64, x]);
            labels.push(u8::from((40.0..=60.0).contains(&x)));
        }
        (rows, labels)
    }

    #[test]
    fn learns_a_band() {
        let (rows, labels) = band_data();
        let model = BoostedStumps::fit(&rows, &labels, &BoostingParams::default()).unwrap();

        assert!(model.probability(&[3.0, 50.0]) > 0.8);
        assert!(model.probability(&[3.0, 10.0]) < 0.2);
        assert!(model.probability(&[3.0, 90.0]) < 0.2);
        assert!(model.stumps.iter().all(|s| s.column <= 1));
    }

    #[test]
    fn base_score_is_prior_log_odds() {
        let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![1, 0, 0, 0];
        let params = BoostingParams {
            rounds: 0,
            ..BoostingParams::default()
        };
        let model = BoostedStumps::fit(&rows, &labels, &params).unwrap();
        assert_relative_eq!(model.probability(&[0.0]), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn single_class_is_rejected() {
        let rows = vec![vec![0.0], vec![1.0]];
        let err = BoostedStumps::fit(&rows, &[1, 1], &BoostingParams::default()).unwrap_err();
        assert!(matches!(err, CropCareError::Training(_)));
        let err = BoostedStumps::fit(&[], &[], &BoostingParams::default()).unwrap_err();
        assert!(matches!(err, CropCareError::EmptyDataset));
    }

    #[test]
    fn binning_excludes_maximum_and_dedups() {
        let column = BinnedColumn::new([0.0, 0.0, 0.0, 1.0].into_iter(), 8);
        assert_eq!(column.thresholds, [0.0]);
        assert_eq!(column.bins, [0, 0, 0, 1]);

        let constant = BinnedColumn::new([5.0; 10].into_iter(), 8);
        assert!(constant.thresholds.is_empty());
    }

    #[test]
    fn sigmoid_is_centered() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
    }
}
