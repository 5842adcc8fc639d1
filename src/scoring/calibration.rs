use serde::{Deserialize, Serialize};

/// Monotone map from raw classifier probability to calibrated probability,
/// fitted by pool-adjacent-violators.
///
/// Knots are stored as parallel `x`/`y` vectors, `x` non-decreasing and `y`
/// non-decreasing. Prediction interpolates linearly between knots and holds
/// the end values outside them. An empty calibrator is the identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IsotonicCalibrator {
    x: Vec<f64>,
    y: Vec<f64>,
}

struct Block {
    x_lo: f64,
    x_hi: f64,
    sum: f64,
    weight: f64,
}

impl Block {
    fn mean(&self) -> f64 {
        self.sum / self.weight
    }
}

impl IsotonicCalibrator {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Fit on `(raw score, label)` pairs. Labels are 0.0 or 1.0.
    pub fn fit(points: &[(f64, f64)]) -> Self {
        let mut sorted: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if sorted.is_empty() {
            return Self::identity();
        }
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut blocks: Vec<Block> = Vec::new();
        for (x, y) in sorted {
            // equal scores share one block so the fit stays a function of x
            if let Some(last) = blocks.last_mut() {
                if last.x_hi == x {
                    last.sum += y;
                    last.weight += 1.0;
                    Self::pool(&mut blocks);
                    continue;
                }
            }
            blocks.push(Block {
                x_lo: x,
                x_hi: x,
                sum: y,
                weight: 1.0,
            });
            Self::pool(&mut blocks);
        }

        let mut x = Vec::with_capacity(blocks.len() * 2);
        let mut y = Vec::with_capacity(blocks.len() * 2);
        for block in &blocks {
            let value = block.mean().clamp(0.0, 1.0);
            x.push(block.x_lo);
            y.push(value);
            if block.x_hi > block.x_lo {
                x.push(block.x_hi);
                y.push(value);
            }
        }

        tracing::debug!("Isotonic calibration: {} knots", x.len());
        Self { x, y }
    }

    fn pool(blocks: &mut Vec<Block>) {
        while blocks.len() > 1 {
            let n = blocks.len();
            if blocks[n - 2].mean() <= blocks[n - 1].mean() {
                break;
            }
            if let Some(last) = blocks.pop() {
                let prev = &mut blocks[n - 2];
                prev.x_hi = last.x_hi;
                prev.sum += last.sum;
                prev.weight += last.weight;
            }
        }
    }

    pub fn is_identity(&self) -> bool {
        self.x.is_empty()
    }

    pub fn predict(&self, raw: f64) -> f64 {
        let (Some(first), Some(last)) = (self.x.first(), self.x.last()) else {
            return raw.clamp(0.0, 1.0);
        };
        if raw <= *first {
            return self.y[0];
        }
        if raw >= *last {
            return self.y[self.y.len() - 1];
        }

        let i = self.x.partition_point(|x| *x <= raw);
        let (x0, x1) = (self.x[i - 1], self.x[i]);
        let (y0, y1) = (self.y[i - 1], self.y[i]);
        if x1 <= x0 {
            return y1;
        }
        let t = (raw - x0) / (x1 - x0);
        (y0 + t * (y1 - y0)).clamp(0.0, 1.0)
    }

    /// Knot vectors must be aligned, ordered and inside `[0, 1]` on `y`.
    pub fn is_consistent(&self) -> bool {
        self.x.len() == self.y.len()
            && self.x.iter().all(|v| v.is_finite())
            && self.y.iter().all(|v| (0.0..=1.0).contains(v))
            && self.x.windows(2).all(|w| w[0] <= w[1])
            && self.y.windows(2).all(|w| w[0] <= w[1])
    }
}
