//! Moving-window statistics over a game log.

use serde::{Deserialize, Serialize};

use crate::domain::GameLog;
use crate::error::{ProplineError, Result};

/// Default standard-deviation multiple for outlier flagging
pub const DEFAULT_OUTLIER_SIGMA: f64 = 2.0;

/// Aggregates over the most recent `min(window_size, len)` observations.
///
/// Recomputed on every query and never persisted. Outlier flagging is
/// advisory: flagged values stay in the mean and standard deviation, so a
/// real blowout or bust game is never silently discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowStats {
    pub mean: f64,
    /// Sample standard deviation (N−1 denominator); 0 when N <= 1
    pub std_dev: f64,
    /// Observations actually included
    pub count: usize,
    /// Window requested by the caller
    pub window_size: usize,
    pub min: f64,
    pub max: f64,
    /// Values further than `outlier_sigma` standard deviations from the mean
    pub outliers: Vec<f64>,
}

impl WindowStats {
    /// Stats over the trailing `window` games with the default outlier sigma
    pub fn over(log: &GameLog, window: usize) -> Result<Self> {
        Self::over_with_sigma(log, window, DEFAULT_OUTLIER_SIGMA)
    }

    /// Stats over the trailing `window` games.
    ///
    /// Fails with `InsufficientData` on an empty log; downstream trend and
    /// line logic must never silently operate on zero games.
    pub fn over_with_sigma(log: &GameLog, window: usize, outlier_sigma: f64) -> Result<Self> {
        if log.is_empty() {
            return Err(ProplineError::InsufficientData {
                player: log.player_id().to_string(),
                metric: log.metric().to_string(),
            });
        }

        let values = log.values();
        let take = window.min(values.len());
        Ok(Self::from_values(
            &values[values.len() - take..],
            window,
            outlier_sigma,
        ))
    }

    /// Aggregate a pre-selected, non-empty slice of values
    pub(crate) fn from_values(values: &[f64], window_size: usize, outlier_sigma: f64) -> Self {
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        let std_dev = if count > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (count as f64 - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let outliers = if std_dev > 0.0 {
            values
                .iter()
                .copied()
                .filter(|v| (v - mean).abs() > outlier_sigma * std_dev)
                .collect()
        } else {
            Vec::new()
        };

        Self {
            mean,
            std_dev,
            count,
            window_size,
            min,
            max,
            outliers,
        }
    }
}
