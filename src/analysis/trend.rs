//! Trend classification from two windows of differing length.

use serde::{Deserialize, Serialize};

use super::window::WindowStats;

/// Relative short-vs-long mean gap before a trend registers.
///
/// Fixed by design rather than configurable: every caller reads UP/DOWN with
/// the same meaning.
pub const TREND_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "UP",
            TrendDirection::Down => "DOWN",
            TrendDirection::Stable => "STABLE",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sample-sufficiency tier.
///
/// This reflects how many games back the windows, NOT statistical
/// significance in the formal sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendConfidence {
    Low,
    Medium,
    High,
}

impl TrendConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendConfidence::Low => "LOW",
            TrendConfidence::Medium => "MEDIUM",
            TrendConfidence::High => "HIGH",
        }
    }
}

impl std::fmt::Display for TrendConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction plus confidence, derived from a short and a long window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub confidence: TrendConfidence,
}

impl TrendResult {
    /// Classify a short window against a long window of the same log.
    ///
    /// UP when the short mean exceeds the long mean by more than 5% of the
    /// long mean, DOWN when below by the same margin, STABLE otherwise. A
    /// zero long mean is STABLE regardless of the short mean.
    pub fn classify(short: &WindowStats, long: &WindowStats) -> Self {
        let direction = if long.mean == 0.0 {
            TrendDirection::Stable
        } else if short.mean > long.mean * (1.0 + TREND_THRESHOLD) {
            TrendDirection::Up
        } else if short.mean < long.mean * (1.0 - TREND_THRESHOLD) {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };

        let confidence = if short.count >= 5 && long.count >= 10 {
            TrendConfidence::High
        } else if short.count >= 3 {
            TrendConfidence::Medium
        } else {
            TrendConfidence::Low
        };

        Self {
            direction,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64, count: usize) -> WindowStats {
        WindowStats {
            mean,
            std_dev: 0.0,
            count,
            window_size: count,
            min: mean,
            max: mean,
            outliers: Vec::new(),
        }
    }

    #[test]
    fn up_when_short_exceeds_threshold() {
        let result = TrendResult::classify(&stats(10.6, 5), &stats(10.0, 10));
        assert_eq!(result.direction, TrendDirection::Up);
    }

    #[test]
    fn down_when_short_below_threshold() {
        let result = TrendResult::classify(&stats(9.4, 5), &stats(10.0, 10));
        assert_eq!(result.direction, TrendDirection::Down);
    }

    #[test]
    fn stable_inside_threshold_band() {
        // exactly 5% above is still stable; the gap must exceed the threshold
        let result = TrendResult::classify(&stats(10.5, 5), &stats(10.0, 10));
        assert_eq!(result.direction, TrendDirection::Stable);
        let result = TrendResult::classify(&stats(9.5, 5), &stats(10.0, 10));
        assert_eq!(result.direction, TrendDirection::Stable);
    }

    #[test]
    fn zero_long_mean_guards_division() {
        let result = TrendResult::classify(&stats(3.0, 5), &stats(0.0, 10));
        assert_eq!(result.direction, TrendDirection::Stable);
    }

    #[test]
    fn confidence_tiers_follow_sample_counts() {
        let high = TrendResult::classify(&stats(10.0, 5), &stats(10.0, 10));
        assert_eq!(high.confidence, TrendConfidence::High);

        let medium = TrendResult::classify(&stats(10.0, 4), &stats(10.0, 8));
        assert_eq!(medium.confidence, TrendConfidence::Medium);

        let low = TrendResult::classify(&stats(10.0, 2), &stats(10.0, 2));
        assert_eq!(low.confidence, TrendConfidence::Low);
    }

    #[test]
    fn classification_is_deterministic() {
        let short = stats(11.0, 5);
        let long = stats(10.0, 10);
        assert_eq!(
            TrendResult::classify(&short, &long),
            TrendResult::classify(&short, &long)
        );
    }
}
