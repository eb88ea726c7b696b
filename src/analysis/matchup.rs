//! Opponent-specific history analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trend::{TrendConfidence, TrendDirection, TrendResult};
use super::window::{WindowStats, DEFAULT_OUTLIER_SIGMA};
use crate::domain::{GameLog, Observation, OpponentId};
use crate::error::{ProplineError, Result};

/// Aggregates over the subsequence of a log played against one opponent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupStats {
    pub opponent_id: OpponentId,
    pub average: f64,
    pub games_played: usize,
    pub trend: TrendResult,
    pub last_performance: f64,
    pub last_matchup_date: NaiveDate,
    pub min: f64,
    pub max: f64,
    /// Up to the five most recent matchup games, newest first
    pub recent: Vec<Observation>,
}

pub struct MatchupAnalyzer;

impl MatchupAnalyzer {
    /// Analyze a player's history against one opponent.
    ///
    /// Zero matching games is `NoMatchupHistory`, a "never played them"
    /// case distinct from an empty log. Callers fall back to unconditional
    /// statistics instead of failing the whole request.
    ///
    /// The effective window is the entire matchup subsequence; opponent
    /// history is typically far smaller than the global log.
    pub fn analyze(log: &GameLog, opponent: &OpponentId) -> Result<MatchupStats> {
        let filtered = log.versus(opponent);
        let Some(last) = filtered.last().cloned() else {
            return Err(ProplineError::NoMatchupHistory {
                player: log.player_id().to_string(),
                opponent: opponent.to_string(),
            });
        };

        let games_played = filtered.len();
        let stats = WindowStats::over(&filtered, games_played)?;
        let trend = Self::matchup_trend(&filtered)?;

        let recent: Vec<Observation> = filtered
            .observations()
            .iter()
            .rev()
            .take(5)
            .cloned()
            .collect();

        Ok(MatchupStats {
            opponent_id: opponent.clone(),
            average: stats.mean,
            games_played,
            trend,
            last_performance: last.value,
            last_matchup_date: last.date,
            min: stats.min,
            max: stats.max,
            recent,
        })
    }

    /// Direction rule from [`TrendResult::classify`], applied to matchup
    /// windows: 5/10 games back when ten or more matchups exist, otherwise
    /// newer half vs older half. A single matchup cannot split.
    fn matchup_trend(filtered: &GameLog) -> Result<TrendResult> {
        let n = filtered.len();
        if n >= 10 {
            let short = WindowStats::over(filtered, 5)?;
            let long = WindowStats::over(filtered, 10)?;
            return Ok(TrendResult::classify(&short, &long));
        }
        if n >= 2 {
            let values = filtered.values();
            let mid = n / 2;
            let older = WindowStats::from_values(&values[..mid], mid, DEFAULT_OUTLIER_SIGMA);
            let newer =
                WindowStats::from_values(&values[mid..], n - mid, DEFAULT_OUTLIER_SIGMA);
            return Ok(TrendResult::classify(&newer, &older));
        }
        Ok(TrendResult {
            direction: TrendDirection::Stable,
            confidence: TrendConfidence::Low,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerId;

    fn log_with_matchups(entries: &[(&str, f64, Option<&str>)]) -> GameLog {
        let mut log = GameLog::empty(PlayerId::new("p1"), "points");
        for (date, value, opp) in entries {
            log.insert_ordered(Observation {
                player_id: PlayerId::new("p1"),
                metric: "points".to_string(),
                date: date.parse().unwrap(),
                value: *value,
                opponent_id: opp.map(OpponentId::new),
            });
        }
        log
    }

    #[test]
    fn zero_matches_is_no_matchup_history() {
        let log = log_with_matchups(&[("2024-01-01", 20.0, Some("LAL"))]);
        let err = MatchupAnalyzer::analyze(&log, &OpponentId::new("BOS")).unwrap_err();
        assert!(matches!(err, ProplineError::NoMatchupHistory { .. }));
    }

    #[test]
    fn all_games_vs_opponent_matches_global_mean() {
        let log = log_with_matchups(&[
            ("2024-01-01", 20.0, Some("BOS")),
            ("2024-01-03", 24.0, Some("BOS")),
            ("2024-01-05", 28.0, Some("BOS")),
        ]);
        let stats = MatchupAnalyzer::analyze(&log, &OpponentId::new("BOS")).unwrap();
        let global = WindowStats::over(&log, log.len()).unwrap();

        assert!((stats.average - global.mean).abs() < 1e-12);
        assert_eq!(stats.games_played, 3);
    }

    #[test]
    fn last_matchup_fields_track_latest_game() {
        let log = log_with_matchups(&[
            ("2024-01-01", 20.0, Some("BOS")),
            ("2024-02-10", 31.0, Some("BOS")),
            ("2024-02-01", 24.0, Some("LAL")),
        ]);
        let stats = MatchupAnalyzer::analyze(&log, &OpponentId::new("BOS")).unwrap();

        assert_eq!(stats.last_matchup_date, "2024-02-10".parse().unwrap());
        assert!((stats.last_performance - 31.0).abs() < 1e-12);
        // newest first
        assert!((stats.recent[0].value - 31.0).abs() < 1e-12);
        assert!((stats.recent[1].value - 20.0).abs() < 1e-12);
    }

    #[test]
    fn half_split_trend_detects_improvement() {
        let log = log_with_matchups(&[
            ("2024-01-01", 10.0, Some("BOS")),
            ("2024-01-08", 10.0, Some("BOS")),
            ("2024-01-15", 20.0, Some("BOS")),
            ("2024-01-22", 20.0, Some("BOS")),
        ]);
        let stats = MatchupAnalyzer::analyze(&log, &OpponentId::new("BOS")).unwrap();
        assert_eq!(stats.trend.direction, TrendDirection::Up);
    }

    #[test]
    fn single_matchup_game_is_stable_low() {
        let log = log_with_matchups(&[("2024-01-01", 20.0, Some("BOS"))]);
        let stats = MatchupAnalyzer::analyze(&log, &OpponentId::new("BOS")).unwrap();
        assert_eq!(stats.trend.direction, TrendDirection::Stable);
        assert_eq!(stats.trend.confidence, TrendConfidence::Low);
    }

    #[test]
    fn ten_or_more_matchups_use_standard_windows() {
        let mut entries = Vec::new();
        // ten matchups: five steady games, then five clearly higher
        let values = [20.0, 20.0, 20.0, 20.0, 20.0, 30.0, 30.0, 30.0, 30.0, 30.0];
        for (i, value) in values.iter().enumerate() {
            let date = format!("2024-01-{:02}", i + 1);
            entries.push((date, *value));
        }
        let mut log = GameLog::empty(PlayerId::new("p1"), "points");
        for (date, value) in &entries {
            log.insert_ordered(Observation {
                player_id: PlayerId::new("p1"),
                metric: "points".to_string(),
                date: date.parse().unwrap(),
                value: *value,
                opponent_id: Some(OpponentId::new("BOS")),
            });
        }

        let stats = MatchupAnalyzer::analyze(&log, &OpponentId::new("BOS")).unwrap();
        // short mean 30 vs long mean 25: up, with full samples on both windows
        assert_eq!(stats.trend.direction, TrendDirection::Up);
        assert_eq!(stats.trend.confidence, TrendConfidence::High);
    }
}
