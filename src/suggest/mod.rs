//! Line suggestion orchestration.
//!
//! Merges the windowed statistics, trend classification, matchup history,
//! and injury signal into one suggestion record. Data flows one direction:
//! observations → windowed aggregates → trend/matchup classifications →
//! merged suggestion. Adjustments blend in weight-space (never by stacking
//! multipliers on multipliers), so the final number stays within a bounded,
//! explainable range.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::injury::{InjuryAdjuster, InjuryDesignation, InjuryFeed, InjuryStatus};
use crate::analysis::matchup::{MatchupAnalyzer, MatchupStats};
use crate::analysis::trend::{TrendConfidence, TrendDirection, TrendResult};
use crate::analysis::window::WindowStats;
use crate::config::AnalysisConfig;
use crate::domain::{GameLog, OpponentId, PlayerId};
use crate::error::{ProplineError, Result};
use crate::store::GameLogStore;

pub const DEFAULT_CONFIDENCE_INTERVAL: f64 = 0.80;
pub const DEFAULT_GAMES_BACK: usize = 10;

/// Two-tailed z-scores by confidence level; lookups resolve to the nearest
/// entry so the orchestrator stays total over the documented input range
const Z_TABLE: &[(f64, f64)] = &[
    (0.80, 1.282),
    (0.85, 1.440),
    (0.90, 1.645),
    (0.95, 1.960),
    (0.99, 2.576),
];

/// Multiple of the best observed game that caps a suggested line
const SANITY_BOUND_RATIO: f64 = 1.5;

fn z_score(confidence: f64) -> f64 {
    let mut best = Z_TABLE[0];
    for entry in Z_TABLE {
        if (entry.0 - confidence).abs() < (best.0 - confidence).abs() {
            best = *entry;
        }
    }
    best.1
}

/// Parameters of one suggestion request
#[derive(Debug, Clone)]
pub struct LineRequest {
    pub player: PlayerId,
    pub metric: String,
    pub opponent: Option<OpponentId>,
    pub confidence_interval: f64,
    pub games_back: usize,
}

impl LineRequest {
    pub fn new(player: &str, metric: &str) -> Self {
        Self {
            player: PlayerId::new(player),
            metric: metric.to_string(),
            opponent: None,
            confidence_interval: DEFAULT_CONFIDENCE_INTERVAL,
            games_back: DEFAULT_GAMES_BACK,
        }
    }

    pub fn with_opponent(mut self, opponent: &str) -> Self {
        self.opponent = Some(OpponentId::new(opponent));
        self
    }

    pub fn with_confidence_interval(mut self, confidence_interval: f64) -> Self {
        self.confidence_interval = confidence_interval;
        self
    }

    pub fn with_games_back(mut self, games_back: usize) -> Self {
        self.games_back = games_back;
        self
    }
}

/// Short-window performance relative to the long-window baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormLabel {
    Hot,
    Cold,
    Neutral,
}

impl FormLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormLabel::Hot => "HOT",
            FormLabel::Cold => "COLD",
            FormLabel::Neutral => "NEUTRAL",
        }
    }
}

impl std::fmt::Display for FormLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSource {
    LongWindowMean,
    ShortWindowMean,
    MatchupAverage,
    InjuryMultiplier,
}

/// One weighted input that contributed to the suggested line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factor {
    pub source: FactorSource,
    pub weight: f64,
    pub value: f64,
}

/// A recoverable error that narrowed the data behind a result.
///
/// Every caught fallback is recorded here; nothing degrades silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    NoMatchupHistory { opponent: OpponentId },
    InjuryStatusUnknown,
}

/// Injury input as applied to the final number
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InjuryAdjustment {
    pub designation: InjuryDesignation,
    pub multiplier: f64,
}

/// Final suggestion output. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSuggestion {
    pub player_id: PlayerId,
    pub metric: String,
    pub suggested_line: f64,
    pub interval_low: f64,
    pub interval_high: f64,
    /// Confidence level the interval was computed for
    pub confidence: f64,
    pub recent_form: FormLabel,
    pub trend: TrendResult,
    /// Games in the long window that actually existed
    pub games_analyzed: usize,
    pub vs_opponent: Option<MatchupStats>,
    pub injury: InjuryAdjustment,
    pub factors: Vec<Factor>,
    pub degradations: Vec<Degradation>,
}

/// Directional read against a posted line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pick {
    Over,
    Under,
    Avoid,
}

impl Pick {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pick::Over => "OVER",
            Pick::Under => "UNDER",
            Pick::Avoid => "AVOID",
        }
    }
}

impl std::fmt::Display for Pick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Over/under recommendation for one posted line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRecommendation {
    pub player_id: PlayerId,
    pub metric: String,
    pub line: f64,
    pub short_mean: f64,
    pub long_mean: f64,
    pub trend: TrendResult,
    pub pick: Pick,
    pub confidence: TrendConfidence,
    pub vs_opponent: Option<MatchupStats>,
    pub degradations: Vec<Degradation>,
}

/// Orchestrator merging every analysis component into one suggestion.
///
/// Stateless across requests: each call recomputes from the current store
/// contents, so concurrent callers never share derived state.
pub struct LineSuggester {
    store: Arc<GameLogStore>,
    injuries: Arc<dyn InjuryFeed>,
    config: AnalysisConfig,
    adjuster: InjuryAdjuster,
}

impl LineSuggester {
    pub fn new(store: Arc<GameLogStore>, injuries: Arc<dyn InjuryFeed>) -> Self {
        let config = AnalysisConfig::default();
        let adjuster = InjuryAdjuster::from_config(&config);
        Self {
            store,
            injuries,
            config,
            adjuster,
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.adjuster = InjuryAdjuster::from_config(&config);
        self.config = config;
        self
    }

    /// Suggest a line for a player's metric.
    ///
    /// Fatal errors (`InsufficientData`, `PlayerUnavailable`) propagate to
    /// the caller; recoverable ones degrade the output and are recorded in
    /// `degradations`.
    pub fn suggest_line(&self, request: &LineRequest) -> Result<LineSuggestion> {
        let log = self.store.query(request.player.as_str(), &request.metric);
        let (short, long) = self.windows(&log, request.games_back)?;
        let trend = TrendResult::classify(&short, &long);

        let mut degradations = Vec::new();
        let vs_opponent =
            self.matchup_or_fallback(&log, request.opponent.as_ref(), &mut degradations)?;

        let status = match self.injuries.status(&request.player) {
            Ok(status) => status,
            Err(ProplineError::UnknownPlayer { .. }) => {
                debug!(player = %request.player, "not tracked by injury feed, assuming ACTIVE");
                degradations.push(Degradation::InjuryStatusUnknown);
                InjuryStatus::active()
            }
            Err(err) => return Err(err),
        };
        let multiplier = self.adjuster.multiplier(&request.player, &status)?;

        // base blend, recent form weighted higher
        let mut line = self.config.long_weight * long.mean + self.config.short_weight * short.mean;
        let mut factors = vec![
            Factor {
                source: FactorSource::LongWindowMean,
                weight: self.config.long_weight,
                value: long.mean,
            },
            Factor {
                source: FactorSource::ShortWindowMean,
                weight: self.config.short_weight,
                value: short.mean,
            },
        ];

        if let Some(matchup) = &vs_opponent {
            line = (1.0 - self.config.matchup_weight) * line
                + self.config.matchup_weight * matchup.average;
            factors.push(Factor {
                source: FactorSource::MatchupAverage,
                weight: self.config.matchup_weight,
                value: matchup.average,
            });
        }

        line *= multiplier;
        factors.push(Factor {
            source: FactorSource::InjuryMultiplier,
            weight: 1.0,
            value: multiplier,
        });

        let cap = log.max_value().unwrap_or(0.0) * SANITY_BOUND_RATIO;
        let suggested_line = line.clamp(0.0, cap);
        if suggested_line != line {
            warn!(
                player = %request.player,
                metric = %request.metric,
                line,
                suggested_line,
                "suggested line clamped to sanity bound"
            );
        }

        let half_width = z_score(request.confidence_interval) * long.std_dev;
        let recent_form = self.form_label(&short, &long);

        debug!(
            player = %request.player,
            metric = %request.metric,
            suggested_line,
            form = %recent_form,
            direction = %trend.direction,
            "line suggested"
        );

        Ok(LineSuggestion {
            player_id: request.player.clone(),
            metric: request.metric.clone(),
            suggested_line,
            interval_low: (suggested_line - half_width).max(0.0),
            interval_high: suggested_line + half_width,
            confidence: request.confidence_interval,
            recent_form,
            trend,
            games_analyzed: long.count,
            vs_opponent,
            injury: InjuryAdjustment {
                designation: status.designation,
                multiplier,
            },
            factors,
            degradations,
        })
    }

    /// Recommend over/under/avoid against a posted line.
    ///
    /// The short-window mean is compared to the line; a pick fires only when
    /// the relative gap clears the edge threshold, and its confidence is
    /// promoted or demoted by agreement with the global and matchup trends.
    pub fn recommend(&self, request: &LineRequest, line: f64) -> Result<LineRecommendation> {
        if line <= 0.0 {
            return Err(ProplineError::InvalidObservation(format!(
                "posted line must be positive: {line}"
            )));
        }

        let log = self.store.query(request.player.as_str(), &request.metric);
        let (short, long) = self.windows(&log, request.games_back)?;
        let trend = TrendResult::classify(&short, &long);

        let mut degradations = Vec::new();
        match self.injuries.status(&request.player) {
            Ok(status) if status.designation == InjuryDesignation::Out => {
                return Err(ProplineError::PlayerUnavailable {
                    player: request.player.to_string(),
                });
            }
            Ok(_) => {}
            Err(ProplineError::UnknownPlayer { .. }) => {
                degradations.push(Degradation::InjuryStatusUnknown);
            }
            Err(err) => return Err(err),
        }

        let vs_opponent =
            self.matchup_or_fallback(&log, request.opponent.as_ref(), &mut degradations)?;

        let edge = (short.mean - line) / line;
        let (pick, confidence) = if edge.abs() > self.config.edge_threshold {
            let pick = if edge > 0.0 { Pick::Over } else { Pick::Under };
            let aligned = matches!(
                (pick, trend.direction),
                (Pick::Over, TrendDirection::Up) | (Pick::Under, TrendDirection::Down)
            );
            let mut confidence = if aligned {
                TrendConfidence::High
            } else {
                TrendConfidence::Medium
            };
            if let Some(matchup) = &vs_opponent {
                confidence =
                    Self::matchup_adjusted_confidence(pick, matchup.trend.direction, confidence);
            }
            (pick, confidence)
        } else {
            (Pick::Avoid, TrendConfidence::Low)
        };

        debug!(
            player = %request.player,
            metric = %request.metric,
            line,
            pick = %pick,
            confidence = %confidence,
            "line recommendation"
        );

        Ok(LineRecommendation {
            player_id: request.player.clone(),
            metric: request.metric.clone(),
            line,
            short_mean: short.mean,
            long_mean: long.mean,
            trend,
            pick,
            confidence,
            vs_opponent,
            degradations,
        })
    }

    fn windows(&self, log: &GameLog, games_back: usize) -> Result<(WindowStats, WindowStats)> {
        let short =
            WindowStats::over_with_sigma(log, self.config.short_window, self.config.outlier_sigma)?;
        let long = WindowStats::over_with_sigma(log, games_back, self.config.outlier_sigma)?;
        Ok((short, long))
    }

    fn matchup_or_fallback(
        &self,
        log: &GameLog,
        opponent: Option<&OpponentId>,
        degradations: &mut Vec<Degradation>,
    ) -> Result<Option<MatchupStats>> {
        let Some(opponent) = opponent else {
            return Ok(None);
        };
        match MatchupAnalyzer::analyze(log, opponent) {
            Ok(stats) => Ok(Some(stats)),
            Err(ProplineError::NoMatchupHistory { .. }) => {
                debug!(
                    player = %log.player_id(),
                    opponent = %opponent,
                    "no matchup history, falling back to global stats"
                );
                degradations.push(Degradation::NoMatchupHistory {
                    opponent: opponent.clone(),
                });
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn form_label(&self, short: &WindowStats, long: &WindowStats) -> FormLabel {
        if short.mean > long.mean * self.config.hot_ratio {
            FormLabel::Hot
        } else if short.mean < long.mean * self.config.cold_ratio {
            FormLabel::Cold
        } else {
            FormLabel::Neutral
        }
    }

    fn matchup_adjusted_confidence(
        pick: Pick,
        matchup_direction: TrendDirection,
        base: TrendConfidence,
    ) -> TrendConfidence {
        let supportive = matches!(
            (pick, matchup_direction),
            (Pick::Over, TrendDirection::Up) | (Pick::Under, TrendDirection::Down)
        );
        let contrary = matches!(
            (pick, matchup_direction),
            (Pick::Over, TrendDirection::Down) | (Pick::Under, TrendDirection::Up)
        );
        match base {
            TrendConfidence::Medium if supportive => TrendConfidence::High,
            TrendConfidence::High if contrary => TrendConfidence::Medium,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::injury::{MockInjuryFeed, StaticInjuryFeed};
    use crate::domain::MetricSchema;

    fn seeded_store(values: &[f64]) -> Arc<GameLogStore> {
        let store = GameLogStore::new(MetricSchema::nba());
        for (i, value) in values.iter().enumerate() {
            let date = format!("2024-01-{:02}", i + 1);
            store
                .append_raw("lebron", "points", &date, *value, Some("BOS"))
                .unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn z_scores_are_table_driven() {
        assert!((z_score(0.80) - 1.282).abs() < 1e-12);
        assert!((z_score(0.85) - 1.440).abs() < 1e-12);
        assert!((z_score(0.95) - 1.960).abs() < 1e-12);
        // unlisted level resolves to the nearest entry
        assert!((z_score(0.82) - 1.282).abs() < 1e-12);
        assert!((z_score(0.97) - 1.960).abs() < 1e-12);
    }

    #[test]
    fn request_builders_override_defaults() {
        let request = LineRequest::new("lebron", "points")
            .with_opponent("BOS")
            .with_confidence_interval(0.85)
            .with_games_back(15);
        assert_eq!(request.opponent, Some(OpponentId::new("BOS")));
        assert!((request.confidence_interval - 0.85).abs() < 1e-12);
        assert_eq!(request.games_back, 15);
    }

    #[test]
    fn empty_log_rejects_the_request() {
        let store = Arc::new(GameLogStore::new(MetricSchema::nba()));
        let suggester = LineSuggester::new(store, Arc::new(StaticInjuryFeed::new()));

        let err = suggester
            .suggest_line(&LineRequest::new("lebron", "points"))
            .unwrap_err();
        assert!(matches!(err, ProplineError::InsufficientData { .. }));
    }

    #[test]
    fn mocked_feed_status_flows_into_the_multiplier() {
        let store = seeded_store(&[20.0, 22.0, 25.0, 24.0, 26.0, 28.0, 30.0, 29.0, 31.0, 33.0]);

        let mut feed = MockInjuryFeed::new();
        feed.expect_status()
            .returning(|_| Ok(InjuryStatus::questionable()));
        let suggester = LineSuggester::new(store, Arc::new(feed));

        let suggestion = suggester
            .suggest_line(&LineRequest::new("lebron", "points"))
            .unwrap();
        assert!((suggestion.injury.multiplier - 0.95).abs() < 1e-12);
        assert!((suggestion.suggested_line - 28.84 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn matchup_confidence_adjustment_rules() {
        use TrendConfidence::*;
        use TrendDirection::*;

        // supportive matchup promotes a medium pick
        assert_eq!(
            LineSuggester::matchup_adjusted_confidence(Pick::Over, Up, Medium),
            High
        );
        // contrary matchup demotes a high pick
        assert_eq!(
            LineSuggester::matchup_adjusted_confidence(Pick::Over, Down, High),
            Medium
        );
        // mirrored for unders
        assert_eq!(
            LineSuggester::matchup_adjusted_confidence(Pick::Under, Down, Medium),
            High
        );
        assert_eq!(
            LineSuggester::matchup_adjusted_confidence(Pick::Under, Up, High),
            Medium
        );
        // stable matchup trends change nothing
        assert_eq!(
            LineSuggester::matchup_adjusted_confidence(Pick::Over, Stable, Medium),
            Medium
        );
    }

    #[test]
    fn non_positive_posted_line_is_rejected() {
        let store = seeded_store(&[20.0, 25.0, 30.0]);
        let suggester = LineSuggester::new(store, Arc::new(StaticInjuryFeed::new()));

        let err = suggester
            .recommend(&LineRequest::new("lebron", "points"), 0.0)
            .unwrap_err();
        assert!(matches!(err, ProplineError::InvalidObservation(_)));
    }
}
