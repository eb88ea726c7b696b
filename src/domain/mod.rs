//! Domain records for player game history.
//!
//! Observations are validated against an explicit [`MetricSchema`] when they
//! enter the store, so malformed input is rejected at ingestion rather than
//! surfacing mid-computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ProplineError, Result};

/// Identifier of a tracked player
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of an opposing team
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpponentId(String);

impl OpponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OpponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OpponentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Numeric shape of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Whole-number tallies: points, rebounds, strikeouts
    Counting,
    /// Non-negative reals: minutes played, yards per carry
    Continuous,
}

/// Explicit mapping from metric name to numeric kind.
///
/// Only registered metrics are accepted by the store. Values must be finite
/// and non-negative; `Counting` metrics must also be whole numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSchema {
    metrics: HashMap<String, MetricKind>,
}

impl MetricSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, kind: MetricKind) -> Self {
        self.metrics.insert(name.into(), kind);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<MetricKind> {
        self.metrics.get(name).copied()
    }

    /// Standard NBA prop metrics
    pub fn nba() -> Self {
        Self::new()
            .register("points", MetricKind::Counting)
            .register("rebounds", MetricKind::Counting)
            .register("assists", MetricKind::Counting)
            .register("threes", MetricKind::Counting)
            .register("minutes", MetricKind::Continuous)
    }

    /// Standard NFL prop metrics
    pub fn nfl() -> Self {
        Self::new()
            .register("passing_yards", MetricKind::Counting)
            .register("rushing_yards", MetricKind::Counting)
            .register("receptions", MetricKind::Counting)
    }

    /// Standard MLB prop metrics
    pub fn mlb() -> Self {
        Self::new()
            .register("strikeouts", MetricKind::Counting)
            .register("hits", MetricKind::Counting)
            .register("runs", MetricKind::Counting)
    }

    /// Validate a metric/value pair against the schema
    pub fn validate(&self, metric: &str, value: f64) -> Result<()> {
        let kind = self.kind_of(metric).ok_or_else(|| {
            ProplineError::InvalidObservation(format!("unknown metric: {metric}"))
        })?;

        if !value.is_finite() {
            return Err(ProplineError::InvalidObservation(format!(
                "{metric} value is not a finite number: {value}"
            )));
        }

        if value < 0.0 {
            return Err(ProplineError::InvalidObservation(format!(
                "{metric} value cannot be negative: {value}"
            )));
        }

        if kind == MetricKind::Counting && value.fract() != 0.0 {
            return Err(ProplineError::InvalidObservation(format!(
                "{metric} is a counting metric, got fractional value: {value}"
            )));
        }

        Ok(())
    }
}

/// One recorded game statistic. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub player_id: PlayerId,
    pub metric: String,
    pub date: NaiveDate,
    pub value: f64,
    pub opponent_id: Option<OpponentId>,
}

/// Ordered game history for one (player, metric) pair.
///
/// Invariant: non-decreasing by date; observations sharing a date keep their
/// insertion order. Duplicate dates are appended, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLog {
    player_id: PlayerId,
    metric: String,
    observations: Vec<Observation>,
}

impl GameLog {
    pub fn empty(player_id: PlayerId, metric: impl Into<String>) -> Self {
        Self {
            player_id,
            metric: metric.into(),
            observations: Vec::new(),
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Values in date order (oldest first)
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|obs| obs.value).collect()
    }

    /// Largest value ever observed in this log
    pub fn max_value(&self) -> Option<f64> {
        self.observations
            .iter()
            .map(|obs| obs.value)
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Subsequence of games played against one opponent, order preserved
    pub fn versus(&self, opponent: &OpponentId) -> GameLog {
        GameLog {
            player_id: self.player_id.clone(),
            metric: self.metric.clone(),
            observations: self
                .observations
                .iter()
                .filter(|obs| obs.opponent_id.as_ref() == Some(opponent))
                .cloned()
                .collect(),
        }
    }

    /// Insert maintaining date order; equal dates land after existing ones
    pub(crate) fn insert_ordered(&mut self, obs: Observation) {
        let idx = self
            .observations
            .partition_point(|existing| existing.date <= obs.date);
        self.observations.insert(idx, obs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, value: f64) -> Observation {
        Observation {
            player_id: PlayerId::new("p1"),
            metric: "points".to_string(),
            date: date.parse().unwrap(),
            value,
            opponent_id: None,
        }
    }

    #[test]
    fn schema_rejects_unknown_metric() {
        let schema = MetricSchema::nba();
        assert!(schema.validate("goals", 3.0).is_err());
        assert!(schema.validate("points", 3.0).is_ok());
    }

    #[test]
    fn sport_presets_register_their_metrics() {
        assert_eq!(
            MetricSchema::nfl().kind_of("passing_yards"),
            Some(MetricKind::Counting)
        );
        assert_eq!(
            MetricSchema::mlb().kind_of("strikeouts"),
            Some(MetricKind::Counting)
        );
        assert!(!MetricSchema::mlb().contains("passing_yards"));
    }

    #[test]
    fn schema_rejects_bad_values() {
        let schema = MetricSchema::nba();
        assert!(schema.validate("points", f64::NAN).is_err());
        assert!(schema.validate("points", f64::INFINITY).is_err());
        assert!(schema.validate("points", -1.0).is_err());
        assert!(schema.validate("points", 12.5).is_err());
        assert!(schema.validate("minutes", 31.4).is_ok());
    }

    #[test]
    fn insert_keeps_date_order() {
        let mut log = GameLog::empty(PlayerId::new("p1"), "points");
        log.insert_ordered(obs("2024-01-05", 20.0));
        log.insert_ordered(obs("2024-01-03", 18.0));
        log.insert_ordered(obs("2024-01-04", 25.0));

        let values = log.values();
        assert_eq!(values, vec![18.0, 25.0, 20.0]);
    }

    #[test]
    fn duplicate_dates_keep_insertion_order() {
        let mut log = GameLog::empty(PlayerId::new("p1"), "points");
        log.insert_ordered(obs("2024-01-03", 10.0));
        log.insert_ordered(obs("2024-01-03", 11.0));
        log.insert_ordered(obs("2024-01-03", 12.0));

        assert_eq!(log.values(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn versus_filters_by_opponent() {
        let mut log = GameLog::empty(PlayerId::new("p1"), "points");
        for (date, value, opp) in [
            ("2024-01-01", 20.0, Some("BOS")),
            ("2024-01-03", 25.0, Some("LAL")),
            ("2024-01-05", 30.0, Some("BOS")),
        ] {
            log.insert_ordered(Observation {
                player_id: PlayerId::new("p1"),
                metric: "points".to_string(),
                date: date.parse().unwrap(),
                value,
                opponent_id: opp.map(OpponentId::new),
            });
        }

        let vs_bos = log.versus(&OpponentId::new("BOS"));
        assert_eq!(vs_bos.values(), vec![20.0, 30.0]);
        let vs_gsw = log.versus(&OpponentId::new("GSW"));
        assert!(vs_gsw.is_empty());
    }
}
