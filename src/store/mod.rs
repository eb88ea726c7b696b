//! Append-only store of per-player, per-metric game logs.
//!
//! Appends to the same log are serialized by the map's per-entry locking;
//! readers always get a snapshot taken entirely before or entirely after any
//! concurrent append.

use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::{GameLog, MetricSchema, Observation, OpponentId, PlayerId};
use crate::error::{ProplineError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// In-memory game log store with schema-checked ingestion
pub struct GameLogStore {
    schema: MetricSchema,
    logs: DashMap<(PlayerId, String), GameLog>,
}

impl GameLogStore {
    pub fn new(schema: MetricSchema) -> Self {
        Self {
            schema,
            logs: DashMap::new(),
        }
    }

    pub fn schema(&self) -> &MetricSchema {
        &self.schema
    }

    /// Record one game observation.
    ///
    /// Fails with `InvalidObservation` when the metric is not in the schema
    /// or the value violates its kind. Out-of-order dates are accepted and
    /// filed into date order; equal dates keep arrival order.
    pub fn append(
        &self,
        player: &str,
        metric: &str,
        date: NaiveDate,
        value: f64,
        opponent: Option<&str>,
    ) -> Result<()> {
        self.schema.validate(metric, value)?;

        let player_id = PlayerId::new(player);
        let obs = Observation {
            player_id: player_id.clone(),
            metric: metric.to_string(),
            date,
            value,
            opponent_id: opponent.map(OpponentId::new),
        };

        let key = (player_id, metric.to_string());
        self.logs
            .entry(key)
            .or_insert_with(|| GameLog::empty(PlayerId::new(player), metric))
            .insert_ordered(obs);

        debug!(player, metric, %date, value, "observation recorded");
        Ok(())
    }

    /// `append` with an unparsed `YYYY-MM-DD` date, for callers ingesting
    /// text feeds. Malformed dates are rejected before anything is stored.
    pub fn append_raw(
        &self,
        player: &str,
        metric: &str,
        date: &str,
        value: f64,
        opponent: Option<&str>,
    ) -> Result<()> {
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|err| {
            ProplineError::InvalidObservation(format!("malformed date {date:?}: {err}"))
        })?;
        self.append(player, metric, date, value, opponent)
    }

    /// Snapshot of the (player, metric) log; empty when nothing is recorded
    pub fn query(&self, player: &str, metric: &str) -> GameLog {
        let key = (PlayerId::new(player), metric.to_string());
        self.logs
            .get(&key)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| GameLog::empty(PlayerId::new(player), metric))
    }

    /// Players with at least one recorded observation
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self
            .logs
            .iter()
            .map(|entry| entry.key().0.clone())
            .collect();
        players.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        players.dedup();
        players
    }

    /// Total observations across all logs
    pub fn len(&self) -> usize {
        self.logs.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}
