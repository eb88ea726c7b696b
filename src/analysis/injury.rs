//! Injury status signals and the line adjustment derived from them.
//!
//! The live injury report scraper is an external collaborator; the core only
//! consumes [`InjuryStatus`] through the [`InjuryFeed`] trait. A player the
//! feed does not track is treated as ACTIVE (fail-open) so untracked players
//! still get suggestions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::domain::PlayerId;
use crate::error::{ProplineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InjuryDesignation {
    Active,
    Questionable,
    Out,
    Returning,
}

impl InjuryDesignation {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjuryDesignation::Active => "ACTIVE",
            InjuryDesignation::Questionable => "QUESTIONABLE",
            InjuryDesignation::Out => "OUT",
            InjuryDesignation::Returning => "RETURNING",
        }
    }
}

impl std::fmt::Display for InjuryDesignation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Externally supplied injury state for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryStatus {
    pub designation: InjuryDesignation,
    /// Games played since coming back; only meaningful for RETURNING
    #[serde(default)]
    pub games_since_return: u32,
}

impl InjuryStatus {
    pub fn active() -> Self {
        Self {
            designation: InjuryDesignation::Active,
            games_since_return: 0,
        }
    }

    pub fn questionable() -> Self {
        Self {
            designation: InjuryDesignation::Questionable,
            games_since_return: 0,
        }
    }

    pub fn out() -> Self {
        Self {
            designation: InjuryDesignation::Out,
            games_since_return: 0,
        }
    }

    pub fn returning(games_since_return: u32) -> Self {
        Self {
            designation: InjuryDesignation::Returning,
            games_since_return,
        }
    }
}

/// Synchronous injury status source.
///
/// `UnknownPlayer` means "not tracked", which callers treat as ACTIVE. Any
/// timeout/retry policy belongs to the implementation, not the core.
#[cfg_attr(test, mockall::automock)]
pub trait InjuryFeed: Send + Sync {
    fn status(&self, player: &PlayerId) -> Result<InjuryStatus>;
}

/// Maps an injury status to a multiplicative line adjustment
#[derive(Debug, Clone)]
pub struct InjuryAdjuster {
    questionable_multiplier: f64,
    returning_multiplier: f64,
    returning_ramp_games: u32,
}

impl InjuryAdjuster {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            questionable_multiplier: config.questionable_multiplier,
            returning_multiplier: config.returning_multiplier,
            returning_ramp_games: config.returning_ramp_games,
        }
    }

    /// Multiplier applied to a suggested line.
    ///
    /// OUT has no multiplier: emitting any number for a ruled-out player
    /// would be misleading, so the request fails with `PlayerUnavailable`.
    /// RETURNING ramps at a reduced multiplier for the first few games back,
    /// then reverts to 1.0.
    pub fn multiplier(&self, player: &PlayerId, status: &InjuryStatus) -> Result<f64> {
        match status.designation {
            InjuryDesignation::Active => Ok(1.0),
            InjuryDesignation::Questionable => Ok(self.questionable_multiplier),
            InjuryDesignation::Out => Err(ProplineError::PlayerUnavailable {
                player: player.to_string(),
            }),
            InjuryDesignation::Returning => {
                if status.games_since_return <= self.returning_ramp_games {
                    Ok(self.returning_multiplier)
                } else {
                    Ok(1.0)
                }
            }
        }
    }
}

impl Default for InjuryAdjuster {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// In-memory injury feed, for tests and embedding hosts that resolve
/// statuses out of band
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticInjuryFeed {
    statuses: HashMap<String, InjuryStatus>,
}

impl StaticInjuryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, player: &str, status: InjuryStatus) -> Self {
        self.statuses.insert(player.to_string(), status);
        self
    }

    pub fn set_status(&mut self, player: &str, status: InjuryStatus) {
        self.statuses.insert(player.to_string(), status);
    }

    /// Load a `{ "player name": { "designation": "OUT", ... } }` JSON map
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let statuses: HashMap<String, InjuryStatus> = serde_json::from_str(&content)?;
        Ok(Self { statuses })
    }

    /// Save the current map as JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.statuses)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl InjuryFeed for StaticInjuryFeed {
    fn status(&self, player: &PlayerId) -> Result<InjuryStatus> {
        self.statuses
            .get(player.as_str())
            .copied()
            .ok_or_else(|| ProplineError::UnknownPlayer {
                player: player.to_string(),
            })
    }
}
