//! propline: player prop line suggestion engine.
//!
//! Ingests time-ordered game logs, computes rolling statistics, classifies
//! trend direction and confidence, applies opponent- and injury-based
//! adjustments, and emits a recommended line with a confidence interval and
//! an over/under read. A deterministic statistical transform of historical
//! inputs, not a forecaster with learned parameters.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod store;
pub mod suggest;

pub use analysis::{
    InjuryAdjuster, InjuryDesignation, InjuryFeed, InjuryStatus, MatchupAnalyzer, MatchupStats,
    StaticInjuryFeed, TrendConfidence, TrendDirection, TrendResult, WindowStats,
};
pub use config::{AnalysisConfig, AppConfig, LoggingConfig};
pub use domain::{GameLog, MetricKind, MetricSchema, Observation, OpponentId, PlayerId};
pub use error::{ProplineError, Result};
pub use store::GameLogStore;
pub use suggest::{
    Degradation, Factor, FactorSource, FormLabel, InjuryAdjustment, LineRecommendation,
    LineRequest, LineSuggester, LineSuggestion, Pick,
};
