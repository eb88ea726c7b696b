pub mod injury;
pub mod matchup;
pub mod trend;
pub mod window;

pub use injury::{InjuryAdjuster, InjuryDesignation, InjuryFeed, InjuryStatus, StaticInjuryFeed};
pub use matchup::{MatchupAnalyzer, MatchupStats};
pub use trend::{TrendConfidence, TrendDirection, TrendResult, TREND_THRESHOLD};
pub use window::{WindowStats, DEFAULT_OUTLIER_SIGMA};
