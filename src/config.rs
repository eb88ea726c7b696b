use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tunable constants of the suggestion engine.
///
/// Defaults reproduce the documented reference behavior; deployments tune
/// them through `config/*.toml` or `PROPLINE_ANALYSIS__*` environment
/// variables. The 5% trend threshold is deliberately NOT here; trend
/// semantics stay identical across callers.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Games in the short (recent form) window
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Weight of the long-window mean in the base blend
    #[serde(default = "default_long_weight")]
    pub long_weight: f64,
    /// Weight of the short-window mean in the base blend
    #[serde(default = "default_short_weight")]
    pub short_weight: f64,
    /// Weight of the matchup average blended into the base line
    #[serde(default = "default_matchup_weight")]
    pub matchup_weight: f64,
    /// Standard deviations from the window mean before a value is flagged
    #[serde(default = "default_outlier_sigma")]
    pub outlier_sigma: f64,
    /// short/long mean ratio above which recent form reads HOT
    #[serde(default = "default_hot_ratio")]
    pub hot_ratio: f64,
    /// short/long mean ratio below which recent form reads COLD
    #[serde(default = "default_cold_ratio")]
    pub cold_ratio: f64,
    /// Line multiplier for a QUESTIONABLE designation
    #[serde(default = "default_questionable_multiplier")]
    pub questionable_multiplier: f64,
    /// Line multiplier while a player ramps back from injury
    #[serde(default = "default_returning_multiplier")]
    pub returning_multiplier: f64,
    /// Games after return during which the ramp multiplier applies
    #[serde(default = "default_returning_ramp_games")]
    pub returning_ramp_games: u32,
    /// Relative distance from a posted line before an over/under pick fires
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,
}

fn default_short_window() -> usize {
    5
}

fn default_long_weight() -> f64 {
    0.4
}

fn default_short_weight() -> f64 {
    0.6
}

fn default_matchup_weight() -> f64 {
    0.3
}

fn default_outlier_sigma() -> f64 {
    2.0
}

fn default_hot_ratio() -> f64 {
    1.10
}

fn default_cold_ratio() -> f64 {
    0.90
}

fn default_questionable_multiplier() -> f64 {
    0.95
}

fn default_returning_multiplier() -> f64 {
    0.90
}

fn default_returning_ramp_games() -> u32 {
    3
}

fn default_edge_threshold() -> f64 {
    0.10
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_weight: default_long_weight(),
            short_weight: default_short_weight(),
            matchup_weight: default_matchup_weight(),
            outlier_sigma: default_outlier_sigma(),
            hot_ratio: default_hot_ratio(),
            cold_ratio: default_cold_ratio(),
            questionable_multiplier: default_questionable_multiplier(),
            returning_multiplier: default_returning_multiplier(),
            returning_ramp_games: default_returning_ramp_games(),
            edge_threshold: default_edge_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PROPLINE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PROPLINE_ANALYSIS__SHORT_WINDOW, etc.)
            .add_source(
                Environment::with_prefix("PROPLINE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.short_window, 5);
        assert!((config.long_weight - 0.4).abs() < 1e-12);
        assert!((config.short_weight - 0.6).abs() < 1e-12);
        assert!((config.matchup_weight - 0.3).abs() < 1e-12);
        assert!((config.outlier_sigma - 2.0).abs() < 1e-12);
        assert!((config.questionable_multiplier - 0.95).abs() < 1e-12);
        assert!((config.returning_multiplier - 0.90).abs() < 1e-12);
        assert_eq!(config.returning_ramp_games, 3);
    }

    #[test]
    fn load_from_missing_dir_yields_defaults() {
        let config = AppConfig::load_from("/nonexistent/propline-config").unwrap();
        assert_eq!(config.analysis.short_window, 5);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }
}
