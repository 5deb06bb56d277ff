use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Blend weight applied to (model - market) for spreads
    pub lambda_spread: f64,
    /// Blend weight applied to (model - market) for totals
    pub lambda_total: f64,
    /// Maximum absolute spread overlay in points
    pub cap_spread: f64,
    /// Maximum absolute total overlay in points
    pub cap_total: f64,
    /// Minimum absolute overlay before a pick is actionable
    pub edge_floor: f64,
    /// Raw model/market disagreement above which grades are demoted
    pub large_disagreement_threshold: f64,
    #[serde(default)]
    pub grade_thresholds: GradeThresholds,
    /// Favorite line magnitude at which underdog spread picks are suppressed
    pub extreme_favorite_threshold: f64,
    /// Abort on invariant violations instead of recording them
    #[serde(default)]
    pub strict_mode: bool,
    /// Home-field edge in points added to the home power rating
    #[serde(default = "default_home_field_advantage")]
    pub home_field_advantage: f64,
    /// Standard deviation of the final margin, in points
    #[serde(default = "default_moneyline_sigma")]
    pub moneyline_sigma: f64,
    /// Max distance between moneyline and spread timestamps when pairing prices
    #[serde(default = "default_pair_window_secs")]
    pub moneyline_pair_window_secs: i64,
    /// Minimum model-minus-market probability for a moneyline pick
    #[serde(default)]
    pub moneyline_min_value: f64,
    /// Allowed |home price + away price| for a spread market
    #[serde(default = "default_spread_pair_tolerance")]
    pub spread_pair_tolerance: f64,
    #[serde(default)]
    pub longshot: LongshotGuard,
    #[serde(default)]
    pub model_bounds: ModelBounds,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_home_field_advantage() -> f64 {
    2.5
}

fn default_moneyline_sigma() -> f64 {
    13.5
}

fn default_pair_window_secs() -> i64 {
    10
}

fn default_spread_pair_tolerance() -> f64 {
    0.5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lambda_spread: 0.25,
            lambda_total: 0.25,
            cap_spread: 3.0,
            cap_total: 3.0,
            edge_floor: 2.0,
            large_disagreement_threshold: 10.0,
            grade_thresholds: GradeThresholds::default(),
            extreme_favorite_threshold: 21.0,
            strict_mode: false,
            home_field_advantage: default_home_field_advantage(),
            moneyline_sigma: default_moneyline_sigma(),
            moneyline_pair_window_secs: default_pair_window_secs(),
            moneyline_min_value: 0.0,
            spread_pair_tolerance: default_spread_pair_tolerance(),
            longshot: LongshotGuard::default(),
            model_bounds: ModelBounds::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Minimum overlay magnitude for each letter grade
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GradeThresholds {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            a: 4.0,
            b: 3.0,
            c: 2.0,
        }
    }
}

/// Value requirements for underdog moneyline prices
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LongshotGuard {
    /// Prices above this need `soft_min_value`
    pub soft_price: f64,
    pub soft_min_value: f64,
    /// Prices above this need `hard_min_value`
    pub hard_price: f64,
    pub hard_min_value: f64,
    /// Prices above this are never recommended
    pub max_price: f64,
}

impl Default for LongshotGuard {
    fn default() -> Self {
        Self {
            soft_price: 500.0,
            soft_min_value: 0.10,
            hard_price: 1000.0,
            hard_min_value: 0.25,
            max_price: 2000.0,
        }
    }
}

/// Sanity bands for model outputs, in points
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelBounds {
    pub max_abs_spread: f64,
    /// Totals must lie strictly inside (hard_min, hard_max)
    pub total_hard_min: f64,
    pub total_hard_max: f64,
    /// Totals outside [plausible_min, plausible_max] only warn
    pub total_plausible_min: f64,
    pub total_plausible_max: f64,
}

impl Default for ModelBounds {
    fn default() -> Self {
        Self {
            max_abs_spread: 50.0,
            total_hard_min: 15.0,
            total_hard_max: 120.0,
            total_plausible_min: 25.0,
            total_plausible_max: 95.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Self::default();

        let builder = Config::builder()
            // Start with default values
            .set_default("lambda_spread", defaults.lambda_spread)?
            .set_default("lambda_total", defaults.lambda_total)?
            .set_default("cap_spread", defaults.cap_spread)?
            .set_default("cap_total", defaults.cap_total)?
            .set_default("edge_floor", defaults.edge_floor)?
            .set_default(
                "large_disagreement_threshold",
                defaults.large_disagreement_threshold,
            )?
            .set_default(
                "extreme_favorite_threshold",
                defaults.extreme_favorite_threshold,
            )?
            .set_default("strict_mode", defaults.strict_mode)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TRUSTLINE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TRUSTLINE__CAP_SPREAD, etc.)
            .add_source(
                Environment::with_prefix("TRUSTLINE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, lambda) in [
            ("lambda_spread", self.lambda_spread),
            ("lambda_total", self.lambda_total),
        ] {
            if !(lambda > 0.0 && lambda <= 1.0) {
                errors.push(format!("{name} must be in (0, 1], got {lambda}"));
            }
        }

        for (name, cap) in [("cap_spread", self.cap_spread), ("cap_total", self.cap_total)] {
            if !(cap > 0.0) {
                errors.push(format!("{name} must be positive, got {cap}"));
            } else if self.edge_floor > cap {
                errors.push(format!(
                    "edge_floor {} exceeds {name} {cap}; no pick could ever be actionable",
                    self.edge_floor
                ));
            }
        }

        if !(self.edge_floor > 0.0) {
            errors.push("edge_floor must be positive".to_string());
        }

        if !(self.large_disagreement_threshold > 0.0) {
            errors.push("large_disagreement_threshold must be positive".to_string());
        }

        let g = &self.grade_thresholds;
        if !(g.a > g.b && g.b > g.c && g.c > 0.0) {
            errors.push(format!(
                "grade thresholds must descend A > B > C > 0, got {} / {} / {}",
                g.a, g.b, g.c
            ));
        }

        if !(self.extreme_favorite_threshold > 0.0) {
            errors.push("extreme_favorite_threshold must be positive".to_string());
        }

        if !(self.moneyline_sigma > 0.0) {
            errors.push("moneyline_sigma must be positive".to_string());
        }

        if self.moneyline_pair_window_secs < 0 {
            errors.push("moneyline_pair_window_secs cannot be negative".to_string());
        }

        if !(self.spread_pair_tolerance >= 0.0) {
            errors.push("spread_pair_tolerance cannot be negative".to_string());
        }

        let l = &self.longshot;
        if !(l.soft_price < l.hard_price && l.hard_price < l.max_price) {
            errors.push("longshot prices must ascend soft < hard < max".to_string());
        }

        let m = &self.model_bounds;
        if !(m.total_hard_min < m.total_plausible_min
            && m.total_plausible_min < m.total_plausible_max
            && m.total_plausible_max < m.total_hard_max)
        {
            errors.push(
                "model total bands must nest: hard_min < plausible_min < plausible_max < hard_max"
                    .to_string(),
            );
        }
        if !(m.max_abs_spread > 0.0) {
            errors.push("model_bounds.max_abs_spread must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
