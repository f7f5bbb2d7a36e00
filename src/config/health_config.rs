//! Health Configuration - every scoring threshold as an operator-tunable TOML value
//!
//! Each struct implements `Default` with values equal to the reference scoring
//! constants, so an absent config file reproduces the reference arithmetic
//! exactly.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Config Provenance
// ============================================================================

/// Dotted key paths explicitly present in the user's TOML file.
///
/// After deserialization every `#[serde(default)]` field has a value; this
/// keeps the distinction between user-set and defaulted keys for reporting.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvenance {
    pub explicit_keys: HashSet<String>,
}

impl ConfigProvenance {
    pub fn is_user_set(&self, dotted_key: &str) -> bool {
        self.explicit_keys.contains(dotted_key)
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the health aggregator.
///
/// Load with `HealthConfig::load()` which searches:
/// 1. `$ASSET_HEALTH_CONFIG` env var
/// 2. `./asset_health.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Alert rule thresholds
    #[serde(default)]
    pub alerts: AlertThresholds,

    /// Health score weights and penalties
    #[serde(default)]
    pub health: HealthWeights,

    /// Failure-probability bands and risk level cut-offs
    #[serde(default)]
    pub risk: RiskThresholds,

    /// Condition bands over the health score
    #[serde(default)]
    pub condition: ConditionThresholds,

    /// Remaining-useful-life projection
    #[serde(default)]
    pub rul: RulConfig,

    /// Snapshot store location
    #[serde(default)]
    pub storage: StorageConfig,
}

impl HealthConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults when no file is found or the file is unusable.
    pub fn load() -> Self {
        Self::load_with_provenance().0
    }

    /// Same search order as `load()`, also returning which keys the user set.
    pub fn load_with_provenance() -> (Self, ConfigProvenance) {
        // 1. Env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file_with_provenance(&p) {
                    Ok((config, provenance)) => {
                        info!(path = %p.display(), "Loaded health config from {}", defaults::CONFIG_ENV_VAR);
                        return (config, provenance);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        // 2. Local file
        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file_with_provenance(&local) {
                Ok((config, provenance)) => {
                    info!("Loaded health config from ./{}", defaults::CONFIG_FILE_NAME);
                    return (config, provenance);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::CONFIG_FILE_NAME);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", defaults::CONFIG_FILE_NAME);
        (Self::default(), ConfigProvenance::default())
    }

    /// The file `load()` would read, given the env var value and the
    /// directory searched for the local file. `None` means defaults.
    pub fn locate_in(env_value: Option<&str>, dir: &Path) -> Option<PathBuf> {
        if let Some(path) = env_value {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
        let local = dir.join(defaults::CONFIG_FILE_NAME);
        local.exists().then_some(local)
    }

    /// Like `load()`, but a located file that fails to parse or validate is
    /// an error instead of a fallback. Also returns the file used, if any.
    pub fn load_strict() -> Result<(Self, Option<PathBuf>), ConfigError> {
        let env_value = std::env::var(defaults::CONFIG_ENV_VAR).ok();
        Self::load_strict_in(env_value.as_deref(), Path::new("."))
    }

    pub fn load_strict_in(
        env_value: Option<&str>,
        dir: &Path,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match Self::locate_in(env_value, dir) {
            Some(path) => Ok((Self::load_from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let (config, _provenance) = Self::load_from_file_with_provenance(path)?;
        Ok(config)
    }

    /// Load from a specific TOML file path, also returning provenance.
    pub fn load_from_file_with_provenance(
        path: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents)
            .map_err(|e| match e {
                ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
                other => other,
            })
    }

    /// Parse and validate a TOML document.
    ///
    /// Two-pass: unknown keys are reported as warnings first, then the
    /// document is deserialized and validated.
    pub fn from_toml_str(contents: &str) -> Result<(Self, ConfigProvenance), ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let provenance = ConfigProvenance {
            explicit_keys: contents
                .parse::<toml::Value>()
                .map(|value| super::validation::walk_toml_keys(&value, ""))
                .unwrap_or_default()
                .into_iter()
                .collect(),
        };

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok((config, provenance))
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Health config saved");
        Ok(())
    }

    /// Validate all thresholds for internal consistency.
    ///
    /// Rules:
    /// - Escalating thresholds must be ordered (critical above high, etc.)
    /// - Probabilities lie in 0-1, default ratings in 1-5
    /// - Weights, caps and divisors are non-negative / positive
    /// - Every value is finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let a = &self.alerts;
        Self::check_escalation(a.high_vibration, a.critical_vibration, "alerts.vibration", &mut errors);
        if a.rising_trend < 0.0 {
            errors.push(format!("alerts.rising_trend ({:.2}) must be >= 0", a.rising_trend));
        }

        let h = &self.health;
        for (name, value) in [
            ("health.vibration_weight", h.vibration_weight),
            ("health.trend_penalty_factor", h.trend_penalty_factor),
            ("health.trend_penalty_cap", h.trend_penalty_cap),
            ("health.alert_penalty", h.alert_penalty),
            ("health.maintenance_penalty", h.maintenance_penalty),
        ] {
            if value < 0.0 {
                errors.push(format!("{name} ({value:.2}) must be >= 0"));
            }
        }
        if h.maintenance_overdue_days <= 0.0 {
            errors.push("health.maintenance_overdue_days must be > 0".to_string());
        }

        let r = &self.risk;
        Self::check_escalation(r.elevated_vibration, r.high_vibration, "risk.elevated/high_vibration", &mut errors);
        Self::check_escalation(r.high_vibration, r.critical_vibration, "risk.high/critical_vibration", &mut errors);
        for (name, p) in [
            ("risk.baseline_probability", r.baseline_probability),
            ("risk.elevated_probability", r.elevated_probability),
            ("risk.high_probability", r.high_probability),
            ("risk.critical_probability", r.critical_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(format!("{name} ({p:.2}) must be within 0-1"));
            }
        }
        Self::check_escalation(r.medium_score, r.high_score, "risk.medium/high_score", &mut errors);
        Self::check_escalation(r.high_score, r.critical_score, "risk.high/critical_score", &mut errors);
        for (name, rating) in [
            ("risk.default_criticality", r.default_criticality),
            ("risk.default_environment", r.default_environment),
        ] {
            if !(1..=5).contains(&rating) {
                errors.push(format!("{name} ({rating}) must be within 1-5"));
            }
        }

        let c = &self.condition;
        Self::check_escalation(c.critical_below, c.poor_below, "condition.critical/poor", &mut errors);
        Self::check_escalation(c.poor_below, c.fair_below, "condition.poor/fair", &mut errors);

        if self.rul.vibration_threshold <= 0.0 {
            errors.push("rul.vibration_threshold must be > 0".to_string());
        }

        if self.storage.equipment_key.trim().is_empty() {
            errors.push("storage.equipment_key must not be empty".to_string());
        }

        // Physical range validation
        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        // Reject NaN/Inf anywhere
        let non_finite: Vec<&str> = self
            .float_fields()
            .into_iter()
            .filter(|(_, v)| !v.is_finite())
            .map(|(name, _)| name)
            .collect();
        if !non_finite.is_empty() {
            errors.push(format!(
                "Config contains NaN or Inf values ({}), all thresholds must be finite numbers",
                non_finite.join(", ")
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Every floating-point threshold with its dotted key.
    pub fn float_fields(&self) -> Vec<(&'static str, f64)> {
        let (a, h, r, c) = (&self.alerts, &self.health, &self.risk, &self.condition);
        vec![
            ("alerts.critical_vibration", a.critical_vibration),
            ("alerts.high_vibration", a.high_vibration),
            ("alerts.rising_trend", a.rising_trend),
            ("health.vibration_weight", h.vibration_weight),
            ("health.trend_penalty_factor", h.trend_penalty_factor),
            ("health.trend_penalty_cap", h.trend_penalty_cap),
            ("health.alert_penalty", h.alert_penalty),
            ("health.maintenance_overdue_days", h.maintenance_overdue_days),
            ("health.maintenance_penalty", h.maintenance_penalty),
            ("risk.critical_vibration", r.critical_vibration),
            ("risk.critical_probability", r.critical_probability),
            ("risk.high_vibration", r.high_vibration),
            ("risk.high_probability", r.high_probability),
            ("risk.elevated_vibration", r.elevated_vibration),
            ("risk.elevated_probability", r.elevated_probability),
            ("risk.baseline_probability", r.baseline_probability),
            ("risk.trend_risk", r.trend_risk),
            ("risk.rising_trend", r.rising_trend),
            ("risk.critical_score", r.critical_score),
            ("risk.high_score", r.high_score),
            ("risk.medium_score", r.medium_score),
            ("condition.critical_below", c.critical_below),
            ("condition.poor_below", c.poor_below),
            ("condition.fair_below", c.fair_below),
            ("rul.vibration_threshold", self.rul.vibration_threshold),
        ]
    }

    fn check_escalation(lower: f64, upper: f64, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass, catch them explicitly
        if !lower.is_finite() || !upper.is_finite() {
            errors.push(format!("{name}: values must be finite (got {lower}, {upper})"));
            return;
        }
        if upper <= lower {
            errors.push(format!("{name}: upper ({upper:.3}) must be > lower ({lower:.3})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n{}", format_errors(.0))]
    Validation(Vec<String>),
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Alert Thresholds
// ============================================================================

/// Vibration levels (mm/s RMS) and trend that trigger an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Latest reading above this raises a Critical alert
    #[serde(default = "default_critical_vibration")]
    pub critical_vibration: f64,

    /// Latest reading above this raises a High alert
    #[serde(default = "default_high_vibration")]
    pub high_vibration: f64,

    /// Trend (mm/s per reading) above this raises a Warning
    #[serde(default = "default_rising_trend")]
    pub rising_trend: f64,
}

fn default_critical_vibration() -> f64 {
    10.0
}
fn default_high_vibration() -> f64 {
    7.0
}
fn default_rising_trend() -> f64 {
    0.5
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            critical_vibration: default_critical_vibration(),
            high_vibration: default_high_vibration(),
            rising_trend: default_rising_trend(),
        }
    }
}

// ============================================================================
// Health Weights
// ============================================================================

/// Weights and penalties of the 0-100 health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthWeights {
    /// Points lost per mm/s of latest vibration
    #[serde(default = "default_vibration_weight")]
    pub vibration_weight: f64,

    /// Points lost per unit of positive trend
    #[serde(default = "default_trend_penalty_factor")]
    pub trend_penalty_factor: f64,

    /// Maximum trend penalty
    #[serde(default = "default_trend_penalty_cap")]
    pub trend_penalty_cap: f64,

    /// Points lost per active alert
    #[serde(default = "default_alert_penalty")]
    pub alert_penalty: f64,

    /// Days since maintenance after which the maintenance penalty applies
    #[serde(default = "default_maintenance_overdue_days")]
    pub maintenance_overdue_days: f64,

    #[serde(default = "default_maintenance_penalty")]
    pub maintenance_penalty: f64,
}

fn default_vibration_weight() -> f64 {
    8.0
}
fn default_trend_penalty_factor() -> f64 {
    10.0
}
fn default_trend_penalty_cap() -> f64 {
    20.0
}
fn default_alert_penalty() -> f64 {
    5.0
}
fn default_maintenance_overdue_days() -> f64 {
    180.0
}
fn default_maintenance_penalty() -> f64 {
    10.0
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            vibration_weight: default_vibration_weight(),
            trend_penalty_factor: default_trend_penalty_factor(),
            trend_penalty_cap: default_trend_penalty_cap(),
            alert_penalty: default_alert_penalty(),
            maintenance_overdue_days: default_maintenance_overdue_days(),
            maintenance_penalty: default_maintenance_penalty(),
        }
    }
}

// ============================================================================
// Risk Thresholds
// ============================================================================

/// Failure-probability bands, trend risk, rating defaults and level cut-offs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_critical_vibration")]
    pub critical_vibration: f64,
    #[serde(default = "default_critical_probability")]
    pub critical_probability: f64,

    #[serde(default = "default_high_vibration")]
    pub high_vibration: f64,
    #[serde(default = "default_high_probability")]
    pub high_probability: f64,

    #[serde(default = "default_elevated_vibration")]
    pub elevated_vibration: f64,
    #[serde(default = "default_elevated_probability")]
    pub elevated_probability: f64,

    /// Probability when vibration is below every band
    #[serde(default = "default_baseline_probability")]
    pub baseline_probability: f64,

    /// Added to the probability when trend exceeds `rising_trend`
    #[serde(default = "default_trend_risk")]
    pub trend_risk: f64,
    #[serde(default = "default_rising_trend")]
    pub rising_trend: f64,

    /// Used when a reading carries no criticality rating
    #[serde(default = "default_criticality")]
    pub default_criticality: u8,
    /// Used when a reading carries no environment rating
    #[serde(default = "default_environment")]
    pub default_environment: u8,

    // Risk score cut-offs (strictly greater than)
    #[serde(default = "default_critical_score")]
    pub critical_score: f64,
    #[serde(default = "default_high_score")]
    pub high_score: f64,
    #[serde(default = "default_medium_score")]
    pub medium_score: f64,
}

fn default_critical_probability() -> f64 {
    0.9
}
fn default_high_probability() -> f64 {
    0.7
}
fn default_elevated_vibration() -> f64 {
    4.0
}
fn default_elevated_probability() -> f64 {
    0.4
}
fn default_baseline_probability() -> f64 {
    0.1
}
fn default_trend_risk() -> f64 {
    0.2
}
fn default_criticality() -> u8 {
    3
}
fn default_environment() -> u8 {
    2
}
fn default_critical_score() -> f64 {
    6.0
}
fn default_high_score() -> f64 {
    4.0
}
fn default_medium_score() -> f64 {
    2.0
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_vibration: default_critical_vibration(),
            critical_probability: default_critical_probability(),
            high_vibration: default_high_vibration(),
            high_probability: default_high_probability(),
            elevated_vibration: default_elevated_vibration(),
            elevated_probability: default_elevated_probability(),
            baseline_probability: default_baseline_probability(),
            trend_risk: default_trend_risk(),
            rising_trend: default_rising_trend(),
            default_criticality: default_criticality(),
            default_environment: default_environment(),
            critical_score: default_critical_score(),
            high_score: default_high_score(),
            medium_score: default_medium_score(),
        }
    }
}

// ============================================================================
// Condition Thresholds
// ============================================================================

/// Health score bands (strictly less than) for the condition label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionThresholds {
    #[serde(default = "default_critical_below")]
    pub critical_below: f64,
    #[serde(default = "default_poor_below")]
    pub poor_below: f64,
    #[serde(default = "default_fair_below")]
    pub fair_below: f64,
}

fn default_critical_below() -> f64 {
    20.0
}
fn default_poor_below() -> f64 {
    40.0
}
fn default_fair_below() -> f64 {
    60.0
}

impl Default for ConditionThresholds {
    fn default() -> Self {
        Self {
            critical_below: default_critical_below(),
            poor_below: default_poor_below(),
            fair_below: default_fair_below(),
        }
    }
}

// ============================================================================
// RUL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulConfig {
    /// Vibration level (mm/s RMS) treated as end of useful life
    #[serde(default = "default_rul_threshold")]
    pub vibration_threshold: f64,

    /// Months reported when vibration is not increasing
    #[serde(default = "default_fallback_months")]
    pub fallback_months: u32,
}

fn default_rul_threshold() -> f64 {
    7.0
}
fn default_fallback_months() -> u32 {
    12
}

impl Default for RulConfig {
    fn default() -> Self {
        Self {
            vibration_threshold: default_rul_threshold(),
            fallback_months: default_fallback_months(),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sled database directory
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Snapshot key holding the equipment list
    #[serde(default = "default_equipment_key")]
    pub equipment_key: String,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(defaults::STORAGE_PATH)
}
fn default_equipment_key() -> String {
    defaults::EQUIPMENT_LIST_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            equipment_key: default_equipment_key(),
        }
    }
}
