//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use crate::validation::rule_for;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for HealthConfig.
///
/// Any new field added to HealthConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [alerts]
        "alerts",
        "alerts.critical_vibration",
        "alerts.high_vibration",
        "alerts.rising_trend",
        // [health]
        "health",
        "health.vibration_weight",
        "health.trend_penalty_factor",
        "health.trend_penalty_cap",
        "health.alert_penalty",
        "health.maintenance_overdue_days",
        "health.maintenance_penalty",
        // [risk]
        "risk",
        "risk.critical_vibration",
        "risk.critical_probability",
        "risk.high_vibration",
        "risk.high_probability",
        "risk.elevated_vibration",
        "risk.elevated_probability",
        "risk.baseline_probability",
        "risk.trend_risk",
        "risk.rising_trend",
        "risk.default_criticality",
        "risk.default_environment",
        "risk.critical_score",
        "risk.high_score",
        "risk.medium_score",
        // [condition]
        "condition",
        "condition.critical_below",
        "condition.poor_below",
        "condition.fair_below",
        // [rul]
        "rul",
        "rul.vibration_threshold",
        "rul.fallback_months",
        // [storage]
        "storage",
        "storage.path",
        "storage.equipment_key",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexically smallest key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed HealthConfig.
///
/// Returns (errors, warnings). Vibration thresholds beyond the accepted
/// velocity range could never be reached by validated input and are errors;
/// unusually long horizons are only suspicious.
pub fn validate_physical_ranges(
    config: &super::HealthConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Some(velocity) = rule_for("velocity") {
        for (key, value) in [
            ("alerts.critical_vibration", config.alerts.critical_vibration),
            ("alerts.high_vibration", config.alerts.high_vibration),
            ("risk.critical_vibration", config.risk.critical_vibration),
            ("risk.high_vibration", config.risk.high_vibration),
            ("risk.elevated_vibration", config.risk.elevated_vibration),
            ("rul.vibration_threshold", config.rul.vibration_threshold),
        ] {
            if value.is_finite() && !velocity.contains(value) {
                errors.push(format!(
                    "{key} = {value:.1} is outside the measurable velocity range ({}-{} mm/s)",
                    velocity.min, velocity.max
                ));
            }
        }
    }

    let overdue = config.health.maintenance_overdue_days;
    if overdue > 3650.0 {
        warnings.push(ValidationWarning {
            field: "health.maintenance_overdue_days".to_string(),
            message: format!("maintenance_overdue_days = {overdue:.0} is longer than ten years"),
            suggestion: None,
        });
    }

    let fallback = config.rul.fallback_months;
    if fallback > 240 {
        warnings.push(ValidationWarning {
            field: "rul.fallback_months".to_string(),
            message: format!("fallback_months = {fallback} is outside typical range (0-240 months)"),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
