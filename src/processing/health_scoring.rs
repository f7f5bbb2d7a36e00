//! Health Scoring Module
//!
//! Deterministic, rule-based scoring for vibration-monitored equipment.
//! Every formula is a fixed weighted heuristic; the weights and cut-offs come
//! from `HealthConfig` and default to the reference constants.

use crate::config::{AlertThresholds, ConditionThresholds, HealthWeights, RiskThresholds, RulConfig};
use crate::types::{Alert, AlertType, Condition, RiskLevel, VibrationReading};

/// Evaluate the alert rules for the latest reading; first match wins.
///
/// Priority:
/// 1. latest > `critical_vibration` → Critical
/// 2. latest > `high_vibration` → High
/// 3. trend > `rising_trend` → Warning
///
/// A reading above the critical level always yields a Critical alert,
/// regardless of trend.
pub fn evaluate_alert(latest: &VibrationReading, trend: f64, t: &AlertThresholds) -> Option<Alert> {
    let rms = latest.vibration_rms;
    let (alert_type, message) = if rms > t.critical_vibration {
        (AlertType::Critical, "Critical vibration detected")
    } else if rms > t.high_vibration {
        (AlertType::High, "High vibration detected")
    } else if trend > t.rising_trend {
        (AlertType::Warning, "Vibration rising rapidly")
    } else {
        return None;
    };

    Some(Alert {
        alert_type,
        message: message.to_string(),
        date: latest.date,
    })
}

/// Calculate health score (0-100) from the latest vibration, trend, alert
/// count and maintenance age.
///
/// # Scoring Algorithm
///
/// - `vibration_score = max(0, 100 - rms * vibration_weight)`
/// - `trend_penalty = min(cap, trend * factor)` for a positive trend, else 0
/// - `alert_penalty = alerts * alert_penalty`
/// - `maintenance_penalty` applies once maintenance is more than
///   `maintenance_overdue_days` old
///
/// The result is clamped to 0-100.
pub fn calculate_health_score(
    latest_rms: f64,
    trend: f64,
    alert_count: usize,
    days_since_maintenance: f64,
    w: &HealthWeights,
) -> f64 {
    let vibration_score = (100.0 - latest_rms * w.vibration_weight).max(0.0);

    let trend_penalty = if trend > 0.0 {
        (trend * w.trend_penalty_factor).min(w.trend_penalty_cap)
    } else {
        0.0
    };

    let alert_penalty = alert_count as f64 * w.alert_penalty;

    let maintenance_penalty = if days_since_maintenance > w.maintenance_overdue_days {
        w.maintenance_penalty
    } else {
        0.0
    };

    (vibration_score - trend_penalty - alert_penalty - maintenance_penalty).clamp(0.0, 100.0)
}

/// Fractional days from the latest reading's maintenance date (or its own
/// date when absent) to the latest reading's date.
pub fn days_since_maintenance(latest: &VibrationReading) -> f64 {
    let elapsed = latest.date - latest.effective_maintenance_date();
    elapsed.num_seconds() as f64 / 86_400.0
}

/// Probability-of-failure band for a vibration level.
pub fn failure_probability(rms: f64, r: &RiskThresholds) -> f64 {
    if rms > r.critical_vibration {
        r.critical_probability
    } else if rms > r.high_vibration {
        r.high_probability
    } else if rms > r.elevated_vibration {
        r.elevated_probability
    } else {
        r.baseline_probability
    }
}

/// `(probability + trend_risk) * (criticality + environment)`.
///
/// Unbounded above; with the default bands the maximum is 1.1 * 10.
pub fn calculate_risk_score(rms: f64, trend: f64, criticality: u8, environment: u8, r: &RiskThresholds) -> f64 {
    let trend_risk = if trend > r.rising_trend { r.trend_risk } else { 0.0 };
    (failure_probability(rms, r) + trend_risk) * (f64::from(criticality) + f64::from(environment))
}

/// Step function over the risk score (strictly greater than each cut-off).
pub fn risk_level_from_score(score: f64, r: &RiskThresholds) -> RiskLevel {
    if score > r.critical_score {
        RiskLevel::Critical
    } else if score > r.high_score {
        RiskLevel::High
    } else if score > r.medium_score {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Condition label from the health score alone (independent of risk).
pub fn condition_from_score(health: f64, c: &ConditionThresholds) -> Condition {
    if health < c.critical_below {
        Condition::Critical
    } else if health < c.poor_below {
        Condition::Poor
    } else if health < c.fair_below {
        Condition::Fair
    } else {
        Condition::Good
    }
}

/// Remaining useful life in months.
///
/// Projects the latest month-over-month increase linearly to the vibration
/// threshold. When vibration is flat or falling the fallback horizon is used.
/// Readings already past the threshold give 0.
pub fn predict_rul(latest_rms: f64, prev_rms: f64, rul: &RulConfig) -> u32 {
    let monthly_increase = latest_rms - prev_rms;
    if monthly_increase > 0.0 {
        let months_to_threshold = (rul.vibration_threshold - latest_rms) / monthly_increase;
        // Saturating float-to-int cast; negative projections floor at 0
        months_to_threshold.round().max(0.0) as u32
    } else {
        rul.fallback_months
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(rms: f64) -> VibrationReading {
        VibrationReading::new("E1", Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(), rms)
    }

    #[test]
    fn test_alert_priority_critical_beats_trend() {
        let t = AlertThresholds::default();
        let alert = evaluate_alert(&reading(10.5), 3.0, &t).unwrap();
        assert_eq!(alert.alert_type, AlertType::Critical);
        assert_eq!(alert.message, "Critical vibration detected");
    }

    #[test]
    fn test_alert_high_and_warning() {
        let t = AlertThresholds::default();
        assert_eq!(evaluate_alert(&reading(8.0), 0.0, &t).unwrap().alert_type, AlertType::High);
        assert_eq!(evaluate_alert(&reading(3.0), 0.6, &t).unwrap().alert_type, AlertType::Warning);
        assert!(evaluate_alert(&reading(3.0), 0.5, &t).is_none());
    }

    #[test]
    fn test_alert_boundaries_are_strict() {
        let t = AlertThresholds::default();
        assert_eq!(evaluate_alert(&reading(10.0), 0.0, &t).unwrap().alert_type, AlertType::High);
        assert!(evaluate_alert(&reading(7.0), 0.0, &t).is_none());
    }

    #[test]
    fn test_alert_carries_latest_date() {
        let r = reading(12.0);
        let alert = evaluate_alert(&r, 0.0, &AlertThresholds::default()).unwrap();
        assert_eq!(alert.date, r.date);
    }

    #[test]
    fn test_health_score_components() {
        let w = HealthWeights::default();
        // 100 - 5*8 = 60, trend 1.0 → 10, one alert → 5
        assert_eq!(calculate_health_score(5.0, 1.0, 1, 0.0, &w), 45.0);
        // trend penalty caps at 20
        assert_eq!(calculate_health_score(0.0, 5.0, 0, 0.0, &w), 80.0);
        // negative trend is not a bonus
        assert_eq!(calculate_health_score(0.0, -2.0, 0, 0.0, &w), 100.0);
        // maintenance overdue
        assert_eq!(calculate_health_score(0.0, 0.0, 0, 181.0, &w), 90.0);
        assert_eq!(calculate_health_score(0.0, 0.0, 0, 180.0, &w), 100.0);
    }

    #[test]
    fn test_health_score_floors_at_zero() {
        let w = HealthWeights::default();
        assert_eq!(calculate_health_score(20.0, 2.0, 1, 400.0, &w), 0.0);
    }

    #[test]
    fn test_health_score_never_exceeds_100() {
        let w = HealthWeights::default();
        assert_eq!(calculate_health_score(-3.0, 0.0, 0, 0.0, &w), 100.0);
    }

    #[test]
    fn test_days_since_maintenance() {
        let r = reading(1.0).with_maintenance_date(Utc.with_ymd_and_hms(2023, 12, 1, 12, 0, 0).unwrap());
        let days = days_since_maintenance(&r);
        assert!((days - 182.5).abs() < 1e-9, "days = {days}");
        assert_eq!(days_since_maintenance(&reading(1.0)), 0.0);
    }

    #[test]
    fn test_failure_probability_bands() {
        let r = RiskThresholds::default();
        assert_eq!(failure_probability(11.0, &r), 0.9);
        assert_eq!(failure_probability(8.0, &r), 0.7);
        assert_eq!(failure_probability(5.0, &r), 0.4);
        assert_eq!(failure_probability(4.0, &r), 0.1);
    }

    #[test]
    fn test_risk_score_and_level() {
        let r = RiskThresholds::default();
        let score = calculate_risk_score(11.0, 0.0, 4, 3, &r);
        assert!((score - 6.3).abs() < 1e-9);
        assert_eq!(risk_level_from_score(score, &r), RiskLevel::Critical);

        let score = calculate_risk_score(5.0, 1.0, 3, 2, &r);
        assert!((score - 3.0).abs() < 1e-9);
        assert_eq!(risk_level_from_score(score, &r), RiskLevel::Medium);

        assert_eq!(risk_level_from_score(6.0, &r), RiskLevel::High);
        assert_eq!(risk_level_from_score(2.0, &r), RiskLevel::Low);
    }

    #[test]
    fn test_condition_bands() {
        let c = ConditionThresholds::default();
        assert_eq!(condition_from_score(7.0, &c), Condition::Critical);
        assert_eq!(condition_from_score(20.0, &c), Condition::Poor);
        assert_eq!(condition_from_score(45.0, &c), Condition::Fair);
        assert_eq!(condition_from_score(60.0, &c), Condition::Good);
    }

    #[test]
    fn test_rul_projection() {
        let rul = RulConfig::default();
        assert_eq!(predict_rul(5.0, 3.0, &rul), 1);
        assert_eq!(predict_rul(4.0, 3.5, &rul), 6);
        // already past threshold
        assert_eq!(predict_rul(9.0, 8.0, &rul), 0);
        // flat or falling → fallback
        assert_eq!(predict_rul(4.0, 4.0, &rul), 12);
        assert_eq!(predict_rul(3.0, 4.0, &rul), 12);
    }

    #[test]
    fn test_rul_rounds_half_up() {
        let rul = RulConfig::default();
        // (7 - 4) / 2 = 1.5 → 2
        assert_eq!(predict_rul(4.0, 2.0, &rul), 2);
    }
}
