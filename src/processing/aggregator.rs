//! Equipment Health Aggregator
//!
//! Turns a flat vibration reading log into one summary per equipment id.
//! Pure function of its input and the scoring configuration: no I/O and no
//! state carried between calls.
//!
//! ## Ordering
//!
//! - Groups appear in the order their equipment id first occurs in the log.
//! - Within a group readings are ordered newest first with a stable sort, so
//!   readings sharing a timestamp keep their log order. The first of several
//!   equal-date readings in the log is therefore treated as the latest.

use std::collections::HashMap;

use serde::Deserialize;
use statrs::statistics::Statistics;
use tracing::{debug, info};

use super::health_scoring::{
    calculate_health_score, calculate_risk_score, condition_from_score, days_since_maintenance,
    evaluate_alert, predict_rul, risk_level_from_score,
};
use crate::config::HealthConfig;
use crate::types::{EquipmentSummary, VibrationReading};

/// Readings of one equipment id, newest first.
///
/// Only built by `group_by_equipment`, so a group is never empty.
#[derive(Debug, Clone)]
pub struct EquipmentGroup<'a> {
    equipment_id: &'a str,
    readings: Vec<&'a VibrationReading>,
}

/// Per-group statistics over `vibration_rms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStatistics {
    pub latest: f64,
    /// Second-newest reading, or the latest when the group has one reading
    pub previous: f64,
    pub oldest: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// `(latest - oldest) / count`
    pub trend: f64,
    pub count: usize,
}

impl<'a> EquipmentGroup<'a> {
    pub fn equipment_id(&self) -> &'a str {
        self.equipment_id
    }

    /// Newest first
    pub fn readings(&self) -> &[&'a VibrationReading] {
        &self.readings
    }

    pub fn latest(&self) -> &'a VibrationReading {
        self.readings[0]
    }

    pub fn previous(&self) -> &'a VibrationReading {
        self.readings.get(1).copied().unwrap_or_else(|| self.latest())
    }

    pub fn oldest(&self) -> &'a VibrationReading {
        self.readings[self.readings.len() - 1]
    }

    pub fn statistics(&self) -> GroupStatistics {
        let values: Vec<f64> = self.readings.iter().map(|r| r.vibration_rms).collect();
        let count = values.len();
        let latest = self.latest().vibration_rms;
        let oldest = self.oldest().vibration_rms;

        GroupStatistics {
            latest,
            previous: self.previous().vibration_rms,
            oldest,
            average: Statistics::<f64>::mean(values.iter()),
            max: Statistics::<f64>::max(values.iter()),
            min: Statistics::<f64>::min(values.iter()),
            trend: (latest - oldest) / count as f64,
            count,
        }
    }
}

/// Partition readings by equipment id, preserving first-occurrence order, and
/// sort each group newest first.
///
/// Every returned group holds at least one reading.
pub fn group_by_equipment(readings: &[VibrationReading]) -> Vec<EquipmentGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<EquipmentGroup<'_>> = Vec::new();

    for reading in readings {
        let id = reading.equipment_id.as_str();
        let slot = *index.entry(id).or_insert_with(|| {
            groups.push(EquipmentGroup { equipment_id: id, readings: Vec::new() });
            groups.len() - 1
        });
        groups[slot].readings.push(reading);
    }

    for group in &mut groups {
        // sort_by is stable: equal dates keep log order
        group.readings.sort_by(|a, b| b.date.cmp(&a.date));
    }

    groups
}

/// Aggregate with the reference scoring constants.
pub fn aggregate_vibration_history(readings: &[VibrationReading]) -> Vec<EquipmentSummary> {
    aggregate_vibration_history_with(readings, &HealthConfig::default())
}

/// Aggregate a reading log into one summary per equipment id.
///
/// Empty input yields an empty list. Input is trusted: run the validators
/// first if the log comes from an untrusted source.
pub fn aggregate_vibration_history_with(
    readings: &[VibrationReading],
    config: &HealthConfig,
) -> Vec<EquipmentSummary> {
    if readings.is_empty() {
        return Vec::new();
    }

    let summaries: Vec<EquipmentSummary> = group_by_equipment(readings)
        .iter()
        .map(|group| summarize_group(group, config))
        .collect();

    info!(
        readings = readings.len(),
        equipment = summaries.len(),
        "Aggregated vibration history"
    );
    summaries
}

/// Aggregate a JSON document holding a reading log.
///
/// Anything other than an array (null, object, scalar) yields an empty list;
/// array elements that are not valid readings are an error.
pub fn aggregate_json(
    log: &serde_json::Value,
    config: &HealthConfig,
) -> Result<Vec<EquipmentSummary>, serde_json::Error> {
    let readings = parse_reading_log(log)?;
    Ok(aggregate_vibration_history_with(&readings, config))
}

/// Decode a reading log, treating non-array documents as empty.
pub fn parse_reading_log(log: &serde_json::Value) -> Result<Vec<VibrationReading>, serde_json::Error> {
    match log {
        serde_json::Value::Array(_) => Vec::<VibrationReading>::deserialize(log),
        _ => Ok(Vec::new()),
    }
}

/// Score one group.
pub fn summarize_group(group: &EquipmentGroup<'_>, config: &HealthConfig) -> EquipmentSummary {
    let latest = group.latest();
    let stats = group.statistics();

    let alerts: Vec<_> = evaluate_alert(latest, stats.trend, &config.alerts).into_iter().collect();

    let health_score = calculate_health_score(
        stats.latest,
        stats.trend,
        alerts.len(),
        days_since_maintenance(latest),
        &config.health,
    );

    let criticality = latest.criticality.unwrap_or(config.risk.default_criticality);
    let environment = latest.environment.unwrap_or(config.risk.default_environment);
    let risk_score = calculate_risk_score(stats.latest, stats.trend, criticality, environment, &config.risk);
    let risk_level = risk_level_from_score(risk_score, &config.risk);
    let condition = condition_from_score(health_score, &config.condition);
    let predicted_rul = predict_rul(stats.latest, stats.previous, &config.rul);

    let name = latest.display_name().to_string();

    debug!(
        equipment = group.equipment_id,
        readings = stats.count,
        latest = stats.latest,
        trend = stats.trend,
        health_score,
        risk_score,
        %risk_level,
        predicted_rul,
        "Scored equipment group"
    );

    EquipmentSummary {
        id: group.equipment_id.to_string(),
        description: format!(
            "{name}: {} vibration reading(s), latest {:.2} mm/s RMS",
            stats.count, stats.latest
        ),
        name,
        zone: group.readings.iter().find_map(|r| r.zone.clone()),
        pump_station: group.readings.iter().find_map(|r| r.pump_station.clone()),
        vibration_latest: stats.latest,
        vibration_max: stats.max,
        vibration_min: stats.min,
        vibration_avg: stats.average,
        trend: stats.trend,
        health_score,
        risk_score,
        risk_level,
        condition,
        predicted_rul,
        alerts,
        last_reading: latest.date,
        last_maintenance: latest.effective_maintenance_date(),
        criticality,
        environment,
        reading_count: stats.count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlertType, Condition, RiskLevel};
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_vibration_history(&[]).is_empty());
    }

    #[test]
    fn test_groups_in_first_occurrence_order() {
        let log = vec![
            VibrationReading::new("B", ts(2024, 1, 1), 1.0),
            VibrationReading::new("A", ts(2024, 1, 1), 1.0),
            VibrationReading::new("B", ts(2024, 2, 1), 1.0),
            VibrationReading::new("C", ts(2024, 1, 1), 1.0),
        ];
        let ids: Vec<_> = aggregate_vibration_history(&log).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_group_sorted_newest_first() {
        let log = vec![
            VibrationReading::new("E", ts(2024, 1, 1), 1.0),
            VibrationReading::new("E", ts(2024, 3, 1), 3.0),
            VibrationReading::new("E", ts(2024, 2, 1), 2.0),
        ];
        let groups = group_by_equipment(&log);
        assert_eq!(groups.len(), 1);
        let rms: Vec<f64> = groups[0].readings().iter().map(|r| r.vibration_rms).collect();
        assert_eq!(rms, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_every_group_has_a_latest_reading() {
        let log = vec![
            VibrationReading::new("A", ts(2024, 1, 1), 1.0),
            VibrationReading::new("B", ts(2024, 1, 1), 2.0),
            VibrationReading::new("A", ts(2024, 2, 1), 3.0),
        ];
        let groups = group_by_equipment(&log);
        let ids: Vec<_> = groups.iter().map(|g| g.equipment_id()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        for group in &groups {
            assert!(!group.readings().is_empty());
            assert_eq!(group.latest().equipment_id, group.equipment_id());
        }
        assert!(group_by_equipment(&[]).is_empty());
    }

    #[test]
    fn test_equal_dates_keep_log_order() {
        let log = vec![
            VibrationReading::new("E", ts(2024, 1, 1), 1.0),
            VibrationReading::new("E", ts(2024, 5, 1), 4.0),
            VibrationReading::new("E", ts(2024, 5, 1), 6.0),
        ];
        let groups = group_by_equipment(&log);
        assert_eq!(groups[0].latest().vibration_rms, 4.0);
        assert_eq!(groups[0].previous().vibration_rms, 6.0);
    }

    #[test]
    fn test_statistics() {
        let log = vec![
            VibrationReading::new("E", ts(2024, 1, 1), 2.0),
            VibrationReading::new("E", ts(2024, 2, 1), 6.0),
            VibrationReading::new("E", ts(2024, 3, 1), 4.0),
        ];
        let stats = group_by_equipment(&log)[0].statistics();
        assert_eq!(stats.latest, 4.0);
        assert_eq!(stats.previous, 6.0);
        assert_eq!(stats.oldest, 2.0);
        assert_eq!(stats.max, 6.0);
        assert_eq!(stats.min, 2.0);
        assert!((stats.average - 4.0).abs() < 1e-12);
        assert!((stats.trend - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_single_reading_group() {
        let log = vec![VibrationReading::new("S", ts(2024, 1, 1), 3.0)];
        let s = &aggregate_vibration_history(&log)[0];
        assert_eq!(s.trend, 0.0);
        assert_eq!(s.predicted_rul, 12);
        assert_eq!(s.health_score, 76.0);
        assert!(s.alerts.is_empty());
        assert_eq!(s.condition, Condition::Good);
        assert_eq!(s.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_overdue_maintenance_penalty() {
        let log = vec![VibrationReading::new("M", ts(2024, 12, 1), 2.0)
            .with_maintenance_date(ts(2024, 1, 1))];
        let s = &aggregate_vibration_history(&log)[0];
        // 100 - 16 - 10
        assert_eq!(s.health_score, 74.0);
        assert_eq!(s.last_maintenance, ts(2024, 1, 1));
    }

    #[test]
    fn test_maintenance_of_older_readings_ignored() {
        let log = vec![
            VibrationReading::new("M", ts(2024, 1, 1), 2.0).with_maintenance_date(ts(2020, 1, 1)),
            VibrationReading::new("M", ts(2024, 2, 1), 2.0),
        ];
        let s = &aggregate_vibration_history(&log)[0];
        assert_eq!(s.health_score, 84.0);
    }

    #[test]
    fn test_descriptive_fields_carried_through() {
        let log = vec![
            VibrationReading::new("P1", ts(2024, 1, 1), 2.0).with_location("East", "PS-4"),
            VibrationReading::new("P1", ts(2024, 2, 1), 2.5).with_pump_no("Pump 1"),
        ];
        let s = &aggregate_vibration_history(&log)[0];
        assert_eq!(s.name, "Pump 1");
        assert_eq!(s.zone.as_deref(), Some("East"));
        assert_eq!(s.pump_station.as_deref(), Some("PS-4"));
        assert!(s.description.contains("Pump 1"));
    }

    #[test]
    fn test_rating_defaults_applied_from_latest() {
        let log = vec![
            VibrationReading::new("R", ts(2024, 1, 1), 2.0).with_criticality(5),
            VibrationReading::new("R", ts(2024, 2, 1), 2.0),
        ];
        let s = &aggregate_vibration_history(&log)[0];
        assert_eq!(s.criticality, 3);
        assert_eq!(s.environment, 2);
    }

    #[test]
    fn test_custom_config_changes_alerts() {
        let mut config = HealthConfig::default();
        config.alerts.high_vibration = 3.0;
        let log = vec![VibrationReading::new("C", ts(2024, 1, 1), 4.0)];
        let s = &aggregate_vibration_history_with(&log, &config)[0];
        assert_eq!(s.alerts[0].alert_type, AlertType::High);
    }

    #[test]
    fn test_parse_reading_log_non_array_is_empty() {
        assert!(parse_reading_log(&serde_json::Value::Null).unwrap().is_empty());
        assert!(parse_reading_log(&serde_json::json!({"equipmentId": "E"})).unwrap().is_empty());
        assert!(aggregate_json(&serde_json::json!([]), &HealthConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_reading_log_rejects_bad_element() {
        let log = serde_json::json!([{"equipmentId": "E", "date": "2024-01-01"}]);
        assert!(parse_reading_log(&log).is_err());
    }
}
