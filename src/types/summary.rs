//! Equipment summary types: the aggregator's per-equipment output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity emitted by the aggregator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertType {
    Critical,
    High,
    Warning,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertType::Critical => write!(f, "Critical"),
            AlertType::High => write!(f, "High"),
            AlertType::Warning => write!(f, "Warning"),
        }
    }
}

/// A single alert attached to a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub date: DateTime<Utc>,
}

/// Risk classification derived from the risk score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

/// Equipment condition derived from the health score alone.
///
/// Ordered worst to best.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    Critical = 0,
    Poor = 1,
    Fair = 2,
    Good = 3,
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Critical => write!(f, "Critical"),
            Condition::Poor => write!(f, "Poor"),
            Condition::Fair => write!(f, "Fair"),
            Condition::Good => write!(f, "Good"),
        }
    }
}

/// Derived health record for one equipment id.
///
/// Rebuilt from the full reading log on every aggregation; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_station: Option<String>,

    // Vibration statistics (mm/s RMS)
    pub vibration_latest: f64,
    pub vibration_max: f64,
    pub vibration_min: f64,
    pub vibration_avg: f64,
    /// Change per reading, positive = worsening
    pub trend: f64,

    /// 0-100, higher is healthier
    pub health_score: f64,
    /// Unbounded, positive
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub condition: Condition,
    /// Months until the vibration threshold is reached
    #[serde(rename = "predictedRUL")]
    pub predicted_rul: u32,
    pub alerts: Vec<Alert>,

    pub last_reading: DateTime<Utc>,
    pub last_maintenance: DateTime<Utc>,
    /// Effective values after defaults
    pub criticality: u8,
    pub environment: u8,
    pub reading_count: usize,
}

impl EquipmentSummary {
    /// Highest-priority alert, if any
    pub fn primary_alert(&self) -> Option<&Alert> {
        self.alerts.first()
    }

    pub fn needs_attention(&self) -> bool {
        !self.alerts.is_empty() || self.risk_level >= RiskLevel::High || self.condition <= Condition::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
        assert_eq!(RiskLevel::default(), RiskLevel::Low);
    }

    #[test]
    fn test_condition_orders_worst_first() {
        assert!(Condition::Critical < Condition::Poor);
        assert!(Condition::Fair < Condition::Good);
    }

    #[test]
    fn test_alert_serializes_type_key() {
        let alert = Alert {
            alert_type: AlertType::Warning,
            message: "Vibration rising rapidly".to_string(),
            date: chrono::DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "Warning");
        assert_eq!(json["message"], "Vibration rising rapidly");
    }
}
