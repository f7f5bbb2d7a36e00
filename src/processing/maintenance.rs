//! Maintenance planning from equipment summaries.
//!
//! Health score bands pick the kind of work and how soon it is due; the
//! equipment category sets the base effort. Plans are ordered by priority,
//! highest first.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EquipmentSummary;

/// Below this health score work is an emergency
pub const EMERGENCY_BELOW: f64 = 60.0;
/// Below this, corrective work
pub const CORRECTIVE_BELOW: f64 = 70.0;
/// Below this, predictive work; anything healthier is preventive
pub const PREDICTIVE_BELOW: f64 = 80.0;

/// Urgency is measured against a 30-day horizon
const URGENCY_HORIZON_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceType {
    Emergency,
    Corrective,
    Predictive,
    Preventive,
}

impl MaintenanceType {
    pub fn from_health(health_score: f64) -> Self {
        if health_score < EMERGENCY_BELOW {
            Self::Emergency
        } else if health_score < CORRECTIVE_BELOW {
            Self::Corrective
        } else if health_score < PREDICTIVE_BELOW {
            Self::Predictive
        } else {
            Self::Preventive
        }
    }

    /// Days until the work should happen
    pub fn interval_days(self) -> i64 {
        match self {
            Self::Emergency => 7,
            Self::Corrective => 14,
            Self::Predictive => 30,
            Self::Preventive => 90,
        }
    }

    /// Expected risk reduction once the work is done, in percent
    pub fn risk_reduction(self) -> f64 {
        match self {
            Self::Emergency => 80.0,
            Self::Corrective => 60.0,
            Self::Predictive => 40.0,
            Self::Preventive => 20.0,
        }
    }
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Emergency => "emergency",
            Self::Corrective => "corrective",
            Self::Predictive => "predictive",
            Self::Preventive => "preventive",
        };
        f.write_str(s)
    }
}

/// Equipment category, from the registry's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentCategory {
    Pump,
    Motor,
    Compressor,
    Valve,
    #[default]
    Other,
}

impl EquipmentCategory {
    /// Base work hours for equipment in full health
    pub fn base_hours(self) -> f64 {
        match self {
            Self::Pump => 8.0,
            Self::Motor => 6.0,
            Self::Compressor => 12.0,
            Self::Valve => 4.0,
            Self::Other => 6.0,
        }
    }

    pub fn base_cost(self) -> f64 {
        match self {
            Self::Pump => 2000.0,
            Self::Motor => 1500.0,
            Self::Compressor => 5000.0,
            Self::Valve => 800.0,
            Self::Other => 1000.0,
        }
    }
}

impl FromStr for EquipmentCategory {
    type Err = std::convert::Infallible;

    /// Unknown names map to `Other`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "pump" => Self::Pump,
            "motor" => Self::Motor,
            "compressor" => Self::Compressor,
            "valve" => Self::Valve,
            _ => Self::Other,
        })
    }
}

/// `(100 - health) * criticality * urgency`.
///
/// Urgency is `30 / days` floored at 1, with days below 1 counted as 1; no
/// scheduled date counts as due today.
pub fn maintenance_priority(health_score: f64, criticality: u8, days_to_maintenance: Option<i64>) -> f64 {
    let days = days_to_maintenance.unwrap_or(0).max(1) as f64;
    let urgency = (URGENCY_HORIZON_DAYS / days).max(1.0);
    (100.0 - health_score) * f64::from(criticality) * urgency
}

pub fn optimal_maintenance_date(health_score: f64, from: DateTime<Utc>) -> DateTime<Utc> {
    from + Duration::days(MaintenanceType::from_health(health_score).interval_days())
}

/// Work hours (1 decimal) and cost (2 decimals).
///
/// Poorer health scales both up, up to 1.5x hours and 1.25x cost at health
/// 50 and below.
pub fn estimate_effort(category: EquipmentCategory, health_score: f64) -> (f64, f64) {
    let health_factor = (health_score / 100.0).max(0.5);
    let hours = category.base_hours() * (2.0 - health_factor);
    let cost = category.base_cost() * (1.5 - health_factor * 0.5);
    (round_to(hours, 1), round_to(cost, 2))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// One scheduled job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenancePlan {
    pub equipment_id: String,
    pub name: String,
    pub category: EquipmentCategory,
    pub maintenance_type: MaintenanceType,
    pub scheduled_date: DateTime<Utc>,
    pub priority: f64,
    pub estimated_hours: f64,
    pub estimated_cost: f64,
    pub risk_reduction: f64,
    pub health_score: f64,
}

impl MaintenancePlan {
    pub fn for_summary(summary: &EquipmentSummary, category: EquipmentCategory, now: DateTime<Utc>) -> Self {
        let maintenance_type = MaintenanceType::from_health(summary.health_score);
        let scheduled_date = optimal_maintenance_date(summary.health_score, now);
        let days = (scheduled_date - now).num_days();
        let (estimated_hours, estimated_cost) = estimate_effort(category, summary.health_score);

        Self {
            equipment_id: summary.id.clone(),
            name: summary.name.clone(),
            category,
            maintenance_type,
            scheduled_date,
            priority: maintenance_priority(summary.health_score, summary.criticality, Some(days)),
            estimated_hours,
            estimated_cost,
            risk_reduction: maintenance_type.risk_reduction(),
            health_score: summary.health_score,
        }
    }
}

/// One plan per summary, highest priority first. Ties keep input order.
pub fn plan_maintenance<F>(summaries: &[EquipmentSummary], now: DateTime<Utc>, category_of: F) -> Vec<MaintenancePlan>
where
    F: Fn(&EquipmentSummary) -> EquipmentCategory,
{
    let mut plans: Vec<_> = summaries
        .iter()
        .map(|s| MaintenancePlan::for_summary(s, category_of(s), now))
        .collect();
    plans.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    plans
}

/// Totals over a set of plans
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSchedule {
    pub plans: Vec<MaintenancePlan>,
    pub total_hours: f64,
    pub total_cost: f64,
    /// Share of plans that are preventive, 0-1
    pub preventive_share: f64,
}

impl MaintenanceSchedule {
    pub fn new(plans: Vec<MaintenancePlan>) -> Self {
        if plans.is_empty() {
            return Self::default();
        }
        let total_hours = round_to(plans.iter().map(|p| p.estimated_hours).sum(), 1);
        let total_cost = round_to(plans.iter().map(|p| p.estimated_cost).sum(), 2);
        let preventive = plans
            .iter()
            .filter(|p| p.maintenance_type == MaintenanceType::Preventive)
            .count();
        let preventive_share = preventive as f64 / plans.len() as f64;
        Self { plans, total_hours, total_cost, preventive_share }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::aggregate_vibration_history;
    use crate::types::VibrationReading;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_type_band_cut_offs() {
        assert_eq!(MaintenanceType::from_health(0.0), MaintenanceType::Emergency);
        assert_eq!(MaintenanceType::from_health(59.9), MaintenanceType::Emergency);
        assert_eq!(MaintenanceType::from_health(60.0), MaintenanceType::Corrective);
        assert_eq!(MaintenanceType::from_health(69.9), MaintenanceType::Corrective);
        assert_eq!(MaintenanceType::from_health(70.0), MaintenanceType::Predictive);
        assert_eq!(MaintenanceType::from_health(79.9), MaintenanceType::Predictive);
        assert_eq!(MaintenanceType::from_health(80.0), MaintenanceType::Preventive);
        assert_eq!(MaintenanceType::from_health(100.0), MaintenanceType::Preventive);
    }

    #[test]
    fn test_interval_and_risk_reduction_per_band() {
        let bands = [
            (50.0, 7, 80.0),
            (65.0, 14, 60.0),
            (75.0, 30, 40.0),
            (95.0, 90, 20.0),
        ];
        for (health, days, reduction) in bands {
            let t = MaintenanceType::from_health(health);
            assert_eq!(t.interval_days(), days, "health {health}");
            assert_eq!(t.risk_reduction(), reduction, "health {health}");
            assert_eq!(optimal_maintenance_date(health, now()), now() + Duration::days(days));
        }
    }

    #[test]
    fn test_priority_urgency() {
        // Due today: urgency 30
        assert_eq!(maintenance_priority(50.0, 2, None), 50.0 * 2.0 * 30.0);
        assert_eq!(maintenance_priority(50.0, 2, Some(-3)), 3000.0);
        // A week out: 30/7
        assert!((maintenance_priority(50.0, 1, Some(7)) - 50.0 * 30.0 / 7.0).abs() < 1e-9);
        // Past the horizon urgency never drops below 1
        assert_eq!(maintenance_priority(90.0, 3, Some(90)), 30.0);
        assert_eq!(maintenance_priority(100.0, 5, Some(1)), 0.0);
    }

    #[test]
    fn test_effort_scales_with_poor_health() {
        assert_eq!(estimate_effort(EquipmentCategory::Pump, 100.0), (8.0, 2000.0));
        assert_eq!(estimate_effort(EquipmentCategory::Compressor, 75.0), (15.0, 5625.0));
        // Health factor floors at 0.5
        assert_eq!(estimate_effort(EquipmentCategory::Valve, 10.0), (6.0, 1000.0));
        assert_eq!(estimate_effort(EquipmentCategory::Motor, 33.0), estimate_effort(EquipmentCategory::Motor, 50.0));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Pump".parse::<EquipmentCategory>(), Ok(EquipmentCategory::Pump));
        assert_eq!(" compressor ".parse::<EquipmentCategory>(), Ok(EquipmentCategory::Compressor));
        assert_eq!("gearbox".parse::<EquipmentCategory>(), Ok(EquipmentCategory::Other));
    }

    #[test]
    fn test_plan_orders_by_priority() {
        let log = vec![
            VibrationReading::new("healthy", now(), 1.0),
            VibrationReading::new("failing", now(), 11.0).with_criticality(4),
        ];
        let summaries = aggregate_vibration_history(&log);
        let plans = plan_maintenance(&summaries, now(), |s| {
            if s.id == "failing" {
                EquipmentCategory::Pump
            } else {
                EquipmentCategory::Other
            }
        });

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].equipment_id, "failing");
        assert_eq!(plans[0].maintenance_type, MaintenanceType::Emergency);
        assert_eq!(plans[0].category, EquipmentCategory::Pump);
        assert_eq!(plans[0].scheduled_date, now() + Duration::days(7));
        assert_eq!(plans[1].maintenance_type, MaintenanceType::Preventive);
        assert!(plans[0].priority > plans[1].priority);
    }

    #[test]
    fn test_schedule_totals() {
        let log = vec![
            VibrationReading::new("a", now(), 1.0),
            VibrationReading::new("b", now(), 11.0),
        ];
        let summaries = aggregate_vibration_history(&log);
        let schedule = MaintenanceSchedule::new(plan_maintenance(&summaries, now(), |_| EquipmentCategory::Other));
        let hours: f64 = schedule.plans.iter().map(|p| p.estimated_hours).sum();
        assert!((schedule.total_hours - hours).abs() < 1e-9);
        assert_eq!(schedule.preventive_share, 0.5);

        assert_eq!(MaintenanceSchedule::new(Vec::new()), MaintenanceSchedule::default());
    }

    #[test]
    fn test_plan_json_shape() {
        let summaries = aggregate_vibration_history(&[VibrationReading::new("a", now(), 1.0)]);
        let plans = plan_maintenance(&summaries, now(), |_| EquipmentCategory::Valve);
        let json = serde_json::to_value(&plans[0]).unwrap();
        assert_eq!(json["maintenanceType"], "preventive");
        assert_eq!(json["category"], "valve");
        assert!(json["estimatedCost"].is_number());
    }
}
