//! Vibration history processing - grouping, scoring and fleet ranking,
//! plus maintenance planning and data quality checks on top of them

mod aggregator;
mod health_scoring;
pub mod data_quality;
pub mod fleet;
pub mod maintenance;

pub use aggregator::{
    aggregate_json, aggregate_vibration_history, aggregate_vibration_history_with,
    group_by_equipment, parse_reading_log, summarize_group, EquipmentGroup, GroupStatistics,
};
pub use data_quality::{assess_data_quality, QualityOptions, QualityReport};
pub use fleet::{rank_by_risk, FleetOverview};
pub use maintenance::{plan_maintenance, EquipmentCategory, MaintenancePlan, MaintenanceSchedule, MaintenanceType};
pub use health_scoring::*;
