//! asset-health: vibration-history health scoring for rotating equipment
//!
//! Turns a flat log of vibration readings into one explainable summary per
//! equipment id, and range-checks raw sensor input before it gets there.
//!
//! ## Architecture
//!
//! - **Validation**: physical range checks for measurement points,
//!   operational parameters, complete equipment readings and form fields
//! - **Processing**: grouping, statistics, health/risk/RUL scoring and
//!   fleet ranking
//! - **Config**: every threshold as a tunable TOML value
//! - **Storage**: key-value snapshot store and the equipment registry
//! - **Reliability**: weighted risk assessment, PFMEA and Pareto worksheets
//!
//! Validation and aggregation are pure functions: nothing here keeps state
//! between calls, and configuration is passed in explicitly.

pub mod config;
pub mod processing;
pub mod reliability;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export configuration
pub use config::{ConfigError, HealthConfig};

// Re-export commonly used types
pub use types::{
    Alert, AlertType, Condition, EquipmentReading, EquipmentSummary, FieldValue, ReadingForm,
    RiskLevel, VibrationReading,
};

// Re-export the aggregator
pub use processing::{
    aggregate_json, aggregate_vibration_history, aggregate_vibration_history_with, rank_by_risk,
    FleetOverview,
};

// Re-export validators
pub use validation::{
    validate_enhanced_required_fields, validate_equipment_reading, validate_field,
    validate_measurement_point, validate_operational_parameters, validate_required_fields,
    FieldCheck, ValidationResult,
};

// Re-export storage
pub use storage::{EquipmentRecord, EquipmentRegistry, InMemoryStore, SledStore, SnapshotStore, StoreError};

pub use reliability::ReliabilityError;
