//! Sensor input validation
//!
//! Range-checks raw measurement points, operational parameters, complete
//! equipment readings and form header fields before readings reach the
//! aggregator. Validators never fail: every check returns a structured result
//! and the caller decides whether to block submission or merely warn.

mod ranges;
mod readings;

pub use ranges::{rule_for, FieldCategory, RangeRule, RANGE_RULES};
pub use readings::{
    validate_enhanced_required_fields, validate_equipment_reading, validate_field,
    validate_measurement_point, validate_operational_parameters, validate_required_fields,
    MEASUREMENT_REQUIRED,
};

use serde::{Deserialize, Serialize};

/// Outcome of a multi-field validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { is_valid: errors.is_empty(), errors }
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(error.into());
    }
}

/// Outcome of a single-field check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheck {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldCheck {
    pub fn ok() -> Self {
        Self { is_valid: true, error: None }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(error.into()) }
    }
}
