//! Validators for measurement points, operating conditions, full equipment
//! readings and form headers.

use tracing::debug;

use super::ranges::{rule_for, FieldCategory, RangeRule};
use super::{FieldCheck, ValidationResult};
use crate::types::{
    EquipmentMeasurements, EquipmentReading, FieldSet, FieldValue, MeasurementPoint,
    OperationalParameters, ReadingForm,
};

/// Emitted when a reading carries no pump, motor or compressor data at all.
pub const MEASUREMENT_REQUIRED: &str = "At least one measurement (pump, motor or compressor) is required";

fn check_fields(
    fields: &FieldSet,
    location: &str,
    accept: impl Fn(&RangeRule) -> bool,
) -> ValidationResult {
    let mut result = ValidationResult::valid();
    for (field, value) in fields.iter() {
        let Some(rule) = rule_for(field).filter(|r| accept(*r)) else {
            continue;
        };
        // Absent, empty and non-numeric input is not an error here
        let Some(v) = value.as_finite() else {
            continue;
        };
        if !rule.contains(v) {
            result.push_error(format!("{location} {field}: {}", rule.message));
        }
    }
    result
}

/// Range-check the velocity, acceleration and temperature fields of one
/// measurement point. `location` only labels the error messages.
pub fn validate_measurement_point(point: &MeasurementPoint, location: &str) -> ValidationResult {
    check_fields(point, location, |rule| rule.category != FieldCategory::Operational)
}

/// Range-check an operational-parameter set.
pub fn validate_operational_parameters(
    params: &OperationalParameters,
    location: &str,
) -> ValidationResult {
    check_fields(params, location, |rule| rule.category == FieldCategory::Operational)
}

fn validate_machine(machine: &EquipmentMeasurements, label: &str) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if let Some(nde) = &machine.nde {
        result.merge(validate_measurement_point(nde, &format!("{label} NDE")));
    }
    if let Some(de) = &machine.de {
        result.merge(validate_measurement_point(de, &format!("{label} DE")));
    }
    result
}

/// Validate a complete equipment reading.
///
/// All sub-validations are concatenated. The reading is also invalid when
/// none of pump, motor or compressor carries any data.
pub fn validate_equipment_reading(reading: &EquipmentReading) -> ValidationResult {
    let machines = [
        ("Pump", reading.pump.as_ref()),
        ("Motor", reading.motor.as_ref()),
        ("Compressor", reading.compressor.as_ref()),
    ];

    let mut result = ValidationResult::valid();
    let mut any_data = false;
    for (label, machine) in machines {
        if let Some(m) = machine {
            any_data |= m.has_data();
            result.merge(validate_machine(m, label));
        }
    }

    if let Some(params) = &reading.operational {
        result.merge(validate_operational_parameters(params, "Operational"));
    }

    if !any_data {
        result.push_error(MEASUREMENT_REQUIRED);
    }

    if !result.is_valid {
        debug!(errors = result.errors.len(), "Equipment reading failed validation");
    }
    result
}

/// Only absent or empty strings count as missing; whitespace is a value.
fn is_missing(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

/// Check that the generic form header carries a date, an equipment
/// selection and a pump number.
pub fn validate_required_fields(form: &ReadingForm) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if is_missing(form.date.as_deref()) {
        result.push_error("Date is required");
    }
    if form.selected_equipment.is_none() {
        result.push_error("Equipment selection is required");
    }
    if is_missing(form.pump_no.as_deref()) {
        result.push_error("Pump number is required");
    }
    result
}

/// Generic header checks plus a non-empty equipment selection.
pub fn validate_enhanced_required_fields(form: &ReadingForm) -> ValidationResult {
    let mut result = validate_required_fields(form);
    if form.selected_equipment.as_ref().is_some_and(Vec::is_empty) {
        result.push_error("At least one equipment item must be selected");
    }
    result
}

/// Check a single named field against the range table.
///
/// Unknown fields and values that do not parse as finite numbers pass.
pub fn validate_field(field: &str, value: &FieldValue) -> FieldCheck {
    match (rule_for(field), value.as_finite()) {
        (Some(rule), Some(v)) if !rule.contains(v) => FieldCheck::fail(format!("{field}: {}", rule.message)),
        _ => FieldCheck::ok(),
    }
}
