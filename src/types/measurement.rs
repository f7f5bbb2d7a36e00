//! Raw measurement input as captured by data-entry forms.
//!
//! Values arrive either as JSON numbers or as the text typed into a form
//! field, so every value is kept as a `FieldValue` and only interpreted as a
//! number when validated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single raw field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    /// Anything else a form may send: `null` for a cleared field, booleans,
    /// nested values. Never numeric and never counted as data.
    Other(serde_json::Value),
}

impl FieldValue {
    /// Finite numeric value, or `None` for empty, non-numeric or non-finite input.
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(v) => *v,
            FieldValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok()?
            }
            FieldValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Other(_) => true,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Named field values, e.g. a measurement point (`velV`, `accH`, `temp`, ...)
/// or an operational-parameter set (`operatingHours`, `efficiency`, ...).
///
/// Ordered by field name so validation output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, FieldValue>);

/// Velocity/acceleration/temperature fields at one bearing location
pub type MeasurementPoint = FieldSet;

/// Operating conditions recorded alongside a reading
pub type OperationalParameters = FieldSet;

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when at least one field carries a non-blank value.
    pub fn has_data(&self) -> bool {
        self.0.values().any(|v| !v.is_blank())
    }
}

/// Non-drive-end and drive-end measurement points of one machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentMeasurements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nde: Option<MeasurementPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub de: Option<MeasurementPoint>,
}

impl EquipmentMeasurements {
    pub fn has_data(&self) -> bool {
        self.nde.as_ref().is_some_and(FieldSet::has_data)
            || self.de.as_ref().is_some_and(FieldSet::has_data)
    }
}

/// A full vibration data-entry record: pump, motor and compressor points plus
/// optional operating conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump: Option<EquipmentMeasurements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor: Option<EquipmentMeasurements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor: Option<EquipmentMeasurements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational: Option<OperationalParameters>,
}

/// Header fields of a reading form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_equipment: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_no: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_finite_number_and_text() {
        assert_eq!(FieldValue::Number(4.5).as_finite(), Some(4.5));
        assert_eq!(FieldValue::from(" 12.5 ").as_finite(), Some(12.5));
        assert_eq!(FieldValue::from("").as_finite(), None);
        assert_eq!(FieldValue::from("abc").as_finite(), None);
        assert_eq!(FieldValue::Number(f64::NAN).as_finite(), None);
        assert_eq!(FieldValue::from("inf").as_finite(), None);
    }

    #[test]
    fn test_field_set_from_json_mixed_values() {
        let json = r#"{"velV": 3.2, "velH": "4.1", "temp": ""}"#;
        let point: MeasurementPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.len(), 3);
        assert_eq!(point.get("velH").and_then(FieldValue::as_finite), Some(4.1));
        assert!(point.has_data());
    }

    #[test]
    fn test_null_and_bool_values_are_kept_but_inert() {
        let point: MeasurementPoint =
            serde_json::from_str(r#"{"velV": null, "temp": true}"#).unwrap();
        assert_eq!(point.len(), 2);
        assert_eq!(point.get("velV"), Some(&FieldValue::Other(serde_json::Value::Null)));
        assert_eq!(point.get("temp").and_then(FieldValue::as_finite), None);
        assert!(!point.has_data());
    }

    #[test]
    fn test_blank_point_has_no_data() {
        let point = FieldSet::new().with("velV", "").with("temp", "  ");
        assert!(!point.has_data());
        let m = EquipmentMeasurements { nde: Some(point), de: None };
        assert!(!m.has_data());
    }

    #[test]
    fn test_equipment_reading_deserialize() {
        let json = r#"{
            "pump": {"nde": {"velV": 2.0}, "de": {"accH": "9.5"}},
            "operational": {"operatingHours": 1200}
        }"#;
        let reading: EquipmentReading = serde_json::from_str(json).unwrap();
        assert!(reading.pump.as_ref().is_some_and(EquipmentMeasurements::has_data));
        assert!(reading.motor.is_none());
        assert_eq!(reading.operational.map(|o| o.len()), Some(1));
    }
}
