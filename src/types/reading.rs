//! Vibration reading: one sensor sample in the flat reading log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One time-stamped vibration sample for a single piece of equipment.
///
/// Readings are only ever compared with other readings that share the same
/// `equipment_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibrationReading {
    /// Grouping key
    pub equipment_id: String,

    /// Sample time, used for ordering and trend
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub date: DateTime<Utc>,

    /// Overall RMS vibration magnitude (mm/s)
    #[serde(rename = "vibrationRMS")]
    pub vibration_rms: f64,

    /// Last maintenance; `date` is used when absent
    #[serde(
        default,
        deserialize_with = "super::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub maintenance_date: Option<DateTime<Utc>>,

    /// Consequence of failure, 1-5
    #[serde(
        default,
        deserialize_with = "deserialize_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub criticality: Option<u8>,

    /// Operating environment severity, 1-5
    #[serde(
        default,
        deserialize_with = "deserialize_rating",
        skip_serializing_if = "Option::is_none"
    )]
    pub environment: Option<u8>,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_no: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_station: Option<String>,
}

impl VibrationReading {
    /// Minimal reading with only the fields the aggregator requires.
    pub fn new(equipment_id: impl Into<String>, date: DateTime<Utc>, vibration_rms: f64) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            date,
            vibration_rms,
            maintenance_date: None,
            criticality: None,
            environment: None,
            pump_no: None,
            zone: None,
            pump_station: None,
        }
    }

    pub fn with_maintenance_date(mut self, date: DateTime<Utc>) -> Self {
        self.maintenance_date = Some(date);
        self
    }

    pub fn with_criticality(mut self, criticality: u8) -> Self {
        self.criticality = Some(criticality);
        self
    }

    pub fn with_environment(mut self, environment: u8) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_pump_no(mut self, pump_no: impl Into<String>) -> Self {
        self.pump_no = Some(pump_no.into());
        self
    }

    pub fn with_location(mut self, zone: impl Into<String>, pump_station: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self.pump_station = Some(pump_station.into());
        self
    }

    /// Display name: `pump_no` when set and non-blank, otherwise the equipment id.
    pub fn display_name(&self) -> &str {
        match self.pump_no.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.equipment_id,
        }
    }

    /// Maintenance date, falling back to the sample date.
    pub fn effective_maintenance_date(&self) -> DateTime<Utc> {
        self.maintenance_date.unwrap_or(self.date)
    }
}

/// serde `deserialize_with` for a 1-5 style rating.
///
/// Spreadsheet exports write whole numbers as `4.0`; any integral value that
/// fits a `u8` is accepted. Fractions, negatives and non-numbers are errors.
pub fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&v) => {
            Ok(Some(v as u8))
        }
        Some(v) => Err(serde::de::Error::custom(format!(
            "rating must be a whole number between 0 and 255, got {v}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_display_name_fallback() {
        let r = VibrationReading::new("E1", ts(2024, 1, 1), 2.0);
        assert_eq!(r.display_name(), "E1");
        let r = r.with_pump_no("P-101");
        assert_eq!(r.display_name(), "P-101");
    }

    #[test]
    fn test_blank_pump_no_falls_back() {
        let r = VibrationReading::new("E1", ts(2024, 1, 1), 2.0).with_pump_no("  ");
        assert_eq!(r.display_name(), "E1");
    }

    #[test]
    fn test_maintenance_date_defaults_to_date() {
        let r = VibrationReading::new("E1", ts(2024, 3, 1), 2.0);
        assert_eq!(r.effective_maintenance_date(), ts(2024, 3, 1));
        let r = r.with_maintenance_date(ts(2023, 1, 1));
        assert_eq!(r.effective_maintenance_date(), ts(2023, 1, 1));
    }

    #[test]
    fn test_deserialize_camel_case_log_entry() {
        let json = r#"{
            "equipmentId": "E7",
            "date": "2024-06-01",
            "vibrationRMS": 4.2,
            "maintenanceDate": "2023-11-15",
            "criticality": 5,
            "pumpNo": "P-7",
            "zone": "North",
            "pumpStation": "PS-2"
        }"#;
        let r: VibrationReading = serde_json::from_str(json).unwrap();
        assert_eq!(r.equipment_id, "E7");
        assert_eq!(r.date, ts(2024, 6, 1));
        assert_eq!(r.vibration_rms, 4.2);
        assert_eq!(r.maintenance_date, Some(ts(2023, 11, 15)));
        assert_eq!(r.criticality, Some(5));
        assert_eq!(r.environment, None);
        assert_eq!(r.zone.as_deref(), Some("North"));
    }

    #[test]
    fn test_deserialize_rejects_bad_date() {
        let json = r#"{"equipmentId": "E7", "date": "soon", "vibrationRMS": 1.0}"#;
        assert!(serde_json::from_str::<VibrationReading>(json).is_err());
    }

    #[test]
    fn test_integral_float_ratings_accepted() {
        let json = r#"{"equipmentId":"E1","date":"2024-06-01","vibrationRMS":2.0,
                       "criticality":4.0,"environment":2}"#;
        let r: VibrationReading = serde_json::from_str(json).unwrap();
        assert_eq!(r.criticality, Some(4));
        assert_eq!(r.environment, Some(2));

        let json = r#"{"equipmentId":"E1","date":"2024-06-01","vibrationRMS":2.0,
                       "criticality":null}"#;
        let r: VibrationReading = serde_json::from_str(json).unwrap();
        assert_eq!(r.criticality, None);
    }

    #[test]
    fn test_fractional_or_negative_rating_rejected() {
        for bad in ["4.5", "-1", "256", "\"high\""] {
            let json = format!(
                r#"{{"equipmentId":"E1","date":"2024-06-01","vibrationRMS":2.0,"criticality":{bad}}}"#
            );
            assert!(serde_json::from_str::<VibrationReading>(&json).is_err(), "{bad}");
        }
    }
}
