//! PFMEA worksheets (process failure mode and effects analysis).
//!
//! Ratings use the 1-10 AIAG-VDA scales; RPN = severity x occurrence x detection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReliabilityError;

/// Applied when a failure mode gives no action of its own
const DEFAULT_ACTION: &str = "Review and improve";

fn default_rating() -> u8 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureMode {
    pub failure_mode: String,
    #[serde(default = "default_rating")]
    pub severity: u8,
    #[serde(default = "default_rating")]
    pub occurrence: u8,
    #[serde(default = "default_rating")]
    pub detection: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
}

impl FailureMode {
    pub fn new(name: impl Into<String>, severity: u8, occurrence: u8, detection: u8) -> Self {
        Self {
            failure_mode: name.into(),
            severity,
            occurrence,
            detection,
            recommended_action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.recommended_action = Some(action.into());
        self
    }

    fn check_ratings(&self) -> Result<(), ReliabilityError> {
        for (field, value) in [
            ("severity", self.severity),
            ("occurrence", self.occurrence),
            ("detection", self.detection),
        ] {
            if !(1..=10).contains(&value) {
                return Err(ReliabilityError::RatingOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

pub fn calculate_rpn(severity: u8, occurrence: u8, detection: u8) -> u32 {
    u32::from(severity) * u32::from(occurrence) * u32::from(detection)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpnBand {
    High,
    Medium,
    Low,
}

impl RpnBand {
    /// High from 200, medium from 100
    pub fn from_rpn(rpn: u32) -> Self {
        match rpn {
            200.. => Self::High,
            100..=199 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedFailureMode {
    #[serde(flatten)]
    pub mode: FailureMode,
    pub rpn: u32,
    pub band: RpnBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PfmeaWorksheet {
    pub equipment_id: String,
    /// Highest RPN first
    pub failure_modes: Vec<RatedFailureMode>,
    pub total_rpn: u32,
    /// Names of the high-band modes
    pub critical_items: Vec<String>,
    /// Actions for the high-band modes, aligned with `critical_items`
    pub recommended_actions: Vec<String>,
}

impl PfmeaWorksheet {
    pub fn in_band(&self, band: RpnBand) -> impl Iterator<Item = &RatedFailureMode> {
        self.failure_modes.iter().filter(move |m| m.band == band)
    }
}

/// Rate every mode and rank by RPN. Modes with equal RPN keep input order.
pub fn pfmea_worksheet(equipment_id: &str, modes: Vec<FailureMode>) -> Result<PfmeaWorksheet, ReliabilityError> {
    let mut rated = Vec::with_capacity(modes.len());
    for mode in modes {
        mode.check_ratings()?;
        let rpn = calculate_rpn(mode.severity, mode.occurrence, mode.detection);
        rated.push(RatedFailureMode {
            band: RpnBand::from_rpn(rpn),
            mode,
            rpn,
        });
    }
    rated.sort_by(|a, b| b.rpn.cmp(&a.rpn));

    let total_rpn = rated.iter().map(|m| m.rpn).sum();
    let (critical_items, recommended_actions) = rated
        .iter()
        .filter(|m| m.band == RpnBand::High)
        .map(|m| {
            (
                m.mode.failure_mode.clone(),
                m.mode
                    .recommended_action
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ACTION.to_string()),
            )
        })
        .unzip();

    let worksheet = PfmeaWorksheet {
        equipment_id: equipment_id.to_string(),
        failure_modes: rated,
        total_rpn,
        critical_items,
        recommended_actions,
    };
    debug!(
        equipment = equipment_id,
        modes = worksheet.failure_modes.len(),
        total_rpn,
        critical = worksheet.critical_items.len(),
        "Built PFMEA worksheet"
    );
    Ok(worksheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpn_and_bands() {
        assert_eq!(calculate_rpn(8, 5, 5), 200);
        assert_eq!(RpnBand::from_rpn(200), RpnBand::High);
        assert_eq!(RpnBand::from_rpn(199), RpnBand::Medium);
        assert_eq!(RpnBand::from_rpn(100), RpnBand::Medium);
        assert_eq!(RpnBand::from_rpn(99), RpnBand::Low);
    }

    #[test]
    fn test_worksheet_sorted_and_bucketed() {
        let worksheet = pfmea_worksheet(
            "P-101",
            vec![
                FailureMode::new("Seal leakage", 5, 4, 3),
                FailureMode::new("Bearing failure", 9, 6, 5).with_action("Vibration route weekly"),
                FailureMode::new("Coupling wear", 5, 5, 5),
            ],
        )
        .unwrap();

        let rpns: Vec<u32> = worksheet.failure_modes.iter().map(|m| m.rpn).collect();
        assert_eq!(rpns, vec![270, 125, 60]);
        assert_eq!(worksheet.total_rpn, 455);
        assert_eq!(worksheet.critical_items, vec!["Bearing failure".to_string()]);
        assert_eq!(worksheet.recommended_actions, vec!["Vibration route weekly".to_string()]);
        assert_eq!(worksheet.in_band(RpnBand::Medium).count(), 1);
        assert_eq!(worksheet.in_band(RpnBand::Low).count(), 1);
    }

    #[test]
    fn test_default_action_for_critical_mode() {
        let worksheet = pfmea_worksheet("P-1", vec![FailureMode::new("Cavitation", 10, 10, 2)]).unwrap();
        assert_eq!(worksheet.recommended_actions, vec![DEFAULT_ACTION.to_string()]);
    }

    #[test]
    fn test_missing_ratings_default_to_five() {
        let mode: FailureMode = serde_json::from_str(r#"{"failure_mode":"Misalignment"}"#).unwrap();
        assert_eq!(calculate_rpn(mode.severity, mode.occurrence, mode.detection), 125);
    }

    #[test]
    fn test_rating_out_of_range() {
        let err = pfmea_worksheet("P-1", vec![FailureMode::new("x", 11, 1, 1)]).unwrap_err();
        assert_eq!(err, ReliabilityError::RatingOutOfRange { field: "severity", value: 11 });
        assert!(pfmea_worksheet("P-1", vec![FailureMode::new("x", 1, 0, 1)]).is_err());
    }

    #[test]
    fn test_rated_mode_flattens() {
        let worksheet = pfmea_worksheet("P-1", vec![FailureMode::new("Seal", 2, 2, 2)]).unwrap();
        let json = serde_json::to_value(&worksheet.failure_modes[0]).unwrap();
        assert_eq!(json["failure_mode"], "Seal");
        assert_eq!(json["rpn"], 8);
        assert_eq!(json["band"], "low");
    }
}
