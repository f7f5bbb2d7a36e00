//! Weighted multi-factor risk assessment.
//!
//! Each factor is expected on a 0-100 scale; the score is the weighted sum,
//! so it shares that scale.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReliabilityError;

/// (factor, weight) pairs; weights sum to 1.0
pub const RISK_WEIGHTS: [(&str, f64); 6] = [
    ("vibration", 0.25),
    ("temperature", 0.20),
    ("operating_hours", 0.15),
    ("age", 0.15),
    ("criticality", 0.15),
    ("environment", 0.10),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub vibration: f64,
    pub temperature: f64,
    pub operating_hours: f64,
    pub age: f64,
    pub criticality: f64,
    pub environment: f64,
}

impl RiskFactors {
    fn values(&self) -> [f64; 6] {
        [
            self.vibration,
            self.temperature,
            self.operating_hours,
            self.age,
            self.criticality,
            self.environment,
        ]
    }

    /// Weighted sum of the factors
    pub fn weighted_score(&self) -> f64 {
        self.values()
            .iter()
            .zip(RISK_WEIGHTS.iter())
            .map(|(value, (_, weight))| value * weight)
            .sum()
    }
}

/// Score band driving the advice text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Acceptable,
    Monitor,
    Preventive,
    Immediate,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            Self::Immediate
        } else if score > 60.0 {
            Self::Preventive
        } else if score > 40.0 {
            Self::Monitor
        } else {
            Self::Acceptable
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Self::Immediate => "Immediate maintenance required",
            Self::Preventive => "Schedule preventive maintenance",
            Self::Monitor => "Monitor equipment condition",
            Self::Acceptable => "Equipment in good condition",
        }
    }

    pub fn mitigation(self) -> &'static str {
        match self {
            Self::Immediate => "Schedule emergency maintenance",
            Self::Preventive => "Increase monitoring frequency",
            Self::Monitor => "Regular inspections",
            Self::Acceptable => "Continue normal operations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub equipment_id: String,
    pub risk_score: f64,
    pub band: RiskBand,
    pub factors: RiskFactors,
    pub recommendations: Vec<String>,
    pub mitigation_actions: Vec<String>,
}

/// Score `factors` and attach the band's advice.
pub fn assess_risk(equipment_id: &str, factors: &RiskFactors) -> Result<RiskAssessment, ReliabilityError> {
    if let Some((name, _)) = RISK_WEIGHTS
        .iter()
        .zip(factors.values())
        .find(|(_, value)| !value.is_finite())
        .map(|((name, _), value)| (*name, value))
    {
        return Err(ReliabilityError::NonFiniteFactor(name));
    }

    let risk_score = factors.weighted_score();
    let band = RiskBand::from_score(risk_score);
    debug!(equipment = equipment_id, risk_score, ?band, "Assessed equipment risk");

    Ok(RiskAssessment {
        equipment_id: equipment_id.to_string(),
        risk_score,
        band,
        factors: *factors,
        recommendations: vec![band.recommendation().to_string()],
        mitigation_actions: vec![band.mitigation().to_string()],
    })
}
