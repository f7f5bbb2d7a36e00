//! Reliability toolkit
//!
//! Classic maintenance-engineering worksheets that sit beside the vibration
//! aggregator:
//! - weighted multi-factor risk assessment
//! - PFMEA worksheets ranked by risk priority number
//! - Pareto analysis of failure-mode frequencies

mod pareto;
mod pfmea;
mod risk_assessment;

pub use pareto::{pareto_analysis, FailureFrequency, ParetoAnalysis, ParetoEntry, VITAL_FEW_CUTOFF};
pub use pfmea::{calculate_rpn, pfmea_worksheet, FailureMode, PfmeaWorksheet, RatedFailureMode, RpnBand};
pub use risk_assessment::{assess_risk, RiskAssessment, RiskBand, RiskFactors, RISK_WEIGHTS};

use thiserror::Error;

/// Errors from the reliability worksheets
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReliabilityError {
    #[error("{field} must be between 1 and 10 (got {value})")]
    RatingOutOfRange { field: &'static str, value: u8 },

    #[error("Risk factor '{0}' is not a finite number")]
    NonFiniteFactor(&'static str),

    #[error("Total failure frequency is zero")]
    ZeroTotalFrequency,
}
