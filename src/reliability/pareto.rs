//! Pareto analysis of failure-mode frequencies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReliabilityError;

/// Modes whose cumulative share stays at or below this percentage are the
/// vital few.
pub const VITAL_FEW_CUTOFF: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureFrequency {
    pub mode: String,
    #[serde(default)]
    pub frequency: u32,
}

impl FailureFrequency {
    pub fn new(mode: impl Into<String>, frequency: u32) -> Self {
        Self { mode: mode.into(), frequency }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoEntry {
    pub mode: String,
    pub frequency: u32,
    pub percentage: f64,
    pub cumulative_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoAnalysis {
    /// Most frequent first
    pub entries: Vec<ParetoEntry>,
    pub total_frequency: u64,
    pub vital_few: Vec<String>,
    /// The vital few are at most a fifth of all modes
    pub pareto_principle_applies: bool,
}

/// Rank modes by frequency and accumulate their shares.
///
/// Equal frequencies keep input order. An empty list, or one whose
/// frequencies are all zero, has no shares to compute and is an error.
pub fn pareto_analysis(modes: &[FailureFrequency]) -> Result<ParetoAnalysis, ReliabilityError> {
    let total_frequency: u64 = modes.iter().map(|m| u64::from(m.frequency)).sum();
    if total_frequency == 0 {
        return Err(ReliabilityError::ZeroTotalFrequency);
    }

    let mut sorted: Vec<&FailureFrequency> = modes.iter().collect();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    let total = total_frequency as f64;
    let mut running = 0u64;
    let entries: Vec<ParetoEntry> = sorted
        .into_iter()
        .map(|m| {
            running += u64::from(m.frequency);
            ParetoEntry {
                mode: m.mode.clone(),
                frequency: m.frequency,
                percentage: f64::from(m.frequency) / total * 100.0,
                cumulative_percentage: running as f64 / total * 100.0,
            }
        })
        .collect();

    let vital_few: Vec<String> = entries
        .iter()
        .filter(|e| e.cumulative_percentage <= VITAL_FEW_CUTOFF)
        .map(|e| e.mode.clone())
        .collect();
    let pareto_principle_applies = vital_few.len() as f64 <= entries.len() as f64 * 0.2;

    debug!(
        modes = entries.len(),
        total_frequency,
        vital_few = vital_few.len(),
        "Computed Pareto analysis"
    );

    Ok(ParetoAnalysis {
        entries,
        total_frequency,
        vital_few,
        pareto_principle_applies,
    })
}
