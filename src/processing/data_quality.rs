//! Data quality checks over a vibration reading log.
//!
//! Works per equipment group:
//! - sparse history (too few readings to trust a trend)
//! - IQR outliers
//! - sigma anomalies
//! - duplicate (equipment, date) pairs
//!
//! Anomalies are reported but do not lower the quality score; sparse
//! history, outliers and duplicates do.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, Statistics};
use tracing::debug;

use super::aggregator::{group_by_equipment, EquipmentGroup};
use crate::types::VibrationReading;

/// Score lost per sparse-history issue
pub const SPARSE_HISTORY_PENALTY: f64 = 10.0;
/// Score lost per outlier issue
pub const OUTLIER_PENALTY: f64 = 5.0;
/// Score lost when the log holds duplicate readings
pub const DUPLICATE_PENALTY: f64 = 2.0;

/// Tunables for `assess_data_quality`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOptions {
    /// Readings further than this many standard deviations from the mean
    /// are anomalies
    pub anomaly_sigma: f64,
    /// Tukey fence multiplier on the interquartile range
    pub iqr_factor: f64,
    /// Groups with fewer readings get a sparse-history issue
    pub min_readings: usize,
}

impl Default for QualityOptions {
    fn default() -> Self {
        Self {
            anomaly_sigma: 3.0,
            iqr_factor: 1.5,
            min_readings: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityIssueKind {
    SparseHistory,
    Outlier,
    DuplicateReadings,
}

impl QualityIssueKind {
    pub fn penalty(self) -> f64 {
        match self {
            Self::SparseHistory => SPARSE_HISTORY_PENALTY,
            Self::Outlier => OUTLIER_PENALTY,
            Self::DuplicateReadings => DUPLICATE_PENALTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIssue {
    pub kind: QualityIssueKind,
    /// `None` for log-wide issues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    /// Readings involved
    pub count: usize,
    pub severity: IssueSeverity,
}

/// Sigma check result for one equipment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub equipment_id: String,
    pub is_anomaly: bool,
    pub anomaly_count: usize,
    pub severity: IssueSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Least-squares slope over the readings in date order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTrend {
    pub equipment_id: String,
    pub direction: TrendDirection,
    /// mm/s per reading; absent below two readings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub total_readings: usize,
    pub equipment_count: usize,
    pub issues: Vec<QualityIssue>,
    pub anomalies: Vec<AnomalyReport>,
    pub trends: Vec<DataTrend>,
    /// 0-100
    pub quality_score: f64,
    pub generated_at: DateTime<Utc>,
}

impl QualityReport {
    pub fn has_anomalies(&self) -> bool {
        self.anomalies.iter().any(|a| a.is_anomaly)
    }
}

/// Run every check over `readings`. Groups keep first-occurrence order.
pub fn assess_data_quality(
    readings: &[VibrationReading],
    options: &QualityOptions,
    generated_at: DateTime<Utc>,
) -> QualityReport {
    let groups = group_by_equipment(readings);

    let mut issues = Vec::new();
    let mut anomalies = Vec::with_capacity(groups.len());
    let mut trends = Vec::with_capacity(groups.len());

    for group in &groups {
        let values = chronological_values(group);

        if values.len() < options.min_readings {
            issues.push(QualityIssue {
                kind: QualityIssueKind::SparseHistory,
                equipment_id: Some(group.equipment_id().to_string()),
                count: values.len(),
                severity: IssueSeverity::Medium,
            });
        }

        let outliers = count_iqr_outliers(&values, options.iqr_factor);
        if outliers > 0 {
            issues.push(QualityIssue {
                kind: QualityIssueKind::Outlier,
                equipment_id: Some(group.equipment_id().to_string()),
                count: outliers,
                severity: IssueSeverity::Low,
            });
        }

        anomalies.push(detect_anomalies(group.equipment_id(), &values, options.anomaly_sigma));
        trends.push(data_trend(group.equipment_id(), &values));
    }

    let duplicates = count_duplicate_readings(readings);
    if duplicates > 0 {
        issues.push(QualityIssue {
            kind: QualityIssueKind::DuplicateReadings,
            equipment_id: None,
            count: duplicates,
            severity: IssueSeverity::Low,
        });
    }

    let quality_score = quality_score(readings.len(), &issues);
    debug!(
        readings = readings.len(),
        equipment = groups.len(),
        issues = issues.len(),
        quality_score,
        "Assessed data quality"
    );

    QualityReport {
        total_readings: readings.len(),
        equipment_count: groups.len(),
        issues,
        anomalies,
        trends,
        quality_score,
        generated_at,
    }
}

/// Oldest first
fn chronological_values(group: &EquipmentGroup<'_>) -> Vec<f64> {
    group.readings().iter().rev().map(|r| r.vibration_rms).collect()
}

/// Values further than `sigma` population standard deviations from the mean.
///
/// Severity is high above two anomalies, medium for one or two.
pub fn detect_anomalies(equipment_id: &str, values: &[f64], sigma: f64) -> AnomalyReport {
    let anomaly_count = if values.is_empty() {
        0
    } else {
        let mean = Statistics::<f64>::mean(values.iter());
        let std_dev = Statistics::<f64>::population_std_dev(values.iter());
        values.iter().filter(|v| (*v - mean).abs() > sigma * std_dev).count()
    };

    let severity = match anomaly_count {
        0 => IssueSeverity::Low,
        1 | 2 => IssueSeverity::Medium,
        _ => IssueSeverity::High,
    };

    AnomalyReport {
        equipment_id: equipment_id.to_string(),
        is_anomaly: anomaly_count > 0,
        anomaly_count,
        severity,
    }
}

/// Values outside `[q1 - k*iqr, q3 + k*iqr]`. Needs at least four values.
pub fn count_iqr_outliers(values: &[f64], factor: f64) -> usize {
    if values.len() < 4 {
        return 0;
    }
    let mut data = Data::new(values.to_vec());
    let q1 = data.lower_quartile();
    let q3 = data.upper_quartile();
    let iqr = q3 - q1;
    let (lower, upper) = (q1 - factor * iqr, q3 + factor * iqr);
    values.iter().filter(|&&v| v < lower || v > upper).count()
}

/// Readings beyond the first for each (equipment, date) pair
pub fn count_duplicate_readings(readings: &[VibrationReading]) -> usize {
    let mut seen = HashSet::with_capacity(readings.len());
    readings
        .iter()
        .filter(|r| !seen.insert((r.equipment_id.as_str(), r.date)))
        .count()
}

pub fn data_trend(equipment_id: &str, values: &[f64]) -> DataTrend {
    let slope = least_squares_slope(values);
    let direction = match slope {
        None => TrendDirection::InsufficientData,
        Some(s) if s > 0.0 => TrendDirection::Increasing,
        Some(s) if s < 0.0 => TrendDirection::Decreasing,
        Some(_) => TrendDirection::Stable,
    };
    DataTrend {
        equipment_id: equipment_id.to_string(),
        direction,
        slope,
        data_points: values.len(),
    }
}

/// Slope of the best-fit line through `(i, values[i])`
fn least_squares_slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let x_mean = Statistics::<f64>::mean(xs.iter());
    let y_mean = Statistics::<f64>::mean(values.iter());

    let (num, den) = xs.iter().zip(values).fold((0.0, 0.0), |(num, den), (x, y)| {
        let dx = x - x_mean;
        (num + dx * (y - y_mean), den + dx * dx)
    });
    Some(num / den)
}

/// 100 minus the penalty of every issue, floored at 0. An empty log scores 0.
pub fn quality_score(total_readings: usize, issues: &[QualityIssue]) -> f64 {
    if total_readings == 0 {
        return 0.0;
    }
    let penalty: f64 = issues.iter().map(|i| i.kind.penalty()).sum();
    (100.0 - penalty).max(0.0)
}
