//! Fleet-level views over equipment summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Condition, EquipmentSummary, RiskLevel};

/// Summaries ordered by risk score (highest first), then health (lowest first).
///
/// The sort is stable, so equipment that ties on both keys keeps the
/// aggregator's first-occurrence order.
pub fn rank_by_risk(summaries: &[EquipmentSummary]) -> Vec<&EquipmentSummary> {
    let mut ranked: Vec<&EquipmentSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| {
        b.risk_score
            .total_cmp(&a.risk_score)
            .then_with(|| a.health_score.total_cmp(&b.health_score))
    });
    ranked
}

/// Counts per condition and risk level, plus the ids that need attention.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetOverview {
    pub total: usize,
    pub by_condition: BTreeMap<Condition, usize>,
    pub by_risk: BTreeMap<RiskLevel, usize>,
    pub average_health: f64,
    /// Ids in risk-rank order
    pub needs_attention: Vec<String>,
}

impl FleetOverview {
    pub fn from_summaries(summaries: &[EquipmentSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }

        let mut by_condition = BTreeMap::new();
        let mut by_risk = BTreeMap::new();
        for s in summaries {
            *by_condition.entry(s.condition).or_insert(0) += 1;
            *by_risk.entry(s.risk_level).or_insert(0) += 1;
        }

        let average_health =
            summaries.iter().map(|s| s.health_score).sum::<f64>() / summaries.len() as f64;

        let needs_attention = rank_by_risk(summaries)
            .into_iter()
            .filter(|s| s.needs_attention())
            .map(|s| s.id.clone())
            .collect();

        Self {
            total: summaries.len(),
            by_condition,
            by_risk,
            average_health,
            needs_attention,
        }
    }

    pub fn count_condition(&self, condition: Condition) -> usize {
        self.by_condition.get(&condition).copied().unwrap_or(0)
    }

    pub fn count_risk(&self, level: RiskLevel) -> usize {
        self.by_risk.get(&level).copied().unwrap_or(0)
    }
}
