//! Anomaly panel projection: one table row per flagged month plus a single
//! headline recommendation.

use crate::types::AnomaliesResponse;

/// Display row for one flagged month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyRow {
    pub month: String,
    pub cpl: String,
    pub z_score: String,
}

/// Headline derived from the anomaly set. When anomalies exist, only the
/// first record's z-score sign drives the tone; the rest fill the table but
/// not the headline. That matches the backend's contract as observed, so it
/// is kept rather than aggregated.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// No anomalies: all values within the normal band.
    AllClear,
    /// First anomaly's z-score is positive: CPL above normal.
    AboveNormal { z_score: f64 },
    /// First anomaly's z-score is zero or negative: CPL below normal.
    BelowNormal { z_score: f64 },
}

impl Recommendation {
    pub fn is_positive(&self) -> bool {
        matches!(self, Recommendation::AllClear)
    }

    pub fn headline(&self) -> String {
        match self {
            Recommendation::AllClear => "All values within the normal band.".to_string(),
            Recommendation::AboveNormal { z_score } => {
                format!("CPL above normal (Z = {z_score:.2}).")
            }
            Recommendation::BelowNormal { z_score } => {
                format!("CPL below normal (Z = {z_score:.2}).")
            }
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Recommendation::AllClear => "Continue the current strategy.",
            Recommendation::AboveNormal { .. } => {
                "Review ad spend and reduce the cost per lead."
            }
            Recommendation::BelowNormal { .. } => {
                "Check lead quality and data correctness."
            }
        }
    }
}

/// The anomaly panel for one render cycle: rows in the order received plus
/// the derived recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyPanel {
    pub rows: Vec<AnomalyRow>,
    pub recommendation: Recommendation,
}

impl AnomalyPanel {
    pub fn from_response(response: &AnomaliesResponse) -> Self {
        let rows = response
            .anomalies
            .iter()
            .map(|a| AnomalyRow {
                month: a.month.clone(),
                // cpl passes through unrounded; only the z-score is fixed to
                // two decimals.
                cpl: a.cpl.to_string(),
                z_score: format!("{:.2}", a.z_score),
            })
            .collect();

        let recommendation = match response.anomalies.first() {
            None => Recommendation::AllClear,
            Some(first) if first.z_score > 0.0 => Recommendation::AboveNormal {
                z_score: first.z_score,
            },
            Some(first) => Recommendation::BelowNormal {
                z_score: first.z_score,
            },
        };

        Self {
            rows,
            recommendation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
