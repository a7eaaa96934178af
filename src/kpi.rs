//! KPI panel projection: the latest month's scalar metrics, formatted for
//! display.

use crate::error::DashError;
use crate::types::MetricsResponse;

/// Display-ready projection of the most recent metric point.
///
/// `leads` stays raw; `cpl` and `roi` are pre-formatted because the display
/// precision (2 and 3 decimal places) is part of the panel's contract, not a
/// presentation detail left to each frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiSnapshot {
    pub month: String,
    pub leads: i64,
    pub cpl: String,
    pub roi: String,
}

impl KpiSnapshot {
    /// Project the last element of the metrics window. An empty window is a
    /// typed error, caught at the chain boundary like any other.
    pub fn from_latest(metrics: &MetricsResponse) -> Result<Self, DashError> {
        let last = metrics
            .data
            .last()
            .ok_or(DashError::EmptyDataset("metrics window has no data points"))?;
        Ok(Self {
            month: last.month.clone(),
            leads: last.leads,
            cpl: format!("{:.2}", last.cpl),
            roi: format!("{:.3}", last.roi),
        })
    }
}
