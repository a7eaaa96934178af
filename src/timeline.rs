//! Timeline merger: reconciles the historical leads series and the forecast
//! series into one labeled axis with a continuous visual join.
//!
//! The forecast overlay is a sparse series over the merged axis: absent for
//! every historical index except the last, where it duplicates the last
//! historical value. That shared point is the join anchor — the dashed
//! forecast line starts exactly where the solid historical line ends, with no
//! numeric gap and no disconnected segment.

use crate::error::DashError;
use crate::types::{ForecastResponse, MetricsResponse};

/// Merged chart data for one render cycle. Derived and ephemeral: built from
/// the cycle's own responses, pushed into the chart handle, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    /// Historical months followed by forecast months, in order.
    pub labels: Vec<String>,
    /// Historical leads values, one per historical month.
    pub historical: Vec<f64>,
    /// Forecast overlay over the full axis. `None` for historical indices
    /// before the anchor; the anchor index holds the last historical value;
    /// forecast values follow.
    pub overlay: Vec<Option<f64>>,
}

impl Timeline {
    /// Merge one cycle's metrics and forecast responses.
    ///
    /// The anchor needs at least one historical point; zero historical points
    /// is a typed error. An empty forecast is fine, the overlay then ends at
    /// the anchor.
    pub fn merge(
        metrics: &MetricsResponse,
        forecast: &ForecastResponse,
    ) -> Result<Self, DashError> {
        let last = metrics
            .data
            .last()
            .ok_or(DashError::EmptyDataset("cannot anchor forecast overlay on an empty historical series"))?;

        let hist_len = metrics.data.len();
        let fc_len = forecast.forecast_monthly.len();

        let mut labels = Vec::with_capacity(hist_len + fc_len);
        labels.extend(metrics.data.iter().map(|p| p.month.clone()));
        labels.extend(forecast.forecast_monthly.iter().map(|p| p.month.clone()));

        let historical: Vec<f64> = metrics.data.iter().map(|p| p.leads as f64).collect();

        let mut overlay: Vec<Option<f64>> = vec![None; hist_len - 1];
        overlay.push(Some(last.leads as f64));
        overlay.extend(
            forecast
                .forecast_monthly
                .iter()
                .map(|p| Some(p.leads_forecast)),
        );

        debug_assert_eq!(overlay.len(), labels.len());
        Ok(Self {
            labels,
            historical,
            overlay,
        })
    }

    /// Index of the join anchor: the last historical point, shared by both
    /// series.
    pub fn anchor_index(&self) -> usize {
        self.historical.len() - 1
    }
}
