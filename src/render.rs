//! Render sinks: the seam between the poll loop and whatever surface draws
//! the dashboard.
//!
//! The poll loop only ever calls a sink on chain success (plus the error
//! hook), so a failed chain leaves that panel's previous render untouched —
//! the display simply does not update that tick.

use crate::anomaly::AnomalyPanel;
use crate::chart::ChartHandle;
use crate::error::DashError;
use crate::kpi::KpiSnapshot;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Which of the two independent per-cycle chains an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Metrics,
    Anomalies,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Metrics => write!(f, "metrics"),
            Chain::Anomalies => write!(f, "anomalies"),
        }
    }
}

/// Render surface for the poll loop. Implementations receive each panel's
/// data as it becomes available within a cycle.
pub trait RenderSink: Send {
    fn kpis(&mut self, kpis: &KpiSnapshot);
    fn chart(&mut self, chart: &ChartHandle);
    fn anomalies(&mut self, panel: &AnomalyPanel);
    /// Called when a chain fails; the chain's remaining panels keep their
    /// previous state for this cycle.
    fn chain_error(&mut self, chain: Chain, error: &DashError);
    /// Called once at the end of every cycle, successful or not.
    fn cycle_complete(&mut self) {}
}

/// Snapshot of everything the TUI needs to draw one frame. Written by the
/// poll task, read by the draw loop.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub kpis: Option<KpiSnapshot>,
    pub chart: Option<ChartView>,
    pub anomalies: Option<AnomalyPanel>,
    pub cycle_count: u64,
    pub last_error: Option<String>,
}

/// Plain-data copy of the live chart, detached from the handle so the draw
/// loop never touches the poll task's state.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub labels: Vec<String>,
    pub actual: Vec<(f64, f64)>,
    pub forecast: Vec<(f64, f64)>,
    pub y_bounds: (f64, f64),
    pub generation: u64,
}

/// Lock a mutex, recovering the data if a previous holder panicked. The state
/// is display-only, so a torn-but-consistent snapshot beats propagating the
/// poison.
pub fn safe_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Sink that publishes into shared state for a terminal draw loop.
pub struct SharedStateSink {
    state: Arc<Mutex<DashboardState>>,
}

impl SharedStateSink {
    pub fn new(state: Arc<Mutex<DashboardState>>) -> Self {
        Self { state }
    }
}

impl RenderSink for SharedStateSink {
    fn kpis(&mut self, kpis: &KpiSnapshot) {
        safe_lock(&self.state).kpis = Some(kpis.clone());
    }

    fn chart(&mut self, chart: &ChartHandle) {
        if let Some(live) = chart.live() {
            safe_lock(&self.state).chart = Some(ChartView {
                labels: live.labels().to_vec(),
                actual: live.actual_points(),
                forecast: live.forecast_points(),
                y_bounds: live.y_bounds(),
                generation: chart.generation(),
            });
        }
    }

    fn anomalies(&mut self, panel: &AnomalyPanel) {
        safe_lock(&self.state).anomalies = Some(panel.clone());
    }

    fn chain_error(&mut self, chain: Chain, error: &DashError) {
        safe_lock(&self.state).last_error = Some(format!("{chain} chain: {error}"));
    }

    fn cycle_complete(&mut self) {
        safe_lock(&self.state).cycle_count += 1;
    }
}

/// Sink for headless runs: logs panel updates instead of drawing them.
#[derive(Debug, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn kpis(&mut self, kpis: &KpiSnapshot) {
        info!(
            month = %kpis.month,
            leads = kpis.leads,
            cpl = %kpis.cpl,
            roi = %kpis.roi,
            "kpi update"
        );
    }

    fn chart(&mut self, chart: &ChartHandle) {
        if let Some(live) = chart.live() {
            info!(
                points = live.labels().len(),
                generation = chart.generation(),
                "chart update"
            );
        }
    }

    fn anomalies(&mut self, panel: &AnomalyPanel) {
        if panel.is_empty() {
            info!("no anomalies; {}", panel.recommendation.advice());
        } else {
            info!(
                flagged = panel.rows.len(),
                headline = %panel.recommendation.headline(),
                "anomaly update"
            );
        }
    }

    fn chain_error(&mut self, _chain: Chain, _error: &DashError) {
        // The poll loop already logs chain failures at warn level.
    }
}
