//! The poll loop: one cycle on startup, then one per tick.
//!
//! A cycle runs two independent chains. The metrics chain fetches the KPI
//! window, updates the KPI panel, then fetches the forecast, merges the
//! timeline and updates the chart; the anomaly chain fetches and renders the
//! anomaly table. Each chain fails on its own: a dead forecast endpoint
//! leaves the anomaly panel updating normally, and vice versa.
//!
//! Cycles never overlap. The loop awaits each cycle to completion before
//! sleeping for the next tick, and missed ticks are skipped rather than
//! queued, so a backend slower than the poll interval degrades to a slower
//! effective cadence instead of interleaved chart updates.

use crate::anomaly::AnomalyPanel;
use crate::chart::ChartHandle;
use crate::client::DashClient;
use crate::error::DashError;
use crate::kpi::KpiSnapshot;
use crate::render::{Chain, RenderSink};
use crate::timeline::Timeline;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Polling parameters. The interval is a parameter, not a constant; the
/// reference deployment runs at 5s.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Pause between cycles.
    pub interval: Duration,
    /// How many trailing months of KPI data to request.
    pub window: usize,
    /// Metric the anomaly detector scores ("cpl" or "roi").
    pub anomaly_metric: String,
    /// Z-score threshold above which a month is flagged.
    pub anomaly_threshold: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            window: 12,
            anomaly_metric: "cpl".to_string(),
            anomaly_threshold: 2.5,
        }
    }
}

pub struct Poller {
    client: DashClient,
    config: PollConfig,
}

impl Poller {
    pub fn new(client: DashClient, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Run forever: one cycle immediately, then one per interval tick.
    ///
    /// The chart handle is owned by the caller and threaded through every
    /// cycle; it is initialized by the first successful metrics chain and
    /// mutated in place from then on.
    pub async fn run(&self, chart: &mut ChartHandle, sink: &mut (dyn RenderSink + '_)) {
        // tokio panics on a zero interval; clamp to 1ms.
        let interval = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            // The first tick completes immediately, giving the startup cycle.
            ticker.tick().await;
            self.run_cycle(chart, sink).await;
        }
    }

    /// Execute one full cycle: both chains, each isolated at its boundary.
    pub async fn run_cycle(&self, chart: &mut ChartHandle, sink: &mut (dyn RenderSink + '_)) {
        if let Err(error) = self.metrics_chain(chart, sink).await {
            warn!(chain = %Chain::Metrics, %error, "chain failed; panels keep their previous render");
            sink.chain_error(Chain::Metrics, &error);
        }
        if let Err(error) = self.anomaly_chain(sink).await {
            warn!(chain = %Chain::Anomalies, %error, "chain failed; panels keep their previous render");
            sink.chain_error(Chain::Anomalies, &error);
        }
        sink.cycle_complete();
    }

    /// metrics fetch → KPI update → forecast fetch → merge → chart update.
    ///
    /// The metrics response is passed by value down the chain, so the chart
    /// never observes a forecast paired with a stale metrics window.
    async fn metrics_chain(
        &self,
        chart: &mut ChartHandle,
        sink: &mut (dyn RenderSink + '_),
    ) -> Result<(), DashError> {
        let metrics = self.client.metrics(self.config.window).await?;
        let kpis = KpiSnapshot::from_latest(&metrics)?;
        sink.kpis(&kpis);

        let forecast = self.client.forecast().await?;
        let timeline = Timeline::merge(&metrics, &forecast)?;
        chart.apply(&timeline);
        sink.chart(chart);

        debug!(
            months = timeline.labels.len(),
            generation = chart.generation(),
            "metrics chain complete"
        );
        Ok(())
    }

    /// anomalies fetch → anomaly panel update.
    async fn anomaly_chain(&self, sink: &mut (dyn RenderSink + '_)) -> Result<(), DashError> {
        let anomalies = self
            .client
            .anomalies(&self.config.anomaly_metric, self.config.anomaly_threshold)
            .await?;
        let panel = AnomalyPanel::from_response(&anomalies);
        sink.anomalies(&panel);

        debug!(flagged = panel.rows.len(), "anomaly chain complete");
        Ok(())
    }
}
