//! Shared test helpers: a stub metrics backend and sample-data constructors.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use respond_dash::{
    AnomaliesResponse, AnomalyPanel, AnomalyRecord, Chain, ChartHandle, DashError, ForecastPoint,
    ForecastResponse, KpiSnapshot, MetricPoint, MetricsResponse, RenderSink,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Creates a metrics window ending at 2025-07 with realistic values.
#[allow(dead_code)]
pub fn sample_metrics() -> MetricsResponse {
    MetricsResponse {
        data: vec![
            MetricPoint {
                month: "2025-05".to_string(),
                leads: 86,
                cpl: 420.75,
                roi: 0.18,
            },
            MetricPoint {
                month: "2025-06".to_string(),
                leads: 97,
                cpl: 398.4,
                roi: 0.21,
            },
            MetricPoint {
                month: "2025-07".to_string(),
                leads: 112,
                cpl: 451.2,
                roi: 0.195,
            },
        ],
    }
}

/// Creates a forecast continuing immediately after `sample_metrics`.
#[allow(dead_code)]
pub fn sample_forecast() -> ForecastResponse {
    ForecastResponse {
        forecast_monthly: vec![
            ForecastPoint {
                month: "2025-08".to_string(),
                leads_forecast: 118.3,
            },
            ForecastPoint {
                month: "2025-09".to_string(),
                leads_forecast: 125.1,
            },
        ],
    }
}

/// Creates one flagged month with an above-normal CPL.
#[allow(dead_code)]
pub fn sample_anomalies() -> AnomaliesResponse {
    AnomaliesResponse {
        anomalies: vec![AnomalyRecord {
            month: "2025-03".to_string(),
            cpl: 612.0,
            z_score: 2.87,
        }],
    }
}

/// Stub backend state shared with the axum handlers. Tests mutate the
/// response payloads and failure switches between cycles.
#[derive(Clone)]
#[allow(dead_code)]
pub struct StubBackend {
    pub metrics: Arc<Mutex<MetricsResponse>>,
    pub forecast: Arc<Mutex<ForecastResponse>>,
    pub anomalies: Arc<Mutex<AnomaliesResponse>>,
    /// When set, `/anomalies` answers HTTP 500.
    pub fail_anomalies: Arc<AtomicBool>,
    /// When set, `/forecast` answers 200 with a non-JSON body.
    pub garble_forecast: Arc<AtomicBool>,
    /// Last `n` received by `/metrics`.
    pub last_window: Arc<Mutex<Option<usize>>>,
    /// Artificial delay applied inside `/metrics`, for overlap tests.
    pub metrics_delay_ms: Arc<AtomicU64>,
    /// Requests currently inside `/metrics`.
    pub inflight: Arc<AtomicUsize>,
    /// High-water mark of `inflight`; stays at 1 when cycles never overlap.
    pub max_inflight: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl StubBackend {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(Mutex::new(sample_metrics())),
            forecast: Arc::new(Mutex::new(sample_forecast())),
            anomalies: Arc::new(Mutex::new(sample_anomalies())),
            fail_anomalies: Arc::new(AtomicBool::new(false)),
            garble_forecast: Arc::new(AtomicBool::new(false)),
            last_window: Arc::new(Mutex::new(None)),
            metrics_delay_ms: Arc::new(AtomicU64::new(0)),
            inflight: Arc::new(AtomicUsize::new(0)),
            max_inflight: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[allow(dead_code)]
async fn metrics_handler(
    State(stub): State<StubBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<MetricsResponse> {
    let entered = stub.inflight.fetch_add(1, Ordering::SeqCst) + 1;
    stub.max_inflight.fetch_max(entered, Ordering::SeqCst);

    let delay_ms = stub.metrics_delay_ms.load(Ordering::SeqCst);
    if delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }

    let window = params.get("n").and_then(|n| n.parse::<usize>().ok());
    *stub.last_window.lock().unwrap() = window;

    let full = stub.metrics.lock().unwrap().clone();
    let data = match window {
        Some(n) if n < full.data.len() => full.data[full.data.len() - n..].to_vec(),
        _ => full.data,
    };

    stub.inflight.fetch_sub(1, Ordering::SeqCst);
    Json(MetricsResponse { data })
}

#[allow(dead_code)]
async fn forecast_handler(State(stub): State<StubBackend>) -> axum::response::Response {
    if stub.garble_forecast.load(Ordering::SeqCst) {
        return (StatusCode::OK, "{not json").into_response();
    }
    Json(stub.forecast.lock().unwrap().clone()).into_response()
}

#[allow(dead_code)]
async fn anomalies_handler(State(stub): State<StubBackend>) -> axum::response::Response {
    if stub.fail_anomalies.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(stub.anomalies.lock().unwrap().clone()).into_response()
}

#[allow(dead_code)]
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Serve the stub backend on an ephemeral port; returns its base URL.
#[allow(dead_code)]
pub async fn spawn_backend(stub: StubBackend) -> String {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/forecast", get(forecast_handler))
        .route("/anomalies", get(anomalies_handler))
        .route("/health", get(health_handler))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });
    format!("http://{addr}")
}

/// Sink that records everything the poll loop pushes at it, so tests can
/// assert which panels updated in a given cycle.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingSink {
    pub kpis: Vec<KpiSnapshot>,
    pub chart_generations: Vec<u64>,
    pub chart_instance_ids: Vec<u64>,
    pub anomalies: Vec<AnomalyPanel>,
    pub errors: Vec<(Chain, String)>,
    pub cycles: u64,
}

#[allow(dead_code)]
impl RenderSink for RecordingSink {
    fn kpis(&mut self, kpis: &KpiSnapshot) {
        self.kpis.push(kpis.clone());
    }

    fn chart(&mut self, chart: &ChartHandle) {
        self.chart_generations.push(chart.generation());
        if let Some(live) = chart.live() {
            self.chart_instance_ids.push(live.instance_id());
        }
    }

    fn anomalies(&mut self, panel: &AnomalyPanel) {
        self.anomalies.push(panel.clone());
    }

    fn chain_error(&mut self, chain: Chain, error: &DashError) {
        self.errors.push((chain, error.to_string()));
    }

    fn cycle_complete(&mut self) {
        self.cycles += 1;
    }
}
