use serde::{Deserialize, Serialize};

/// One aggregation bucket of the monthly KPI series.
///
/// `month` is an opaque, chronologically sortable period label ("2025-01").
/// The backend returns points ordered ascending by month with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub month: String,
    pub leads: i64,
    pub cpl: f64,
    pub roi: f64,
}

/// Body of `GET /metrics?n={count}`: the last `n` monthly KPI buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub data: Vec<MetricPoint>,
}

/// One forecast bucket; the series continues immediately after the last
/// historical month, no gap and no overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month: String,
    pub leads_forecast: f64,
}

/// Body of `GET /forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub forecast_monthly: Vec<ForecastPoint>,
}

/// One flagged month from the z-score anomaly detector. Positive `z_score`
/// means above-normal, negative means below-normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub month: String,
    pub cpl: f64,
    pub z_score: f64,
}

/// Body of `GET /anomalies?metric={name}&k={float}`. Unordered, may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomaliesResponse {
    pub anomalies: Vec<AnomalyRecord>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
