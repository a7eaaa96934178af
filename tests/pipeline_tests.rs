//! End-to-end properties of the merge-and-render pipeline, exercised through
//! the public API without any network involved.

mod common;

use common::{sample_forecast, sample_metrics};
use respond_dash::{
    AnomaliesResponse, AnomalyPanel, AnomalyRecord, ChartHandle, ForecastPoint, ForecastResponse,
    KpiSnapshot, MetricPoint, MetricsResponse, Recommendation, Timeline,
};

#[test]
fn merged_axis_is_historical_then_forecast() {
    let metrics = sample_metrics();
    let forecast = sample_forecast();
    let timeline = Timeline::merge(&metrics, &forecast).unwrap();

    let expected_axis: Vec<String> = metrics
        .data
        .iter()
        .map(|p| p.month.clone())
        .chain(forecast.forecast_monthly.iter().map(|p| p.month.clone()))
        .collect();
    assert_eq!(timeline.labels, expected_axis);
    assert_eq!(timeline.overlay.len(), timeline.labels.len());

    // Null prefix up to the anchor, anchor duplicates the last historical
    // value, forecast values follow in order.
    let m = metrics.data.len();
    assert!(timeline.overlay[..m - 1].iter().all(|v| v.is_none()));
    assert_eq!(timeline.overlay[m - 1], Some(112.0));
    assert_eq!(timeline.overlay[m], Some(118.3));
    assert_eq!(timeline.overlay[m + 1], Some(125.1));
}

#[test]
fn single_point_history_joins_forecast_without_a_gap() {
    // The one-month scenario: the null prefix is empty and index 0 is the
    // join anchor directly.
    let metrics = MetricsResponse {
        data: vec![MetricPoint {
            month: "2025-01".to_string(),
            leads: 100,
            cpl: 10.5,
            roi: 0.2,
        }],
    };
    let forecast = ForecastResponse {
        forecast_monthly: vec![ForecastPoint {
            month: "2025-02".to_string(),
            leads_forecast: 120.0,
        }],
    };

    let timeline = Timeline::merge(&metrics, &forecast).unwrap();
    assert_eq!(timeline.labels, vec!["2025-01", "2025-02"]);
    assert_eq!(timeline.historical, vec![100.0]);
    assert_eq!(timeline.overlay, vec![Some(100.0), Some(120.0)]);

    let kpis = KpiSnapshot::from_latest(&metrics).unwrap();
    assert_eq!(kpis.leads, 100);
    assert_eq!(kpis.cpl, "10.50");
    assert_eq!(kpis.roi, "0.200");
}

#[test]
fn kpi_panel_shows_the_latest_month_with_fixed_decimals() {
    let kpis = KpiSnapshot::from_latest(&sample_metrics()).unwrap();
    assert_eq!(kpis.month, "2025-07");
    assert_eq!(kpis.leads, 112);
    assert_eq!(kpis.cpl, "451.20");
    assert_eq!(kpis.roi, "0.195");
}

#[test]
fn repeated_cycles_mutate_one_chart_instance() {
    let metrics = sample_metrics();
    let forecast = sample_forecast();
    let mut chart = ChartHandle::new();

    chart.apply(&Timeline::merge(&metrics, &forecast).unwrap());
    let first_id = chart.live().unwrap().instance_id();

    // A later cycle with a longer window grows the axis in place.
    let mut grown = metrics.clone();
    grown.data.push(MetricPoint {
        month: "2025-08".to_string(),
        leads: 119,
        cpl: 440.0,
        roi: 0.22,
    });
    let shifted = ForecastResponse {
        forecast_monthly: vec![ForecastPoint {
            month: "2025-09".to_string(),
            leads_forecast: 126.0,
        }],
    };
    chart.apply(&Timeline::merge(&grown, &shifted).unwrap());

    let live = chart.live().unwrap();
    assert_eq!(live.instance_id(), first_id);
    assert_eq!(chart.generation(), 2);
    assert_eq!(live.labels().len(), 5);
    assert_eq!(live.forecast_points(), vec![(3.0, 119.0), (4.0, 126.0)]);
}

#[test]
fn recommendation_tone_follows_the_first_record_only() {
    let above_first = AnomalyPanel::from_response(&AnomaliesResponse {
        anomalies: vec![
            AnomalyRecord {
                month: "2025-02".to_string(),
                cpl: 700.0,
                z_score: 3.4,
            },
            AnomalyRecord {
                month: "2025-04".to_string(),
                cpl: 150.0,
                z_score: -2.9,
            },
        ],
    });
    assert_eq!(
        above_first.recommendation,
        Recommendation::AboveNormal { z_score: 3.4 }
    );
    // Rows stay in received order even though the headline ignores all but
    // the first.
    assert_eq!(above_first.rows[0].month, "2025-02");
    assert_eq!(above_first.rows[1].month, "2025-04");
    assert_eq!(above_first.rows[1].z_score, "-2.90");
}
