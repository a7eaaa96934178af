//! Chart state handle: created once, mutated in place on every later cycle.
//!
//! Recreating the chart each cycle would restart animations and flicker the
//! panel, so the handle keeps its identity for the life of the process once
//! initialized. The caller owns the handle and threads it through every poll
//! cycle; nothing here is process-global.

use crate::timeline::Timeline;

/// Fraction of headroom above the tallest point when computing y-axis bounds.
const Y_AXIS_GRACE: f64 = 0.05;

/// Two-state chart: `Uninitialized` until the first successful timeline, then
/// `Live` forever. While `Live`, `apply` mutates the existing label and series
/// vectors rather than replacing the handle's contents wholesale.
#[derive(Debug, Default)]
pub struct ChartHandle {
    state: Option<LiveChart>,
    /// Total number of timelines applied, including the initializing one.
    generation: u64,
}

/// The live chart's data: merged axis labels plus the solid "actual" series
/// and the dashed "forecast" overlay.
#[derive(Debug)]
pub struct LiveChart {
    labels: Vec<String>,
    actual: Vec<f64>,
    forecast: Vec<Option<f64>>,
    /// Stable identity token assigned at initialization. Never changes while
    /// the handle lives; lets callers assert the chart was not recreated.
    instance_id: u64,
}

impl ChartHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one cycle's merged timeline into the chart. The first call
    /// initializes the chart; every later call updates the same instance in
    /// place.
    pub fn apply(&mut self, timeline: &Timeline) {
        self.generation += 1;
        match &mut self.state {
            None => {
                self.state = Some(LiveChart {
                    labels: timeline.labels.clone(),
                    actual: timeline.historical.clone(),
                    forecast: timeline.overlay.clone(),
                    instance_id: self.generation,
                });
            }
            Some(live) => {
                live.labels.clear();
                live.labels.extend_from_slice(&timeline.labels);
                live.actual.clear();
                live.actual.extend_from_slice(&timeline.historical);
                live.forecast.clear();
                live.forecast.extend_from_slice(&timeline.overlay);
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.state.is_some()
    }

    /// Number of timelines applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn live(&self) -> Option<&LiveChart> {
        self.state.as_ref()
    }
}

impl LiveChart {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Solid historical line as (index, value) points.
    pub fn actual_points(&self) -> Vec<(f64, f64)> {
        self.actual
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }

    /// Dashed forecast line as (index, value) points; absent overlay entries
    /// are skipped so the line begins at the join anchor.
    pub fn forecast_points(&self) -> Vec<(f64, f64)> {
        self.forecast
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect()
    }

    /// Y-axis bounds: floored at zero with a small headroom margin above the
    /// tallest point of either series.
    pub fn y_bounds(&self) -> (f64, f64) {
        let max = self
            .actual
            .iter()
            .copied()
            .chain(self.forecast.iter().filter_map(|v| *v))
            .fold(0.0_f64, f64::max);
        (0.0, max * (1.0 + Y_AXIS_GRACE))
    }
}
