pub mod anomaly;
pub mod chart;
pub mod client;
pub mod error;
pub mod kpi;
pub mod poller;
pub mod render;
pub mod timeline;
pub mod types;

pub use anomaly::{AnomalyPanel, AnomalyRow, Recommendation};
pub use chart::{ChartHandle, LiveChart};
pub use client::DashClient;
pub use error::DashError;
pub use kpi::KpiSnapshot;
pub use poller::{PollConfig, Poller};
pub use render::{
    safe_lock, Chain, ChartView, DashboardState, LogSink, RenderSink, SharedStateSink,
};
pub use timeline::Timeline;
pub use types::*;
