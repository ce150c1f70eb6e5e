//! Web module - Browser dashboard served over HTTP

mod app;
mod chart_viewer;
mod control_panel;
pub mod html;

pub use app::{router, AppState, DashboardServer, FilteredData, HealthStatus};
pub use chart_viewer::{ChartViewer, EXPORTABLE, TOP_COMPANIES};
pub use control_panel::{ControlPanel, Controls, Page};
