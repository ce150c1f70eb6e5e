//! Dashboard Application
//! Shared state, HTTP routes and the server loop.

use crate::charts::{ChartPlotter, StaticChartRenderer};
use crate::config::Config;
use crate::data::{AdoptionRecord, DataLoader, DataProcessor, Dataset, FilterParams};
use crate::error::{DashboardError, Result};
use crate::web::chart_viewer::{ChartViewer, TOP_COMPANIES};
use crate::web::control_panel::ControlPanel;
use crate::web::html;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const EXPORT_SIZE: (u32, u32) = (1000, 600);

enum DataSource {
    Ready(Dataset),
    /// Loading failed at startup; the message is shown on every page.
    Failed(String),
}

/// Read-only state shared by all requests.
#[derive(Clone)]
pub struct AppState {
    data: Arc<DataSource>,
}

impl AppState {
    /// Load the dataset once. A failure is logged and kept so pages can report it.
    pub fn load(path: impl AsRef<std::path::Path>) -> Self {
        match DataLoader::load_csv(path) {
            Ok(dataset) => Self::from_dataset(dataset),
            Err(e) => {
                tracing::error!(error = %e, "failed to load dataset");
                Self::failed(e.to_string())
            }
        }
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            data: Arc::new(DataSource::Ready(dataset)),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            data: Arc::new(DataSource::Failed(message.into())),
        }
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        match self.data.as_ref() {
            DataSource::Ready(dataset) => Ok(dataset),
            DataSource::Failed(message) => Err(DashboardError::DataUnavailable(message.clone())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/data", get(filtered_data))
        .route("/export/{chart}", get(export_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The dashboard page. Errors are rendered inside the page, never as a bare response.
async fn dashboard(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let dataset = match state.dataset() {
        Ok(dataset) => dataset,
        Err(e) => return error_page("", &e),
    };

    let panel = ControlPanel::new(dataset);
    let controls = panel.parse(&pairs);
    let sidebar = panel.render(&controls);

    match ChartViewer::render(dataset.frame(), &controls) {
        Ok(main) => Html(html::document(&sidebar, &main)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to render page");
            error_page(&sidebar, &e)
        }
    }
}

fn error_page(sidebar: &str, error: &DashboardError) -> Response {
    let body = html::document(sidebar, &html::error_block(&error.to_string()));
    (error.status(), Html(body)).into_response()
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let status = match state.dataset() {
        Ok(dataset) => HealthStatus {
            status: "healthy",
            rows: dataset.row_count(),
            source: Some(dataset.source().display().to_string()),
            error: None,
        },
        Err(e) => HealthStatus {
            status: "degraded",
            rows: 0,
            source: None,
            error: Some(e.to_string()),
        },
    };
    Json(status)
}

#[derive(Debug, Serialize)]
pub struct FilteredData {
    pub total: usize,
    pub filters: FilterParams,
    pub rows: Vec<AdoptionRecord>,
}

/// Filtered rows as JSON, driven by the same query parameters as the page.
async fn filtered_data(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<FilteredData>> {
    let dataset = state.dataset()?;
    let controls = ControlPanel::new(dataset).parse(&pairs);
    let filtered = DataProcessor::filter(dataset.frame(), &controls.filters)?;
    let rows = DataProcessor::records(&filtered)?;

    Ok(Json(FilteredData {
        total: rows.len(),
        filters: controls.filters,
        rows,
    }))
}

/// Static SVG of a chart over the filtered rows.
async fn export_chart(
    State(state): State<AppState>,
    Path(chart): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response> {
    let dataset = state.dataset()?;
    let controls = ControlPanel::new(dataset).parse(&pairs);
    let filtered = DataProcessor::filter(dataset.frame(), &controls.filters)?;

    let spec = match chart.as_str() {
        "investment-by-year" => ChartPlotter::investment_by_year(&filtered)?,
        "top-companies" => ChartPlotter::top_companies(&filtered, TOP_COMPANIES)?,
        "sector-trends" => ChartPlotter::sector_trends(&filtered)?,
        _ => return Err(DashboardError::UnknownChart(chart)),
    };

    let (width, height) = EXPORT_SIZE;
    let svg = StaticChartRenderer::render_svg(&spec, width, height)?;
    tracing::info!(chart = %spec.id, bytes = svg.len(), "exported chart");

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

/// HTTP server for the dashboard.
pub struct DashboardServer {
    config: Config,
    state: AppState,
}

impl DashboardServer {
    pub fn new(config: Config, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind, open the browser unless headless, and serve until Ctrl+C.
    pub async fn start(self) -> Result<()> {
        let addr = self.config.address()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| DashboardError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        let url = self.config.url();
        tracing::info!("Dashboard available at {}", url);

        if !self.config.headless {
            if let Err(e) = open::that_detached(&url) {
                tracing::warn!(error = %e, "could not open a browser");
            }
        }

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DashboardError::Server(e.to_string()))?;

        tracing::info!("Dashboard stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
