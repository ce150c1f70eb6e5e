//! Integration tests: drive the router end to end with tower's `oneshot`.

use ai_adoption_dashboard::data::DataLoader;
use ai_adoption_dashboard::web::{router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

const FIXTURE: &str = "\
ano,empresa,setor,pais_sede,investimento_ia_usd_milhoes,crescimento_lucro_%,nota_inovacao,principais_usos_ia,impacto_operacional
2015,Nubank,Finanças,Brasil,10.5,5.2,7.1,Análise de crédito,Médio
2016,Nubank,Finanças,Brasil,20.0,6.8,7.6,Detecção de fraudes,Alto
2015,SAP,Tecnologia,Alemanha,300.0,3.1,8.4,Automação de processos,Alto
2016,SAP,Tecnologia,Alemanha,340.0,3.9,8.7,Automação de processos,Alto
2017,SAP,Tecnologia,Alemanha,390.0,4.2,8.9,IA generativa,Alto
";

fn fixture_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("avanco_ia_empresas.csv");
    fs::write(&path, FIXTURE).unwrap();
    let state = AppState::load(&path);
    (dir, state)
}

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(state, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[test]
fn shipped_dataset_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/avanco_ia_empresas.csv");
    let dataset = DataLoader::load_csv(path).unwrap();

    assert_eq!(dataset.row_count(), 120);
    assert_eq!(dataset.year_bounds(), Some((2015, 2024)));
}

#[tokio::test]
async fn dashboard_opens_on_overview() {
    let (_dir, state) = fixture_state();

    let (status, body) = get(state, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Visão Geral"));
    assert!(body.contains("Plotly.newPlot"));
    assert!(body.contains(r#"value="Brasil" checked"#));
    assert!(body.contains("$1,060.50"));
}

#[tokio::test]
async fn company_page_shows_requested_company() {
    let (_dir, state) = fixture_state();

    let (status, body) = get(state, "/?page=company&company=SAP").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<option value="SAP" selected>"#));
    assert!(body.contains("$343.33"));
}

#[tokio::test]
async fn missing_file_is_reported_on_every_route() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::load(dir.path().join("avanco_ia_empresas.csv"));

    let (status, body) = get(state.clone(), "/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Data file not found"));

    let (status, json) = get_json(state.clone(), "/api/data").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("Data file not found"));

    let (status, json) = get_json(state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
}

#[tokio::test]
async fn health_reports_row_count() {
    let (_dir, state) = fixture_state();

    let (status, json) = get_json(state, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["rows"], 5);
    assert!(json["source"].as_str().unwrap().ends_with("avanco_ia_empresas.csv"));
}

#[tokio::test]
async fn api_data_keeps_only_selected_years() {
    let (_dir, state) = fixture_state();

    let (status, json) = get_json(state, "/api/data?year_from=2016&year_to=2016").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    let rows = json["rows"].as_array().unwrap();
    assert!(rows.iter().all(|row| row["ano"] == 2016));
}

#[tokio::test]
async fn api_data_filters_by_country() {
    let (_dir, state) = fixture_state();

    let (_, json) = get_json(
        state.clone(),
        "/api/data?applied=1&country=Alemanha&sector=Tecnologia&sector=Varejo",
    )
    .await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["filters"]["sectors"], serde_json::json!(["Tecnologia"]));

    let (_, json) = get_json(state, "/api/data?applied=1").await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn inverted_year_range_is_a_bad_request() {
    let (_dir, state) = fixture_state();

    let (status, body) = get(state.clone(), "/?year_from=2017&year_to=2015").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid year range"));
    assert!(body.contains(r#"<form id="controls""#));

    let (status, _) = get(state, "/api/data?year_from=2017&year_to=2015").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_rejects_unknown_and_empty_charts() {
    let (_dir, state) = fixture_state();

    let (status, json) = get_json(state.clone(), "/export/pizza").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);

    let (status, _) = get(state, "/export/top-companies?applied=1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

async fn export(state: AppState, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn export_draws_svg_charts() {
    let (_dir, state) = fixture_state();

    for chart in ["investment-by-year", "top-companies", "sector-trends"] {
        let (status, content_type, body) = export(state.clone(), &format!("/export/{}", chart)).await;

        assert_eq!(status, StatusCode::OK, "{}", chart);
        assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
        assert!(body.trim_start().starts_with("<svg"), "{}", chart);
    }
}

#[tokio::test]
async fn export_draws_single_year_line() {
    let (_dir, state) = fixture_state();

    let (status, content_type, body) =
        export(state, "/export/investment-by-year?year_from=2017&year_to=2017").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
    assert!(body.trim_start().starts_with("<svg"));
}
