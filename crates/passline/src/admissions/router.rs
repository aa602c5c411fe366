use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{DrainPercent, HeadingId, Scenario, StudentId};
use super::repository::AdmissionRepository;
use super::service::{AdmissionError, AdmissionService};

/// Router builder exposing admission lookups and drain tables.
pub fn admission_router<R>(service: Arc<AdmissionService<R>>) -> Router
where
    R: AdmissionRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/students/:student_id/admission",
            get(lookup_handler::<R>),
        )
        .route("/api/v1/headings/:heading_id", get(heading_handler::<R>))
        .route(
            "/api/v1/headings/:heading_id/drain",
            get(drain_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LookupParams {
    #[serde(default)]
    pub(crate) scenario: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DrainParams {
    #[serde(default)]
    pub(crate) percents: Option<String>,
}

pub(crate) async fn lookup_handler<R>(
    State(service): State<Arc<AdmissionService<R>>>,
    Path(student_id): Path<String>,
    Query(params): Query<LookupParams>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    let scenario = match params.scenario.as_deref().map(str::parse::<Scenario>) {
        None => Scenario::Primary,
        Some(Ok(scenario)) => scenario,
        Some(Err(err)) => return bad_request(err.to_string()),
    };

    match service.lookup(&StudentId(student_id), scenario) {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn heading_handler<R>(
    State(service): State<Arc<AdmissionService<R>>>,
    Path(heading_id): Path<String>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    let heading_id = match parse_heading_id(&heading_id) {
        Ok(heading_id) => heading_id,
        Err(message) => return bad_request(message),
    };

    match service.heading_summary(heading_id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn drain_handler<R>(
    State(service): State<Arc<AdmissionService<R>>>,
    Path(heading_id): Path<String>,
    Query(params): Query<DrainParams>,
) -> Response
where
    R: AdmissionRepository + 'static,
{
    let heading_id = match parse_heading_id(&heading_id) {
        Ok(heading_id) => heading_id,
        Err(message) => return bad_request(message),
    };
    let percents = match params.percents.as_deref().map(parse_percents) {
        None => None,
        Some(Ok(percents)) => Some(percents),
        Some(Err(message)) => return bad_request(message),
    };

    match service.drain_table(heading_id, percents.as_deref()) {
        Ok(table) => (StatusCode::OK, axum::Json(table)).into_response(),
        Err(err) => error_response(err),
    }
}

fn parse_heading_id(raw: &str) -> Result<HeadingId, String> {
    raw.trim()
        .parse::<u64>()
        .map(HeadingId)
        .map_err(|_| format!("invalid heading id '{raw}'"))
}

/// Parses a comma separated list such as `33,50,66`.
pub fn parse_percents(raw: &str) -> Result<Vec<DrainPercent>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .trim_end_matches('%')
                .parse::<u8>()
                .ok()
                .and_then(DrainPercent::new)
                .ok_or_else(|| format!("invalid drain percent '{value}'"))
        })
        .collect()
}

fn bad_request(message: String) -> Response {
    let payload = json!({
        "error": message,
        "kind": "BAD_REQUEST",
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(err: AdmissionError) -> Response {
    let status = match err {
        AdmissionError::StudentNotFound(_) | AdmissionError::HeadingNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        AdmissionError::DataError(_) => StatusCode::BAD_GATEWAY,
        AdmissionError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    };
    let payload = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    (status, axum::Json(payload)).into_response()
}
