use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use passline::admissions::{admission_router, AdmissionRepository, AdmissionService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_admission_routes<R>(service: Arc<AdmissionService<R>>) -> axum::Router
where
    R: AdmissionRepository + 'static,
{
    admission_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::demo_repository;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        };
        let repository = Arc::new(demo_repository().expect("demo dataset"));
        with_admission_routes(Arc::new(AdmissionService::new(repository))).layer(Extension(state))
    }

    async fn status_of(app: axum::Router, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds")
        .status()
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        assert_eq!(status_of(app(false), "/ready").await, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(app(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_admission_routes_share_the_router() {
        assert_eq!(status_of(app(true), "/health").await, StatusCode::OK);
        assert_eq!(
            status_of(app(true), "/api/v1/students/150-811-442%2007/admission").await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(app(true), "/api/v1/headings/201/drain?percents=50,100").await,
            StatusCode::OK
        );
    }
}
