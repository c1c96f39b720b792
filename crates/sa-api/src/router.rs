use axum::{Router, http::StatusCode, middleware, response::IntoResponse, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::{
    deck,
    metrics::{metrics_handler, track_metrics},
    middleware::{create_cors_layer, request_id_middleware},
    quiz,
    state::ApiState,
    summary,
};

/// All routes of the service, still waiting for their state
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(deck::routes())
        .merge(quiz::routes())
        .merge(summary::routes())
        .fallback(handler_404)
}

/// The complete application: routes, state, and the middleware stack.
///
/// `/metrics` is only mounted when a Prometheus recorder was installed.
pub fn app(
    state: ApiState,
    metrics: Option<PrometheusHandle>,
    allowed_origins: &[String],
) -> Router {
    let mut app = router().with_state(state);

    if let Some(handle) = metrics {
        app = app.merge(
            Router::new()
                .route("/metrics", get(metrics_handler))
                .with_state(handle),
        );
    }

    app.layer(create_cors_layer(allowed_origins))
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
