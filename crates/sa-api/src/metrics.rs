//! Prometheus metrics for monitoring API performance and health.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;
use std::{sync::LazyLock, time::Instant};

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new();

    // Configure histogram buckets for request duration (in seconds)
    let builder = builder.set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ],
    )?;

    // Install the exporter and get the handle
    let handle = builder.install_recorder()?;

    Ok(handle)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Normalize path to avoid high cardinality (replace IDs with placeholders)
    let normalized_path = normalize_path(&path);

    // Track in-flight requests
    counter!("http_requests_in_flight", "method" => method.clone(), "path" => normalized_path.clone()).increment(1);

    // Process the request
    let response: Response = next.run(req).await;

    // Track request completion
    counter!("http_requests_in_flight", "method" => method.clone(), "path" => normalized_path.clone()).absolute(0);

    // Record metrics
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    // Request counter
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => normalized_path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    // Request duration histogram
    histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => normalized_path.clone(),
        "status" => status
    )
    .record(duration);

    response
}

/// Normalize URL paths to reduce cardinality in metrics
/// Replaces UUIDs and numeric IDs with placeholders
fn normalize_path(path: &str) -> String {
    static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("uuid pattern is valid")
    });
    static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"/\d+(/|$)").expect("number pattern is valid")
    });

    let normalized = UUID_RE.replace_all(path, ":id");
    NUMBER_RE.replace_all(&normalized, "/:id$1").to_string()
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Record a card review
pub fn record_card_review() {
    counter!("card_reviews_total").increment(1);
}

/// Record a scored quiz attempt (`manual`, `auto` or `direct`)
pub fn record_quiz_attempt(mode: &'static str) {
    counter!("quiz_attempts_total", "mode" => mode).increment(1);
}

/// Record generation content served from the fallback payload
pub fn record_generation_fallback(kind: &'static str) {
    counter!("generation_fallbacks_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/flashcards/decks/550e8400-e29b-41d4-a716-446655440000"),
            "/flashcards/decks/:id"
        );
        assert_eq!(normalize_path("/flashcards/decks/123"), "/flashcards/decks/:id");
        assert_eq!(
            normalize_path("/flashcards/decks/550e8400-e29b-41d4-a716-446655440000/cards/456"),
            "/flashcards/decks/:id/cards/:id"
        );
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(
            normalize_path("/quiz/sessions/550e8400-e29b-41d4-a716-446655440000/answers/2"),
            "/quiz/sessions/:id/answers/:id"
        );
    }
}
