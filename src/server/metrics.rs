use anyhow::{Context, Result};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;
use tracing::info;

use crate::dataset::LoadReport;

/// Metric name prefix for all nutrition server metrics
const PREFIX: &str = "nutrition";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Dataset Metrics
    pub static ref DATASET_ROWS: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_dataset_rows"), "Rows in the loaded dataset"),
        &["kind"]
    ).expect("Failed to create dataset_rows metric");

    pub static ref DATASET_DIET_TYPES: Gauge = Gauge::new(
        format!("{PREFIX}_dataset_diet_types"),
        "Distinct diet types with at least one valid row"
    ).expect("Failed to create dataset_diet_types metric");

    // Error Metrics
    pub static ref QUERY_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_query_errors_total"), "Rejected requests by offending parameter"),
        &["parameter"]
    ).expect("Failed to create query_errors_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DATASET_ROWS.clone()));
    let _ = REGISTRY.register(Box::new(DATASET_DIET_TYPES.clone()));
    let _ = REGISTRY.register(Box::new(QUERY_ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    info!("Metrics system initialized successfully");
}

/// Publish the shape of the loaded dataset
pub fn init_dataset_metrics(report: &LoadReport, diet_types: usize) {
    DATASET_ROWS
        .with_label_values(&["total"])
        .set(report.total_rows as f64);
    DATASET_ROWS
        .with_label_values(&["valid"])
        .set(report.valid_rows as f64);
    DATASET_ROWS
        .with_label_values(&["skipped"])
        .set(report.skipped_rows() as f64);
    DATASET_DIET_TYPES.set(diet_types as f64);

    info!(
        "Dataset metrics initialized: {} rows, {} valid, {} diet types",
        report.total_rows, report.valid_rows, diet_types
    );
}

/// API routes reported under their own path.
const API_ENDPOINTS: &[&str] = &[
    "/api/health",
    "/api/nutrition/summary",
    "/api/nutrition/all",
    "/api/nutrition/insights",
    "/api/recipes",
    "/api/recipes/top",
    "/api/recipes/top-protein",
    "/api/clusters",
];

/// Collapses a request onto a fixed set of endpoint labels. Anything that
/// did not hit a route is `unmatched`, served static files are `frontend`.
pub fn categorize_endpoint(path: &str, status: u16) -> &'static str {
    if let Some(endpoint) = API_ENDPOINTS.iter().find(|e| **e == path) {
        return endpoint;
    }
    if status == StatusCode::NOT_FOUND.as_u16() || path == "/api" || path.starts_with("/api/") {
        return "unmatched";
    }
    if path == "/" {
        return "/";
    }
    "frontend"
}

/// Record an HTTP request
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// Record a request rejected because of `parameter`
pub fn record_query_error(parameter: &str) {
    QUERY_ERRORS_TOTAL.with_label_values(&[parameter]).inc();
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<f64>().ok());
            if let Some(kb) = rss_kb {
                PROCESS_MEMORY_BYTES.set(kb * 1024.0);
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves `/metrics` on its own port so scraping stays off the public API.
pub async fn run_metrics_server(host: &str, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind metrics server to {}:{}", host, port))?;
    info!("Metrics available at {}:{}/metrics", host, port);
    axum::serve(listener, make_metrics_app()).await?;
    Ok(())
}
