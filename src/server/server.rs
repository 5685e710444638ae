use anyhow::{Context, Result};
use std::time::Duration;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{error, info};

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::{
    log_requests, make_nutrition_routes, metrics::run_metrics_server, state::*, ServerConfig,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub total_records: usize,
    pub valid_records: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub uptime: String,
    pub total_records: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let report = state.engine.report();
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        total_records: report.total_rows,
        valid_records: report.valid_rows,
    })
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        message: "Nutritional Insights API is running",
        uptime: format_uptime(state.start_time.elapsed()),
        total_records: state.engine.dataset().len(),
    })
}

fn make_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

pub fn make_app(config: ServerConfig, engine: GuardedEngine) -> Router {
    let state = ServerState::new(config.clone(), engine);

    let api_routes: Router = Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(make_nutrition_routes(state.clone()));

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/api", api_routes)
        .layer(make_cors_layer())
        .layer(middleware::from_fn_with_state(state, log_requests))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("Failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn run_server(
    config: ServerConfig,
    engine: GuardedEngine,
    metrics_port: u16,
) -> Result<()> {
    let metrics_host = config.host.clone();
    tokio::spawn(async move {
        if let Err(err) = run_metrics_server(&metrics_host, metrics_port).await {
            error!("Metrics server stopped: {:#}", err);
        }
    });

    let address = format!("{}:{}", config.host, config.port);
    let app = make_app(config, engine);

    let listener = tokio::net::TcpListener::bind(address.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Serving nutrition API on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
