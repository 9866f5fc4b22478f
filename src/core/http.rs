//! Status server: health, metrics, latest cycle report and the trading switch

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::core::notifier::LatestReportStore;
use crate::core::runtime::TradingSwitch;
use crate::metrics::Metrics;
use crate::models::report::CycleReport;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub reports: Arc<LatestReportStore>,
    pub trading: TradingSwitch,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, reports: Arc<LatestReportStore>, trading: TradingSwitch) -> Self {
        Self {
            metrics,
            reports,
            trading,
            start_time: Arc::new(Instant::now()),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let last_cycle = state.reports.latest().map(|r| r.started_at);
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "perptrader",
        "trading_enabled": state.trading.is_enabled(),
        "cycle_in_flight": state.metrics.cycle_in_flight.get() > 0,
        "last_cycle_at": last_cycle,
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn latest_cycle(State(state): State<AppState>) -> Result<Json<CycleReport>, StatusCode> {
    state
        .reports
        .latest()
        .map(|report| Json(report.as_ref().clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn trading_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "trading_enabled": state.trading.is_enabled() }))
}

pub async fn start_trading(State(state): State<AppState>) -> Json<Value> {
    state.trading.set(true);
    info!("trading enabled via API");
    Json(json!({ "trading_enabled": true }))
}

pub async fn stop_trading(State(state): State<AppState>) -> Json<Value> {
    state.trading.set(false);
    info!("trading disabled via API");
    Json(json!({ "trading_enabled": false }))
}

async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    state.metrics.http_requests_in_flight.dec();

    let duration = start.elapsed();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if response.status().is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %response.status(),
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/cycle/latest", get(latest_cycle))
        .route("/api/trading", get(trading_status))
        .route("/api/trading/start", post(start_trading))
        .route("/api/trading/stop", post(stop_trading))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
