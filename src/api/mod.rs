use axum::{
    Router,
    extract::{Json, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    Composer, FiSnapshot, ProjectionRequest, ScenarioState, SolverConfig, coast_number,
    display_percent, progress_percent, required_monthly_contribution, scenario_checksum,
    years_to_target,
};

#[derive(Debug, Clone)]
pub struct ApiContext {
    pub as_of_year: i32,
    pub solver: SolverConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioPayload {
    #[serde(default)]
    scenario: ScenarioState,
    as_of_year: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EffectiveRequestResponse {
    request: ProjectionRequest,
    checksum: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FiSnapshotResponse {
    #[serde(flatten)]
    snapshot: FiSnapshot,
    fi_progress_display: Option<f64>,
    coast_fi_progress_display: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YearsQuery {
    assets: f64,
    monthly_contribution: f64,
    target: f64,
    rate_percent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YearsResponse {
    years: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequiredQuery {
    assets: f64,
    target: f64,
    years: f64,
    rate_percent: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequiredResponse {
    monthly_contribution: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoastQuery {
    target: f64,
    years: f64,
    rate_percent: f64,
    assets: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoastResponse {
    coast_number: Option<f64>,
    progress: Option<f64>,
    is_coast_fi: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/effective-request", post(effective_request_handler))
        .route("/api/fi-snapshot", post(fi_snapshot_handler))
        .route("/api/solve/years", get(solve_years_handler))
        .route("/api/solve/required", get(solve_required_handler))
        .route("/api/solve/coast", get(solve_coast_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(ctx))
}

pub async fn run_http_server(port: u16, ctx: ApiContext) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, as_of_year = ctx.as_of_year, "scenario API listening");
    axum::serve(listener, router(ctx)).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn effective_request_handler(
    State(ctx): State<Arc<ApiContext>>,
    Json(payload): Json<ScenarioPayload>,
) -> Response {
    match effective_request(&ctx, payload) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn fi_snapshot_handler(
    State(ctx): State<Arc<ApiContext>>,
    Json(payload): Json<ScenarioPayload>,
) -> Response {
    match fi_snapshot(&ctx, payload) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn solve_years_handler(
    State(ctx): State<Arc<ApiContext>>,
    Query(query): Query<YearsQuery>,
) -> Response {
    match solve_years(&query, &ctx.solver) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn solve_required_handler(Query(query): Query<RequiredQuery>) -> Response {
    match solve_required(&query) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn solve_coast_handler(Query(query): Query<CoastQuery>) -> Response {
    match solve_coast(&query) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn compose_payload(
    ctx: &ApiContext,
    payload: &ScenarioPayload,
) -> Result<ProjectionRequest, String> {
    let composer = Composer::new(payload.as_of_year.unwrap_or(ctx.as_of_year));
    composer
        .compose_state(&payload.scenario)
        .ok_or_else(|| "plan is required".to_string())
}

fn effective_request(
    ctx: &ApiContext,
    payload: ScenarioPayload,
) -> Result<EffectiveRequestResponse, String> {
    let request = compose_payload(ctx, &payload)?;
    let checksum =
        scenario_checksum(&payload.scenario).ok_or_else(|| "plan is required".to_string())?;
    Ok(EffectiveRequestResponse { request, checksum })
}

fn fi_snapshot(ctx: &ApiContext, payload: ScenarioPayload) -> Result<FiSnapshotResponse, String> {
    let request = compose_payload(ctx, &payload)?;
    let snapshot = FiSnapshot::compute(&request, &payload.scenario.assets, &ctx.solver);
    Ok(FiSnapshotResponse {
        fi_progress_display: snapshot.fi_progress.map(display_percent),
        coast_fi_progress_display: snapshot.coast_fi_progress.map(display_percent),
        snapshot,
    })
}

fn require_finite(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{name} must be a finite number"))
    }
}

fn solve_years(query: &YearsQuery, solver: &SolverConfig) -> Result<YearsResponse, String> {
    require_finite("assets", query.assets)?;
    require_finite("monthlyContribution", query.monthly_contribution)?;
    require_finite("target", query.target)?;
    require_finite("ratePercent", query.rate_percent)?;
    if query.target <= 0.0 {
        return Err("target must be > 0".to_string());
    }
    Ok(YearsResponse {
        years: years_to_target(
            query.assets,
            query.monthly_contribution * 12.0,
            query.target,
            query.rate_percent / 100.0,
            solver,
        ),
    })
}

fn solve_required(query: &RequiredQuery) -> Result<RequiredResponse, String> {
    require_finite("assets", query.assets)?;
    require_finite("target", query.target)?;
    require_finite("years", query.years)?;
    require_finite("ratePercent", query.rate_percent)?;
    if query.years <= 0.0 {
        return Err("years must be > 0".to_string());
    }
    Ok(RequiredResponse {
        monthly_contribution: required_monthly_contribution(
            query.assets,
            query.target,
            query.years,
            query.rate_percent / 100.0,
        ),
    })
}

fn solve_coast(query: &CoastQuery) -> Result<CoastResponse, String> {
    require_finite("target", query.target)?;
    require_finite("years", query.years)?;
    require_finite("ratePercent", query.rate_percent)?;
    let coast = coast_number(query.target, query.years, query.rate_percent / 100.0);
    let progress = match (coast, query.assets) {
        (Some(coast), Some(assets)) => progress_percent(assets, coast),
        _ => None,
    };
    Ok(CoastResponse {
        coast_number: coast,
        progress,
        is_coast_fi: progress.is_some_and(|p| p >= 100.0),
    })
}
