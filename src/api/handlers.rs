//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    services::{Settings, SettingsPatch},
    state::{AppState, QueryOutcome},
    timer::TimerAction,
};
use super::responses::{ApiResponse, HealthResponse, QueryRequest, StatusResponse};

/// Handle POST /query - Route a free-form text query
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let outcome = state.submit_query(&request.query).map_err(|e| {
        error!("Failed to handle query {:?}: {}", request.query, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let timer = state.snapshot();

    let (status, response) = match outcome {
        QueryOutcome::Started => {
            (StatusCode::OK, ApiResponse::ok(format!("Timer started for {}", timer.target), timer))
        }
        QueryOutcome::Stopped => (StatusCode::OK, ApiResponse::ok("Timer stopped".to_string(), timer)),
        QueryOutcome::Applied(action) => {
            info!("Query {:?} applied as {:?}", request.query, action);
            let message = match action {
                TimerAction::Set(_) => format!("Timer set to {}", timer.target),
                TimerAction::Add(delta) => format!("Timer adjusted by {} to {}", delta, timer.target),
            };
            (StatusCode::OK, ApiResponse::ok(message, timer).with_action(action))
        }
        QueryOutcome::Rejected(e) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ApiResponse::error(e.to_string(), timer))
        }
    };
    Ok((status, Json(response)))
}

/// Handle POST /start - Start counting down from the current target
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start() {
        Ok(true) => Ok(Json(ApiResponse::ok("Timer started".to_string(), state.snapshot()))),
        Ok(false) => Ok(Json(ApiResponse::unchanged("Timer already running".to_string(), state.snapshot()))),
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /stop - Stop the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.stop() {
        Ok(true) => Ok(Json(ApiResponse::ok("Timer stopped".to_string(), state.snapshot()))),
        Ok(false) => Ok(Json(ApiResponse::unchanged("Timer was not running".to_string(), state.snapshot()))),
        Err(e) => {
            error!("Failed to stop timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /alarm/stop - Dismiss the alarm
pub async fn stop_alarm_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.stop_alarm() {
        Ok(()) => Ok(Json(ApiResponse::ok("Alarm stopped".to_string(), state.snapshot()))),
        Err(e) => {
            error!("Failed to stop alarm: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        display: timer.display().to_string(),
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /settings - Return the persisted settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, StatusCode> {
    state.get_settings().map(Json).map_err(|e| {
        error!("Failed to read settings: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle PUT /settings - Update sound settings
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, StatusCode> {
    state.update_settings(&patch).map(Json).map_err(|e| {
        error!("Failed to update settings: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
