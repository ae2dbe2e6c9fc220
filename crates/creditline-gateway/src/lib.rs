pub mod auth;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use creditline_core::{CreditLine, CreditLineRegistry, NewCreditLine, RegistryError};
use creditline_platform::{CreateCreditLineRequest, DataResponse, ErrorBody, EvaluateRiskRequest};
use creditline_risk::{RiskEvaluation, evaluate_wallet};
use tracing::{error, info, warn};

use crate::auth::{ADMIN_ACTOR, require_admin};

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn CreditLineRegistry>,
    pub admin_api_key: Option<String>,
}

impl AppState {
    pub fn new(registry: Arc<dyn CreditLineRegistry>, admin_api_key: Option<String>) -> Self {
        Self {
            registry,
            admin_api_key,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let admin = middleware::from_fn_with_state(state.clone(), require_admin);

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/lines",
            get(list_lines).merge(post(create_line).route_layer(admin.clone())),
        )
        .route("/lines/{id}", get(get_line))
        .route(
            "/lines/{id}/suspend",
            post(suspend_line).route_layer(admin.clone()),
        )
        .route("/lines/{id}/close", post(close_line).route_layer(admin))
        .route("/risk/evaluate", post(evaluate_risk))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_lines(State(state): State<AppState>) -> Json<DataResponse<Vec<CreditLine>>> {
    Json(DataResponse::new(state.registry.list().await))
}

async fn get_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<CreditLine>>, ApiError> {
    let line = state.registry.get(&id).await.map_err(registry_error)?;
    Ok(Json(DataResponse::new(line)))
}

async fn create_line(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<DataResponse<CreditLine>>), ApiError> {
    let payload: CreateCreditLineRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateCreditLineRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(invalid_request)?
    };

    let mut input = match payload.id {
        Some(id) => NewCreditLine::with_id(id),
        None => NewCreditLine::generated(),
    };
    if let Some(status) = payload.status {
        input = input.status(status);
    }

    let line = state
        .registry
        .create(input.actor(ADMIN_ACTOR))
        .await
        .map_err(registry_error)?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(line, "Credit line created.")),
    ))
}

async fn suspend_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<CreditLine>>, ApiError> {
    let line = state
        .registry
        .suspend(&id, Some(ADMIN_ACTOR))
        .await
        .map_err(registry_error)?;

    Ok(Json(DataResponse::with_message(line, "Credit line suspended.")))
}

async fn close_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<CreditLine>>, ApiError> {
    let line = state
        .registry
        .close(&id, Some(ADMIN_ACTOR))
        .await
        .map_err(registry_error)?;

    Ok(Json(DataResponse::with_message(line, "Credit line closed.")))
}

async fn evaluate_risk(
    payload: Result<Json<EvaluateRiskRequest>, JsonRejection>,
) -> Result<Json<DataResponse<RiskEvaluation>>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| invalid_request(rejection.body_text()))?;
    let evaluation = evaluate_wallet(&payload.wallet_address).map_err(invalid_request)?;
    Ok(Json(DataResponse::new(evaluation)))
}

fn registry_error(err: RegistryError) -> ApiError {
    let status = match &err {
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::InvalidTransition { .. } | RegistryError::AlreadyExists { .. } => {
            StatusCode::CONFLICT
        }
        RegistryError::InvalidId => StatusCode::BAD_REQUEST,
        RegistryError::Storage(_) => return internal_error(&err),
    };

    if status == StatusCode::CONFLICT {
        warn!("credit line request rejected: {err}");
    } else {
        info!("credit line request failed: {err}");
    }

    (status, Json(ErrorBody::new(err.to_string())))
}

fn invalid_request(err: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(err.to_string())))
}

fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    error!("internal error: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("internal server error")),
    )
}
