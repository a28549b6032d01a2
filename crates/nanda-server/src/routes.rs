use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use nanda_core::error::{RegistryError, StoreError};
use nanda_core::types::{MetricsBundle, ReputationScore};
use nanda_reputation::score_trend;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::badge::{render_html_badge, render_svg_badge};
use crate::error::ServiceError;
use crate::plugin::Plugin;
use crate::AppState;

pub const REPUTATION_PLUGIN: &str = "reputation";

// ── Error helper ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    /// Request body that does not decode into the expected shape.
    BadRequest(String),
    NotFound(String),
    Service(ServiceError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Service(e) => match e {
                ServiceError::InvalidSubject(_)
                | ServiceError::Registry(RegistryError::UnknownAlgorithm(_))
                | ServiceError::Store(StoreError::InvalidSubject(_)) => StatusCode::BAD_REQUEST,
                ServiceError::Source(_) => StatusCode::BAD_GATEWAY,
                ServiceError::Config(_) | ServiceError::Registry(_) | ServiceError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::BadRequest(reason) => reason.clone(),
            Self::NotFound(subject) => format!("no score for subject {subject}"),
            Self::Service(e) => e.to_string(),
        };
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %message, "routes: request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Plugin ───────────────────────────────────────────────────────────────────

/// Scoring, history, anomaly and badge endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReputationPlugin;

impl Plugin for ReputationPlugin {
    fn name(&self) -> &str {
        REPUTATION_PLUGIN
    }

    fn capabilities(&self) -> Vec<String> {
        [
            "reputation.score",
            "reputation.refresh",
            "reputation.history",
            "reputation.anomalies",
            "reputation.badge",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn routes(&self) -> Router<AppState> {
        Router::new()
            .route("/api/reputation/:id", get(current_score).post(score_bundle))
            .route("/api/reputation/:id/history", get(history))
            .route("/api/reputation/:id/refresh", post(refresh))
            .route("/api/reputation/:id/anomalies", get(anomalies))
            .route("/api/badge/:id", get(svg_badge))
            .route("/api/badge/:id/html", get(html_badge))
    }
}

#[derive(Deserialize)]
struct AlgorithmQuery {
    algorithm: Option<String>,
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

fn current_or_404(s: &AppState, id: &str) -> Result<ReputationScore, ApiError> {
    s.service
        .current(id)?
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

// ── /api/reputation/:id ──────────────────────────────────────────────────────

async fn current_score(
    State(s): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ReputationScore> {
    Ok(Json(current_or_404(&s, &id)?))
}

async fn score_bundle(
    State(s): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<AlgorithmQuery>,
    payload: Result<Json<MetricsBundle>, JsonRejection>,
) -> ApiResult<ReputationScore> {
    let Json(bundle) = payload?;
    let score = s.service.score_bundle(&id, &bundle, q.algorithm.as_deref())?;
    Ok(Json(score))
}

// ── /api/reputation/:id/refresh ──────────────────────────────────────────────

async fn refresh(
    State(s): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<AlgorithmQuery>,
) -> ApiResult<ReputationScore> {
    let score = s.service.refresh(&id, q.algorithm.as_deref()).await?;
    Ok(Json(score))
}

// ── /api/reputation/:id/history?limit=N ──────────────────────────────────────

async fn history(
    State(s): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Value> {
    let limit = q.limit.unwrap_or(s.config.history_limit);
    let scores = s.service.history(&id, limit)?;
    Ok(Json(json!({
        "subject_id": id,
        "trend":      score_trend(&scores),
        "scores":     scores,
    })))
}

// ── /api/reputation/:id/anomalies ────────────────────────────────────────────

async fn anomalies(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let anomalies = s.service.anomalies(&id)?;
    Ok(Json(json!({
        "subject_id":  id,
        "z_threshold": s.config.scoring.outlier_z_threshold,
        "anomalies":   anomalies,
    })))
}

// ── /api/badge/:id ───────────────────────────────────────────────────────────

async fn svg_badge(
    State(s): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let score = current_or_404(&s, &id)?;
    let svg = render_svg_badge(&id, score.overall_score, score.verification_level());
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn html_badge(
    State(s): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let score = current_or_404(&s, &id)?;
    Ok(Html(render_html_badge(
        &id,
        score.overall_score,
        score.verification_level(),
    )))
}
