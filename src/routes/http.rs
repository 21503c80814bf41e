//! HTTP endpoint handlers. These are thin wrappers that forward to quiz logic.
//! Each handler is instrumented; transition errors map to JSON error bodies.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::error::{BankError, SessionError};
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

/// Failures rendered as `{error, message}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
  Session(SessionError),
  /// Request body missing, not JSON, or not the expected shape.
  BadRequest(String),
}

impl From<SessionError> for ApiError {
  fn from(e: SessionError) -> Self { Self::Session(e) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, error, message) = match self {
      ApiError::Session(e) => {
        let (status, error) = match &e {
          SessionError::InvalidTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
          SessionError::InvalidChoice { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_choice"),
          SessionError::NoQuestionsRequested { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "no_questions"),
          SessionError::Bank(BankError::InsufficientPool { .. }) => (StatusCode::UNPROCESSABLE_ENTITY, "empty_pool"),
        };
        (status, error, e.to_string())
      }
      ApiError::BadRequest(message) => (StatusCode::UNPROCESSABLE_ENTITY, "bad_request", message),
    };
    warn!(target: "quiz", %status, error, %message, "Request rejected");
    (status, Json(ErrorOut { error, message })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_bank(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(bank_out(&state.bank, &state.rules))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::view_session(&state).await)
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_start(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<StartIn>, JsonRejection>,
) -> Result<Json<SessionOut>, ApiError> {
  let Json(body) = payload?;
  info!(target: "quiz", mode = %body.mode, category = %body.category, "HTTP start requested");
  let view = logic::start_quiz(&state, body.mode, body.category).await?;
  info!(target: "quiz", total = view.total, "HTTP quiz started");
  Ok(Json(view))
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<AnswerIn>, JsonRejection>,
) -> Result<Json<SessionOut>, ApiError> {
  let Json(body) = payload?;
  Ok(Json(logic::submit_answer(&state, &body.choice).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_advance(State(state): State<Arc<AppState>>) -> Result<Json<SessionOut>, ApiError> {
  Ok(Json(logic::advance(&state).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_summary(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(logic::summary(&state).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::reset(&state).await)
}
