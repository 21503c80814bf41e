//! Quiz operations behind the HTTP handlers.
//!
//! Each function takes the session lock once, applies a single transition and
//! builds the read-back while still holding the guard.

use tracing::{info, instrument};

use crate::domain::{CategoryFilter, Mode};
use crate::error::SessionError;
use crate::protocol::{session_out, SessionOut};
use crate::session::QuizSummary;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn view_session(state: &AppState) -> SessionOut {
  let session = state.session.read().await;
  session_out(&session)
}

#[instrument(level = "info", skip_all, fields(%mode, %category))]
pub async fn start_quiz(state: &AppState, mode: Mode, category: CategoryFilter) -> Result<SessionOut, SessionError> {
  let mut session = state.session.write().await;
  session.start(&state.bank, mode, category)?;
  Ok(session_out(&session))
}

#[instrument(level = "info", skip(state, choice), fields(choice_len = choice.len()))]
pub async fn submit_answer(state: &AppState, choice: &str) -> Result<SessionOut, SessionError> {
  let mut session = state.session.write().await;
  let feedback = session.submit_answer(choice)?;
  info!(target: "quiz", index = session.current_index(), correct = feedback.correct, score = session.score(), "Answer submitted");
  Ok(session_out(&session))
}

#[instrument(level = "info", skip(state))]
pub async fn advance(state: &AppState) -> Result<SessionOut, SessionError> {
  let mut session = state.session.write().await;
  session.advance()?;
  Ok(session_out(&session))
}

#[instrument(level = "info", skip(state))]
pub async fn summary(state: &AppState) -> Result<QuizSummary, SessionError> {
  let session = state.session.read().await;
  let summary = session.summary()?;
  info!(target: "quiz", score = summary.score, total = summary.total, percent = %format!("{:.1}", summary.percent), passed = summary.passed, "Summary served");
  Ok(summary)
}

#[instrument(level = "info", skip(state))]
pub async fn reset(state: &AppState) -> SessionOut {
  let mut session = state.session.write().await;
  session.reset();
  session_out(&session)
}
