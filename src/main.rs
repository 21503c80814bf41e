//! Radio Operator Exam Quiz · Backend
//!
//! - Loads the multiple-choice question bank (CSV) once at startup
//! - Runs one quiz session at a time: practice (50) or exam (27) questions,
//!   optionally narrowed to a single category
//! - Exposes the session as a small JSON API for a browser front end
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   QUIZ_CONFIG_PATH : path to TOML config (bank path + quiz rules)
//!   QUIZ_BANK_PATH   : question bank CSV, overrides the config (default "quiz_data.csv")
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use radio_quiz_backend::config::load_config_from_env;
use radio_quiz_backend::routes::build_router;
use radio_quiz_backend::state::AppState;
use radio_quiz_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = load_config_from_env();

  // The bank is the only input; without it there is nothing to quiz on.
  let state = match AppState::from_config(&cfg) {
    Ok(state) => Arc::new(state),
    Err(e) => {
      error!(target: "quiz_backend", bank = %cfg.bank.path, error = %e, "Failed to load question bank");
      return Err(e.into());
    }
  };

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "quiz_backend", error = %e, "Failed to listen for shutdown signal");
  }
  info!(target: "quiz_backend", "Shutting down");
}
