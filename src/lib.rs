//! Radio operator exam quiz: question bank, quiz session state machine and
//! the JSON API that drives it.

pub mod bank;
pub mod config;
pub mod domain;
pub mod error;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod session;
pub mod state;
pub mod telemetry;
