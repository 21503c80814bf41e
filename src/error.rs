//! Error types for bank loading, sampling and session transitions.

use thiserror::Error;

use crate::domain::Mode;
use crate::session::Phase;

/// Loading the question bank failed; the process cannot continue.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
  #[error("failed to read question bank '{path}': {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("malformed question bank: {0}")]
  Csv(#[from] csv::Error),
  #[error("record {record}: required field '{field}' is empty")]
  MissingField { record: usize, field: &'static str },
}

/// Errors emitted by bank sampling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
  #[error("cannot sample {requested} questions from an empty pool")]
  InsufficientPool { requested: usize },
}

/// Errors emitted by `QuizSession` transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
  #[error("cannot {action} while session is {phase}")]
  InvalidTransition { action: &'static str, phase: Phase },
  #[error("'{choice}' is not one of the current question's options")]
  InvalidChoice { choice: String },
  #[error("no questions configured for {mode} mode")]
  NoQuestionsRequested { mode: Mode },
  #[error(transparent)]
  Bank(#[from] BankError),
}
