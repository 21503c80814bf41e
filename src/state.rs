//! Application state: the loaded question bank and the single quiz session.
//!
//! The bank is read-only for the lifetime of the process. The session sits
//! behind a write lock so each request applies one transition and reads the
//! result back before anyone else can observe it.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::bank::QuestionBank;
use crate::config::{QuizConfig, QuizRules};
use crate::error::LoadError;
use crate::session::QuizSession;

pub struct AppState {
  pub bank: Arc<QuestionBank>,
  pub rules: QuizRules,
  pub session: RwLock<QuizSession>,
}

impl AppState {
  pub fn new(bank: QuestionBank, rules: QuizRules) -> Self {
    Self {
      bank: Arc::new(bank),
      session: RwLock::new(QuizSession::new(rules.clone())),
      rules,
    }
  }

  /// Load the bank named by `cfg`; failures are fatal to the caller.
  #[instrument(level = "info", skip_all, fields(bank = %cfg.bank.path))]
  pub fn from_config(cfg: &QuizConfig) -> Result<Self, LoadError> {
    let bank = QuestionBank::load(&cfg.bank.path)?;
    for category in bank.categories() {
      let count = bank.filter(&crate::domain::CategoryFilter::Only(category.clone())).len();
      info!(target: "quiz_backend", %category, questions = count, "Startup question inventory");
    }
    Ok(Self::new(bank, cfg.rules.clone()))
  }
}
