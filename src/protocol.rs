//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable so a front end can evolve independently.

use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;
use crate::config::QuizRules;
use crate::domain::{Category, CategoryFilter, Mode, Question};
use crate::session::{AnswerFeedback, Phase, QuizSession};

/// Question as shown while it is being asked (no answer, no explanation).
#[derive(Debug, Serialize)]
pub struct QuestionOut {
  pub id: usize,
  pub category: Category,
  pub text: String,
  pub options: Vec<String>,
}

pub fn to_out(q: &Question) -> QuestionOut {
  QuestionOut {
    id: q.id,
    category: q.category.clone(),
    text: q.text.clone(),
    options: q.options.clone(),
  }
}

/// Full read-back of the session after every request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
  pub phase: Phase,
  pub mode: Option<Mode>,
  pub category: Option<CategoryFilter>,
  /// 0-based index of the current question.
  pub index: usize,
  pub total: u32,
  /// Fraction of questions already passed, in [0, 1].
  pub progress: f64,
  pub score: u32,
  pub revealed: bool,
  pub question: Option<QuestionOut>,
  pub feedback: Option<AnswerFeedback>,
}

pub fn session_out(s: &QuizSession) -> SessionOut {
  let started = s.phase() != Phase::NotStarted;
  let total = s.total();
  let progress = match s.phase() {
    Phase::NotStarted => 0.0,
    Phase::Finished => 1.0,
    _ if total == 0 => 0.0,
    _ => s.current_index() as f64 / f64::from(total),
  };
  SessionOut {
    phase: s.phase(),
    mode: started.then(|| s.mode()),
    category: started.then(|| s.category_filter().clone()),
    index: s.current_index(),
    total,
    progress,
    score: s.score(),
    revealed: s.is_revealed(),
    question: s.current_question().ok().map(to_out),
    feedback: s.feedback(),
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeOut {
  pub mode: Mode,
  pub target_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankOut {
  pub total_questions: usize,
  pub categories: Vec<CategoryFilter>,
  pub modes: Vec<ModeOut>,
  pub pass_threshold: f64,
}

pub fn bank_out(bank: &QuestionBank, rules: &QuizRules) -> BankOut {
  BankOut {
    total_questions: bank.len(),
    categories: bank.filter_options(),
    modes: Mode::ALL
      .iter()
      .map(|&mode| ModeOut { mode, target_count: rules.target_count(mode) })
      .collect(),
    pass_threshold: rules.pass_threshold,
  }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct StartIn {
  pub mode: Mode,
  #[serde(default)]
  pub category: CategoryFilter,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  /// Bare label ("2") or a full option ("2) ...").
  pub choice: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
  pub error: &'static str,
  pub message: String,
}
