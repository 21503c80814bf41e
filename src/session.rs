//! Quiz session state machine.
//!
//! ```text
//! NotStarted --start--> Unanswered --submit_answer--> Revealed --advance--> Unanswered ...
//!                                                     Revealed --advance (last)--> Finished
//! any --reset--> NotStarted
//! ```
//!
//! Every question index carries its own `graded` flag, so repeated submits on
//! a revealed question never touch the tallies a second time.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::bank::{self, QuestionBank};
use crate::config::QuizRules;
use crate::domain::{choice_label, Category, CategoryFilter, Mode, Question};
use crate::error::SessionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  NotStarted,
  Unanswered,
  Revealed,
  Finished,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Phase::NotStarted => "not started",
      Phase::Unanswered => "awaiting an answer",
      Phase::Revealed => "showing the answer",
      Phase::Finished => "finished",
    })
  }
}

/// What the user sees after confirming an answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
  pub correct: bool,
  pub selected: String,
  pub answer_label: String,
  pub correct_option: String,
  pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
  pub category: Category,
  pub correct: u32,
  pub total: u32,
}

impl CategoryTally {
  pub fn percent(&self) -> f64 { percent(self.correct, self.total) }
}

/// A missed question together with the label the user picked.
#[derive(Clone, Debug, PartialEq)]
pub struct WrongAnswer {
  pub question: Arc<Question>,
  pub selected: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
  pub category: Category,
  pub correct: u32,
  pub total: u32,
  pub percent: f64,
}

/// Review entry for a missed question.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
  pub question_id: usize,
  pub category: Category,
  pub question: String,
  pub options: Vec<String>,
  pub selected: String,
  pub correct_option: String,
  pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
  pub mode: Mode,
  pub category: CategoryFilter,
  pub percent: f64,
  pub score: u32,
  pub total: u32,
  pub per_category: Vec<CategoryResult>,
  pub wrong_answers: Vec<ReviewItem>,
  pub passed: bool,
  pub pass_threshold: f64,
}

/// Per-question bookkeeping.
#[derive(Clone, Debug, Default)]
struct Slot {
  graded: bool,
  selected: Option<String>,
}

#[derive(Clone, Debug)]
pub struct QuizSession {
  rules: QuizRules,
  phase: Phase,
  mode: Mode,
  category_filter: CategoryFilter,
  questions: Vec<Arc<Question>>,
  slots: Vec<Slot>,
  current: usize,
  score: u32,
  tallies: Vec<CategoryTally>,
  wrong_answers: Vec<WrongAnswer>,
}

impl Default for QuizSession {
  fn default() -> Self { Self::new(QuizRules::default()) }
}

impl QuizSession {
  pub fn new(rules: QuizRules) -> Self {
    Self {
      rules,
      phase: Phase::NotStarted,
      mode: Mode::Practice,
      category_filter: CategoryFilter::All,
      questions: Vec::new(),
      slots: Vec::new(),
      current: 0,
      score: 0,
      tallies: Vec::new(),
      wrong_answers: Vec::new(),
    }
  }

  /// Draw the question set for `mode`/`filter` and begin at the first question.
  pub fn start(&mut self, bank: &QuestionBank, mode: Mode, filter: CategoryFilter) -> Result<(), SessionError> {
    self.start_with(bank, mode, filter, &mut rand::thread_rng())
  }

  #[instrument(level = "info", skip_all, fields(%mode, %filter))]
  pub fn start_with<R: Rng + ?Sized>(
    &mut self,
    bank: &QuestionBank,
    mode: Mode,
    filter: CategoryFilter,
    rng: &mut R,
  ) -> Result<(), SessionError> {
    self.expect_phase("start", &[Phase::NotStarted])?;

    let pool = bank.filter(&filter);
    let target = self.rules.target_count(mode);
    if target == 0 {
      return Err(SessionError::NoQuestionsRequested { mode });
    }
    let questions = bank::sample_with(&pool, target, rng)?;

    let rules = self.rules.clone();
    *self = Self::new(rules);
    self.slots = vec![Slot::default(); questions.len()];
    self.questions = questions;
    self.mode = mode;
    self.category_filter = filter;
    self.phase = Phase::Unanswered;
    info!(target: "quiz", %mode, category = %self.category_filter, pool = pool.len(), questions = self.questions.len(), "Quiz started");
    Ok(())
  }

  /// Grade `choice` against the current question and reveal the answer.
  ///
  /// The choice must name one of the question's options. Once revealed,
  /// further calls for the same question return the stored feedback without
  /// changing score or tallies.
  #[instrument(level = "debug", skip(self), fields(index = self.current))]
  pub fn submit_answer(&mut self, choice: &str) -> Result<AnswerFeedback, SessionError> {
    self.expect_phase("submit an answer", &[Phase::Unanswered, Phase::Revealed])?;

    let idx = self.current;
    if self.slots[idx].graded {
      debug!(target: "quiz", index = idx, "Answer already graded; ignoring resubmit");
      return self.feedback().ok_or(SessionError::InvalidTransition {
        action: "submit an answer",
        phase: self.phase,
      });
    }

    let question = Arc::clone(&self.questions[idx]);
    let selected = choice_label(choice).to_string();
    if !question.has_option(&selected) {
      return Err(SessionError::InvalidChoice { choice: choice.trim().to_string() });
    }
    let correct = question.is_correct(&selected);

    let tally = self.tally_mut(&question.category);
    tally.total += 1;
    tally.correct += u32::from(correct);
    if correct {
      self.score += 1;
    } else {
      self.wrong_answers.push(WrongAnswer { question: Arc::clone(&question), selected: selected.clone() });
    }

    self.slots[idx] = Slot { graded: true, selected: Some(selected) };
    self.phase = Phase::Revealed;
    debug!(target: "quiz", index = idx, question_id = question.id, correct, score = self.score, "Answer graded");

    self.feedback().ok_or(SessionError::InvalidTransition {
      action: "submit an answer",
      phase: self.phase,
    })
  }

  /// Feedback for the current question, once it has been answered.
  pub fn feedback(&self) -> Option<AnswerFeedback> {
    if self.phase != Phase::Revealed {
      return None;
    }
    let question = self.questions.get(self.current)?;
    let selected = self.slots.get(self.current)?.selected.clone()?;
    Some(AnswerFeedback {
      correct: question.is_correct(&selected),
      selected,
      answer_label: question.answer.clone(),
      correct_option: question.correct_option().to_string(),
      explanation: question.explanation.clone(),
    })
  }

  /// Move past the revealed question; finishes after the last one.
  #[instrument(level = "debug", skip(self), fields(index = self.current))]
  pub fn advance(&mut self) -> Result<Phase, SessionError> {
    self.expect_phase("advance", &[Phase::Revealed])?;
    if self.current + 1 < self.questions.len() {
      self.current += 1;
      self.phase = Phase::Unanswered;
    } else {
      self.phase = Phase::Finished;
      info!(target: "quiz", score = self.score, total = self.questions.len(), "Quiz finished");
    }
    Ok(self.phase)
  }

  pub fn summary(&self) -> Result<QuizSummary, SessionError> {
    self.expect_phase("summarize", &[Phase::Finished])?;

    let total = self.total();
    let pct = percent(self.score, total);
    let per_category = self
      .tallies
      .iter()
      .map(|t| CategoryResult { category: t.category.clone(), correct: t.correct, total: t.total, percent: t.percent() })
      .collect();
    let wrong_answers = self
      .wrong_answers
      .iter()
      .map(|w| ReviewItem {
        question_id: w.question.id,
        category: w.question.category.clone(),
        question: w.question.text.clone(),
        options: w.question.options.clone(),
        selected: w.selected.clone(),
        correct_option: w.question.correct_option().to_string(),
        explanation: w.question.explanation.clone(),
      })
      .collect();

    Ok(QuizSummary {
      mode: self.mode,
      category: self.category_filter.clone(),
      percent: pct,
      score: self.score,
      total,
      per_category,
      wrong_answers,
      passed: pct >= self.rules.pass_threshold,
      pass_threshold: self.rules.pass_threshold,
    })
  }

  /// Drop all session data and return to `NotStarted`.
  pub fn reset(&mut self) {
    if self.phase != Phase::NotStarted {
      info!(target: "quiz", phase = %self.phase, index = self.current, "Quiz reset");
    }
    let rules = self.rules.clone();
    *self = Self::new(rules);
  }

  pub fn phase(&self) -> Phase { self.phase }

  pub fn mode(&self) -> Mode { self.mode }

  pub fn category_filter(&self) -> &CategoryFilter { &self.category_filter }

  pub fn rules(&self) -> &QuizRules { &self.rules }

  pub fn current_index(&self) -> usize { self.current }

  pub fn total(&self) -> u32 { u32::try_from(self.questions.len()).unwrap_or(u32::MAX) }

  pub fn score(&self) -> u32 { self.score }

  pub fn is_revealed(&self) -> bool { self.phase == Phase::Revealed }

  pub fn is_finished(&self) -> bool { self.phase == Phase::Finished }

  pub fn questions(&self) -> &[Arc<Question>] { &self.questions }

  pub fn current_question(&self) -> Result<&Question, SessionError> {
    self.expect_phase("read the current question", &[Phase::Unanswered, Phase::Revealed])?;
    Ok(self.questions[self.current].as_ref())
  }

  pub fn category_tallies(&self) -> &[CategoryTally] { &self.tallies }

  pub fn wrong_answers(&self) -> &[WrongAnswer] { &self.wrong_answers }

  /// Number of questions graded so far (sum of category totals).
  pub fn graded_count(&self) -> u32 { self.tallies.iter().map(|t| t.total).sum() }

  fn expect_phase(&self, action: &'static str, allowed: &[Phase]) -> Result<(), SessionError> {
    if allowed.contains(&self.phase) {
      Ok(())
    } else {
      Err(SessionError::InvalidTransition { action, phase: self.phase })
    }
  }

  fn tally_mut(&mut self, category: &Category) -> &mut CategoryTally {
    let pos = match self.tallies.iter().position(|t| &t.category == category) {
      Some(pos) => pos,
      None => {
        self.tallies.push(CategoryTally { category: category.clone(), correct: 0, total: 0 });
        self.tallies.len() - 1
      }
    };
    &mut self.tallies[pos]
  }
}

fn percent(part: u32, whole: u32) -> f64 {
  if whole == 0 { 0.0 } else { 100.0 * f64::from(part) / f64::from(whole) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bank::tests::sample_bank;
  use crate::error::BankError;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::collections::HashSet;

  fn single_question_bank() -> QuestionBank {
    QuestionBank::from_questions(vec![Question {
      id: 0,
      category: Category::Engineering,
      text: "Pick bar".into(),
      options: vec!["1) foo".into(), "2) bar".into()],
      answer: "2".into(),
      explanation: "bar is right".into(),
    }])
  }

  fn started(bank: &QuestionBank, mode: Mode, filter: CategoryFilter) -> QuizSession {
    let mut session = QuizSession::default();
    session.start_with(bank, mode, filter, &mut StdRng::seed_from_u64(42)).unwrap();
    session
  }

  fn assert_tally_invariants(session: &QuizSession) {
    for t in session.category_tallies() {
      assert!(t.total >= t.correct);
    }
    let graded = session.graded_count();
    assert!(graded <= session.total());
    let expected = session.current_index() as u32 + u32::from(session.is_revealed() || session.is_finished());
    assert_eq!(graded, expected);
  }

  #[test]
  fn exam_over_small_bank_takes_whole_pool() {
    let bank = sample_bank();
    let session = started(&bank, Mode::Exam, CategoryFilter::All);
    assert_eq!(session.total(), 5);
    assert_eq!(session.phase(), Phase::Unanswered);
    let ids: HashSet<usize> = session.questions().iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), 5);
  }

  #[test]
  fn practice_filtered_to_engineering() {
    let bank = sample_bank();
    let session = started(&bank, Mode::Practice, CategoryFilter::Only(Category::Engineering));
    assert_eq!(session.total(), 3);
    assert!(session.questions().iter().all(|q| q.category == Category::Engineering));
  }

  #[test]
  fn session_length_follows_rules_target() {
    let bank = sample_bank();
    let mut session = QuizSession::new(QuizRules { exam_questions: 2, ..QuizRules::default() });
    session.start(&bank, Mode::Exam, CategoryFilter::All).unwrap();
    assert_eq!(session.total(), 2);
  }

  #[test]
  fn start_on_empty_pool_fails_and_stays_not_started() {
    let bank = sample_bank();
    let mut session = QuizSession::default();
    let err = session.start(&bank, Mode::Exam, CategoryFilter::from("Safety")).unwrap_err();
    assert_eq!(err, SessionError::Bank(BankError::InsufficientPool { requested: 27 }));
    assert_eq!(session.phase(), Phase::NotStarted);
  }

  #[test]
  fn correct_answer_scenario() {
    let bank = single_question_bank();
    let mut session = started(&bank, Mode::Exam, CategoryFilter::All);

    let fb = session.submit_answer("2").unwrap();
    assert!(fb.correct);
    assert_eq!(fb.correct_option, "2) bar");
    assert_eq!(session.score(), 1);
    assert_eq!(session.category_tallies()[0], CategoryTally { category: Category::Engineering, correct: 1, total: 1 });
    assert!(session.wrong_answers().is_empty());

    assert_eq!(session.advance().unwrap(), Phase::Finished);
    assert!(session.is_finished());
    let summary = session.summary().unwrap();
    assert_eq!(summary.percent, 100.0);
    assert!(summary.passed);
    assert_eq!(summary.per_category[0].percent, 100.0);
  }

  #[test]
  fn wrong_answer_scenario() {
    let bank = single_question_bank();
    let mut session = started(&bank, Mode::Practice, CategoryFilter::All);

    let fb = session.submit_answer("1) foo").unwrap();
    assert!(!fb.correct);
    assert_eq!(fb.selected, "1");
    assert_eq!(session.score(), 0);
    assert_eq!(session.wrong_answers().len(), 1);

    session.advance().unwrap();
    let summary = session.summary().unwrap();
    assert_eq!(summary.percent, 0.0);
    assert!(!summary.passed);
    assert_eq!(summary.wrong_answers.len(), 1);
    assert_eq!(summary.wrong_answers[0].selected, "1");
    assert_eq!(summary.wrong_answers[0].correct_option, "2) bar");
  }

  #[test]
  fn resubmit_does_not_double_count() {
    let bank = single_question_bank();
    let mut session = started(&bank, Mode::Exam, CategoryFilter::All);

    let first = session.submit_answer("1").unwrap();
    let second = session.submit_answer("2").unwrap();
    let third = session.submit_answer("1").unwrap();
    assert_eq!(first, second);
    assert_eq!(first, third);
    assert_eq!(session.score(), 0);
    assert_eq!(session.graded_count(), 1);
    assert_eq!(session.wrong_answers().len(), 1);
  }

  #[test]
  fn transitions_in_wrong_phase_are_rejected() {
    let bank = single_question_bank();
    let mut session = QuizSession::default();

    assert!(matches!(session.submit_answer("1"), Err(SessionError::InvalidTransition { phase: Phase::NotStarted, .. })));
    assert!(session.advance().is_err());
    assert!(session.summary().is_err());
    assert!(session.current_question().is_err());

    session.start(&bank, Mode::Exam, CategoryFilter::All).unwrap();
    assert!(matches!(session.advance(), Err(SessionError::InvalidTransition { phase: Phase::Unanswered, .. })));
    assert!(session.summary().is_err());
    assert!(session.start(&bank, Mode::Exam, CategoryFilter::All).is_err());

    session.submit_answer("2").unwrap();
    session.advance().unwrap();
    assert!(session.submit_answer("2").is_err());
    assert!(session.advance().is_err());
    assert_eq!(session.score(), 1);
  }

  #[test]
  fn full_run_keeps_tally_invariants() {
    let bank = sample_bank();
    let mut session = started(&bank, Mode::Exam, CategoryFilter::All);
    assert_tally_invariants(&session);

    let mut step = 0;
    while !session.is_finished() {
      let q = session.current_question().unwrap().clone();
      let choice = if step % 2 == 0 {
        q.answer.clone()
      } else {
        q.options.iter().map(|o| choice_label(o)).find(|l| *l != q.answer).unwrap().to_string()
      };
      session.submit_answer(&choice).unwrap();
      assert_tally_invariants(&session);
      session.submit_answer(&q.answer).unwrap();
      assert_tally_invariants(&session);
      session.advance().unwrap();
      assert_tally_invariants(&session);
      step += 1;
    }

    let summary = session.summary().unwrap();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.score, 3);
    assert_eq!(summary.wrong_answers.len() as u32, summary.total - summary.score);
    assert!((summary.percent - 100.0 * 3.0 / 5.0).abs() < 1e-9);
    assert_eq!(summary.passed, summary.percent >= 80.0);
    let per_cat_total: u32 = summary.per_category.iter().map(|c| c.total).sum();
    assert_eq!(per_cat_total, 5);
  }

  #[test]
  fn unknown_choice_is_rejected_without_grading() {
    let bank = single_question_bank();
    let mut session = started(&bank, Mode::Exam, CategoryFilter::All);

    for choice in ["", "   ", "3", "3) qux"] {
      let err = session.submit_answer(choice).unwrap_err();
      assert!(matches!(err, SessionError::InvalidChoice { .. }), "{choice:?}: {err}");
    }
    assert_eq!(session.phase(), Phase::Unanswered);
    assert_eq!(session.graded_count(), 0);
    assert!(session.category_tallies().is_empty());
    assert!(session.wrong_answers().is_empty());

    let fb = session.submit_answer("2").unwrap();
    assert!(fb.correct);
    assert_eq!(session.score(), 1);
  }

  #[test]
  fn zero_target_is_reported_as_configuration() {
    let bank = sample_bank();
    let mut session = QuizSession::new(QuizRules { practice_questions: 0, ..QuizRules::default() });
    let err = session.start(&bank, Mode::Practice, CategoryFilter::All).unwrap_err();
    assert_eq!(err, SessionError::NoQuestionsRequested { mode: Mode::Practice });
    assert_eq!(err.to_string(), "no questions configured for practice mode");
    assert_eq!(session.phase(), Phase::NotStarted);
  }

  #[test]
  fn reset_discards_everything_and_allows_restart() {
    let bank = single_question_bank();
    let mut session = started(&bank, Mode::Exam, CategoryFilter::All);
    session.submit_answer("2").unwrap();
    session.reset();

    assert_eq!(session.phase(), Phase::NotStarted);
    assert_eq!(session.score(), 0);
    assert_eq!(session.total(), 0);
    assert!(session.category_tallies().is_empty());
    assert!(session.feedback().is_none());

    session.start(&bank, Mode::Practice, CategoryFilter::All).unwrap();
    assert_eq!(session.mode(), Mode::Practice);
    assert_eq!(session.current_index(), 0);
  }

  #[test]
  fn feedback_falls_back_to_raw_label() {
    let bank = QuestionBank::from_questions(vec![Question {
      id: 0,
      category: Category::Regulation,
      text: "Broken row".into(),
      options: vec!["1) a".into(), "2) b".into()],
      answer: "4".into(),
      explanation: String::new(),
    }]);
    let mut session = started(&bank, Mode::Exam, CategoryFilter::All);
    let fb = session.submit_answer("1").unwrap();
    assert!(!fb.correct);
    assert_eq!(fb.correct_option, "4");
  }
}
