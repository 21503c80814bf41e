//! Question bank: loads the CSV once, then serves filtering and sampling.
//!
//! The bank is immutable after load and shared read-only with every session.
//! A load either yields every record or fails; there is no partial bank.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::domain::{Category, CategoryFilter, Question};
use crate::error::{BankError, LoadError};

const OPTION_DELIMITER: char = '|';
const BOM: char = '\u{feff}';

/// Raw CSV row before trimming and option splitting.
#[derive(Debug, Deserialize)]
struct QuestionRecord {
  category: String,
  question: String,
  options: String,
  answer: String,
  #[serde(default)]
  explanation: String,
}

#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  questions: Vec<Arc<Question>>,
}

impl QuestionBank {
  /// Read and parse the bank at `path`.
  #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
  pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
      path: path.display().to_string(),
      source,
    })?;
    let bank = Self::from_reader(file).map_err(|e| match e {
      LoadError::Io { source, .. } => LoadError::Io { path: path.display().to_string(), source },
      other => other,
    })?;
    info!(target: "quiz_backend", questions = bank.len(), categories = bank.categories().len(), "Question bank loaded");
    Ok(bank)
  }

  /// Parse a bank from any reader (UTF-8, optional BOM).
  pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
    let mut raw = String::new();
    reader
      .read_to_string(&mut raw)
      .map_err(|source| LoadError::Io { path: "<reader>".into(), source })?;
    let body = raw.strip_prefix(BOM).unwrap_or(&raw);

    let mut rdr = csv::ReaderBuilder::new()
      .trim(csv::Trim::All)
      .from_reader(body.as_bytes());

    let mut questions = Vec::new();
    for (idx, row) in rdr.deserialize::<QuestionRecord>().enumerate() {
      let question = parse_record(idx, row?)?;
      match question.matching_option_count() {
        0 => warn!(target: "quiz_backend", record = idx + 1, answer = %question.answer, "No option carries the answer label; raw label will be shown"),
        1 => {}
        n => warn!(target: "quiz_backend", record = idx + 1, answer = %question.answer, matches = n, "Several options carry the answer label; the first is shown"),
      }
      questions.push(Arc::new(question));
    }
    Ok(Self { questions })
  }

  pub fn from_questions(questions: Vec<Question>) -> Self {
    Self { questions: questions.into_iter().map(Arc::new).collect() }
  }

  pub fn len(&self) -> usize { self.questions.len() }

  pub fn is_empty(&self) -> bool { self.questions.is_empty() }

  pub fn questions(&self) -> &[Arc<Question>] { &self.questions }

  /// Questions matching `filter`; the whole pool for `All`.
  pub fn filter(&self, filter: &CategoryFilter) -> Vec<Arc<Question>> {
    self
      .questions
      .iter()
      .filter(|q| filter.matches(&q.category))
      .cloned()
      .collect()
  }

  /// Distinct categories in order of first appearance.
  pub fn categories(&self) -> Vec<Category> {
    let mut seen: Vec<Category> = Vec::new();
    for q in &self.questions {
      if !seen.contains(&q.category) {
        seen.push(q.category.clone());
      }
    }
    seen
  }

  /// `All` followed by every category present in the bank.
  pub fn filter_options(&self) -> Vec<CategoryFilter> {
    std::iter::once(CategoryFilter::All)
      .chain(self.categories().into_iter().map(CategoryFilter::Only))
      .collect()
  }
}

fn parse_record(idx: usize, rec: QuestionRecord) -> Result<Question, LoadError> {
  let record = idx + 1;
  let required = |value: &str, field: &'static str| {
    if value.trim().is_empty() {
      Err(LoadError::MissingField { record, field })
    } else {
      Ok(())
    }
  };
  required(&rec.category, "category")?;
  required(&rec.question, "question")?;
  required(&rec.options, "options")?;
  required(&rec.answer, "answer")?;

  let options: Vec<String> = rec
    .options
    .split(OPTION_DELIMITER)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect();

  Ok(Question {
    id: idx,
    category: Category::from(rec.category.as_str()),
    text: rec.question.trim().to_string(),
    options,
    answer: rec.answer.trim().to_string(),
    explanation: rec.explanation.trim().to_string(),
  })
}

/// Uniform random sample of `min(count, pool.len())` distinct questions.
pub fn sample(pool: &[Arc<Question>], count: usize) -> Result<Vec<Arc<Question>>, BankError> {
  sample_with(pool, count, &mut rand::thread_rng())
}

pub fn sample_with<R: Rng + ?Sized>(
  pool: &[Arc<Question>],
  count: usize,
  rng: &mut R,
) -> Result<Vec<Arc<Question>>, BankError> {
  if count == 0 {
    return Ok(Vec::new());
  }
  if pool.is_empty() {
    return Err(BankError::InsufficientPool { requested: count });
  }
  let mut picked = pool.to_vec();
  picked.shuffle(rng);
  picked.truncate(count);
  Ok(picked)
}
