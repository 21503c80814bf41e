//! Domain models: questions, categories, category filters and quiz modes,
//! plus the choice-label helpers used for grading.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subject area of a question.
///
/// The two exam subjects get their own variants; anything else found in the
/// bank is kept verbatim so filters can still target it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
  Engineering,
  Regulation,
  Other(String),
}

impl Category {
  pub fn as_str(&self) -> &str {
    match self {
      Category::Engineering => "Engineering",
      Category::Regulation => "Regulation",
      Category::Other(name) => name,
    }
  }
}

impl From<&str> for Category {
  fn from(raw: &str) -> Self {
    match raw.trim() {
      "Engineering" | "engineering" | "工学" => Category::Engineering,
      "Regulation" | "regulation" | "法規" => Category::Regulation,
      other => Category::Other(other.to_string()),
    }
  }
}

impl From<String> for Category {
  fn from(raw: String) -> Self { Category::from(raw.as_str()) }
}

impl From<Category> for String {
  fn from(c: Category) -> Self { c.as_str().to_string() }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Narrows the pool to one category, or keeps everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
  #[default]
  All,
  Only(Category),
}

impl CategoryFilter {
  pub fn matches(&self, category: &Category) -> bool {
    match self {
      CategoryFilter::All => true,
      CategoryFilter::Only(c) => c == category,
    }
  }
}

impl From<&str> for CategoryFilter {
  fn from(raw: &str) -> Self {
    match raw.trim() {
      "" | "All" | "all" | "すべて" => CategoryFilter::All,
      other => CategoryFilter::Only(Category::from(other)),
    }
  }
}

impl From<String> for CategoryFilter {
  fn from(raw: String) -> Self { CategoryFilter::from(raw.as_str()) }
}

impl From<CategoryFilter> for String {
  fn from(f: CategoryFilter) -> Self { f.to_string() }
}

impl fmt::Display for CategoryFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CategoryFilter::All => f.write_str("All"),
      CategoryFilter::Only(c) => f.write_str(c.as_str()),
    }
  }
}

/// Practice runs a long drill; Exam mirrors the real test length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
  Practice,
  Exam,
}

impl Mode {
  pub const ALL: [Mode; 2] = [Mode::Practice, Mode::Exam];

  pub fn as_str(&self) -> &'static str {
    match self {
      Mode::Practice => "practice",
      Mode::Exam => "exam",
    }
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Mode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "practice" => Ok(Mode::Practice),
      "exam" => Ok(Mode::Exam),
      other => Err(format!("unknown mode '{other}' (expected 'practice' or 'exam')")),
    }
  }
}

/// One multiple-choice question as loaded from the bank.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Question {
  /// Position in the bank (0-based, file order).
  pub id: usize,
  pub category: Category,
  pub text: String,
  /// Ordered options, each starting with its choice label, e.g. `"1) ..."`.
  pub options: Vec<String>,
  /// Label of the correct option, e.g. `"2"`.
  pub answer: String,
  pub explanation: String,
}

impl Question {
  /// Full text of the correct option.
  ///
  /// Falls back to the raw answer label when no option carries that label,
  /// so a single malformed row still renders.
  pub fn correct_option(&self) -> &str {
    self
      .options
      .iter()
      .find(|opt| choice_label(opt) == self.answer)
      .map(String::as_str)
      .unwrap_or(&self.answer)
  }

  /// True if some option's label equals the answer label.
  pub fn has_matching_option(&self) -> bool {
    self.matching_option_count() > 0
  }

  /// Options whose label equals the answer label; a well-formed row has one.
  pub fn matching_option_count(&self) -> usize {
    self.options.iter().filter(|opt| choice_label(opt) == self.answer).count()
  }

  /// True if `label` names one of the options.
  pub fn has_option(&self, label: &str) -> bool {
    !label.is_empty() && self.options.iter().any(|opt| choice_label(opt) == label)
  }

  pub fn is_correct(&self, choice: &str) -> bool {
    choice_label(choice) == self.answer
  }
}

/// Leading label of an option or a user choice.
///
/// `"2) bar"`, `"2. bar"`, `"2：bar"` and `"2"` all yield `"2"`. Text with no
/// delimiter before the first whitespace is returned trimmed as a whole word.
pub fn choice_label(choice: &str) -> &str {
  let s = choice.trim();
  let end = s
    .char_indices()
    .find(|(_, c)| matches!(c, ')' | '）' | '.' | '．' | ':' | '：') || c.is_whitespace())
    .map(|(i, _)| i)
    .unwrap_or(s.len());
  &s[..end]
}
