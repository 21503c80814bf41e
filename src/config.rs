//! Loading quiz configuration (bank location + quiz rules) from TOML.
//!
//! Expected schema:
//!
//! ```toml
//! [bank]
//! path = "quiz_data.csv"
//!
//! [rules]
//! practice_questions = 50
//! exam_questions = 27
//! pass_threshold = 80.0
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Mode;

pub const DEFAULT_BANK_PATH: &str = "quiz_data.csv";

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
pub struct QuizConfig {
  #[serde(default)]
  pub bank: BankCfg,
  #[serde(default)]
  pub rules: QuizRules,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BankCfg {
  #[serde(default = "default_bank_path")]
  pub path: String,
}

impl Default for BankCfg {
  fn default() -> Self { Self { path: default_bank_path() } }
}

fn default_bank_path() -> String { DEFAULT_BANK_PATH.into() }

/// Session sizing and the pass line.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuizRules {
  pub practice_questions: usize,
  pub exam_questions: usize,
  /// Minimum percent (inclusive) for a pass.
  pub pass_threshold: f64,
}

impl Default for QuizRules {
  fn default() -> Self {
    Self { practice_questions: 50, exam_questions: 27, pass_threshold: 80.0 }
  }
}

impl QuizRules {
  pub fn target_count(&self, mode: Mode) -> usize {
    match mode {
      Mode::Practice => self.practice_questions,
      Mode::Exam => self.exam_questions,
    }
  }
}

impl QuizConfig {
  pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str::<QuizConfig>(s)
  }
}

/// Build the config from QUIZ_CONFIG_PATH (optional TOML) and QUIZ_BANK_PATH.
/// Any read/parse failure is logged and the defaults are used instead.
pub fn load_config_from_env() -> QuizConfig {
  let mut cfg = std::env::var("QUIZ_CONFIG_PATH")
    .ok()
    .and_then(|path| load_config_file(&path))
    .unwrap_or_default();

  if let Ok(bank_path) = std::env::var("QUIZ_BANK_PATH") {
    if !bank_path.trim().is_empty() {
      cfg.bank.path = bank_path;
    }
  }
  cfg
}

fn load_config_file(path: &str) -> Option<QuizConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match QuizConfig::from_toml_str(&s) {
      Ok(cfg) => {
        info!(target: "quiz_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_backend", %path, error = %e, "Failed to parse TOML config; using defaults");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_backend", %path, error = %e, "Failed to read TOML config file; using defaults");
      None
    }
  }
}
