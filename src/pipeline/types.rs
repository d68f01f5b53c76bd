//! Shared types for the classification pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Message returned when a request carries no usable content.
pub const EMPTY_CONTENT_MESSAGE: &str = "Nenhum conteúdo fornecido";

// ── Email content ───────────────────────────────────────────────────

/// Validated email text.
///
/// Can only be built from a string that is not empty or whitespace-only,
/// so everything downstream of the boundary may assume there is content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent(String);

impl EmailContent {
    /// Validate raw text at the pipeline boundary.
    pub fn new(text: impl Into<String>) -> Result<Self, PipelineError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PipelineError::Validation(EMPTY_CONTENT_MESSAGE.into()));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of Unicode scalar values, as reported in `content_length`.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// Whitespace-separated word count.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    /// First `max` characters, for log previews.
    pub fn preview(&self, max: usize) -> String {
        self.0.chars().take(max).collect()
    }
}

impl AsRef<str> for EmailContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── Category ────────────────────────────────────────────────────────

/// Two-valued priority classification of an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "important")]
    Important,
    #[serde(alias = "not_important")]
    NotImportant,
}

impl Category {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Important => "important",
            Self::NotImportant => "not_important",
        }
    }

    /// Parse a configuration token (`important`, `not_important`, ...).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().replace('-', "_").as_str() {
            "important" => Some(Self::Important),
            "not_important" | "notimportant" | "unimportant" => Some(Self::NotImportant),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Important => f.write_str("Important"),
            Self::NotImportant => f.write_str("NotImportant"),
        }
    }
}

// ── Classification result ───────────────────────────────────────────

/// Where a classification decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The remote inference model answered with a mapped label.
    Remote,
    /// The local keyword scorer decided.
    Heuristic,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Outcome of the classification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category: Category,
    pub source: Source,
}

impl ClassificationResult {
    pub fn remote(category: Category) -> Self {
        Self {
            category,
            source: Source::Remote,
        }
    }

    pub fn heuristic(category: Category) -> Self {
        Self {
            category,
            source: Source::Heuristic,
        }
    }
}

// ── Pipeline outcome ────────────────────────────────────────────────

/// Final result of running one email through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageOutcome {
    pub category: Category,
    pub source: Source,
    pub reply: String,
    /// Character count of the exact text that was classified.
    pub length: usize,
}
