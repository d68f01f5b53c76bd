//! Remote label → `Category` lookup.
//!
//! Inference models answer in their own label space (sentiment polarity,
//! `LABEL_0`/`LABEL_1`, ...). Which side of that space counts as
//! important is configuration: two presets ship with opposite
//! orientations, and a custom table can be parsed from a string.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::pipeline::types::Category;

/// Built-in label orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPreset {
    /// Negative or neutral sentiment reads as something to act on.
    Sentiment,
    /// Positive class reads as business priority.
    Priority,
}

impl LabelPreset {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sentiment" | "polarity" => Some(Self::Sentiment),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Case-insensitive table from remote labels to categories.
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    entries: HashMap<String, Category>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_preset(preset: LabelPreset) -> Self {
        let (important, not_important): (&[&str], &[&str]) = match preset {
            LabelPreset::Sentiment => (
                &["negative", "neg", "neutral", "lab_0", "label_0"],
                &["positive", "pos", "lab_1", "label_1"],
            ),
            LabelPreset::Priority => (
                &[
                    "positive", "pos", "lab_1", "label_1", "important", "urgent", "productive",
                ],
                &[
                    "negative",
                    "neg",
                    "neutral",
                    "lab_0",
                    "label_0",
                    "not_important",
                    "unproductive",
                ],
            ),
        };

        let mut map = Self::new();
        for label in important {
            map.insert(label, Category::Important);
        }
        for label in not_important {
            map.insert(label, Category::NotImportant);
        }
        map
    }

    /// Parse `label=category` pairs separated by commas,
    /// e.g. `positive=not_important,negative=important`.
    pub fn parse(pairs: &str) -> Result<Self, ConfigError> {
        let mut map = Self::new();
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (label, category) = pair.split_once('=').ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "TRIAGE_LABEL_MAP".into(),
                    message: format!("expected label=category, got '{pair}'"),
                }
            })?;
            let category =
                Category::from_token(category).ok_or_else(|| ConfigError::InvalidValue {
                    key: "TRIAGE_LABEL_MAP".into(),
                    message: format!("unknown category '{}'", category.trim()),
                })?;
            if label.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "TRIAGE_LABEL_MAP".into(),
                    message: format!("empty label in '{pair}'"),
                });
            }
            map.insert(label, category);
        }
        if map.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "TRIAGE_LABEL_MAP".into(),
                message: "no label mappings given".into(),
            });
        }
        Ok(map)
    }

    pub fn insert(&mut self, label: &str, category: Category) {
        self.entries.insert(label.trim().to_lowercase(), category);
    }

    pub fn get(&self, label: &str) -> Option<Category> {
        self.entries.get(&label.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
