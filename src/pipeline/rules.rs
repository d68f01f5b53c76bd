//! Weighted keyword scorer: the local, always-available classifier.
//!
//! Two disjoint phrase tables (important / not important) are summed
//! against the lower-cased text. A phrase counts once no matter how many
//! times it occurs. Decision order:
//! - important sum greater than unimportant sum → `Important`
//! - both sums zero → `Important` (no signal is never deprioritized)
//! - anything else, including a nonzero tie → `NotImportant`

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::pipeline::types::Category;

/// A single weighted phrase with its category affinity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub phrase: String,
    pub weight: u32,
    pub class: Category,
}

impl KeywordRule {
    pub fn new(phrase: impl Into<String>, weight: u32, class: Category) -> Self {
        Self {
            phrase: phrase.into(),
            weight,
            class,
        }
    }
}

/// Named rule-table presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordPreset {
    /// Support-desk vocabulary with weights and multi-word phrases.
    Weighted,
    /// Flat vocabulary, every phrase weighs 1.
    Uniform,
}

impl KeywordPreset {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "weighted" => Some(Self::Weighted),
            "uniform" => Some(Self::Uniform),
            _ => None,
        }
    }

    pub fn rules(&self) -> Vec<KeywordRule> {
        match self {
            Self::Weighted => weighted_rules(),
            Self::Uniform => uniform_rules(),
        }
    }
}

/// Deterministic keyword scorer. Read-only once built.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    important_rules: Vec<(String, u32)>,
    unimportant_rules: Vec<(String, u32)>,
}

impl KeywordScorer {
    /// Build a scorer from a rule table, validating weights, table totals and disjointness.
    pub fn new(rules: Vec<KeywordRule>) -> Result<Self, ConfigError> {
        let mut important_rules = Vec::new();
        let mut unimportant_rules = Vec::new();
        let mut seen = HashSet::new();
        let (mut important_total, mut unimportant_total) = (0u32, 0u32);

        for rule in rules {
            let phrase = rule.phrase.trim().to_lowercase();
            if phrase.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "keyword rule".into(),
                    message: "phrase must not be empty".into(),
                });
            }
            if rule.weight == 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("keyword rule '{phrase}'"),
                    message: "weight must be a positive integer".into(),
                });
            }
            if !seen.insert(phrase.clone()) {
                return Err(ConfigError::InvalidValue {
                    key: format!("keyword rule '{phrase}'"),
                    message: "phrase appears more than once".into(),
                });
            }
            let (table, total) = match rule.class {
                Category::Important => (&mut important_rules, &mut important_total),
                Category::NotImportant => (&mut unimportant_rules, &mut unimportant_total),
            };
            // `sums` adds every matching weight of a table.
            *total = total.checked_add(rule.weight).ok_or_else(|| ConfigError::InvalidValue {
                key: format!("keyword rule '{phrase}'"),
                message: format!("total {} weight exceeds {}", rule.class.label(), u32::MAX),
            })?;
            table.push((phrase, rule.weight));
        }

        Ok(Self {
            important_rules,
            unimportant_rules,
        })
    }

    /// Scorer for one of the built-in presets.
    pub fn from_preset(preset: KeywordPreset) -> Result<Self, ConfigError> {
        Self::new(preset.rules())
    }

    /// Parse a JSON array of `KeywordRule`s.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let rules: Vec<KeywordRule> = serde_json::from_str(raw)
            .map_err(|e| ConfigError::ParseError(format!("keyword rules: {e}")))?;
        Self::new(rules)
    }

    /// Load a JSON rule file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Number of rules across both tables.
    pub fn rule_count(&self) -> usize {
        self.important_rules.len() + self.unimportant_rules.len()
    }

    /// Weighted sums `(important, unimportant)` for a text.
    pub fn sums(&self, text: &str) -> (u32, u32) {
        let lowered = text.to_lowercase();
        let sum = |rules: &[(String, u32)]| -> u32 {
            rules
                .iter()
                .filter(|(phrase, _)| lowered.contains(phrase.as_str()))
                .map(|(_, weight)| *weight)
                .sum()
        };
        (sum(&self.important_rules), sum(&self.unimportant_rules))
    }

    /// Classify a text. Total: never fails.
    pub fn score(&self, text: &str) -> Category {
        let (important, unimportant) = self.sums(text);
        let no_signal = important == 0 && unimportant == 0;
        let category = if important > unimportant || no_signal {
            Category::Important
        } else {
            Category::NotImportant
        };
        debug!(
            important_sum = important,
            unimportant_sum = unimportant,
            category = category.label(),
            "Keyword scorer decided"
        );
        category
    }
}

fn weighted_rules() -> Vec<KeywordRule> {
    use Category::{Important, NotImportant};

    vec![
        KeywordRule::new("urgente", 3, Important),
        KeywordRule::new("fora do ar", 3, Important),
        KeywordRule::new("não funciona", 3, Important),
        KeywordRule::new("preciso de ajuda", 2, Important),
        KeywordRule::new("problema", 2, Important),
        KeywordRule::new("erro", 2, Important),
        KeywordRule::new("falha", 2, Important),
        KeywordRule::new("suporte", 2, Important),
        KeywordRule::new("corrigir", 2, Important),
        KeywordRule::new("quebrado", 2, Important),
        KeywordRule::new("bloqueado", 2, Important),
        KeywordRule::new("ação", 1, Important),
        KeywordRule::new("prazo", 1, Important),
        KeywordRule::new("pendente", 1, Important),
        KeywordRule::new("obrigado", 2, NotImportant),
        KeywordRule::new("obrigada", 2, NotImportant),
        KeywordRule::new("agradeço", 2, NotImportant),
        KeywordRule::new("parabéns", 2, NotImportant),
        KeywordRule::new("bom trabalho", 2, NotImportant),
        KeywordRule::new("excelente", 1, NotImportant),
        KeywordRule::new("feliz", 1, NotImportant),
        KeywordRule::new("boas festas", 2, NotImportant),
    ]
}

fn uniform_rules() -> Vec<KeywordRule> {
    use Category::{Important, NotImportant};

    let important = [
        "problema", "suporte", "erro", "urgente", "ação", "corrigir", "quebrado",
    ];
    let unimportant = [
        "obrigado",
        "parabéns",
        "agradeço",
        "feliz",
        "bom trabalho",
        "excelente",
    ];

    important
        .iter()
        .map(|p| KeywordRule::new(*p, 1, Important))
        .chain(
            unimportant
                .iter()
                .map(|p| KeywordRule::new(*p, 1, NotImportant)),
        )
        .collect()
}
