//! Remote classifier adapter.
//!
//! One best-effort call to the inference classifier, mapped through the
//! configured `LabelMap`. Every failure (short input, transport, timeout,
//! non-200, malformed payload, unknown or tied label) resolves to the
//! keyword scorer with `Source::Heuristic`. Nothing here returns an error.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::RemoteError;
use crate::inference::{InferenceBackend, LabelScore};
use crate::pipeline::labels::LabelMap;
use crate::pipeline::rules::KeywordScorer;
use crate::pipeline::types::{Category, ClassificationResult, EmailContent};

/// Inputs with fewer words than this skip the remote call.
pub const MIN_REMOTE_WORDS: usize = 2;

/// Remote-first classifier with a keyword fallback.
pub struct RemoteClassifier {
    backend: Arc<dyn InferenceBackend>,
    labels: LabelMap,
    timeout: Duration,
}

impl RemoteClassifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, labels: LabelMap) -> Self {
        Self {
            backend,
            labels,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify `text`, consulting the remote model when it is worth asking.
    pub async fn classify(
        &self,
        text: &EmailContent,
        scorer: &KeywordScorer,
    ) -> ClassificationResult {
        if text.word_count() < MIN_REMOTE_WORDS {
            debug!(
                words = text.word_count(),
                "Input too short for remote classifier, using keyword scorer"
            );
            return ClassificationResult::heuristic(scorer.score(text.as_str()));
        }

        match self.classify_remote(text).await {
            Ok(category) => {
                info!(
                    backend = self.backend.name(),
                    category = category.label(),
                    "Remote classifier decided"
                );
                ClassificationResult::remote(category)
            }
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    kind = e.kind(),
                    error = %e,
                    "Remote classification degraded, falling back to keyword scorer"
                );
                ClassificationResult::heuristic(scorer.score(text.as_str()))
            }
        }
    }

    /// Single remote attempt, translated into the domain's category space.
    pub async fn classify_remote(&self, text: &EmailContent) -> Result<Category, RemoteError> {
        let scores = tokio::time::timeout(self.timeout, self.backend.classify(text.as_str()))
            .await
            .map_err(|_| RemoteError::Timeout {
                endpoint: self.backend.name().to_string(),
                timeout: self.timeout,
            })??;

        let best = top_label(&scores).ok_or_else(|| RemoteError::Malformed {
            endpoint: self.backend.name().to_string(),
            reason: format!("no single highest-confidence label in {} scores", scores.len()),
        })?;

        self.labels
            .get(&best.label)
            .ok_or_else(|| RemoteError::Unrecognized {
                label: best.label.clone(),
            })
    }
}

/// The label with the unique highest finite score.
///
/// `None` when the list is empty, a score is not finite, or the top score
/// is shared.
fn top_label(scores: &[LabelScore]) -> Option<&LabelScore> {
    if scores.iter().any(|s| !s.score.is_finite()) {
        return None;
    }

    let mut best: Option<&LabelScore> = None;
    let mut tied = false;
    for candidate in scores {
        match best {
            Some(current) if candidate.score > current.score => {
                best = Some(candidate);
                tied = false;
            }
            Some(current) if candidate.score == current.score => tied = true,
            Some(_) => {}
            None => best = Some(candidate),
        }
    }

    if tied { None } else { best }
}
