//! Classification pipeline: validate, classify, compose.
//!
//! Flow, strictly sequential per request:
//! 1. Boundary validation (`EmailContent`): the only failing step
//! 2. `RemoteClassifier::classify()`: remote model, keyword fallback
//! 3. `ReplyComposer::compose()`: remote generation, template fallback
//!
//! Once the text is valid the pipeline always completes: remote outages
//! degrade the answer, they never fail the request.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::error::{ConfigError, PipelineError};
use crate::inference::InferenceBackend;
use crate::pipeline::classifier::RemoteClassifier;
use crate::pipeline::composer::ReplyComposer;
use crate::pipeline::rules::KeywordScorer;
use crate::pipeline::types::{EmailContent, TriageOutcome};

/// Characters of the email shown in debug logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// The classification-and-reply pipeline. Shared across requests.
pub struct ClassificationPipeline {
    scorer: Arc<KeywordScorer>,
    classifier: RemoteClassifier,
    composer: ReplyComposer,
}

impl ClassificationPipeline {
    pub fn new(
        scorer: Arc<KeywordScorer>,
        classifier: RemoteClassifier,
        composer: ReplyComposer,
    ) -> Self {
        Self {
            scorer,
            classifier,
            composer,
        }
    }

    /// Wire the pipeline from configuration, loading the keyword table once.
    pub fn from_config(
        config: &ServiceConfig,
        backend: Arc<dyn InferenceBackend>,
    ) -> Result<Self, ConfigError> {
        let scorer = Arc::new(config.keywords.load()?);
        let timeout = config.inference.timeout;

        let classifier = RemoteClassifier::new(Arc::clone(&backend), config.labels.clone())
            .with_timeout(timeout);
        let composer = ReplyComposer::new(backend, config.generation).with_timeout(timeout);

        info!(
            rules = scorer.rule_count(),
            labels = config.labels.len(),
            timeout_secs = timeout.as_secs(),
            "Classification pipeline ready"
        );

        Ok(Self::new(scorer, classifier, composer))
    }

    pub fn scorer(&self) -> &KeywordScorer {
        &self.scorer
    }

    /// Validate raw text and run it through the pipeline.
    pub async fn run(&self, text: impl Into<String>) -> Result<TriageOutcome, PipelineError> {
        let content = EmailContent::new(text)?;
        Ok(self.process(&content).await)
    }

    /// Run already-validated content. Infallible.
    pub async fn process(&self, content: &EmailContent) -> TriageOutcome {
        let length = content.char_count();
        info!(chars = length, "Processing email");
        debug!(preview = %content.preview(LOG_PREVIEW_CHARS), "Email content");

        let result = self.classifier.classify(content, &self.scorer).await;
        let reply = self.composer.compose(content, &result).await;

        info!(
            category = result.category.label(),
            source = result.source.label(),
            "Email classified"
        );

        TriageOutcome {
            category: result.category,
            source: result.source,
            reply,
            length,
        }
    }
}
