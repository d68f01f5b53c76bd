//! Reply composer: drafts a suggested reply for a classified email.
//!
//! Asks the generative model for a continuation of a category-specific
//! prompt and keeps what follows the reply marker. Any failure returns the
//! fixed template for the category.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::RemoteError;
use crate::inference::{GenerationParams, InferenceBackend};
use crate::pipeline::types::{Category, ClassificationResult, EmailContent};

/// Marker that precedes the reply in the generated continuation.
pub const REPLY_MARKER: &str = "Resposta:";

const IMPORTANT_FALLBACK: &str =
    "Agradeço seu email. Analisarei sua solicitação e retornarei em breve com uma solução.";
const NOT_IMPORTANT_FALLBACK: &str =
    "Obrigado pelo seu email! Agradeço o contato e fico feliz em ajudar.";

/// Drafts replies through the generative endpoint.
pub struct ReplyComposer {
    backend: Arc<dyn InferenceBackend>,
    params: GenerationParams,
    timeout: Duration,
}

impl ReplyComposer {
    pub fn new(backend: Arc<dyn InferenceBackend>, params: GenerationParams) -> Self {
        Self {
            backend,
            params,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Compose a reply. Never fails.
    pub async fn compose(&self, text: &EmailContent, result: &ClassificationResult) -> String {
        match self.compose_remote(text, result.category).await {
            Ok(reply) => {
                debug!(
                    category = result.category.label(),
                    source = result.source.label(),
                    chars = reply.chars().count(),
                    "Generated reply"
                );
                reply
            }
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    kind = e.kind(),
                    error = %e,
                    "Reply generation degraded, using template"
                );
                fallback_reply(result.category).to_string()
            }
        }
    }

    /// Single remote attempt.
    pub async fn compose_remote(
        &self,
        text: &EmailContent,
        category: Category,
    ) -> Result<String, RemoteError> {
        let prompt = build_reply_prompt(text.as_str(), category);
        let generated = tokio::time::timeout(
            self.timeout,
            self.backend.generate(&prompt, &self.params),
        )
        .await
        .map_err(|_| RemoteError::Timeout {
            endpoint: self.backend.name().to_string(),
            timeout: self.timeout,
        })??;

        let reply = extract_reply(&generated);
        if reply.is_empty() {
            return Err(RemoteError::Malformed {
                endpoint: self.backend.name().to_string(),
                reason: "generated reply is empty".into(),
            });
        }
        Ok(reply.to_string())
    }
}

/// Fixed reply used whenever generation fails.
pub fn fallback_reply(category: Category) -> &'static str {
    match category {
        Category::Important => IMPORTANT_FALLBACK,
        Category::NotImportant => NOT_IMPORTANT_FALLBACK,
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the generation prompt for a category.
fn build_reply_prompt(text: &str, category: Category) -> String {
    let instruction = match category {
        Category::Important => {
            "Responda este email profissionalmente, de forma direta e focada em resolver o pedido"
        }
        Category::NotImportant => "Responda este email de forma breve e cordial",
    };
    format!("{instruction}: '{text}'. {REPLY_MARKER}")
}

/// Text after the last reply marker, trimmed. The whole text when absent.
fn extract_reply(generated: &str) -> &str {
    match generated.rsplit_once(REPLY_MARKER) {
        Some((_, reply)) => reply.trim(),
        None => generated.trim(),
    }
}
