//! Remote inference integration.
//!
//! The pipeline talks to two hosted models through one seam:
//! - a text classifier that answers with scored labels
//! - a text generator that continues a prompt
//!
//! `HfInferenceClient` is the HTTP implementation (Hugging Face Inference
//! API wire format). Tests swap in their own `InferenceBackend`.

mod client;

pub use client::HfInferenceClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// One scored label from the classifier endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Generation knobs forwarded as `parameters`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_length: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 100,
            temperature: 0.7,
        }
    }
}

/// Remote inference backend. One attempt per call, no retries.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Score `text` against the classifier's label space.
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, RemoteError>;

    /// Continue `prompt` with the generative model.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, RemoteError>;
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ClassifyRequest<'a> {
    pub inputs: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub inputs: &'a str,
    pub parameters: GenerationParams,
}

/// Classifier payloads come either nested per input or flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifyResponse {
    pub fn into_scores(self) -> Option<Vec<LabelScore>> {
        match self {
            Self::Nested(lists) => lists.into_iter().next(),
            Self::Flat(scores) => Some(scores),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedText {
    pub generated_text: String,
}
