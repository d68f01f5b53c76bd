use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::InferenceConfig;
use crate::error::RemoteError;

use super::{
    ClassifyRequest, ClassifyResponse, GenerateRequest, GeneratedText, GenerationParams,
    InferenceBackend, LabelScore,
};

/// HTTP client for the hosted inference endpoints.
#[derive(Clone)]
pub struct HfInferenceClient {
    http: Client,
    api_key: Option<SecretString>,
    classify_url: String,
    generate_url: String,
    timeout: Duration,
}

impl HfInferenceClient {
    pub fn new(http: Client, config: &InferenceConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            classify_url: config.classify_url.clone(),
            generate_url: config.generate_url.clone(),
            timeout: config.timeout,
        }
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(url).timeout(self.timeout).json(body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        debug!(endpoint = url, bytes = body.len(), "Inference response received");

        serde_json::from_str(&body).map_err(|e| RemoteError::Malformed {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::Timeout {
                endpoint: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            RemoteError::Transport {
                endpoint: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl InferenceBackend for HfInferenceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, RemoteError> {
        let response: ClassifyResponse = self
            .post_json(&self.classify_url, &ClassifyRequest { inputs: text })
            .await?;

        response.into_scores().ok_or_else(|| RemoteError::Malformed {
            endpoint: self.classify_url.clone(),
            reason: "empty label list".into(),
        })
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, RemoteError> {
        let request = GenerateRequest {
            inputs: prompt,
            parameters: *params,
        };
        let response: Vec<GeneratedText> = self.post_json(&self.generate_url, &request).await?;

        response
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| RemoteError::Malformed {
                endpoint: self.generate_url.clone(),
                reason: "empty generation list".into(),
            })
    }
}
