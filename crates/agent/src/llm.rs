//! Completion collaborator seam.
//!
//! The endpoint is a black box: `complete(prompt, config) -> text`. The two
//! response envelope shapes the fleet of model endpoints actually returns are
//! unified here behind [`primary_text`]; which shape applies is a
//! configuration decision, never an inline branch at a call site.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use salesdesk_core::config::{CompletionShape, LlmConfig};

/// Bounded sampling settings for one completion call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Clone, Debug, Error)]
pub enum LlmError {
    #[error("completion transport failure: {0}")]
    Transport(String),
    #[error("completion endpoint returned status {status}: {detail}")]
    Endpoint { status: u16, detail: String },
    #[error("completion response could not be parsed: {0}")]
    MalformedEnvelope(String),
    #[error("completion response carried no usable text payload")]
    EmptyCompletion,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct OutputsEnvelope {
    outputs: Vec<OutputChunk>,
}

#[derive(Debug, Deserialize)]
struct OutputChunk {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    results: Vec<ResultChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultChunk {
    output_text: Option<String>,
}

/// Unwraps the first candidate's text from a raw response body, according to
/// the configured envelope shape.
pub fn primary_text(body: &str, shape: CompletionShape) -> Result<String, LlmError> {
    let text = match shape {
        CompletionShape::Outputs => {
            let envelope: OutputsEnvelope = serde_json::from_str(body)
                .map_err(|error| LlmError::MalformedEnvelope(error.to_string()))?;
            envelope.outputs.into_iter().next().and_then(|chunk| chunk.text)
        }
        CompletionShape::Results => {
            let envelope: ResultsEnvelope = serde_json::from_str(body)
                .map_err(|error| LlmError::MalformedEnvelope(error.to_string()))?;
            envelope.results.into_iter().next().and_then(|chunk| chunk.output_text)
        }
    };

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(LlmError::EmptyCompletion),
    }
}

/// HTTP implementation of [`LlmClient`] against a managed inference endpoint.
/// The request body follows the same shape convention as the response
/// envelope, since the two come in matched pairs.
pub struct HttpLlmClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    shape: CompletionShape,
}

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig, api_key: Option<&str>) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.map(str::to_string),
            shape: config.response_shape,
        })
    }

    fn request_body(&self, prompt: &str, config: &GenerationConfig) -> serde_json::Value {
        match self.shape {
            CompletionShape::Outputs => json!({
                "prompt": prompt,
                "max_tokens": config.max_tokens,
                "temperature": config.temperature,
            }),
            CompletionShape::Results => json!({
                "inputText": prompt,
                "textGenerationConfig": {
                    "maxTokenCount": config.max_tokens,
                    "temperature": config.temperature,
                },
            }),
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        let url = format!("{}/model/{}/invoke", self.base_url, self.model);
        let mut request = self.http.post(&url).json(&self.request_body(prompt, config));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response =
            request.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        let status = response.status();
        let body =
            response.text().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Endpoint { status: status.as_u16(), detail: body });
        }

        primary_text(&body, self.shape)
    }
}
