//! Generation client for an OpenAI-style chat-completions backend
//!
//! Every call returns a [`Generated`] value: either the generated text or a
//! classified [`GenerationFailure`]. Nothing raised by the transport escapes
//! this module, so callers can always render the outcome.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{PinguinoError, Result};

/// Value shipped in example `.env` files; treated exactly like a missing key
pub const PLACEHOLDER_API_KEY: &str = "tu_api_key_aqui";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Sampling parameters for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
  temperature: f64,
  max_output_tokens: u32,
}

impl GenerationParams {
  /// Descriptions and insights
  pub const DEFAULT: Self = Self { temperature: 0.7, max_output_tokens: 250 };
  /// Q&A, biased towards repeatable answers
  pub const QUESTION: Self = Self { temperature: 0.2, max_output_tokens: 250 };

  pub fn new(temperature: f64, max_output_tokens: u32) -> Result<Self> {
    if !(0.0..=2.0).contains(&temperature) {
      return Err(PinguinoError::invalid_parameter(
        "temperature",
        format!("{temperature} is outside [0, 2]"),
      ));
    }
    if max_output_tokens == 0 {
      return Err(PinguinoError::invalid_parameter("max_output_tokens", "must be positive"));
    }
    Ok(Self { temperature, max_output_tokens })
  }

  pub fn temperature(&self) -> f64 {
    self.temperature
  }

  pub fn max_output_tokens(&self) -> u32 {
    self.max_output_tokens
  }
}

impl Default for GenerationParams {
  fn default() -> Self {
    Self::DEFAULT
  }
}

/// Why no text was generated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
  #[error("API key not configured")]
  NotConfigured,

  #[error("request failed: {message}")]
  Transport { message: String },

  #[error("service answered {status}: {message}")]
  Service { status: u16, message: String },

  #[error("response contained no generated text")]
  EmptyResponse,
}

impl GenerationFailure {
  pub fn transport(message: impl Into<String>) -> Self {
    Self::Transport { message: message.into() }
  }

  pub fn service(status: u16, message: impl Into<String>) -> Self {
    Self::Service { status, message: message.into() }
  }

  pub fn is_not_configured(&self) -> bool {
    matches!(self, GenerationFailure::NotConfigured)
  }

  /// Text shown to the user in place of the generated content
  pub fn display_message(&self) -> String {
    match self {
      GenerationFailure::NotConfigured => {
        "⚠️ API key not configured. Set OPENAI_API_KEY to enable generated content.".to_string()
      }
      other => format!("❌ Error querying the API: {other}"),
    }
  }
}

/// Outcome of one generation call
pub type Generated = std::result::Result<String, GenerationFailure>;

/// One request as handed to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
  pub model: String,
  pub prompt: String,
  pub temperature: f64,
  pub max_tokens: u32,
}

/// The single network call behind the client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
  async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Generated;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
  temperature: f64,
  max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
  content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
  error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
  message: String,
}

/// Production service: `POST {base}/chat/completions` with bearer auth
pub struct ChatCompletionsService {
  client: Client,
  base_url: String,
}

impl ChatCompletionsService {
  pub fn new(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Self { client: Client::new(), base_url }
  }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.base_url)
  }
}

impl Default for ChatCompletionsService {
  fn default() -> Self {
    Self::new(DEFAULT_API_BASE)
  }
}

#[async_trait]
impl CompletionService for ChatCompletionsService {
  async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Generated {
    let body = ChatRequest {
      model: &request.model,
      messages: vec![ChatMessage { role: "user", content: &request.prompt }],
      temperature: request.temperature,
      max_tokens: request.max_tokens,
    };

    let response = self
      .client
      .post(self.endpoint())
      .bearer_auth(api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| GenerationFailure::transport(e.to_string()))?;

    let status = response.status();
    let text = response.text().await.map_err(|e| GenerationFailure::transport(e.to_string()))?;

    if !status.is_success() {
      let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);
      return Err(GenerationFailure::service(status.as_u16(), message));
    }

    let parsed: ChatResponse = serde_json::from_str(&text)
      .map_err(|e| GenerationFailure::transport(format!("invalid response body: {e}")))?;

    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .filter(|content| !content.is_empty())
      .ok_or(GenerationFailure::EmptyResponse)
  }
}

/// Empty and placeholder keys count as "not configured"
pub fn normalize_api_key(raw: Option<String>) -> Option<String> {
  let key = raw?.trim().to_string();
  if key.is_empty() || key == PLACEHOLDER_API_KEY {
    None
  } else {
    Some(key)
  }
}

/// Client owning the credential, model choice and backend service
pub struct GenerationClient {
  service: Box<dyn CompletionService>,
  api_key: Option<String>,
  model: String,
}

impl GenerationClient {
  /// Client talking to a real chat-completions endpoint
  pub fn create(api_key: Option<String>, model: impl Into<String>, api_base: &str) -> Self {
    Self::with_service(Box::new(ChatCompletionsService::new(api_base)), api_key, model)
  }

  /// Client with an injected service (for testing)
  pub fn with_service(
    service: Box<dyn CompletionService>,
    api_key: Option<String>,
    model: impl Into<String>,
  ) -> Self {
    Self { service, api_key: normalize_api_key(api_key), model: model.into() }
  }

  pub fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  /// Generate text for `prompt`; never calls the backend without a key
  pub async fn generate(&self, prompt: &str, params: GenerationParams) -> Generated {
    let Some(api_key) = self.api_key.as_deref() else {
      debug!("generation skipped, no API key configured");
      return Err(GenerationFailure::NotConfigured);
    };

    let request = CompletionRequest {
      model: self.model.clone(),
      prompt: prompt.to_string(),
      temperature: params.temperature(),
      max_tokens: params.max_output_tokens(),
    };

    info!(
      model = %request.model,
      temperature = request.temperature,
      max_tokens = request.max_tokens,
      prompt_chars = request.prompt.len(),
      "requesting generation"
    );

    match self.service.complete(api_key, &request).await {
      Ok(text) => {
        debug!(chars = text.len(), "generation succeeded");
        Ok(text)
      }
      Err(failure) => {
        warn!(%failure, "generation failed");
        Err(failure)
      }
    }
  }
}
