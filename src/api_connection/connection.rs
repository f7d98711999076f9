use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::Client;
use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::endpoints::{
    GenerateOptions, GenerateRequest, GenerateResponse, PullRequest, TagsResponse,
    DEFAULT_OLLAMA_URL, DEFAULT_TEMPERATURE, GENERATE_PATH, OLLAMA_URL_ENV_VAR, PULL_PATH,
    TAGS_PATH,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);
const PULL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Every way the model endpoint can fail to produce a completion.
/// Callers treat all of them as "model unavailable".
#[derive(Debug)]
pub enum ModelError {
    ClientBuild(reqwest::Error),
    NetworkError(reqwest::Error),
    Timeout(Duration),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    InvalidResponse(String),
    Disabled,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ClientBuild(err) => write!(f, "Failed to build HTTP client: {}", err),
            ModelError::NetworkError(err) => write!(f, "Network error: {}", err),
            ModelError::Timeout(after) => {
                write!(f, "Model did not answer within {}s", after.as_secs_f32())
            }
            ModelError::ApiError { status, error_body } => {
                write!(f, "Model API error {}: {}", status, error_body)
            }
            ModelError::InvalidResponse(msg) => write!(f, "Invalid model response: {}", msg),
            ModelError::Disabled => write!(f, "Model calls are disabled"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelError::ClientBuild(err) | ModelError::NetworkError(err) => Some(err),
            _ => None,
        }
    }
}

/// Seam between the recommendation flow and whatever produces completions.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// One prompt in, one completion out. No retries.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Reads the endpoint base URL from `OLLAMA_URL`, loading `.env` first.
pub fn ollama_url_from_env() -> String {
    dotenv().ok();
    env::var(OLLAMA_URL_ENV_VAR)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(ModelError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            timeout,
        })
    }

    pub fn from_env(model: impl Into<String>, timeout: Duration) -> Result<Self, ModelError> {
        Self::new(ollama_url_from_env(), model, timeout)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            ModelError::NetworkError(err)
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ModelError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        Err(ModelError::ApiError { status, error_body })
    }

    /// Lists the model names the server has locally.
    pub async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let response = self
            .client
            .get(self.url(TAGS_PATH))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    pub async fn pull_model(&self) -> Result<(), ModelError> {
        info!(model = %self.model, base_url = %self.base_url, "pulling model");
        let response = self
            .client
            .post(self.url(PULL_PATH))
            .timeout(PULL_TIMEOUT)
            .json(&PullRequest {
                name: self.model.clone(),
                stream: false,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(PULL_TIMEOUT)
                } else {
                    ModelError::NetworkError(e)
                }
            })?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Makes sure the configured model is present, pulling it when missing.
    /// Returns whether the model is available afterwards.
    pub async fn ensure_model(&self) -> Result<bool, ModelError> {
        if self.list_models().await?.iter().any(|m| m == &self.model) {
            debug!(model = %self.model, "model already available");
            return Ok(true);
        }
        self.pull_model().await?;
        let available = self.list_models().await?.iter().any(|m| m == &self.model);
        if !available {
            warn!(model = %self.model, "model still missing after pull");
        }
        Ok(available)
    }
}

#[async_trait]
impl CompletionModel for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: Some(GenerateOptions {
                temperature: self.temperature,
                num_predict: None,
            }),
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "calling model");
        let response = self
            .client
            .post(self.url(GENERATE_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        debug!(status = %response.status(), "model responded");

        let response = Self::check_status(response).await?;
        let body: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(self.timeout)
            } else {
                ModelError::InvalidResponse(e.to_string())
            }
        })?;

        if let Some(error) = body.error {
            return Err(ModelError::InvalidResponse(error));
        }
        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/", "gemma3:1b", DEFAULT_TIMEOUT)
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.url(GENERATE_PATH), "http://localhost:11434/api/generate");
        assert_eq!(client.model_name(), "gemma3:1b");
    }

    #[test]
    fn test_error_display() {
        let err = ModelError::ApiError {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            error_body: "loading".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("loading"));
        let err = ModelError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
        assert!(err.source().is_none());
    }
}
