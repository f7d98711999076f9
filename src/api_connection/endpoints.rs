use serde::{Deserialize, Serialize};

pub const DEFAULT_OLLAMA_URL: &str = "http://ollama:11434";
pub const OLLAMA_URL_ENV_VAR: &str = "OLLAMA_URL";
pub const DEFAULT_MODEL: &str = "gemma3:1b";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;

pub const GENERATE_PATH: &str = "/api/generate";
pub const TAGS_PATH: &str = "/api/tags";
pub const PULL_PATH: &str = "/api/pull";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateOptions {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelTag {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PullRequest {
    pub name: String,
    pub stream: bool,
}
