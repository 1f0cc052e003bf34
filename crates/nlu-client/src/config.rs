//! Configuration for the NLU client.

use std::env;

use chat_core::CoreError;

/// Default API base URL.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Default model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for [`NluClient`](crate::NluClient).
#[derive(Debug, Clone)]
pub struct NluConfig {
    /// API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model used for classification, extraction and chat.
    pub model: String,

    /// Maximum tokens for streamed chat replies.
    pub max_tokens: Option<u32>,

    /// Temperature for chat replies. Classification and extraction always
    /// run at 0.
    pub temperature: Option<f32>,

    /// Maximum number of transcript turns sent as context.
    pub max_context_turns: usize,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(1024),
            temperature: Some(0.7),
            max_context_turns: 10,
        }
    }
}

impl NluConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `NLU_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `NLU_API_URL` - API base URL (default: api.openai.com/v1)
    /// - `NLU_MODEL` - model name (default: gpt-4o-mini)
    /// - `NLU_MAX_TOKENS` - max tokens for chat replies (default: 1024)
    /// - `NLU_TEMPERATURE` - chat temperature (default: 0.7)
    /// - `NLU_MAX_CONTEXT_TURNS` - context window in turns (default: 10)
    pub fn from_env() -> Result<Self, CoreError> {
        let api_key = env::var("NLU_API_KEY")
            .map_err(|_| CoreError::Configuration("NLU_API_KEY not set".to_string()))?;

        let api_url = env::var("NLU_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = env::var("NLU_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let max_tokens = env::var("NLU_MAX_TOKENS").ok().and_then(|s| s.parse().ok());
        let temperature = env::var("NLU_TEMPERATURE").ok().and_then(|s| s.parse().ok());
        let max_context_turns = env::var("NLU_MAX_CONTEXT_TURNS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens: max_tokens.or(Some(1024)),
            temperature: temperature.or(Some(0.7)),
            max_context_turns,
        })
    }

    /// Create a new configuration with the required fields.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the max tokens for chat replies.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the chat temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NluConfig::new("key");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_context_turns, 10);
    }

    #[test]
    fn test_builder_chain() {
        let config = NluConfig::new("key")
            .with_api_url("http://localhost:8080/v1")
            .with_model("test-model")
            .with_max_tokens(64)
            .with_temperature(0.1);

        assert_eq!(config.api_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.max_tokens, Some(64));
    }
}
