//! The NLU client implementation.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use chat_core::{
    ChatResponder, CoreError, FieldExtractor, Intent, IntentClassifier, TokenStream, Turn,
};

use crate::config::NluConfig;
use crate::json_extract::first_json_object;
use crate::types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, StreamChunk};

/// System prompt for intent classification.
///
/// The model is asked for a single coarse label; anything else is treated
/// as "unknown" downstream.
const CLASSIFIER_PROMPT: &str = r#"You classify messages sent to an advertising assistant. Output JSON only:
{"intent": "<label>"}

Labels:
- "create_campaign": user wants to create an ad campaign (pasted post text, campaign details)
- "create_audience": user wants to build a custom or lookalike audience
- "clone": user wants to duplicate an existing campaign, ad set or ad
- "quick_post": user wants to boost/advertise an existing post link
- "toggle": user wants to turn campaigns on/off or list them
- "create_rule": user wants an automation rule (auto-pause, budget rules)
- "unknown": anything else

The input format is:
[CONTEXT: recent conversation, if any]
[MESSAGE: the user's new message]

Respond with JSON only. No explanation."#;

/// Client implementing the channel's three language seams over one
/// chat-completions API.
pub struct NluClient {
    http: Client,
    config: NluConfig,
}

impl NluClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NluConfig) -> Result<Self, CoreError> {
        let http = Client::builder()
            .build()
            .map_err(|e| CoreError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        info!("NLU client initialized with model {}", config.model);

        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::new(NluConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &NluConfig {
        &self.config
    }

    /// Format transcript turns into a compact context block.
    fn format_context(history: &[Turn]) -> Option<String> {
        if history.is_empty() {
            return None;
        }
        let summary = history
            .iter()
            .map(|t| format!("{}: {}", t.role.as_str(), t.content))
            .collect::<Vec<_>>()
            .join(" | ");
        Some(summary)
    }

    /// Make a non-streaming completion request with deterministic settings.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, CoreError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(256),
            temperature: Some(0.0),
            stream: false,
        };

        let response = self.send(&request).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CoreError::ProcessingFailed(format!("failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CoreError::ProcessingFailed("no content in response".to_string()))
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<reqwest::Response, CoreError> {
        let url = format!("{}/chat/completions", self.config.api_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CoreError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                message
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl IntentClassifier for NluClient {
    async fn detect(&self, text: &str, history: &[Turn]) -> Result<Intent, CoreError> {
        let mut input = String::new();
        if let Some(context) = Self::format_context(history) {
            input.push_str(&format!("[CONTEXT: {}]\n", context));
        }
        input.push_str(&format!("[MESSAGE: {}]", text));

        let messages = vec![
            ChatMessage::system(CLASSIFIER_PROMPT),
            ChatMessage::user(input),
        ];

        let raw = self.complete(messages).await?;
        debug!("Classifier response: {}", raw);

        let parsed = first_json_object(&raw)
            .and_then(|json_str| serde_json::from_str::<Value>(json_str).ok());
        let intent = match parsed {
            Some(value) => value
                .get("intent")
                .and_then(|v| v.as_str())
                .map(Intent::from_label)
                .unwrap_or(Intent::Unknown),
            None => {
                // Some models skip the JSON wrapper and answer with the
                // bare label; accept that too.
                warn!("Classifier returned non-JSON output: {}", raw);
                Intent::from_label(raw.trim())
            }
        };

        info!("Detected intent: {:?}", intent);
        Ok(intent)
    }
}

#[async_trait]
impl FieldExtractor for NluClient {
    async fn extract(&self, text: &str, fields: &[&str]) -> Result<Value, CoreError> {
        let prompt = format!(
            "Extract the following fields from the user's message: {}.\n\
             Output a JSON object with only the fields you actually find.\n\
             Omit fields that are not clearly present. JSON only, no explanation.",
            fields.join(", ")
        );

        let messages = vec![ChatMessage::system(prompt), ChatMessage::user(text)];

        let raw = self.complete(messages).await?;
        debug!("Extractor response: {}", raw);

        let parsed = first_json_object(&raw)
            .and_then(|json_str| serde_json::from_str::<Value>(json_str).ok());
        match parsed {
            Some(value) if value.is_object() => Ok(value),
            _ => {
                // Extraction is best-effort; callers run a deterministic
                // backfill pass, so an empty object is a safe answer.
                warn!("Extractor returned unusable output: {}", raw);
                Ok(Value::Object(serde_json::Map::new()))
            }
        }
    }
}

#[async_trait]
impl ChatResponder for NluClient {
    async fn stream_reply(&self, text: &str, history: &[Turn]) -> Result<TokenStream, CoreError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        for turn in history {
            messages.push(ChatMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }
        messages.push(ChatMessage::user(text));

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: true,
        };

        let response = self.send(&request).await?;
        let bytes = response.bytes_stream();

        // Decode the SSE framing into content tokens. Lines look like
        // `data: {json}` with a final `data: [DONE]` marker.
        let stream = futures::stream::unfold(
            (Box::pin(bytes), String::new(), false),
            |(mut inner, mut buffer, mut done)| async move {
                loop {
                    if let Some(pos) = buffer.find('\n') {
                        let line: String = buffer.drain(..=pos).collect();
                        let line = line.trim();

                        let Some(payload) = line.strip_prefix("data:") else {
                            continue;
                        };
                        let payload = payload.trim();

                        if payload == "[DONE]" {
                            done = true;
                            continue;
                        }

                        match serde_json::from_str::<StreamChunk>(payload) {
                            Ok(chunk) => {
                                let token = chunk
                                    .choices
                                    .into_iter()
                                    .next()
                                    .and_then(|c| c.delta.content)
                                    .unwrap_or_default();
                                if token.is_empty() {
                                    continue;
                                }
                                return Some((Ok(token), (inner, buffer, done)));
                            }
                            Err(e) => {
                                debug!("Skipping unparseable stream chunk: {}", e);
                                continue;
                            }
                        }
                    }

                    if done {
                        return None;
                    }

                    match inner.next().await {
                        Some(Ok(bytes)) => {
                            buffer.push_str(&String::from_utf8_lossy(&bytes));
                        }
                        Some(Err(e)) => {
                            let err = CoreError::Network(format!("stream error: {}", e));
                            return Some((Err(err), (inner, buffer, true)));
                        }
                        None => {
                            done = true;
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Role;

    #[test]
    fn test_format_context_empty() {
        assert!(NluClient::format_context(&[]).is_none());
    }

    #[test]
    fn test_format_context_joins_turns() {
        let history = vec![Turn::user("hi"), Turn::assistant("hello")];
        let context = NluClient::format_context(&history).unwrap();
        assert_eq!(context, "user: hi | assistant: hello");
        assert_eq!(history[0].role, Role::User);
    }

    #[test]
    fn test_classifier_prompt_covers_all_labels() {
        for label in [
            "create_campaign",
            "create_audience",
            "clone",
            "quick_post",
            "toggle",
            "create_rule",
            "unknown",
        ] {
            assert!(CLASSIFIER_PROMPT.contains(label), "missing {}", label);
        }
    }
}
