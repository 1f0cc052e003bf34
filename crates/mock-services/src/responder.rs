//! Scripted streaming responders.

use async_trait::async_trait;
use futures::stream;

use chat_core::{ChatResponder, CoreError, TokenStream, Turn};

/// A responder that streams a fixed token sequence for every request.
#[derive(Debug, Clone)]
pub struct TokenStreamResponder {
    tokens: Vec<String>,
}

impl TokenStreamResponder {
    /// Stream the given tokens, one stream item each.
    pub fn new(tokens: Vec<&str>) -> Self {
        Self {
            tokens: tokens.into_iter().map(String::from).collect(),
        }
    }

    /// Stream a single-token reply.
    pub fn single(reply: impl Into<String>) -> Self {
        Self {
            tokens: vec![reply.into()],
        }
    }
}

#[async_trait]
impl ChatResponder for TokenStreamResponder {
    async fn stream_reply(&self, _text: &str, _history: &[Turn]) -> Result<TokenStream, CoreError> {
        let items: Vec<Result<String, CoreError>> =
            self.tokens.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// A responder whose stream fails after a few tokens.
///
/// Exercises the partial-turn discard path in the transcript.
#[derive(Debug, Clone)]
pub struct FailingResponder {
    tokens_before_failure: Vec<String>,
}

impl FailingResponder {
    pub fn new(tokens_before_failure: Vec<&str>) -> Self {
        Self {
            tokens_before_failure: tokens_before_failure
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// A responder that fails immediately, yielding no tokens.
    pub fn immediate() -> Self {
        Self {
            tokens_before_failure: Vec::new(),
        }
    }
}

#[async_trait]
impl ChatResponder for FailingResponder {
    async fn stream_reply(&self, _text: &str, _history: &[Turn]) -> Result<TokenStream, CoreError> {
        let mut items: Vec<Result<String, CoreError>> = self
            .tokens_before_failure
            .iter()
            .cloned()
            .map(Ok)
            .collect();
        items.push(Err(CoreError::Network("scripted stream failure".to_string())));
        Ok(Box::pin(stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_streams_all_tokens() {
        let responder = TokenStreamResponder::new(vec!["Hel", "lo"]);
        let mut stream = responder.stream_reply("hi", &[]).await.unwrap();

        let mut collected = String::new();
        while let Some(token) = stream.next().await {
            collected.push_str(&token.unwrap());
        }
        assert_eq!(collected, "Hello");
    }

    #[tokio::test]
    async fn test_failing_responder_errors_after_tokens() {
        let responder = FailingResponder::new(vec!["partial"]);
        let mut stream = responder.stream_reply("hi", &[]).await.unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap(), "partial");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }
}
