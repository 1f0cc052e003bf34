//! Service traits the orchestrator calls into.
//!
//! These are the seams between the dialogue orchestrator and its external
//! collaborators: the intent classifier, the field extractor used during
//! audience collection, and the streaming general-chat responder. All of
//! them are opaque request/response services from the orchestrator's
//! perspective.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;
use serde_json::Value;

use crate::error::CoreError;
use crate::intent::Intent;
use crate::message::Turn;

/// A stream of reply tokens from the general-chat responder.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, CoreError>> + Send>>;

/// Classifies free text into a coarse [`Intent`] label.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Detect the intent of `text`, given recent conversation history.
    async fn detect(&self, text: &str, history: &[Turn]) -> Result<Intent, CoreError>;
}

/// Extracts named fields from free text.
///
/// Used by the audience-creation flow for lookalike collection. The
/// extractor is best-effort; callers apply a deterministic backfill pass
/// for values the extractor misses.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extract the requested fields from `text`.
    ///
    /// Returns a JSON object mapping field names to extracted values.
    /// Fields the extractor could not find are simply absent.
    async fn extract(&self, text: &str, fields: &[&str]) -> Result<Value, CoreError>;
}

/// Produces a streamed free-form reply for general conversation.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    /// Start streaming a reply to `text`, given recent history.
    ///
    /// The returned stream yields incremental content tokens. Callers may
    /// drop the stream at any point to abandon the reply.
    async fn stream_reply(&self, text: &str, history: &[Turn]) -> Result<TokenStream, CoreError>;
}
