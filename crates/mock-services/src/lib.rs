//! Mock service implementations for testing the ads assistant.
//!
//! This crate provides scripted doubles for every service seam the
//! orchestrator depends on:
//! - `ScriptedClassifier` - returns a queued sequence of intents
//! - `ScriptedExtractor` - returns queued field-extraction results
//! - `TokenStreamResponder` - streams a fixed token sequence
//! - `RecordingAdsApi` - records calls and returns scripted results
//! - `StaticCredentials` - a credential provider with fixed tokens
//!
//! For production behavior, use the `nlu-client` and `ads-client` crates
//! instead.
//!
//! # Example
//!
//! ```rust
//! use chat_core::{Intent, IntentClassifier};
//! use mock_services::ScriptedClassifier;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chat_core::CoreError> {
//!     let classifier = ScriptedClassifier::always(Intent::QuickPost);
//!     let intent = classifier.detect("boost my post", &[]).await?;
//!     assert_eq!(intent, Intent::QuickPost);
//!     Ok(())
//! }
//! ```

mod ads;
mod classifier;
mod credentials;
mod extractor;
mod responder;

// Re-export the seams for convenience
pub use chat_core::{async_trait, ChatResponder, FieldExtractor, Intent, IntentClassifier};

pub use ads::{AdsCall, RecordingAdsApi};
pub use classifier::ScriptedClassifier;
pub use credentials::{MissingCredentials, StaticCredentials};
pub use extractor::ScriptedExtractor;
pub use responder::{FailingResponder, TokenStreamResponder};
