//! Core types and traits for the ads-assistant conversation channel.
//!
//! This crate provides the shared vocabulary for every other crate in the
//! workspace. It defines:
//!
//! - [`Turn`] / [`Transcript`] - the append-only conversation log
//! - [`InboundMessage`] / [`Attachment`] - one inbound unit of user input
//! - [`Intent`] - the coarse label produced by the intent classifier
//! - [`IntentClassifier`] / [`FieldExtractor`] / [`ChatResponder`] - the
//!   service seams the orchestrator calls into
//! - [`CoreError`] - error type for service operations
//!
//! # Example
//!
//! ```rust
//! use chat_core::{CoreError, Intent, IntentClassifier, Turn};
//! use async_trait::async_trait;
//!
//! struct AlwaysCampaign;
//!
//! #[async_trait]
//! impl IntentClassifier for AlwaysCampaign {
//!     async fn detect(&self, _text: &str, _history: &[Turn]) -> Result<Intent, CoreError> {
//!         Ok(Intent::CreateCampaign)
//!     }
//! }
//! ```

mod error;
mod intent;
mod message;
mod services;
mod transcript;

pub use error::CoreError;
pub use intent::Intent;
pub use message::{Attachment, InboundMessage, Role, Turn, MAX_IMAGE_BYTES, MAX_VIDEO_BYTES};
pub use services::{ChatResponder, FieldExtractor, IntentClassifier, TokenStream};
pub use transcript::{StreamId, Transcript};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
