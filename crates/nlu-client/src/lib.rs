//! NLU services backed by an OpenAI-compatible chat-completions API.
//!
//! One HTTP client implements all three of the conversation channel's
//! language seams:
//!
//! - [`chat_core::IntentClassifier`] - single coarse label per message
//! - [`chat_core::FieldExtractor`] - best-effort JSON field extraction
//! - [`chat_core::ChatResponder`] - token-streamed general replies
//!
//! The classifier and extractor are called with deterministic settings
//! (temperature 0) and their output is defensively parsed: the first
//! balanced JSON object is recovered from whatever wrapping the model adds
//! (markdown fences, prose, stray closing braces).

mod client;
mod config;
mod json_extract;
mod types;

pub use client::NluClient;
pub use config::NluConfig;
pub use json_extract::first_json_object;
