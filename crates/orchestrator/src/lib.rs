//! Dialogue orchestrator routing chat messages into ad workflows.
//!
//! This crate provides the [`Orchestrator`] type that owns a single chat
//! channel: it decides, message by message, whether the input belongs to
//! an in-progress workflow, starts a new one, or falls through to the
//! streaming general-chat responder.
//!
//! # Architecture
//!
//! ```text
//! Inbound message (text and/or attachment)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Reset command? → clear everything, acknowledge          │
//! │         ↓                                                   │
//! │  2. Active flow? → forward input to its stage handler       │
//! │     (at most one flow is ever active: ActiveFlow is a       │
//! │      tagged union, not six independent slots)               │
//! │         ↓                                                   │
//! │  3. Idle triggers: rule phrase, toggle/list phrase          │
//! │         ↓                                                   │
//! │  4. Attachment? → campaign-creation path                    │
//! │         ↓                                                   │
//! │  5. Intent classifier → start the matching flow             │
//! │     (each feature individually switchable)                  │
//! │         ↓                                                   │
//! │  6. Fallthrough → stream a general reply token-by-token     │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! Assistant turns appended to the shared transcript
//! ```
//!
//! Every failure path produces exactly one assistant turn; nothing in the
//! dispatch loop is process-fatal.
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_core::InboundMessage;
//! use orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), orchestrator::OrchestratorError> {
//!     let orchestrator = Orchestrator::from_env().await?;
//!
//!     let turns = orchestrator
//!         .handle(InboundMessage::text("pause the summer campaign"))
//!         .await;
//!     for turn in turns {
//!         println!("{}", turn.content);
//!     }
//!     Ok(())
//! }
//! ```

mod active_flow;
mod error;
mod flags;
mod orchestrator;
mod triggers;

pub use active_flow::ActiveFlow;
pub use error::OrchestratorError;
pub use flags::FeatureFlags;
pub use orchestrator::{Orchestrator, RESET_ACK};

// Re-export commonly used types from dependencies
pub use chat_core::{InboundMessage, Intent, Transcript, Turn};
