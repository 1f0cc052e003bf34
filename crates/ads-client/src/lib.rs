//! Advertising-platform client for the ads assistant.
//!
//! This crate wraps the external advertising/data platform behind the
//! [`AdsApi`] trait so the orchestrator and flow controllers can be tested
//! against doubles. It also provides the [`CredentialProvider`] seam that
//! supplies the currently configured account tokens, failing fast with a
//! message naming the missing setting when configuration is incomplete.

mod api;
mod client;
mod credentials;
mod error;
mod types;

pub use api::AdsApi;
pub use client::{GraphAdsClient, GraphAdsConfig};
pub use credentials::{CredentialProvider, Credentials, EnvCredentialProvider};
pub use error::AdsError;
pub use types::{
    AdObject, CampaignSpec, LookalikeSpec, MediaHandle, ObjectKind, ObjectStatus, QuickPostSpec,
    RuleSpec,
};
