//! Credential provisioning for the advertising platform.

use std::env;

use async_trait::async_trait;

use crate::error::AdsError;

/// The set of tokens and identifiers needed for platform calls.
///
/// Credentials are supplied lazily and re-fetched at every point of use;
/// flow controllers never hold on to them across turns, so rotated tokens
/// take effect on the next call.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Access token for the advertising API.
    pub ads_token: String,
    /// Ad account identifier (e.g. "act_123456").
    pub ad_account_id: String,
    /// Access token for the messaging page.
    pub page_token: String,
    /// Page identifier.
    pub page_id: String,
}

/// Supplies the currently configured credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get the current credentials.
    ///
    /// Fails with [`AdsError::MissingSetting`] naming the missing setting
    /// when configuration is incomplete.
    async fn get_tokens(&self) -> Result<Credentials, AdsError>;
}

/// Credential provider backed by environment variables.
///
/// Required variables:
/// - `ADS_ACCESS_TOKEN` - advertising API access token
/// - `AD_ACCOUNT_ID` - ad account identifier
/// - `PAGE_ACCESS_TOKEN` - page access token
/// - `PAGE_ID` - page identifier
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new env-backed provider.
    pub fn new() -> Self {
        Self
    }

    fn require(name: &str, hint: &str) -> Result<String, AdsError> {
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(AdsError::MissingSetting(format!(
                "{} is not configured. Set the {} environment variable ({}).",
                name, name, hint
            ))),
        }
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn get_tokens(&self) -> Result<Credentials, AdsError> {
        let ads_token = Self::require("ADS_ACCESS_TOKEN", "advertising API access token")?;
        let ad_account_id = Self::require("AD_ACCOUNT_ID", "ad account id, e.g. act_123456")?;
        let page_token = Self::require("PAGE_ACCESS_TOKEN", "page access token")?;
        let page_id = Self::require("PAGE_ID", "page identifier")?;

        Ok(Credentials {
            ads_token,
            ad_account_id,
            page_token,
            page_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing_names_setting() {
        let err = EnvCredentialProvider::require("DEFINITELY_NOT_SET_VAR", "a test value")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DEFINITELY_NOT_SET_VAR"));
        assert!(msg.contains("a test value"));
    }
}
