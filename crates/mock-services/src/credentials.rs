//! Credential provider doubles.

use async_trait::async_trait;

use ads_client::{AdsError, CredentialProvider, Credentials};

/// A credential provider with fixed tokens.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl Default for StaticCredentials {
    /// Plausible non-empty defaults for tests that don't care about values.
    fn default() -> Self {
        Self {
            credentials: Credentials {
                ads_token: "test-ads-token".to_string(),
                ad_account_id: "act_123".to_string(),
                page_token: "test-page-token".to_string(),
                page_id: "page_123".to_string(),
            },
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn get_tokens(&self) -> Result<Credentials, AdsError> {
        Ok(self.credentials.clone())
    }
}

/// A credential provider that always reports a missing setting.
#[derive(Debug, Clone)]
pub struct MissingCredentials {
    setting: String,
}

impl MissingCredentials {
    pub fn new(setting: impl Into<String>) -> Self {
        Self {
            setting: setting.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for MissingCredentials {
    async fn get_tokens(&self) -> Result<Credentials, AdsError> {
        Err(AdsError::MissingSetting(self.setting.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_returns_fixed_tokens() {
        let provider = StaticCredentials::default();
        let creds = provider.get_tokens().await.unwrap();
        assert_eq!(creds.ad_account_id, "act_123");
    }

    #[tokio::test]
    async fn test_missing_reports_setting() {
        let provider = MissingCredentials::new("ADS_ACCESS_TOKEN");
        let err = provider.get_tokens().await.unwrap_err();
        assert!(err.to_string().contains("ADS_ACCESS_TOKEN"));
    }
}
