//! Graph-style advertising API client.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::api::AdsApi;
use crate::credentials::Credentials;
use crate::error::AdsError;
use crate::types::{
    AdObject, CampaignSpec, LookalikeSpec, MediaHandle, ObjectKind, ObjectStatus, QuickPostSpec,
    RuleSpec,
};

/// Default API base URL.
const DEFAULT_API_URL: &str = "https://graph.facebook.com/v19.0";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`GraphAdsClient`].
#[derive(Debug, Clone)]
pub struct GraphAdsConfig {
    /// API base URL.
    pub api_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GraphAdsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GraphAdsConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `ADS_API_URL` - API base URL (default: graph.facebook.com/v19.0)
    /// - `ADS_API_TIMEOUT_SECS` - request timeout in seconds (default: 60)
    pub fn from_env() -> Self {
        let api_url = env::var("ADS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout = env::var("ADS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self { api_url, timeout }
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Error envelope returned by the platform.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Listing response envelope.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<ListedObject>,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    id: String,
    name: String,
    #[serde(default)]
    effective_status: Option<String>,
}

/// Generic id response envelope.
#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ImageUploadResponse {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct VideoUploadResponse {
    id: String,
}

/// HTTP client for the advertising platform.
pub struct GraphAdsClient {
    http: Client,
    config: GraphAdsConfig,
}

impl GraphAdsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GraphAdsConfig) -> Result<Self, AdsError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdsError::Network(format!("failed to create HTTP client: {}", e)))?;

        info!("Ads client initialized for {}", config.api_url);

        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, AdsError> {
        Self::new(GraphAdsConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &GraphAdsConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url, path)
    }

    /// Decode a response, surfacing the platform's error message on failure.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AdsError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AdsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AdsError::InvalidResponse(format!("failed to parse response: {}", e)))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Result<T, AdsError> {
        debug!("POST {}", path);

        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdsError::Network(format!("request failed: {}", e)))?;

        Self::decode(response).await
    }
}

#[async_trait]
impl AdsApi for GraphAdsClient {
    async fn list_objects(
        &self,
        creds: &Credentials,
        kind: ObjectKind,
    ) -> Result<Vec<AdObject>, AdsError> {
        let path = format!("{}/{}", creds.ad_account_id, kind.path_segment());
        debug!("GET {}", path);

        let response = self
            .http
            .get(self.url(&path))
            .bearer_auth(&creds.ads_token)
            .query(&[("fields", "id,name,effective_status")])
            .send()
            .await
            .map_err(|e| AdsError::Network(format!("request failed: {}", e)))?;

        let listing: ListResponse = Self::decode(response).await?;

        let objects = listing
            .data
            .into_iter()
            .map(|obj| {
                let status = match obj.effective_status.as_deref() {
                    Some("ACTIVE") => ObjectStatus::Active,
                    _ => ObjectStatus::Paused,
                };
                AdObject {
                    id: obj.id,
                    name: obj.name,
                    kind,
                    status,
                }
            })
            .collect::<Vec<_>>();

        info!("Listed {} {}(s)", objects.len(), kind.label());
        Ok(objects)
    }

    async fn set_status(
        &self,
        creds: &Credentials,
        object_id: &str,
        status: ObjectStatus,
    ) -> Result<(), AdsError> {
        let _: serde_json::Value = self
            .post_json(
                object_id,
                &creds.ads_token,
                json!({ "status": status }),
            )
            .await?;

        info!("Set {} to {}", object_id, status.label());
        Ok(())
    }

    async fn clone_object(
        &self,
        creds: &Credentials,
        kind: ObjectKind,
        object_id: &str,
        new_name: &str,
        copies: u32,
    ) -> Result<Vec<String>, AdsError> {
        let mut created = Vec::with_capacity(copies as usize);

        for n in 1..=copies {
            let name = if copies == 1 {
                new_name.to_string()
            } else {
                format!("{} ({})", new_name, n)
            };

            let response: IdResponse = self
                .post_json(
                    &format!("{}/copies", object_id),
                    &creds.ads_token,
                    json!({ "rename_options": { "rename_suffix": "" }, "name": name }),
                )
                .await?;
            created.push(response.id);
        }

        info!(
            "Cloned {} {} into {} cop(ies)",
            kind.label(),
            object_id,
            created.len()
        );
        Ok(created)
    }

    async fn create_campaign(
        &self,
        creds: &Credentials,
        spec: &CampaignSpec,
    ) -> Result<String, AdsError> {
        let mut body = json!({
            "name": spec.name,
            "objective": spec.objective,
            "daily_budget": spec.daily_budget,
            "body_text": spec.body_text,
            "status": "PAUSED",
        });

        if let Some(radius) = spec.radius_km {
            body["targeting"] = json!({ "radius_km": radius });
        }
        match &spec.media {
            Some(MediaHandle::ImageHash(hash)) => body["image_hash"] = json!(hash),
            Some(MediaHandle::VideoId(id)) => body["video_id"] = json!(id),
            None => {}
        }

        let path = format!("{}/campaigns", creds.ad_account_id);
        let response: IdResponse = self.post_json(&path, &creds.ads_token, body).await?;

        info!("Created campaign {} ({})", spec.name, response.id);
        Ok(response.id)
    }

    async fn create_custom_audience(
        &self,
        creds: &Credentials,
        name: &str,
        phone_numbers: &[String],
    ) -> Result<String, AdsError> {
        let path = format!("{}/customaudiences", creds.ad_account_id);
        let response: IdResponse = self
            .post_json(
                &path,
                &creds.ads_token,
                json!({
                    "name": name,
                    "subtype": "CUSTOM",
                    "customer_file_source": "USER_PROVIDED_ONLY",
                    "phone_numbers": phone_numbers,
                }),
            )
            .await?;

        info!(
            "Created custom audience {} with {} numbers",
            name,
            phone_numbers.len()
        );
        Ok(response.id)
    }

    async fn create_messenger_audience(
        &self,
        creds: &Credentials,
        name: &str,
        days: u32,
    ) -> Result<String, AdsError> {
        let path = format!("{}/customaudiences", creds.ad_account_id);
        let response: IdResponse = self
            .post_json(
                &path,
                &creds.ads_token,
                json!({
                    "name": name,
                    "subtype": "ENGAGEMENT",
                    "page_id": creds.page_id,
                    "retention_days": days,
                }),
            )
            .await?;

        info!("Created messenger audience {} ({} days)", name, days);
        Ok(response.id)
    }

    async fn create_lookalike_audience(
        &self,
        creds: &Credentials,
        name: &str,
        spec: &LookalikeSpec,
    ) -> Result<String, AdsError> {
        let path = format!("{}/customaudiences", creds.ad_account_id);
        let response: IdResponse = self
            .post_json(
                &path,
                &creds.ads_token,
                json!({
                    "name": name,
                    "subtype": "LOOKALIKE",
                    "origin_audience_id": spec.source_audience_id,
                    "lookalike_spec": {
                        "country": spec.country,
                        "ratio": f64::from(spec.ratio_percent) / 100.0,
                    },
                }),
            )
            .await?;

        info!(
            "Created lookalike audience {} ({}% of {})",
            name, spec.ratio_percent, spec.country
        );
        Ok(response.id)
    }

    async fn create_rule(&self, creds: &Credentials, spec: &RuleSpec) -> Result<String, AdsError> {
        let path = format!("{}/adrules_library", creds.ad_account_id);
        let response: IdResponse = self
            .post_json(
                &path,
                &creds.ads_token,
                json!({
                    "name": spec.name,
                    "evaluation_spec": { "condition": spec.condition },
                    "execution_spec": { "execution_type": spec.action },
                }),
            )
            .await?;

        info!("Created rule {} ({})", spec.name, response.id);
        Ok(response.id)
    }

    async fn create_quick_post(
        &self,
        creds: &Credentials,
        spec: &QuickPostSpec,
    ) -> Result<String, AdsError> {
        let path = format!("{}/campaigns", creds.ad_account_id);
        let response: IdResponse = self
            .post_json(
                &path,
                &creds.ads_token,
                json!({
                    "name": format!("Boost: {}", spec.post_url),
                    "objective": "POST_ENGAGEMENT",
                    "daily_budget": spec.daily_budget,
                    "promoted_post_url": spec.post_url,
                    "status": "PAUSED",
                }),
            )
            .await?;

        info!("Created quick-post campaign for {}", spec.post_url);
        Ok(response.id)
    }

    async fn upload_image(
        &self,
        creds: &Credentials,
        file_path: &str,
    ) -> Result<MediaHandle, AdsError> {
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| AdsError::Upload(format!("could not read {}: {}", file_path, e)))?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name("image");
        let form = reqwest::multipart::Form::new().part("source", part);

        let path = format!("{}/adimages", creds.ad_account_id);
        let response = self
            .http
            .post(self.url(&path))
            .bearer_auth(&creds.ads_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AdsError::Network(format!("upload failed: {}", e)))?;

        let upload: ImageUploadResponse = Self::decode(response).await?;
        info!("Uploaded image {} (hash {})", file_path, upload.hash);
        Ok(MediaHandle::ImageHash(upload.hash))
    }

    async fn upload_video(
        &self,
        creds: &Credentials,
        file_path: &str,
    ) -> Result<MediaHandle, AdsError> {
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| AdsError::Upload(format!("could not read {}: {}", file_path, e)))?;

        if bytes.is_empty() {
            warn!("Uploading empty video file: {}", file_path);
        }

        let part = reqwest::multipart::Part::bytes(bytes).file_name("video");
        let form = reqwest::multipart::Form::new().part("source", part);

        let path = format!("{}/advideos", creds.ad_account_id);
        let response = self
            .http
            .post(self.url(&path))
            .bearer_auth(&creds.ads_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AdsError::Network(format!("upload failed: {}", e)))?;

        let upload: VideoUploadResponse = Self::decode(response).await?;
        info!("Uploaded video {} (id {})", file_path, upload.id);
        Ok(MediaHandle::VideoId(upload.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphAdsConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_with_api_url() {
        let config = GraphAdsConfig::default().with_api_url("http://localhost:9999/v1");
        assert_eq!(config.api_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_url_join() {
        let client = GraphAdsClient::new(
            GraphAdsConfig::default().with_api_url("http://localhost:1234/v1"),
        )
        .unwrap();
        assert_eq!(
            client.url("act_1/campaigns"),
            "http://localhost:1234/v1/act_1/campaigns"
        );
    }

    #[test]
    fn test_error_body_parsing() {
        let body = r#"{"error": {"message": "Invalid OAuth access token."}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Invalid OAuth access token.");
    }
}
