//! Recording double for the advertising platform.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use ads_client::{
    AdObject, AdsApi, AdsError, CampaignSpec, Credentials, LookalikeSpec, MediaHandle, ObjectKind,
    ObjectStatus, QuickPostSpec, RuleSpec,
};

/// One recorded call against the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum AdsCall {
    ListObjects {
        kind: ObjectKind,
    },
    SetStatus {
        object_id: String,
        status: ObjectStatus,
    },
    CloneObject {
        kind: ObjectKind,
        object_id: String,
        new_name: String,
        copies: u32,
    },
    CreateCampaign {
        name: String,
    },
    CreateCustomAudience {
        name: String,
        phone_numbers: Vec<String>,
    },
    CreateMessengerAudience {
        name: String,
        days: u32,
    },
    CreateLookalikeAudience {
        name: String,
        source_audience_id: String,
        ratio_percent: u8,
    },
    CreateRule {
        name: String,
        condition: String,
        action: String,
    },
    CreateQuickPost {
        post_url: String,
        daily_budget: u64,
    },
    UploadImage {
        file_path: String,
    },
    UploadVideo {
        file_path: String,
    },
}

/// An [`AdsApi`] double that records every call and returns scripted
/// results.
///
/// By default every call succeeds with generated ids. A failure message
/// makes every subsequent call fail, for exercising external-error paths.
#[derive(Debug, Default)]
pub struct RecordingAdsApi {
    calls: Mutex<Vec<AdsCall>>,
    catalog: Vec<AdObject>,
    failure: Option<String>,
    next_id: AtomicU64,
}

impl RecordingAdsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `catalog` from `list_objects`.
    pub fn with_catalog(catalog: Vec<AdObject>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Make every call fail with a platform error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// All calls recorded so far, in order.
    pub fn calls(&self) -> Vec<AdsCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: AdsCall) -> Result<(), AdsError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.failure {
            Some(message) => Err(AdsError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn generate_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", prefix, n)
    }
}

#[async_trait]
impl AdsApi for RecordingAdsApi {
    async fn list_objects(
        &self,
        _creds: &Credentials,
        kind: ObjectKind,
    ) -> Result<Vec<AdObject>, AdsError> {
        self.record(AdsCall::ListObjects { kind })?;
        Ok(self
            .catalog
            .iter()
            .filter(|obj| obj.kind == kind)
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        _creds: &Credentials,
        object_id: &str,
        status: ObjectStatus,
    ) -> Result<(), AdsError> {
        self.record(AdsCall::SetStatus {
            object_id: object_id.to_string(),
            status,
        })
    }

    async fn clone_object(
        &self,
        _creds: &Credentials,
        kind: ObjectKind,
        object_id: &str,
        new_name: &str,
        copies: u32,
    ) -> Result<Vec<String>, AdsError> {
        self.record(AdsCall::CloneObject {
            kind,
            object_id: object_id.to_string(),
            new_name: new_name.to_string(),
            copies,
        })?;
        Ok((0..copies).map(|_| self.generate_id("copy")).collect())
    }

    async fn create_campaign(
        &self,
        _creds: &Credentials,
        spec: &CampaignSpec,
    ) -> Result<String, AdsError> {
        self.record(AdsCall::CreateCampaign {
            name: spec.name.clone(),
        })?;
        Ok(self.generate_id("campaign"))
    }

    async fn create_custom_audience(
        &self,
        _creds: &Credentials,
        name: &str,
        phone_numbers: &[String],
    ) -> Result<String, AdsError> {
        self.record(AdsCall::CreateCustomAudience {
            name: name.to_string(),
            phone_numbers: phone_numbers.to_vec(),
        })?;
        Ok(self.generate_id("audience"))
    }

    async fn create_messenger_audience(
        &self,
        _creds: &Credentials,
        name: &str,
        days: u32,
    ) -> Result<String, AdsError> {
        self.record(AdsCall::CreateMessengerAudience {
            name: name.to_string(),
            days,
        })?;
        Ok(self.generate_id("audience"))
    }

    async fn create_lookalike_audience(
        &self,
        _creds: &Credentials,
        name: &str,
        spec: &LookalikeSpec,
    ) -> Result<String, AdsError> {
        self.record(AdsCall::CreateLookalikeAudience {
            name: name.to_string(),
            source_audience_id: spec.source_audience_id.clone(),
            ratio_percent: spec.ratio_percent,
        })?;
        Ok(self.generate_id("audience"))
    }

    async fn create_rule(&self, _creds: &Credentials, spec: &RuleSpec) -> Result<String, AdsError> {
        self.record(AdsCall::CreateRule {
            name: spec.name.clone(),
            condition: spec.condition.clone(),
            action: spec.action.clone(),
        })?;
        Ok(self.generate_id("rule"))
    }

    async fn create_quick_post(
        &self,
        _creds: &Credentials,
        spec: &QuickPostSpec,
    ) -> Result<String, AdsError> {
        self.record(AdsCall::CreateQuickPost {
            post_url: spec.post_url.clone(),
            daily_budget: spec.daily_budget,
        })?;
        Ok(self.generate_id("quick"))
    }

    async fn upload_image(
        &self,
        _creds: &Credentials,
        file_path: &str,
    ) -> Result<MediaHandle, AdsError> {
        self.record(AdsCall::UploadImage {
            file_path: file_path.to_string(),
        })?;
        Ok(MediaHandle::ImageHash(self.generate_id("img")))
    }

    async fn upload_video(
        &self,
        _creds: &Credentials,
        file_path: &str,
    ) -> Result<MediaHandle, AdsError> {
        self.record(AdsCall::UploadVideo {
            file_path: file_path.to_string(),
        })?;
        Ok(MediaHandle::VideoId(self.generate_id("vid")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            ads_token: "t".to_string(),
            ad_account_id: "act_1".to_string(),
            page_token: "p".to_string(),
            page_id: "page".to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let api = RecordingAdsApi::new();
        api.set_status(&creds(), "100", ObjectStatus::Paused)
            .await
            .unwrap();
        api.create_rule(
            &creds(),
            &RuleSpec {
                name: "r".to_string(),
                condition: "spend > 1".to_string(),
                action: "pause".to_string(),
            },
        )
        .await
        .unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            AdsCall::SetStatus {
                object_id: "100".to_string(),
                status: ObjectStatus::Paused
            }
        );
    }

    #[tokio::test]
    async fn test_clone_returns_requested_copies() {
        let api = RecordingAdsApi::new();
        let ids = api
            .clone_object(&creds(), ObjectKind::Campaign, "100", "Copy", 3)
            .await
            .unwrap();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_failing_records_then_errors() {
        let api = RecordingAdsApi::failing("rate limited");
        let err = api
            .set_status(&creds(), "100", ObjectStatus::Active)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_kind() {
        let api = RecordingAdsApi::with_catalog(vec![
            AdObject {
                id: "1".to_string(),
                name: "c".to_string(),
                kind: ObjectKind::Campaign,
                status: ObjectStatus::Active,
            },
            AdObject {
                id: "2".to_string(),
                name: "a".to_string(),
                kind: ObjectKind::Ad,
                status: ObjectStatus::Active,
            },
        ]);
        let campaigns = api.list_objects(&creds(), ObjectKind::Campaign).await.unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].id, "1");
    }
}
