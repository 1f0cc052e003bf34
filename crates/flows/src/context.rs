//! Injected services for flow stage handlers.

use ads_client::{AdsApi, CredentialProvider, Credentials};
use chat_core::FieldExtractor;

use crate::error::FlowError;

/// Borrowed handles to the external services a stage handler may call.
///
/// Passed per invocation so controllers own no service state and can be
/// driven by test doubles.
pub struct FlowContext<'a> {
    pub ads: &'a dyn AdsApi,
    pub credentials: &'a dyn CredentialProvider,
    pub extractor: &'a dyn FieldExtractor,
}

impl<'a> FlowContext<'a> {
    /// Fetch fresh credentials at the point of use.
    ///
    /// Credentials are never cached across turns so rotated tokens take
    /// effect on the next call.
    pub async fn tokens(&self) -> Result<Credentials, FlowError> {
        self.credentials
            .get_tokens()
            .await
            .map_err(|e| FlowError::MissingConfig(e.user_message()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A do-nothing service bundle for exercising stage transitions.

    use async_trait::async_trait;
    use serde_json::Value;

    use ads_client::{
        AdObject, AdsApi, AdsError, CampaignSpec, CredentialProvider, Credentials, LookalikeSpec,
        MediaHandle, ObjectKind, ObjectStatus, QuickPostSpec, RuleSpec,
    };
    use chat_core::{CoreError, FieldExtractor};

    use super::FlowContext;

    pub(crate) struct NoopServices;

    impl NoopServices {
        pub(crate) fn as_context(&self) -> FlowContext<'_> {
            FlowContext {
                ads: self,
                credentials: self,
                extractor: self,
            }
        }
    }

    pub(crate) fn noop_context() -> NoopServices {
        NoopServices
    }

    #[async_trait]
    impl CredentialProvider for NoopServices {
        async fn get_tokens(&self) -> Result<Credentials, AdsError> {
            Ok(Credentials {
                ads_token: "token".to_string(),
                ad_account_id: "act_1".to_string(),
                page_token: "page-token".to_string(),
                page_id: "page_1".to_string(),
            })
        }
    }

    #[async_trait]
    impl FieldExtractor for NoopServices {
        async fn extract(&self, _text: &str, _fields: &[&str]) -> Result<Value, CoreError> {
            Ok(Value::Object(serde_json::Map::new()))
        }
    }

    #[async_trait]
    impl AdsApi for NoopServices {
        async fn list_objects(
            &self,
            _creds: &Credentials,
            _kind: ObjectKind,
        ) -> Result<Vec<AdObject>, AdsError> {
            Ok(Vec::new())
        }

        async fn set_status(
            &self,
            _creds: &Credentials,
            _object_id: &str,
            _status: ObjectStatus,
        ) -> Result<(), AdsError> {
            Ok(())
        }

        async fn clone_object(
            &self,
            _creds: &Credentials,
            _kind: ObjectKind,
            _object_id: &str,
            _new_name: &str,
            copies: u32,
        ) -> Result<Vec<String>, AdsError> {
            Ok((0..copies).map(|i| format!("copy-{}", i)).collect())
        }

        async fn create_campaign(
            &self,
            _creds: &Credentials,
            _spec: &CampaignSpec,
        ) -> Result<String, AdsError> {
            Ok("campaign-1".to_string())
        }

        async fn create_custom_audience(
            &self,
            _creds: &Credentials,
            _name: &str,
            _phone_numbers: &[String],
        ) -> Result<String, AdsError> {
            Ok("audience-1".to_string())
        }

        async fn create_messenger_audience(
            &self,
            _creds: &Credentials,
            _name: &str,
            _days: u32,
        ) -> Result<String, AdsError> {
            Ok("audience-2".to_string())
        }

        async fn create_lookalike_audience(
            &self,
            _creds: &Credentials,
            _name: &str,
            _spec: &LookalikeSpec,
        ) -> Result<String, AdsError> {
            Ok("audience-3".to_string())
        }

        async fn create_rule(
            &self,
            _creds: &Credentials,
            _spec: &RuleSpec,
        ) -> Result<String, AdsError> {
            Ok("rule-1".to_string())
        }

        async fn create_quick_post(
            &self,
            _creds: &Credentials,
            _spec: &QuickPostSpec,
        ) -> Result<String, AdsError> {
            Ok("quick-1".to_string())
        }

        async fn upload_image(
            &self,
            _creds: &Credentials,
            _file_path: &str,
        ) -> Result<MediaHandle, AdsError> {
            Ok(MediaHandle::ImageHash("hash".to_string()))
        }

        async fn upload_video(
            &self,
            _creds: &Credentials,
            _file_path: &str,
        ) -> Result<MediaHandle, AdsError> {
            Ok(MediaHandle::VideoId("video".to_string()))
        }
    }
}
