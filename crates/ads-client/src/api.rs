//! The advertising-platform service seam.

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::AdsError;
use crate::types::{
    AdObject, CampaignSpec, LookalikeSpec, MediaHandle, ObjectKind, ObjectStatus, QuickPostSpec,
    RuleSpec,
};

/// Operations the orchestrator and flow controllers need from the
/// advertising platform.
///
/// All calls are fallible and surface a human-readable failure reason.
/// Implementations must not cache credentials; callers pass fresh ones at
/// every point of use.
#[async_trait]
pub trait AdsApi: Send + Sync {
    /// List objects of the given kind in the account.
    async fn list_objects(
        &self,
        creds: &Credentials,
        kind: ObjectKind,
    ) -> Result<Vec<AdObject>, AdsError>;

    /// Set the delivery status of an object.
    async fn set_status(
        &self,
        creds: &Credentials,
        object_id: &str,
        status: ObjectStatus,
    ) -> Result<(), AdsError>;

    /// Clone an object `copies` times under a new name.
    ///
    /// Returns the ids of the created copies.
    async fn clone_object(
        &self,
        creds: &Credentials,
        kind: ObjectKind,
        object_id: &str,
        new_name: &str,
        copies: u32,
    ) -> Result<Vec<String>, AdsError>;

    /// Create a campaign (with its ad set and ad) from a spec.
    ///
    /// Returns the new campaign id.
    async fn create_campaign(
        &self,
        creds: &Credentials,
        spec: &CampaignSpec,
    ) -> Result<String, AdsError>;

    /// Create a custom audience from normalized phone numbers.
    ///
    /// Returns the new audience id.
    async fn create_custom_audience(
        &self,
        creds: &Credentials,
        name: &str,
        phone_numbers: &[String],
    ) -> Result<String, AdsError>;

    /// Create an engagement audience from people who messaged the page in
    /// the last `days` days.
    async fn create_messenger_audience(
        &self,
        creds: &Credentials,
        name: &str,
        days: u32,
    ) -> Result<String, AdsError>;

    /// Create a lookalike audience.
    async fn create_lookalike_audience(
        &self,
        creds: &Credentials,
        name: &str,
        spec: &LookalikeSpec,
    ) -> Result<String, AdsError>;

    /// Create an automation rule.
    async fn create_rule(&self, creds: &Credentials, spec: &RuleSpec) -> Result<String, AdsError>;

    /// Create a quick campaign boosting an existing post.
    async fn create_quick_post(
        &self,
        creds: &Credentials,
        spec: &QuickPostSpec,
    ) -> Result<String, AdsError>;

    /// Upload an image, returning its creative hash.
    async fn upload_image(
        &self,
        creds: &Credentials,
        file_path: &str,
    ) -> Result<MediaHandle, AdsError>;

    /// Upload a video, returning its video id.
    async fn upload_video(
        &self,
        creds: &Credentials,
        file_path: &str,
    ) -> Result<MediaHandle, AdsError>;
}
