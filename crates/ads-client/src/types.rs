//! Shared advertising-object types.

use serde::{Deserialize, Serialize};

/// Kind of advertising object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Campaign,
    AdSet,
    Ad,
}

impl ObjectKind {
    /// API path segment for listing objects of this kind.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ObjectKind::Campaign => "campaigns",
            ObjectKind::AdSet => "adsets",
            ObjectKind::Ad => "ads",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Campaign => "campaign",
            ObjectKind::AdSet => "ad set",
            ObjectKind::Ad => "ad",
        }
    }
}

/// Delivery status of an advertising object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectStatus {
    Active,
    Paused,
}

impl ObjectStatus {
    /// The opposite status.
    pub fn toggled(&self) -> Self {
        match self {
            ObjectStatus::Active => ObjectStatus::Paused,
            ObjectStatus::Paused => ObjectStatus::Active,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectStatus::Active => "active",
            ObjectStatus::Paused => "paused",
        }
    }
}

/// One advertising object from a catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdObject {
    pub id: String,
    pub name: String,
    pub kind: ObjectKind,
    pub status: ObjectStatus,
}

/// Handle to uploaded media, returned by the upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaHandle {
    /// Image hash usable in ad creatives.
    ImageHash(String),
    /// Video identifier.
    VideoId(String),
}

/// Everything needed to create a campaign with its ad set and ad.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub name: String,
    pub objective: String,
    /// Daily budget in minor currency units.
    pub daily_budget: u64,
    /// Targeting radius in kilometres, when location targeting applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<u32>,
    /// Uploaded creative media, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaHandle>,
    /// Ad copy, usually parsed from the pasted post.
    pub body_text: String,
}

/// Lookalike audience parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookalikeSpec {
    /// Source audience the lookalike expands from.
    pub source_audience_id: String,
    /// Two-letter country code.
    pub country: String,
    /// Expansion ratio as a whole percentage, 1-20.
    pub ratio_percent: u8,
}

/// Automation rule parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    /// Condition expression, e.g. "cost_per_result > 2.5".
    pub condition: String,
    /// Action to take when the condition fires, e.g. "pause".
    pub action: String,
}

/// Quick campaign created from an existing post link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickPostSpec {
    pub post_url: String,
    /// Daily budget in minor currency units.
    pub daily_budget: u64,
}
