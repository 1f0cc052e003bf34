//! Coarse intent labels produced by the classifier.

use serde::{Deserialize, Serialize};

/// Coarse classification of a free-text message.
///
/// The classifier is an opaque external service; whatever label it returns
/// is folded into this enum, with anything unrecognized mapping to
/// [`Intent::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Create an ad campaign (from a pasted post plus media).
    CreateCampaign,
    /// Build a custom or lookalike audience.
    CreateAudience,
    /// Clone an existing campaign/ad-set/ad.
    CloneObject,
    /// Create a quick campaign from a post link.
    QuickPost,
    /// Turn campaigns on or off.
    ToggleCampaign,
    /// Define an automation rule.
    DefineRule,
    /// No recognizable intent.
    Unknown,
}

impl Intent {
    /// Parse a classifier label into an intent.
    ///
    /// Labels are matched case-insensitively; anything unrecognized is
    /// [`Intent::Unknown`] rather than an error.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "create_campaign" | "campaign_creation" | "create campaign" => Self::CreateCampaign,
            "create_audience" | "audience_creation" | "create audience" => Self::CreateAudience,
            "clone" | "clone_object" => Self::CloneObject,
            "quick_post" | "post_link" => Self::QuickPost,
            "toggle" | "toggle_campaign" | "list_campaigns" => Self::ToggleCampaign,
            "define_rule" | "create_rule" => Self::DefineRule,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description of this intent.
    pub fn description(&self) -> &'static str {
        match self {
            Self::CreateCampaign => "create an ad campaign",
            Self::CreateAudience => "create an audience",
            Self::CloneObject => "clone an advertising object",
            Self::QuickPost => "create a campaign from a post link",
            Self::ToggleCampaign => "toggle campaign status",
            Self::DefineRule => "define an automation rule",
            Self::Unknown => "general conversation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_known() {
        assert_eq!(Intent::from_label("create_campaign"), Intent::CreateCampaign);
        assert_eq!(Intent::from_label("Create Campaign"), Intent::CreateCampaign);
        assert_eq!(Intent::from_label("clone"), Intent::CloneObject);
        assert_eq!(Intent::from_label("quick_post"), Intent::QuickPost);
        assert_eq!(Intent::from_label("toggle"), Intent::ToggleCampaign);
        assert_eq!(Intent::from_label("create_rule"), Intent::DefineRule);
    }

    #[test]
    fn test_from_label_unknown() {
        assert_eq!(Intent::from_label("banana"), Intent::Unknown);
        assert_eq!(Intent::from_label(""), Intent::Unknown);
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Intent::CreateAudience).unwrap();
        assert_eq!(json, "\"create_audience\"");
        let intent: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(intent, Intent::CreateAudience);
    }
}
