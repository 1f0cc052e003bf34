//! Per-feature enablement switches.

use std::env;

use chat_core::Intent;

/// Which workflows this channel is allowed to start.
///
/// Read from the environment at startup; everything defaults to enabled.
/// A disabled feature never starts its flow and replies with a short
/// permission message instead.
#[derive(Debug, Clone)]
pub struct FeatureFlags {
    pub campaign_creation: bool,
    pub audience_creation: bool,
    pub clone_object: bool,
    pub quick_post: bool,
    pub rule_definition: bool,
    pub campaign_toggle: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            campaign_creation: true,
            audience_creation: true,
            clone_object: true,
            quick_post: true,
            rule_definition: true,
            campaign_toggle: true,
        }
    }
}

fn env_flag(name: &str) -> bool {
    match env::var(name) {
        Ok(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        Err(_) => true,
    }
}

impl FeatureFlags {
    /// Read flags from `FLOW_*_ENABLED` environment variables.
    ///
    /// Unset variables mean enabled; `0`/`false`/`no`/`off` disable.
    pub fn from_env() -> Self {
        Self {
            campaign_creation: env_flag("FLOW_CAMPAIGN_CREATION_ENABLED"),
            audience_creation: env_flag("FLOW_AUDIENCE_CREATION_ENABLED"),
            clone_object: env_flag("FLOW_CLONE_OBJECT_ENABLED"),
            quick_post: env_flag("FLOW_QUICK_POST_ENABLED"),
            rule_definition: env_flag("FLOW_RULE_DEFINITION_ENABLED"),
            campaign_toggle: env_flag("FLOW_CAMPAIGN_TOGGLE_ENABLED"),
        }
    }

    /// All features switched off. Useful in tests.
    pub fn none() -> Self {
        Self {
            campaign_creation: false,
            audience_creation: false,
            clone_object: false,
            quick_post: false,
            rule_definition: false,
            campaign_toggle: false,
        }
    }

    /// Whether the flow behind `intent` may start.
    pub fn allows(&self, intent: Intent) -> bool {
        match intent {
            Intent::CreateCampaign => self.campaign_creation,
            Intent::CreateAudience => self.audience_creation,
            Intent::CloneObject => self.clone_object,
            Intent::QuickPost => self.quick_post,
            Intent::ToggleCampaign => self.campaign_toggle,
            Intent::DefineRule => self.rule_definition,
            Intent::Unknown => true,
        }
    }

    /// Message shown when a disabled feature is requested.
    pub fn denied_message(intent: Intent) -> String {
        format!(
            "Sorry, {} isn't enabled for this assistant. Ask the account \
             owner to switch it on.",
            intent.description()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_everything() {
        let flags = FeatureFlags::default();
        for intent in [
            Intent::CreateCampaign,
            Intent::CreateAudience,
            Intent::CloneObject,
            Intent::QuickPost,
            Intent::ToggleCampaign,
            Intent::DefineRule,
        ] {
            assert!(flags.allows(intent), "{:?}", intent);
        }
    }

    #[test]
    fn test_none_blocks_features_but_not_unknown() {
        let flags = FeatureFlags::none();
        assert!(!flags.allows(Intent::QuickPost));
        // General chat is not a feature and can't be switched off
        assert!(flags.allows(Intent::Unknown));
    }
}
