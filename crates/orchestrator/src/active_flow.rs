//! The single slot for an in-progress workflow.

use flows::{
    AudienceCreationFlow, CampaignCreationFlow, CampaignToggleFlow, CloneObjectFlow,
    QuickPostFlow, RuleDefinitionFlow,
};

/// The workflow currently owning the channel, if any.
///
/// A tagged union rather than six independent slots: it is structurally
/// impossible for two flows to be active at once, and starting a flow
/// replaces the whole value, which is what resets any sibling.
#[derive(Debug, Default)]
pub enum ActiveFlow {
    #[default]
    Idle,
    CampaignCreation(CampaignCreationFlow),
    AudienceCreation(AudienceCreationFlow),
    CloneObject(CloneObjectFlow),
    QuickPost(QuickPostFlow),
    RuleDefinition(RuleDefinitionFlow),
    CampaignToggle(CampaignToggleFlow),
}

impl ActiveFlow {
    /// Whether no flow currently owns the channel.
    pub fn is_idle(&self) -> bool {
        matches!(self, ActiveFlow::Idle)
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ActiveFlow::Idle => "idle",
            ActiveFlow::CampaignCreation(_) => "campaign_creation",
            ActiveFlow::AudienceCreation(_) => "audience_creation",
            ActiveFlow::CloneObject(_) => "clone_object",
            ActiveFlow::QuickPost(_) => "quick_post",
            ActiveFlow::RuleDefinition(_) => "rule_definition",
            ActiveFlow::CampaignToggle(_) => "campaign_toggle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert!(ActiveFlow::default().is_idle());
    }

    #[test]
    fn test_starting_a_flow_replaces_the_slot() {
        let mut active = ActiveFlow::QuickPost(QuickPostFlow::new());
        assert_eq!(active.name(), "quick_post");

        // Whatever was there before is dropped wholesale
        active = ActiveFlow::RuleDefinition(RuleDefinitionFlow::new());
        assert_eq!(active.name(), "rule_definition");
    }
}
