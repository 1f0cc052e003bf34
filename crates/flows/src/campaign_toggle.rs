//! Pausing and resuming campaigns by name.

use tracing::{info, warn};

use ads_client::{AdObject, ObjectKind, ObjectStatus};

use crate::confirm::{is_affirmative, is_negative};
use crate::context::FlowContext;
use crate::error::FlowError;
use crate::reply::FlowReply;

/// Stages of the toggle workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleStage {
    #[default]
    Idle,
    /// More than one campaign matched; waiting for the user to pick one.
    AwaitingSelection,
    /// Exactly one target is lined up; waiting for a yes/no.
    Confirming,
}

/// The campaign toggle flow controller.
#[derive(Debug, Default)]
pub struct CampaignToggleFlow {
    stage: ToggleStage,
    candidates: Vec<AdObject>,
    target: Option<AdObject>,
    /// `None` means flip whatever the current status is.
    desired: Option<ObjectStatus>,
    applied: Option<(String, ObjectStatus)>,
}

impl CampaignToggleFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> ToggleStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != ToggleStage::Idle
    }

    /// Return to `Idle` and clear all collected data. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The toggle applied by the last confirmed turn, if any.
    ///
    /// The orchestrator consumes this to record the status change in its
    /// catalog cache. Taking it clears it.
    pub fn take_applied_toggle(&mut self) -> Option<(String, ObjectStatus)> {
        self.applied.take()
    }

    /// Start the flow against a snapshot of the account's campaigns.
    pub fn start_with_catalog(&mut self, catalog: Vec<AdObject>, query: &str) -> FlowReply {
        self.reset();
        self.desired = parse_desired_status(query);
        let needle = search_term(query);

        self.candidates = catalog
            .into_iter()
            .filter(|obj| obj.kind == ObjectKind::Campaign)
            .filter(|obj| needle.is_empty() || obj.name.to_lowercase().contains(&needle))
            .collect();
        info!(
            "Toggle flow started: {} candidate(s) for \"{}\"",
            self.candidates.len(),
            needle
        );

        match self.candidates.len() {
            0 => {
                self.reset();
                if needle.is_empty() {
                    FlowReply::text("There are no campaigns in the account.")
                } else {
                    FlowReply::text(format!(
                        "I couldn't find a campaign matching \"{}\".",
                        needle
                    ))
                }
            }
            1 => {
                let only = self.candidates.remove(0);
                self.confirm_target(only)
            }
            _ => {
                self.stage = ToggleStage::AwaitingSelection;
                FlowReply::text(format!(
                    "Which campaign do you mean? Reply with a number or a name:\n{}",
                    self.listing()
                ))
            }
        }
    }

    fn listing(&self) -> String {
        self.candidates
            .iter()
            .enumerate()
            .map(|(i, obj)| format!("{}. {} ({})", i + 1, obj.name, obj.status.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn new_status_for(&self, target: &AdObject) -> ObjectStatus {
        self.desired.unwrap_or_else(|| target.status.toggled())
    }

    fn confirm_target(&mut self, target: AdObject) -> FlowReply {
        let new_status = self.new_status_for(&target);

        if new_status == target.status {
            self.reset();
            return FlowReply::text(format!(
                "\"{}\" is already {}.",
                target.name,
                target.status.label()
            ));
        }

        let reply = FlowReply::with_payload(
            format!(
                "\"{}\" is currently {}. Set it to {}? (yes/no)",
                target.name,
                target.status.label(),
                new_status.label()
            ),
            serde_json::json!({
                "kind": "toggle",
                "id": target.id,
                "name": target.name,
                "from": target.status.label(),
                "to": new_status.label(),
            }),
        );
        self.target = Some(target);
        self.stage = ToggleStage::Confirming;
        reply
    }

    /// Handle free-text input for the current stage.
    pub async fn handle_input(
        &mut self,
        ctx: &FlowContext<'_>,
        text: &str,
    ) -> Result<FlowReply, FlowError> {
        match self.stage {
            ToggleStage::Idle => Err(FlowError::Invalid(
                "No status change is in progress right now.".to_string(),
            )),

            ToggleStage::AwaitingSelection => {
                // A bare "yes" here has nothing to agree to; never treat it
                // as picking a campaign
                if is_affirmative(text) {
                    return Ok(FlowReply::text(format!(
                        "I still need to know which campaign:\n{}",
                        self.listing()
                    )));
                }
                if is_negative(text) {
                    self.reset();
                    return Ok(FlowReply::text("Okay, nothing was changed."));
                }

                let picked = self.pick_candidate(text)?;
                Ok(self.confirm_target(picked))
            }

            ToggleStage::Confirming => {
                if is_affirmative(text) {
                    self.apply(ctx).await
                } else if is_negative(text) {
                    self.reset();
                    Ok(FlowReply::text("Okay, nothing was changed."))
                } else {
                    Ok(FlowReply::text(
                        "Please answer yes to change the status or no to leave it.",
                    ))
                }
            }
        }
    }

    fn pick_candidate(&mut self, text: &str) -> Result<AdObject, FlowError> {
        let trimmed = text.trim();

        if let Ok(index) = trimmed.parse::<usize>() {
            if index >= 1 && index <= self.candidates.len() {
                return Ok(self.candidates[index - 1].clone());
            }
            return Err(FlowError::Invalid(format!(
                "There is no option {}. Pick a number between 1 and {}.",
                index,
                self.candidates.len()
            )));
        }

        let needle = trimmed.to_lowercase();
        let matches: Vec<&AdObject> = self
            .candidates
            .iter()
            .filter(|obj| obj.id == trimmed || obj.name.to_lowercase().contains(&needle))
            .collect();

        match matches.as_slice() {
            [single] => Ok((*single).clone()),
            [] => Err(FlowError::Invalid(format!(
                "I couldn't find a campaign matching \"{}\".",
                trimmed
            ))),
            _ => Err(FlowError::Ambiguous(
                "That still matches more than one campaign. Reply with the number from the list."
                    .to_string(),
            )),
        }
    }

    async fn apply(&mut self, ctx: &FlowContext<'_>) -> Result<FlowReply, FlowError> {
        let target = self
            .target
            .clone()
            .ok_or_else(|| FlowError::Invalid("No campaign is selected.".to_string()))?;
        let new_status = self.new_status_for(&target);

        let creds = ctx.tokens().await?;
        match ctx.ads.set_status(&creds, &target.id, new_status).await {
            Ok(()) => {
                self.reset();
                self.applied = Some((target.id.clone(), new_status));
                Ok(FlowReply::text(format!(
                    "Done. \"{}\" is now {}.",
                    target.name,
                    new_status.label()
                )))
            }
            Err(e) => {
                warn!("Status change failed: {}", e);
                self.reset();
                Err(FlowError::External(e.user_message()))
            }
        }
    }
}

/// Pull the desired end state out of the request, when it names one.
fn parse_desired_status(text: &str) -> Option<ObjectStatus> {
    let lower = text.to_lowercase();
    if ["turn on", "activate", "enable", "resume", "unpause", "start"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Some(ObjectStatus::Active)
    } else if ["turn off", "pause", "disable", "stop"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        Some(ObjectStatus::Paused)
    } else {
        None
    }
}

/// Strip toggle keywords, leaving the campaign search term.
fn search_term(text: &str) -> String {
    let mut remaining = text.to_lowercase();
    for keyword in [
        "turn on",
        "turn off",
        "activate",
        "deactivate",
        "enable",
        "disable",
        "unpause",
        "pause",
        "resume",
        "stop",
        "start",
        "toggle",
        "list campaigns",
        "list",
        "campaigns",
        "campaign",
        "the",
        "my",
        "please",
    ] {
        remaining = remaining.replace(keyword, " ");
    }
    remaining.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<AdObject> {
        vec![
            AdObject {
                id: "100".to_string(),
                name: "Summer sale".to_string(),
                kind: ObjectKind::Campaign,
                status: ObjectStatus::Active,
            },
            AdObject {
                id: "200".to_string(),
                name: "Summer clearance".to_string(),
                kind: ObjectKind::Campaign,
                status: ObjectStatus::Active,
            },
            AdObject {
                id: "300".to_string(),
                name: "Winter promo".to_string(),
                kind: ObjectKind::Campaign,
                status: ObjectStatus::Paused,
            },
            AdObject {
                id: "900".to_string(),
                name: "Summer ad set".to_string(),
                kind: ObjectKind::AdSet,
                status: ObjectStatus::Active,
            },
        ]
    }

    #[test]
    fn test_search_term_strips_keywords() {
        assert_eq!(search_term("pause the summer campaign"), "summer");
        assert_eq!(search_term("turn on winter"), "winter");
        assert_eq!(search_term("list campaigns"), "");
    }

    #[test]
    fn test_parse_desired_status() {
        assert_eq!(
            parse_desired_status("pause summer"),
            Some(ObjectStatus::Paused)
        );
        assert_eq!(
            parse_desired_status("turn on winter"),
            Some(ObjectStatus::Active)
        );
        assert_eq!(parse_desired_status("toggle winter"), None);
    }

    #[test]
    fn test_single_match_goes_straight_to_confirm() {
        let mut flow = CampaignToggleFlow::new();
        let reply = flow.start_with_catalog(catalog(), "pause winter");
        // "pause winter" names a desired state that differs from nothing:
        // Winter promo is already paused
        assert_eq!(flow.stage(), ToggleStage::Idle);
        assert!(reply.message.contains("already paused"));

        let reply = flow.start_with_catalog(catalog(), "turn on winter");
        assert_eq!(flow.stage(), ToggleStage::Confirming);
        assert!(reply.message.contains("Winter promo"));
        assert!(reply.side_channel.is_some());
    }

    #[test]
    fn test_multiple_matches_ask_for_selection() {
        let mut flow = CampaignToggleFlow::new();
        let reply = flow.start_with_catalog(catalog(), "pause summer");
        assert_eq!(flow.stage(), ToggleStage::AwaitingSelection);
        assert!(reply.message.contains("Summer sale"));
        assert!(reply.message.contains("Summer clearance"));
        // Ad sets never show up in a campaign toggle
        assert!(!reply.message.contains("ad set"));
    }

    #[tokio::test]
    async fn test_yes_during_selection_does_not_toggle() {
        let ctx = crate::context::test_support::noop_context();
        let mut flow = CampaignToggleFlow::new();
        flow.start_with_catalog(catalog(), "pause summer");

        let reply = flow.handle_input(&ctx.as_context(), "yes").await.unwrap();
        assert_eq!(flow.stage(), ToggleStage::AwaitingSelection);
        assert!(reply.message.contains("which campaign"));
        assert!(flow.take_applied_toggle().is_none());
    }

    #[tokio::test]
    async fn test_select_then_confirm_applies_toggle() {
        let ctx = crate::context::test_support::noop_context();
        let mut flow = CampaignToggleFlow::new();
        flow.start_with_catalog(catalog(), "pause summer");

        let reply = flow.handle_input(&ctx.as_context(), "1").await.unwrap();
        assert_eq!(flow.stage(), ToggleStage::Confirming);
        assert!(reply.message.contains("Summer sale"));

        let reply = flow.handle_input(&ctx.as_context(), "yes").await.unwrap();
        assert!(reply.message.contains("now paused"));
        assert_eq!(flow.stage(), ToggleStage::Idle);
        assert_eq!(
            flow.take_applied_toggle(),
            Some(("100".to_string(), ObjectStatus::Paused))
        );
        // Consumed on take
        assert!(flow.take_applied_toggle().is_none());
    }

    #[test]
    fn test_no_match_resets() {
        let mut flow = CampaignToggleFlow::new();
        let reply = flow.start_with_catalog(catalog(), "pause autumn");
        assert_eq!(flow.stage(), ToggleStage::Idle);
        assert!(reply.message.contains("autumn"));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut flow = CampaignToggleFlow::new();
        flow.start_with_catalog(catalog(), "pause summer");
        flow.reset();
        assert_eq!(flow.stage(), ToggleStage::Idle);
        assert!(flow.candidates.is_empty());
        flow.reset();
        assert_eq!(flow.stage(), ToggleStage::Idle);
    }
}
