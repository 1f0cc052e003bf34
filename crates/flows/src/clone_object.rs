//! Duplicating existing campaigns, ad sets and ads.

use tracing::{info, warn};

use ads_client::{AdObject, ObjectKind};

use crate::confirm::{is_affirmative, is_negative};
use crate::context::FlowContext;
use crate::error::FlowError;
use crate::reply::FlowReply;

/// Most copies a single clone request may produce.
pub const MAX_CLONE_COPIES: u32 = 50;

/// Longest accepted name for a cloned object.
pub const MAX_CLONE_NAME_CHARS: usize = 100;

/// Stages of the clone workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneStage {
    #[default]
    Idle,
    /// Waiting for the kind of object to clone.
    ChoosingKind,
    /// Waiting for the user to pick one object from the listing.
    SelectingObject,
    /// Waiting for the name the copies get.
    EnteringName,
    /// Waiting for how many copies to make.
    EnteringQuantity,
    /// Waiting for a yes/no on the final summary.
    Confirming,
}

/// The clone flow controller.
#[derive(Debug, Default)]
pub struct CloneObjectFlow {
    stage: CloneStage,
    catalog: Vec<AdObject>,
    kind: Option<ObjectKind>,
    selected: Option<AdObject>,
    new_name: Option<String>,
    copies: Option<u32>,
}

impl CloneObjectFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> CloneStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != CloneStage::Idle
    }

    /// Return to `Idle` and clear all collected data. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start the flow with a snapshot of the account's objects.
    pub fn start(&mut self, catalog: Vec<AdObject>, trigger_text: &str) -> FlowReply {
        self.reset();
        self.catalog = catalog;
        info!("Clone flow started with {} catalog objects", self.catalog.len());

        if let Some(kind) = parse_kind(trigger_text) {
            return self.choose_kind(kind);
        }

        self.stage = CloneStage::ChoosingKind;
        FlowReply::text("What do you want to clone? A campaign, an ad set, or an ad?")
    }

    fn choose_kind(&mut self, kind: ObjectKind) -> FlowReply {
        self.kind = Some(kind);
        let listing = self.listing_for(kind);

        if listing.is_empty() {
            self.reset();
            return FlowReply::text(format!(
                "There are no {}s in the account to clone.",
                kind.label()
            ));
        }

        self.stage = CloneStage::SelectingObject;
        FlowReply::text(format!(
            "Which {} should I clone? Reply with a number or a name:\n{}",
            kind.label(),
            listing
        ))
    }

    fn listing_for(&self, kind: ObjectKind) -> String {
        self.candidates(kind)
            .enumerate()
            .map(|(i, obj)| format!("{}. {} ({})", i + 1, obj.name, obj.status.label()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn candidates(&self, kind: ObjectKind) -> impl Iterator<Item = &AdObject> {
        self.catalog.iter().filter(move |obj| obj.kind == kind)
    }

    /// Handle free-text input for the current stage.
    pub async fn handle_input(
        &mut self,
        ctx: &FlowContext<'_>,
        text: &str,
    ) -> Result<FlowReply, FlowError> {
        match self.stage {
            CloneStage::Idle => Err(FlowError::Invalid(
                "No clone is in progress right now.".to_string(),
            )),

            CloneStage::ChoosingKind => match parse_kind(text) {
                Some(kind) => Ok(self.choose_kind(kind)),
                None => Err(FlowError::Invalid(
                    "Please say campaign, ad set, or ad.".to_string(),
                )),
            },

            CloneStage::SelectingObject => {
                let kind = self.kind.ok_or_else(|| {
                    FlowError::Invalid("The object kind was never chosen.".to_string())
                })?;
                let selected = self.select_object(kind, text)?;
                let name = selected.name.clone();
                self.selected = Some(selected);
                self.stage = CloneStage::EnteringName;
                Ok(FlowReply::text(format!(
                    "Cloning \"{}\". What should the copies be called? (1-{} characters)",
                    name, MAX_CLONE_NAME_CHARS
                )))
            }

            CloneStage::EnteringName => {
                let name = text.trim();
                let chars = name.chars().count();
                if chars == 0 || chars > MAX_CLONE_NAME_CHARS {
                    return Err(FlowError::Invalid(format!(
                        "The name must be between 1 and {} characters.",
                        MAX_CLONE_NAME_CHARS
                    )));
                }
                self.new_name = Some(name.to_string());
                self.stage = CloneStage::EnteringQuantity;
                Ok(FlowReply::text(format!(
                    "How many copies? (1-{})",
                    MAX_CLONE_COPIES
                )))
            }

            CloneStage::EnteringQuantity => {
                let copies: u32 = text.trim().parse().map_err(|_| {
                    FlowError::Invalid(format!(
                        "The number of copies must be a number between 1 and {}.",
                        MAX_CLONE_COPIES
                    ))
                })?;
                if copies == 0 || copies > MAX_CLONE_COPIES {
                    return Err(FlowError::Invalid(format!(
                        "The number of copies must be between 1 and {}.",
                        MAX_CLONE_COPIES
                    )));
                }
                self.copies = Some(copies);
                self.stage = CloneStage::Confirming;

                let selected = self.selected.as_ref().ok_or_else(|| {
                    FlowError::Invalid("No object is selected.".to_string())
                })?;
                let name = self.new_name.as_deref().unwrap_or("");
                Ok(FlowReply::with_payload(
                    format!(
                        "Ready to make {} cop{} of \"{}\" named \"{}\". Go ahead? (yes/no)",
                        copies,
                        if copies == 1 { "y" } else { "ies" },
                        selected.name,
                        name
                    ),
                    serde_json::json!({ "kind": "confirm", "flow": "clone_object" }),
                ))
            }

            CloneStage::Confirming => {
                if is_affirmative(text) {
                    self.clone_selected(ctx).await
                } else if is_negative(text) {
                    self.reset();
                    Ok(FlowReply::text("Okay, nothing was cloned."))
                } else {
                    Ok(FlowReply::text(
                        "Please answer yes to clone or no to cancel.",
                    ))
                }
            }
        }
    }

    fn select_object(&self, kind: ObjectKind, text: &str) -> Result<AdObject, FlowError> {
        let candidates: Vec<&AdObject> = self.candidates(kind).collect();
        let trimmed = text.trim();

        // Numbered pick from the listing
        if let Ok(index) = trimmed.parse::<usize>() {
            return candidates
                .get(index.wrapping_sub(1))
                .map(|obj| (*obj).clone())
                .ok_or_else(|| {
                    FlowError::Invalid(format!(
                        "There is no option {}. Pick a number between 1 and {}.",
                        index,
                        candidates.len()
                    ))
                });
        }

        // Name or id match, case-insensitive
        let needle = trimmed.to_lowercase();
        let matches: Vec<&&AdObject> = candidates
            .iter()
            .filter(|obj| obj.id == trimmed || obj.name.to_lowercase().contains(&needle))
            .collect();

        match matches.as_slice() {
            [single] => Ok((**single).clone()),
            [] => Err(FlowError::Invalid(format!(
                "I couldn't find a {} matching \"{}\".",
                kind.label(),
                trimmed
            ))),
            _ => Err(FlowError::Ambiguous(format!(
                "\"{}\" matches more than one {}. Reply with the number from the list.",
                trimmed,
                kind.label()
            ))),
        }
    }

    async fn clone_selected(&mut self, ctx: &FlowContext<'_>) -> Result<FlowReply, FlowError> {
        let selected = self
            .selected
            .clone()
            .ok_or_else(|| FlowError::Invalid("No object is selected.".to_string()))?;
        let new_name = self
            .new_name
            .clone()
            .ok_or_else(|| FlowError::Invalid("The new name is missing.".to_string()))?;
        let copies = self
            .copies
            .ok_or_else(|| FlowError::Invalid("The number of copies is missing.".to_string()))?;

        let creds = ctx.tokens().await?;
        match ctx
            .ads
            .clone_object(&creds, selected.kind, &selected.id, &new_name, copies)
            .await
        {
            Ok(ids) => {
                self.reset();
                Ok(FlowReply::text(format!(
                    "Done. Created {} cop{} of \"{}\".",
                    ids.len(),
                    if ids.len() == 1 { "y" } else { "ies" },
                    selected.name
                )))
            }
            Err(e) => {
                warn!("Clone failed: {}", e);
                self.reset();
                Err(FlowError::External(e.user_message()))
            }
        }
    }
}

fn parse_kind(text: &str) -> Option<ObjectKind> {
    let lower = text.to_lowercase();
    // "ad set" must be checked before the bare "ad"
    if lower.contains("campaign") {
        Some(ObjectKind::Campaign)
    } else if lower.contains("ad set") || lower.contains("adset") {
        Some(ObjectKind::AdSet)
    } else if lower.contains("ad") {
        Some(ObjectKind::Ad)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ads_client::ObjectStatus;

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
                name: "Winter promo".to_string(),
                kind: ObjectKind::Campaign,
                status: ObjectStatus::Paused,
            },
        ]
    }

    fn flow_at_quantity() -> CloneObjectFlow {
        let mut flow = CloneObjectFlow::new();
        flow.start(catalog(), "clone a campaign");
        flow.selected = Some(catalog().remove(0));
        flow.new_name = Some("Copy".to_string());
        flow.stage = CloneStage::EnteringQuantity;
        flow
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("clone a campaign"), Some(ObjectKind::Campaign));
        assert_eq!(parse_kind("duplicate an ad set"), Some(ObjectKind::AdSet));
        assert_eq!(parse_kind("copy that ad"), Some(ObjectKind::Ad));
        assert_eq!(parse_kind("copy something"), None);
    }

    #[test]
    fn test_start_with_kind_lists_objects() {
        let mut flow = CloneObjectFlow::new();
        let reply = flow.start(catalog(), "clone a campaign");
        assert_eq!(flow.stage(), CloneStage::SelectingObject);
        assert!(reply.message.contains("Summer sale"));
        assert!(reply.message.contains("Winter promo"));
    }

    #[test]
    fn test_start_without_kind_asks() {
        let mut flow = CloneObjectFlow::new();
        let reply = flow.start(catalog(), "clone something");
        assert_eq!(flow.stage(), CloneStage::ChoosingKind);
        assert!(reply.message.contains("campaign"));
    }

    #[test]
    fn test_select_by_number_and_name() {
        let mut flow = CloneObjectFlow::new();
        flow.start(catalog(), "clone a campaign");

        let by_number = flow.select_object(ObjectKind::Campaign, "2");
        assert_eq!(by_number.unwrap().name, "Winter promo");

        let by_name = flow.select_object(ObjectKind::Campaign, "summer");
        assert_eq!(by_name.unwrap().id, "100");
    }

    #[test]
    fn test_select_no_match() {
        let mut flow = CloneObjectFlow::new();
        flow.start(catalog(), "clone a campaign");
        let result = flow.select_object(ObjectKind::Campaign, "autumn");
        assert!(matches!(result, Err(FlowError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_quantity_bounds() {
        let ctx = crate::context::test_support::noop_context();

        for bad in ["0", "51", "many"] {
            let mut flow = flow_at_quantity();
            let result = flow.handle_input(&ctx.as_context(), bad).await;
            assert!(matches!(result, Err(FlowError::Invalid(_))), "{}", bad);
            assert_eq!(flow.stage(), CloneStage::EnteringQuantity);
        }

        for good in ["1", "50"] {
            let mut flow = flow_at_quantity();
            let result = flow.handle_input(&ctx.as_context(), good).await;
            assert!(result.is_ok(), "{}", good);
            assert_eq!(flow.stage(), CloneStage::Confirming);
        }
    }

    #[tokio::test]
    async fn test_name_bounds() {
        let ctx = crate::context::test_support::noop_context();

        let mut flow = CloneObjectFlow::new();
        flow.start(catalog(), "clone a campaign");
        flow.selected = Some(catalog().remove(0));
        flow.stage = CloneStage::EnteringName;

        let too_long = "x".repeat(101);
        let result = flow.handle_input(&ctx.as_context(), &too_long).await;
        assert!(matches!(result, Err(FlowError::Invalid(_))));
        assert_eq!(flow.stage(), CloneStage::EnteringName);

        let result = flow.handle_input(&ctx.as_context(), "   ").await;
        assert!(matches!(result, Err(FlowError::Invalid(_))));

        let max_len = "x".repeat(100);
        let result = flow.handle_input(&ctx.as_context(), &max_len).await;
        assert!(result.is_ok());
        assert_eq!(flow.stage(), CloneStage::EnteringQuantity);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut flow = flow_at_quantity();
        flow.reset();
        assert_eq!(flow.stage(), CloneStage::Idle);
        assert!(flow.catalog.is_empty());
        flow.reset();
        assert_eq!(flow.stage(), CloneStage::Idle);
    }
}
