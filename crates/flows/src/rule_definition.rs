//! Automation rule definition ("pause anything above 2.5 per result").

use serde_json::Value;
use tracing::{info, warn};

use ads_client::RuleSpec;

use crate::confirm::{is_affirmative, is_negative};
use crate::context::FlowContext;
use crate::error::FlowError;
use crate::reply::FlowReply;

/// Stages of the rule-definition workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleStage {
    #[default]
    Idle,
    /// Waiting for a sentence describing condition and action.
    CollectingRule,
    /// Waiting for a yes/no on the parsed rule.
    Confirming,
}

/// The rule-definition flow controller.
#[derive(Debug, Default)]
pub struct RuleDefinitionFlow {
    stage: RuleStage,
    draft: Option<RuleSpec>,
}

impl RuleDefinitionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> RuleStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != RuleStage::Idle
    }

    /// Return to `Idle` and clear all collected data. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start the flow; if the trigger already describes the rule, parse it.
    pub async fn start(
        &mut self,
        ctx: &FlowContext<'_>,
        trigger_text: &str,
    ) -> Result<FlowReply, FlowError> {
        self.reset();
        self.stage = RuleStage::CollectingRule;
        info!("Rule definition started");

        if let Some(reply) = self.try_parse_rule(ctx, trigger_text).await {
            return Ok(reply);
        }

        Ok(FlowReply::text(
            "Describe the rule in one sentence: what condition to watch and \
             what to do when it fires. For example: \"pause any ad set whose \
             cost per result goes above 2.5\".",
        ))
    }

    /// Handle free-text input for the current stage.
    pub async fn handle_input(
        &mut self,
        ctx: &FlowContext<'_>,
        text: &str,
    ) -> Result<FlowReply, FlowError> {
        match self.stage {
            RuleStage::Idle => Err(FlowError::Invalid(
                "No rule is being defined right now.".to_string(),
            )),

            RuleStage::CollectingRule => match self.try_parse_rule(ctx, text).await {
                Some(reply) => Ok(reply),
                None => Err(FlowError::Invalid(
                    "I couldn't pick out a condition and an action from that. \
                     Try something like \"pause any ad set whose cost per \
                     result goes above 2.5\"."
                        .to_string(),
                )),
            },

            RuleStage::Confirming => {
                if is_affirmative(text) {
                    self.create(ctx).await
                } else if is_negative(text) {
                    self.reset();
                    Ok(FlowReply::text("Okay, no rule was created."))
                } else {
                    // Yes/no only; anything else re-prompts without
                    // reinterpreting the text as a new rule
                    Ok(FlowReply::text(
                        "Please answer yes to create the rule or no to cancel.",
                    ))
                }
            }
        }
    }

    /// Run extraction over the text; on success store the draft and move
    /// to confirmation.
    async fn try_parse_rule(&mut self, ctx: &FlowContext<'_>, text: &str) -> Option<FlowReply> {
        let extracted = match ctx
            .extractor
            .extract(text, &["name", "condition", "action"])
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!("Rule extraction failed: {}", e);
                return None;
            }
        };

        let condition = string_field(&extracted, "condition")?;
        let action = string_field(&extracted, "action")?;
        let name = string_field(&extracted, "name")
            .unwrap_or_else(|| format!("{} when {}", action, condition));

        let spec = RuleSpec {
            name,
            condition,
            action,
        };
        let summary = format!(
            "Here's the rule I understood:\n  name: {}\n  condition: {}\n  action: {}\nCreate it? (yes/no)",
            spec.name, spec.condition, spec.action
        );
        self.draft = Some(spec);
        self.stage = RuleStage::Confirming;

        Some(FlowReply::with_payload(
            summary,
            serde_json::json!({ "kind": "confirm", "flow": "rule_definition" }),
        ))
    }

    async fn create(&mut self, ctx: &FlowContext<'_>) -> Result<FlowReply, FlowError> {
        let spec = self
            .draft
            .clone()
            .ok_or_else(|| FlowError::Invalid("There is no rule to create.".to_string()))?;
        let creds = ctx.tokens().await?;

        match ctx.ads.create_rule(&creds, &spec).await {
            Ok(id) => {
                self.reset();
                Ok(FlowReply::text(format!(
                    "Rule \"{}\" created (id {}).",
                    spec.name, id
                )))
            }
            Err(e) => {
                warn!("Rule creation failed: {}", e);
                self.reset();
                Err(FlowError::External(e.user_message()))
            }
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    let field = value.get(key)?.as_str()?.trim();
    (!field.is_empty()).then(|| field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_core::{CoreError, FieldExtractor};

    struct FixedExtractor(Value);

    #[async_trait]
    impl FieldExtractor for FixedExtractor {
        async fn extract(&self, _text: &str, _fields: &[&str]) -> Result<Value, CoreError> {
            Ok(self.0.clone())
        }
    }

    fn context_with<'a>(
        services: &'a crate::context::test_support::NoopServices,
        extractor: &'a FixedExtractor,
    ) -> FlowContext<'a> {
        FlowContext {
            ads: services,
            credentials: services,
            extractor,
        }
    }

    #[tokio::test]
    async fn test_rule_parsed_from_trigger() {
        let services = crate::context::test_support::noop_context();
        let extractor = FixedExtractor(serde_json::json!({
            "condition": "cost_per_result > 2.5",
            "action": "pause"
        }));
        let ctx = context_with(&services, &extractor);

        let mut flow = RuleDefinitionFlow::new();
        let reply = flow
            .start(&ctx, "pause anything above 2.5 per result")
            .await
            .unwrap();
        assert_eq!(flow.stage(), RuleStage::Confirming);
        assert!(reply.message.contains("cost_per_result > 2.5"));
    }

    #[tokio::test]
    async fn test_unusable_extraction_reprompts() {
        let services = crate::context::test_support::noop_context();
        let extractor = FixedExtractor(serde_json::json!({}));
        let ctx = context_with(&services, &extractor);

        let mut flow = RuleDefinitionFlow::new();
        flow.start(&ctx, "make a rule").await.unwrap();
        assert_eq!(flow.stage(), RuleStage::CollectingRule);

        let result = flow.handle_input(&ctx, "just do the usual").await;
        assert!(matches!(result, Err(FlowError::Invalid(_))));
        assert_eq!(flow.stage(), RuleStage::CollectingRule);
    }

    #[tokio::test]
    async fn test_confirming_accepts_only_yes_no() {
        let services = crate::context::test_support::noop_context();
        let extractor = FixedExtractor(serde_json::json!({
            "name": "cap spend",
            "condition": "spend > 100",
            "action": "pause"
        }));
        let ctx = context_with(&services, &extractor);

        let mut flow = RuleDefinitionFlow::new();
        flow.start(&ctx, "pause when spend passes 100").await.unwrap();

        let reply = flow.handle_input(&ctx, "hmm what about 200").await.unwrap();
        assert!(reply.message.contains("yes"));
        assert_eq!(flow.stage(), RuleStage::Confirming);

        let reply = flow.handle_input(&ctx, "yes").await.unwrap();
        assert!(reply.message.contains("rule-1"));
        assert_eq!(flow.stage(), RuleStage::Idle);
    }
}
