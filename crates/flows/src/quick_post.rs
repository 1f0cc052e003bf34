//! Quick campaigns boosting an existing post link.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

use ads_client::QuickPostSpec;

use crate::confirm::{is_affirmative, is_negative};
use crate::context::FlowContext;
use crate::error::FlowError;
use crate::reply::FlowReply;

/// Stages of the quick-post workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuickPostStage {
    #[default]
    Idle,
    /// Waiting for the post link.
    AwaitingLink,
    /// Waiting for a daily budget.
    AwaitingBudget,
    /// Waiting for a yes/no on the final summary.
    Confirming,
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("static regex"))
}

/// Pull the first http(s) link out of free text.
pub(crate) fn parse_link(text: &str) -> Option<String> {
    url_regex()
        .find(text)
        .map(|m| m.as_str().trim_end_matches([',', '.', ')']).to_string())
}

fn parse_budget(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok().filter(|v| *v > 0)
}

/// The quick-post flow controller.
#[derive(Debug, Default)]
pub struct QuickPostFlow {
    stage: QuickPostStage,
    post_url: Option<String>,
    daily_budget: Option<u64>,
}

impl QuickPostFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> QuickPostStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != QuickPostStage::Idle
    }

    /// Return to `Idle` and clear all collected data. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start the flow, picking up a link already present in the trigger.
    pub fn start(&mut self, trigger_text: &str) -> FlowReply {
        self.reset();
        info!("Quick post flow started");

        match parse_link(trigger_text) {
            Some(link) => {
                self.post_url = Some(link);
                self.stage = QuickPostStage::AwaitingBudget;
                FlowReply::text("Got the post link. What daily budget should I set?")
            }
            None => {
                self.stage = QuickPostStage::AwaitingLink;
                FlowReply::text("Which post should I boost? Paste the link.")
            }
        }
    }

    /// Handle free-text input for the current stage.
    pub async fn handle_input(
        &mut self,
        ctx: &FlowContext<'_>,
        text: &str,
    ) -> Result<FlowReply, FlowError> {
        match self.stage {
            QuickPostStage::Idle => Err(FlowError::Invalid(
                "No quick post is in progress right now.".to_string(),
            )),

            QuickPostStage::AwaitingLink => match parse_link(text) {
                Some(link) => {
                    self.post_url = Some(link);
                    self.stage = QuickPostStage::AwaitingBudget;
                    Ok(FlowReply::text(
                        "Got the post link. What daily budget should I set?",
                    ))
                }
                None => Err(FlowError::Invalid(
                    "That doesn't look like a link. Paste the full http(s) URL of the post."
                        .to_string(),
                )),
            },

            QuickPostStage::AwaitingBudget => match parse_budget(text) {
                Some(budget) => {
                    self.daily_budget = Some(budget);
                    self.stage = QuickPostStage::Confirming;
                    let link = self.post_url.as_deref().unwrap_or("");
                    Ok(FlowReply::with_payload(
                        format!(
                            "Ready to boost {} with a daily budget of {}. Go ahead? (yes/no)",
                            link, budget
                        ),
                        serde_json::json!({ "kind": "confirm", "flow": "quick_post" }),
                    ))
                }
                None => Err(FlowError::Invalid(
                    "The budget needs to be a positive number, e.g. 50000.".to_string(),
                )),
            },

            QuickPostStage::Confirming => {
                if is_affirmative(text) {
                    self.create(ctx).await
                } else if is_negative(text) {
                    self.reset();
                    Ok(FlowReply::text("Okay, the post won't be boosted."))
                } else {
                    Ok(FlowReply::text(
                        "Please answer yes to boost the post or no to cancel.",
                    ))
                }
            }
        }
    }

    async fn create(&mut self, ctx: &FlowContext<'_>) -> Result<FlowReply, FlowError> {
        let post_url = self
            .post_url
            .clone()
            .ok_or_else(|| FlowError::Invalid("The post link is missing.".to_string()))?;
        let daily_budget = self
            .daily_budget
            .ok_or_else(|| FlowError::Invalid("The daily budget is missing.".to_string()))?;

        let spec = QuickPostSpec {
            post_url,
            daily_budget,
        };
        let creds = ctx.tokens().await?;

        match ctx.ads.create_quick_post(&creds, &spec).await {
            Ok(id) => {
                self.reset();
                Ok(FlowReply::text(format!(
                    "Boost campaign created (id {}). It starts paused so you can review it.",
                    id
                )))
            }
            Err(e) => {
                warn!("Quick post creation failed: {}", e);
                self.reset();
                Err(FlowError::External(e.user_message()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link() {
        assert_eq!(
            parse_link("boost https://example.com/posts/123 please").as_deref(),
            Some("https://example.com/posts/123")
        );
        assert_eq!(
            parse_link("see http://example.com/p/1.").as_deref(),
            Some("http://example.com/p/1")
        );
        assert!(parse_link("no link here").is_none());
    }

    #[test]
    fn test_start_with_link_skips_link_stage() {
        let mut flow = QuickPostFlow::new();
        flow.start("boost https://example.com/posts/123");
        assert_eq!(flow.stage(), QuickPostStage::AwaitingBudget);
    }

    #[test]
    fn test_start_without_link_asks_for_it() {
        let mut flow = QuickPostFlow::new();
        flow.start("boost my latest post");
        assert_eq!(flow.stage(), QuickPostStage::AwaitingLink);
    }

    #[tokio::test]
    async fn test_budget_must_be_positive() {
        let ctx = crate::context::test_support::noop_context();
        let mut flow = QuickPostFlow::new();
        flow.start("boost https://example.com/posts/123");

        let result = flow.handle_input(&ctx.as_context(), "zero please").await;
        assert!(matches!(result, Err(FlowError::Invalid(_))));
        assert_eq!(flow.stage(), QuickPostStage::AwaitingBudget);

        let result = flow.handle_input(&ctx.as_context(), "50000").await;
        assert!(result.is_ok());
        assert_eq!(flow.stage(), QuickPostStage::Confirming);
    }

    #[tokio::test]
    async fn test_confirm_creates_and_resets() {
        let ctx = crate::context::test_support::noop_context();
        let mut flow = QuickPostFlow::new();
        flow.start("boost https://example.com/posts/123");
        flow.handle_input(&ctx.as_context(), "50000").await.unwrap();

        let reply = flow.handle_input(&ctx.as_context(), "yes").await.unwrap();
        assert!(reply.message.contains("quick-1"));
        assert_eq!(flow.stage(), QuickPostStage::Idle);
    }

    #[tokio::test]
    async fn test_decline_cancels() {
        let ctx = crate::context::test_support::noop_context();
        let mut flow = QuickPostFlow::new();
        flow.start("boost https://example.com/posts/123");
        flow.handle_input(&ctx.as_context(), "50000").await.unwrap();

        flow.handle_input(&ctx.as_context(), "no").await.unwrap();
        assert_eq!(flow.stage(), QuickPostStage::Idle);
        assert!(flow.post_url.is_none());
    }
}
