//! Campaign creation from a pasted post plus media.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

use ads_client::{CampaignSpec, MediaHandle};
use chat_core::Attachment;

use crate::confirm::{is_affirmative, is_negative};
use crate::context::FlowContext;
use crate::error::FlowError;
use crate::reply::FlowReply;

/// Stages of the campaign-creation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CampaignStage {
    #[default]
    Idle,
    /// Waiting for the user to send the creative image or video.
    AwaitingMedia,
    /// Waiting for name/budget details not found in the pasted text.
    AwaitingDetails,
    /// Waiting for a numeric targeting radius.
    AwaitingRadius,
    /// Waiting for a yes/no on the final summary.
    Confirming,
}

fn budget_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "budget 50000", "budget: 50,000", "50000/day"
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:budget\s*:?\s*|^\s*)([0-9][0-9.,]{2,})(?:\s*/\s*day)?")
            .expect("static regex")
    })
}

fn parse_budget(text: &str) -> Option<u64> {
    let capture = budget_regex().captures(text)?;
    let digits: String = capture[1].chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok().filter(|v| *v > 0)
}

fn parse_name(text: &str) -> Option<String> {
    // First non-empty line that isn't the budget line doubles as the name
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && parse_budget(line).is_none())
        .map(|line| line.chars().take(100).collect())
}

/// Validate an attachment and upload it as campaign media.
async fn upload_attachment(
    ctx: &FlowContext<'_>,
    attachment: &Attachment,
) -> Result<MediaHandle, FlowError> {
    attachment.validate().map_err(FlowError::Invalid)?;
    let path = attachment.file_path.as_deref().ok_or_else(|| {
        FlowError::Invalid("The attachment data wasn't available. Please send it again.".to_string())
    })?;

    let creds = ctx.tokens().await?;
    let result = if attachment.is_image() {
        ctx.ads.upload_image(&creds, path).await
    } else {
        ctx.ads.upload_video(&creds, path).await
    };

    result.map_err(|e| {
        warn!("Media upload failed: {}", e);
        FlowError::External(e.user_message())
    })
}

/// The campaign-creation flow controller.
#[derive(Debug, Default)]
pub struct CampaignCreationFlow {
    stage: CampaignStage,
    draft: CampaignSpec,
}

impl CampaignCreationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    pub fn stage(&self) -> CampaignStage {
        self.stage
    }

    /// Whether the flow currently owns the input channel.
    pub fn is_active(&self) -> bool {
        self.stage != CampaignStage::Idle
    }

    /// The accumulated draft, for tests and the presentation layer.
    pub fn draft(&self) -> &CampaignSpec {
        &self.draft
    }

    /// Return to `Idle` and clear all collected data. Idempotent.
    pub fn reset(&mut self) {
        self.stage = CampaignStage::Idle;
        self.draft = CampaignSpec::default();
    }

    /// Merge externally-extracted fields into the draft.
    pub fn set_fields(&mut self, name: Option<String>, budget: Option<u64>) {
        if let Some(name) = name {
            self.draft.name = name;
        }
        if let Some(budget) = budget {
            self.draft.daily_budget = budget;
        }
    }

    /// Start the flow from text only; media comes later.
    pub fn start(&mut self, seed_text: &str) -> FlowReply {
        self.reset();
        self.draft.body_text = seed_text.trim().to_string();
        self.stage = CampaignStage::AwaitingMedia;
        info!("Campaign creation started, awaiting media");
        FlowReply::text(
            "Let's create a campaign. Send the creative image (up to 20 MB) \
             or video (up to 1 GB) for the ad.",
        )
    }

    /// Start the flow from text plus a validated, uploaded attachment.
    ///
    /// Called by the orchestrator after intent detection confirmed campaign
    /// creation. Upload happens before any draft data is committed.
    pub async fn start_with_media(
        &mut self,
        ctx: &FlowContext<'_>,
        text: &str,
        attachment: &Attachment,
    ) -> Result<FlowReply, FlowError> {
        self.reset();

        let media = upload_attachment(ctx, attachment).await?;

        // Only now that the upload succeeded does the draft get touched
        self.draft.body_text = text.trim().to_string();
        self.draft.media = Some(media);
        self.draft.objective = "OUTCOME_TRAFFIC".to_string();

        if let Some(budget) = parse_budget(text) {
            self.draft.daily_budget = budget;
        }
        if let Some(name) = parse_name(text) {
            self.draft.name = name;
        }

        Ok(self.advance_after_media())
    }

    /// Handle an attachment arriving while the flow waits for media.
    pub async fn handle_attachment(
        &mut self,
        ctx: &FlowContext<'_>,
        attachment: &Attachment,
    ) -> Result<FlowReply, FlowError> {
        if self.stage != CampaignStage::AwaitingMedia {
            return Err(FlowError::Invalid(
                "I wasn't expecting media right now.".to_string(),
            ));
        }

        let media = upload_attachment(ctx, attachment).await?;
        self.draft.media = Some(media);
        self.draft.objective = "OUTCOME_TRAFFIC".to_string();

        let body = self.draft.body_text.clone();
        if let Some(budget) = parse_budget(&body) {
            self.draft.daily_budget = budget;
        }
        if let Some(name) = parse_name(&body) {
            self.draft.name = name;
        }

        Ok(self.advance_after_media())
    }

    fn advance_after_media(&mut self) -> FlowReply {
        if self.draft.name.is_empty() || self.draft.daily_budget == 0 {
            self.stage = CampaignStage::AwaitingDetails;
            FlowReply::text(
                "Media uploaded. Now give me a campaign name and a daily \
                 budget (e.g. \"Summer sale, budget 50000\").",
            )
        } else {
            self.stage = CampaignStage::AwaitingRadius;
            FlowReply::text(
                "Media uploaded. What targeting radius should I use, in km? \
                 (a number, e.g. 10)",
            )
        }
    }

    /// Handle free-text input for the current stage.
    pub async fn handle_input(
        &mut self,
        ctx: &FlowContext<'_>,
        text: &str,
    ) -> Result<FlowReply, FlowError> {
        match self.stage {
            CampaignStage::Idle => Err(FlowError::Invalid(
                "No campaign is being created right now.".to_string(),
            )),

            CampaignStage::AwaitingMedia => {
                // Text without an attachment doesn't advance this stage
                Ok(FlowReply::text(
                    "I still need the creative. Send an image (up to 20 MB) \
                     or a video (up to 1 GB).",
                ))
            }

            CampaignStage::AwaitingDetails => {
                if let Some(budget) = parse_budget(text) {
                    self.draft.daily_budget = budget;
                }
                if self.draft.name.is_empty() {
                    if let Some(name) = parse_name(text) {
                        self.draft.name = name;
                    }
                }

                if self.draft.name.is_empty() {
                    return Err(FlowError::Invalid(
                        "I still need a campaign name.".to_string(),
                    ));
                }
                if self.draft.daily_budget == 0 {
                    return Err(FlowError::Invalid(
                        "I still need a daily budget, e.g. \"budget 50000\".".to_string(),
                    ));
                }

                self.stage = CampaignStage::AwaitingRadius;
                Ok(FlowReply::text(
                    "Got it. What targeting radius should I use, in km? (a number, e.g. 10)",
                ))
            }

            CampaignStage::AwaitingRadius => {
                let radius: u32 = text
                    .trim()
                    .trim_end_matches("km")
                    .trim()
                    .parse()
                    .map_err(|_| {
                        FlowError::Invalid(
                            "The radius needs to be a number of kilometres, e.g. 10.".to_string(),
                        )
                    })?;
                if radius == 0 || radius > 500 {
                    return Err(FlowError::Invalid(
                        "The radius must be between 1 and 500 km.".to_string(),
                    ));
                }

                self.draft.radius_km = Some(radius);
                self.stage = CampaignStage::Confirming;
                Ok(FlowReply::with_payload(
                    format!(
                        "Ready to create \"{}\" with a daily budget of {} and a {} km radius. \
                         Create it? (yes/no)",
                        self.draft.name, self.draft.daily_budget, radius
                    ),
                    serde_json::json!({ "kind": "confirm", "flow": "campaign_creation" }),
                ))
            }

            CampaignStage::Confirming => {
                if is_affirmative(text) {
                    self.create(ctx).await
                } else if is_negative(text) {
                    self.reset();
                    Ok(FlowReply::text("Okay, campaign creation cancelled."))
                } else {
                    Ok(FlowReply::text(
                        "Please answer yes to create the campaign or no to cancel.",
                    ))
                }
            }
        }
    }

    async fn create(&mut self, ctx: &FlowContext<'_>) -> Result<FlowReply, FlowError> {
        let creds = ctx.tokens().await?;
        let name = self.draft.name.clone();

        match ctx.ads.create_campaign(&creds, &self.draft).await {
            Ok(id) => {
                self.reset();
                Ok(FlowReply::text(format!(
                    "Campaign \"{}\" created (id {}). It starts paused so you can review it.",
                    name, id
                )))
            }
            Err(e) => {
                // Creation was confirmed and attempted; the draft is spent
                warn!("Campaign creation failed: {}", e);
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
    fn test_parse_budget_variants() {
        assert_eq!(parse_budget("budget 50000"), Some(50000));
        assert_eq!(parse_budget("Budget: 50,000"), Some(50000));
        assert_eq!(parse_budget("no numbers here"), None);
    }

    #[test]
    fn test_parse_name_skips_budget_line() {
        let text = "budget 50000\nSummer sale";
        assert_eq!(parse_name(text).as_deref(), Some("Summer sale"));
    }

    #[test]
    fn test_start_awaits_media() {
        let mut flow = CampaignCreationFlow::new();
        let reply = flow.start("Summer sale post text");
        assert_eq!(flow.stage(), CampaignStage::AwaitingMedia);
        assert!(reply.message.contains("image"));
        assert_eq!(flow.draft().body_text, "Summer sale post text");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut flow = CampaignCreationFlow::new();
        flow.start("text");
        flow.reset();
        assert_eq!(flow.stage(), CampaignStage::Idle);
        assert!(flow.draft().body_text.is_empty());
        flow.reset();
        assert_eq!(flow.stage(), CampaignStage::Idle);
    }

    #[test]
    fn test_set_fields_merges() {
        let mut flow = CampaignCreationFlow::new();
        flow.set_fields(Some("Name".to_string()), None);
        flow.set_fields(None, Some(1000));
        assert_eq!(flow.draft().name, "Name");
        assert_eq!(flow.draft().daily_budget, 1000);
    }
}
