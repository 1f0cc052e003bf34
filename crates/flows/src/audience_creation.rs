//! Audience creation: custom phone lists, messenger engagement windows
//! and lookalike expansion.

use serde_json::Value;
use tracing::{debug, info, warn};

use ads_client::LookalikeSpec;

use crate::confirm::{is_affirmative, is_negative};
use crate::context::FlowContext;
use crate::error::FlowError;
use crate::extract::{backfill_ratio, parse_ratio};
use crate::phone::normalize_phone_list;
use crate::reply::FlowReply;

/// Which kind of audience is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudienceType {
    /// Uploaded phone list.
    Custom,
    /// People who messaged the page recently.
    Engagement,
    /// Lookalike expansion of an existing audience.
    Lookalike,
}

impl AudienceType {
    fn label(&self) -> &'static str {
        match self {
            AudienceType::Custom => "custom",
            AudienceType::Engagement => "messenger engagement",
            AudienceType::Lookalike => "lookalike",
        }
    }
}

/// Stages of the audience-creation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudienceStage {
    #[default]
    Idle,
    /// Waiting for the user to pick custom / engagement / lookalike.
    ChoosingType,
    /// Waiting for the user to say how the phone numbers arrive.
    ChoosingPhoneSource,
    /// Collecting pasted phone numbers.
    CollectingPhones,
    /// Showing the normalized list back for approval.
    ConfirmingPhones,
    /// Waiting for the engagement window in days.
    AwaitingEngagementDays,
    /// Waiting for the lookalike source audience.
    AwaitingLookalikeSource,
    /// Waiting for the lookalike country.
    AwaitingLookalikeCountry,
    /// Waiting for the lookalike ratio.
    AwaitingLookalikeRatio,
    /// Waiting for a yes/no on the final summary.
    Confirming,
}

/// Data accumulated across turns. Cleared wholesale on reset.
#[derive(Debug, Default)]
struct AudienceData {
    audience_type: Option<AudienceType>,
    name: Option<String>,
    phones: Vec<String>,
    engagement_days: Option<u32>,
    source_audience: Option<String>,
    country: Option<String>,
    ratio: Option<u8>,
}

/// The audience-creation flow controller.
#[derive(Debug, Default)]
pub struct AudienceCreationFlow {
    stage: AudienceStage,
    data: AudienceData,
}

impl AudienceCreationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> AudienceStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != AudienceStage::Idle
    }

    /// Return to `Idle` and clear all collected data. Idempotent.
    pub fn reset(&mut self) {
        self.stage = AudienceStage::Idle;
        self.data = AudienceData::default();
    }

    /// Start the flow, seeding fields from the trigger message.
    ///
    /// The trigger text often already names the type ("make a lookalike
    /// of my buyers at 5%"), so it goes through the same extraction pass
    /// as later turns before the first question is chosen.
    pub async fn start(&mut self, ctx: &FlowContext<'_>, text: &str) -> Result<FlowReply, FlowError> {
        self.reset();
        self.stage = AudienceStage::ChoosingType;
        info!("Audience creation started");

        self.data.audience_type = parse_audience_type(text);
        if let Some(name) = parse_quoted_name(text) {
            self.data.name = Some(name);
        }

        match self.data.audience_type {
            None => Ok(FlowReply::text(
                "What kind of audience should I build? \
                 1) custom (from phone numbers), \
                 2) messenger engagement, \
                 3) lookalike.",
            )),
            Some(AudienceType::Lookalike) => {
                // Lookalike triggers frequently carry the details inline
                self.merge_lookalike_fields(ctx, text).await;
                Ok(self.next_lookalike_prompt())
            }
            Some(chosen) => Ok(self.prompt_for_type(chosen)),
        }
    }

    fn prompt_for_type(&mut self, chosen: AudienceType) -> FlowReply {
        self.data.audience_type = Some(chosen);
        match chosen {
            AudienceType::Custom => {
                self.stage = AudienceStage::ChoosingPhoneSource;
                FlowReply::text(
                    "A custom audience it is. Paste the phone numbers here \
                     (commas, semicolons or new lines between them), or type \
                     'paste' when you have them ready.",
                )
            }
            AudienceType::Engagement => {
                self.stage = AudienceStage::AwaitingEngagementDays;
                FlowReply::text(
                    "How many days back should the messenger engagement \
                     window reach? (e.g. 30)",
                )
            }
            AudienceType::Lookalike => {
                self.stage = AudienceStage::AwaitingLookalikeSource;
                FlowReply::text("Which existing audience should the lookalike expand from?")
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
            AudienceStage::Idle => Err(FlowError::Invalid(
                "No audience is being created right now.".to_string(),
            )),

            AudienceStage::ChoosingType => match parse_audience_type(text) {
                Some(chosen) => {
                    if chosen == AudienceType::Lookalike {
                        self.data.audience_type = Some(chosen);
                        self.merge_lookalike_fields(ctx, text).await;
                        Ok(self.next_lookalike_prompt())
                    } else {
                        Ok(self.prompt_for_type(chosen))
                    }
                }
                None => Err(FlowError::Invalid(
                    "Please pick 1 (custom), 2 (messenger engagement) or 3 (lookalike)."
                        .to_string(),
                )),
            },

            AudienceStage::ChoosingPhoneSource => {
                let normalized = normalize_phone_list(text);
                if !normalized.is_empty() {
                    // The user pasted the numbers straight away
                    self.accept_phones(normalized)
                } else {
                    self.stage = AudienceStage::CollectingPhones;
                    Ok(FlowReply::text(
                        "Go ahead and paste the phone numbers, separated by \
                         commas, semicolons or new lines.",
                    ))
                }
            }

            AudienceStage::CollectingPhones => {
                let normalized = normalize_phone_list(text);
                if normalized.is_empty() {
                    return Err(FlowError::Invalid(
                        "I couldn't find any phone numbers in that. Entries \
                         need at least 9 digits."
                            .to_string(),
                    ));
                }
                self.accept_phones(normalized)
            }

            AudienceStage::ConfirmingPhones => {
                if is_affirmative(text) {
                    self.stage = AudienceStage::Confirming;
                    Ok(self.summary_reply())
                } else if is_negative(text) {
                    self.data.phones.clear();
                    self.stage = AudienceStage::CollectingPhones;
                    Ok(FlowReply::text(
                        "Okay, list discarded. Paste the phone numbers again.",
                    ))
                } else {
                    // Further pastes extend the list
                    let normalized = normalize_phone_list(text);
                    if normalized.is_empty() {
                        return Ok(FlowReply::text(
                            "Reply yes to keep this list, no to discard it, or \
                             paste more numbers to add them.",
                        ));
                    }
                    self.accept_phones(normalized)
                }
            }

            AudienceStage::AwaitingEngagementDays => {
                let days: u32 = text.trim().trim_end_matches("days").trim().parse().map_err(
                    |_| {
                        FlowError::Invalid(
                            "The engagement window needs to be a number of days, e.g. 30."
                                .to_string(),
                        )
                    },
                )?;
                if days == 0 || days > 365 {
                    return Err(FlowError::Invalid(
                        "The engagement window must be between 1 and 365 days.".to_string(),
                    ));
                }
                self.data.engagement_days = Some(days);
                self.stage = AudienceStage::Confirming;
                Ok(self.summary_reply())
            }

            AudienceStage::AwaitingLookalikeSource
            | AudienceStage::AwaitingLookalikeCountry
            | AudienceStage::AwaitingLookalikeRatio => {
                self.merge_lookalike_fields(ctx, text).await;
                Ok(self.next_lookalike_prompt())
            }

            AudienceStage::Confirming => {
                if is_affirmative(text) {
                    self.create(ctx).await
                } else if is_negative(text) {
                    self.reset();
                    Ok(FlowReply::text("Okay, audience creation cancelled."))
                } else {
                    Ok(FlowReply::text(
                        "Please answer yes to create the audience or no to cancel.",
                    ))
                }
            }
        }
    }

    fn accept_phones(&mut self, normalized: Vec<String>) -> Result<FlowReply, FlowError> {
        for phone in normalized {
            if !self.data.phones.contains(&phone) {
                self.data.phones.push(phone);
            }
        }

        let preview: Vec<&str> = self.data.phones.iter().take(5).map(String::as_str).collect();
        let suffix = if self.data.phones.len() > preview.len() {
            format!(" and {} more", self.data.phones.len() - preview.len())
        } else {
            String::new()
        };

        self.stage = AudienceStage::ConfirmingPhones;
        Ok(FlowReply::text(format!(
            "I have {} unique number(s): {}{}. Use this list? (yes/no, or \
             paste more to add them)",
            self.data.phones.len(),
            preview.join(", "),
            suffix
        )))
    }

    /// Merge lookalike fields out of free text.
    ///
    /// Extraction runs first; a deterministic pass then fills what the
    /// extractor missed or, if extraction failed outright, interprets the
    /// raw text for the stage's own field. Fields already collected are
    /// never overwritten.
    async fn merge_lookalike_fields(&mut self, ctx: &FlowContext<'_>, text: &str) {
        let mut extracted = match ctx
            .extractor
            .extract(text, &["source_audience", "country", "ratio"])
            .await
        {
            Ok(value) => value,
            Err(e) => {
                debug!("Field extraction unavailable, using stage fallback: {}", e);
                Value::Object(serde_json::Map::new())
            }
        };
        backfill_ratio(text, &mut extracted);

        if self.data.source_audience.is_none() {
            if let Some(source) = string_field(&extracted, "source_audience") {
                self.data.source_audience = Some(source);
            }
        }
        if self.data.country.is_none() {
            if let Some(country) = string_field(&extracted, "country") {
                if let Some(code) = parse_country(&country) {
                    self.data.country = Some(code);
                }
            }
        }
        if self.data.ratio.is_none() {
            self.data.ratio = ratio_field(&extracted);
        }

        // Stage fallback: the raw answer is the field being asked for
        match self.stage {
            AudienceStage::AwaitingLookalikeSource if self.data.source_audience.is_none() => {
                let trimmed = text.trim();
                if !trimmed.is_empty() && !is_affirmative(trimmed) && !is_negative(trimmed) {
                    self.data.source_audience = Some(trimmed.to_string());
                }
            }
            AudienceStage::AwaitingLookalikeCountry if self.data.country.is_none() => {
                self.data.country = parse_country(text);
            }
            AudienceStage::AwaitingLookalikeRatio if self.data.ratio.is_none() => {
                self.data.ratio = parse_ratio(text);
            }
            _ => {}
        }
    }

    /// Ask for the first lookalike field still missing, or move to the
    /// final confirmation when all three are in.
    fn next_lookalike_prompt(&mut self) -> FlowReply {
        if self.data.source_audience.is_none() {
            self.stage = AudienceStage::AwaitingLookalikeSource;
            FlowReply::text("Which existing audience should the lookalike expand from?")
        } else if self.data.country.is_none() {
            self.stage = AudienceStage::AwaitingLookalikeCountry;
            FlowReply::text("Which country should it target? (two-letter code, e.g. VN)")
        } else if self.data.ratio.is_none() {
            self.stage = AudienceStage::AwaitingLookalikeRatio;
            FlowReply::text("What expansion ratio? (1-20, e.g. 5%)")
        } else {
            self.stage = AudienceStage::Confirming;
            self.summary_reply()
        }
    }

    fn summary_reply(&self) -> FlowReply {
        let name = self.display_name();
        let summary = match self.data.audience_type {
            Some(AudienceType::Custom) => format!(
                "Ready to create custom audience \"{}\" with {} phone number(s).",
                name,
                self.data.phones.len()
            ),
            Some(AudienceType::Engagement) => format!(
                "Ready to create messenger engagement audience \"{}\" covering \
                 the last {} day(s).",
                name,
                self.data.engagement_days.unwrap_or(0)
            ),
            Some(AudienceType::Lookalike) => format!(
                "Ready to create lookalike audience \"{}\" from \"{}\" in {} at {}%.",
                name,
                self.data.source_audience.as_deref().unwrap_or(""),
                self.data.country.as_deref().unwrap_or(""),
                self.data.ratio.unwrap_or(0)
            ),
            None => "Ready to create the audience.".to_string(),
        };
        FlowReply::with_payload(
            format!("{} Create it? (yes/no)", summary),
            serde_json::json!({ "kind": "confirm", "flow": "audience_creation" }),
        )
    }

    fn display_name(&self) -> String {
        match &self.data.name {
            Some(name) => name.clone(),
            None => {
                let label = self
                    .data
                    .audience_type
                    .map(|t| t.label())
                    .unwrap_or("custom");
                format!("New {} audience", label)
            }
        }
    }

    async fn create(&mut self, ctx: &FlowContext<'_>) -> Result<FlowReply, FlowError> {
        let creds = ctx.tokens().await?;
        let name = self.display_name();

        let result = match self.data.audience_type {
            Some(AudienceType::Custom) => {
                ctx.ads
                    .create_custom_audience(&creds, &name, &self.data.phones)
                    .await
            }
            Some(AudienceType::Engagement) => {
                let days = self.data.engagement_days.ok_or_else(|| {
                    FlowError::Invalid("The engagement window is missing.".to_string())
                })?;
                ctx.ads.create_messenger_audience(&creds, &name, days).await
            }
            Some(AudienceType::Lookalike) => {
                let spec = self.lookalike_spec()?;
                ctx.ads
                    .create_lookalike_audience(&creds, &name, &spec)
                    .await
            }
            None => {
                return Err(FlowError::Invalid(
                    "The audience type was never chosen.".to_string(),
                ))
            }
        };

        match result {
            Ok(id) => {
                self.reset();
                Ok(FlowReply::text(format!(
                    "Audience \"{}\" created (id {}).",
                    name, id
                )))
            }
            Err(e) => {
                warn!("Audience creation failed: {}", e);
                self.reset();
                Err(FlowError::External(e.user_message()))
            }
        }
    }

    fn lookalike_spec(&self) -> Result<LookalikeSpec, FlowError> {
        let source_audience_id = self
            .data
            .source_audience
            .clone()
            .ok_or_else(|| FlowError::Invalid("The source audience is missing.".to_string()))?;
        let country = self
            .data
            .country
            .clone()
            .ok_or_else(|| FlowError::Invalid("The target country is missing.".to_string()))?;
        let ratio_percent = self
            .data
            .ratio
            .ok_or_else(|| FlowError::Invalid("The expansion ratio is missing.".to_string()))?;
        Ok(LookalikeSpec {
            source_audience_id,
            country,
            ratio_percent,
        })
    }
}

fn parse_audience_type(text: &str) -> Option<AudienceType> {
    let lower = text.trim().to_ascii_lowercase();
    if lower == "1" || lower.contains("custom") || lower.contains("phone") {
        Some(AudienceType::Custom)
    } else if lower == "2" || lower.contains("engage") || lower.contains("messenger") {
        Some(AudienceType::Engagement)
    } else if lower == "3" || lower.contains("lookalike") || lower.contains("look-alike") {
        Some(AudienceType::Lookalike)
    } else {
        None
    }
}

/// Pull a double-quoted audience name out of the trigger text.
fn parse_quoted_name(text: &str) -> Option<String> {
    let start = text.find('"')?;
    let rest = &text[start + 1..];
    let end = rest.find('"')?;
    let name = rest[..end].trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    let field = value.get(key)?.as_str()?.trim();
    (!field.is_empty()).then(|| field.to_string())
}

fn ratio_field(value: &Value) -> Option<u8> {
    let field = value.get("ratio")?;
    let ratio = match field {
        Value::Number(n) => u8::try_from(n.as_u64()?).ok()?,
        Value::String(s) => parse_ratio(s)?,
        _ => return None,
    };
    (1..=20).contains(&ratio).then_some(ratio)
}

fn parse_country(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| trimmed.to_ascii_uppercase())
}
