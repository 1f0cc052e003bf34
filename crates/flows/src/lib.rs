//! Multi-turn workflow state machines for the ads assistant.
//!
//! Each workflow (campaign creation, audience building, cloning, quick
//! posts, automation rules, status toggling) is an independent state
//! machine with a fixed stage enum, a data bag that accumulates across
//! turns, and a `reset()` that returns it to `Idle` with all data cleared.
//!
//! Controllers never call each other; the orchestrator decides which one
//! owns an inbound message. External services (the advertising platform,
//! credential provider and field extractor) are injected per call through
//! [`FlowContext`], so every controller is testable in isolation.

mod audience_creation;
mod campaign_creation;
mod campaign_toggle;
mod clone_object;
mod confirm;
mod context;
mod error;
mod extract;
mod phone;
mod quick_post;
mod reply;
mod rule_definition;

pub use audience_creation::{AudienceCreationFlow, AudienceStage, AudienceType};
pub use campaign_creation::{CampaignCreationFlow, CampaignStage};
pub use campaign_toggle::{CampaignToggleFlow, ToggleStage};
pub use clone_object::{CloneObjectFlow, CloneStage, MAX_CLONE_COPIES, MAX_CLONE_NAME_CHARS};
pub use confirm::{is_affirmative, is_negative};
pub use context::FlowContext;
pub use error::FlowError;
pub use extract::{backfill_ratio, parse_ratio};
pub use phone::{normalize_phone_list, normalize_phone_number};
pub use quick_post::{QuickPostFlow, QuickPostStage};
pub use reply::FlowReply;
pub use rule_definition::{RuleDefinitionFlow, RuleStage};
