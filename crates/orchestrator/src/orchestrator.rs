//! Main dispatch loop for the chat channel.

use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use ads_client::{
    AdObject, AdsApi, CredentialProvider, EnvCredentialProvider, GraphAdsClient, ObjectKind,
    ObjectStatus,
};
use catalog_store::CatalogStore;
use chat_core::{
    ChatResponder, FieldExtractor, InboundMessage, Intent, IntentClassifier, Transcript, Turn,
};
use flows::{
    AudienceCreationFlow, CampaignCreationFlow, CampaignToggleFlow, CloneObjectFlow, FlowContext,
    FlowError, FlowReply, QuickPostFlow, RuleDefinitionFlow,
};
use nlu_client::NluClient;

use crate::active_flow::ActiveFlow;
use crate::error::OrchestratorError;
use crate::flags::FeatureFlags;
use crate::triggers;

/// Reply sent after a reset command.
pub const RESET_ACK: &str =
    "Everything has been reset. The conversation is cleared and no workflow is in progress.";

/// Reply when the classifier can't be reached or errors out.
const CLARIFY: &str = "I didn't catch what you'd like to do. I can create campaigns and \
     audiences, clone existing objects, boost a post, set automation rules, \
     or pause and resume campaigns.";

/// How many recent turns go to the classifier and responder as context.
const MAX_CONTEXT_TURNS: usize = 10;

/// What a dispatch decision resolved to.
enum Outcome {
    /// Finished turns, already appended to the transcript.
    Turns(Vec<Turn>),
    /// Fall through to the streaming general responder.
    Stream,
}

/// The dialogue orchestrator for a single chat channel.
///
/// Owns the transcript, the single active-flow slot and the feature
/// flags. All state sits behind a `tokio::sync::Mutex`, so concurrent
/// callers serialize on the one-flow-at-a-time invariant.
pub struct Orchestrator {
    classifier: Arc<dyn IntentClassifier>,
    extractor: Arc<dyn FieldExtractor>,
    responder: Arc<dyn ChatResponder>,
    ads: Arc<dyn AdsApi>,
    credentials: Arc<dyn CredentialProvider>,
    /// Best-effort catalog cache; never required for correctness.
    store: Option<CatalogStore>,
    flags: FeatureFlags,
    transcript: Transcript,
    active: Mutex<ActiveFlow>,
    /// Bumped on every reset; streaming paths snapshot it before awaiting
    /// and discard their result when it moved.
    reset_epoch: AtomicU64,
}

impl Orchestrator {
    /// Create an orchestrator from explicit service handles.
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        extractor: Arc<dyn FieldExtractor>,
        responder: Arc<dyn ChatResponder>,
        ads: Arc<dyn AdsApi>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            classifier,
            extractor,
            responder,
            ads,
            credentials,
            store: None,
            flags: FeatureFlags::default(),
            transcript: Transcript::new(),
            active: Mutex::new(ActiveFlow::Idle),
            reset_epoch: AtomicU64::new(0),
        }
    }

    /// Create an orchestrator from environment variables.
    ///
    /// Uses the NLU client for classification, extraction and streaming
    /// replies, the HTTP ads client, env-backed credentials, and (when
    /// `CATALOG_DB_URL` is set) a SQLite catalog cache.
    pub async fn from_env() -> Result<Self, OrchestratorError> {
        let nlu = Arc::new(NluClient::from_env()?);
        let ads = GraphAdsClient::from_env()
            .map_err(|e| OrchestratorError::Configuration(e.to_string()))?;

        let mut orchestrator = Self::new(
            nlu.clone(),
            nlu.clone(),
            nlu,
            Arc::new(ads),
            Arc::new(EnvCredentialProvider::new()),
        );
        orchestrator.flags = FeatureFlags::from_env();

        if let Ok(url) = env::var("CATALOG_DB_URL") {
            let store = CatalogStore::connect(&url).await?;
            store.migrate().await?;
            orchestrator.store = Some(store);
        }

        Ok(orchestrator)
    }

    /// Attach a catalog cache.
    pub fn with_store(mut self, store: CatalogStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the feature flags.
    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The shared transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Name of the flow currently owning the channel, for logs and tests.
    pub async fn active_flow_name(&self) -> &'static str {
        self.active.lock().await.name()
    }

    /// Process one inbound message and return the assistant turns it
    /// produced. The turns are also appended to the transcript.
    pub async fn handle(&self, inbound: InboundMessage) -> Vec<Turn> {
        if !inbound.has_text() && inbound.attachment.is_none() {
            debug!("Dropping empty inbound message");
            return Vec::new();
        }

        let text = inbound.text.trim().to_string();
        self.transcript.append(Turn::user(inbound.text.clone())).await;

        if triggers::is_reset(&text) {
            return vec![self.reset().await];
        }

        let outcome = {
            let mut active = self.active.lock().await;
            info!(flow = active.name(), "Dispatching message");
            self.dispatch(&mut active, &inbound, &text).await
        };

        match outcome {
            Outcome::Turns(turns) => turns,
            Outcome::Stream => self.stream_general_reply(&text).await,
        }
    }

    /// Reset the channel: drop the active flow, clear the transcript and
    /// abandon any in-flight streaming reply. Safe to call repeatedly.
    pub async fn reset(&self) -> Turn {
        info!("Resetting channel state");
        self.reset_epoch.fetch_add(1, Ordering::SeqCst);
        {
            let mut active = self.active.lock().await;
            *active = ActiveFlow::Idle;
        }
        self.transcript.clear().await;

        let turn = Turn::assistant(RESET_ACK);
        self.transcript.append(turn.clone()).await;
        turn
    }

    fn flow_context(&self) -> FlowContext<'_> {
        FlowContext {
            ads: self.ads.as_ref(),
            credentials: self.credentials.as_ref(),
            extractor: self.extractor.as_ref(),
        }
    }

    async fn dispatch(
        &self,
        active: &mut ActiveFlow,
        inbound: &InboundMessage,
        text: &str,
    ) -> Outcome {
        let ctx = self.flow_context();

        // An active flow owns every message until it finishes or fails
        let step = match active {
            ActiveFlow::Idle => None,
            ActiveFlow::CampaignCreation(flow) => Some(match &inbound.attachment {
                Some(attachment) => flow.handle_attachment(&ctx, attachment).await,
                None => flow.handle_input(&ctx, text).await,
            }),
            ActiveFlow::AudienceCreation(flow) => Some(flow.handle_input(&ctx, text).await),
            ActiveFlow::CloneObject(flow) => Some(flow.handle_input(&ctx, text).await),
            ActiveFlow::QuickPost(flow) => Some(flow.handle_input(&ctx, text).await),
            ActiveFlow::RuleDefinition(flow) => Some(flow.handle_input(&ctx, text).await),
            ActiveFlow::CampaignToggle(flow) => {
                let result = flow.handle_input(&ctx, text).await;
                if let Some((object_id, status)) = flow.take_applied_toggle() {
                    self.remember_toggle(&object_id, status).await;
                }
                Some(result)
            }
        };

        if let Some(result) = step {
            return Outcome::Turns(self.settle(active, result).await);
        }

        self.dispatch_idle(active, inbound, text).await
    }

    /// Idle-path dispatch: deterministic triggers, then attachments, then
    /// the intent classifier, and finally the streaming responder.
    async fn dispatch_idle(
        &self,
        active: &mut ActiveFlow,
        inbound: &InboundMessage,
        text: &str,
    ) -> Outcome {
        // Rule first: rule descriptions often mention pausing campaigns
        if triggers::mentions_rule(text) {
            return Outcome::Turns(self.start_rule(active, text).await);
        }
        if triggers::mentions_toggle(text) {
            return Outcome::Turns(self.start_toggle(active, text).await);
        }
        if let Some(attachment) = inbound.attachment.clone() {
            return Outcome::Turns(
                self.start_campaign_with_media(active, inbound, &attachment)
                    .await,
            );
        }

        let history = self.transcript.recent(MAX_CONTEXT_TURNS).await;
        let intent = match self.classifier.detect(text, &history).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Intent classification failed: {}", e);
                return Outcome::Turns(self.say(CLARIFY).await);
            }
        };
        info!(?intent, "Intent detected");

        if !self.flags.allows(intent) {
            return Outcome::Turns(self.say(FeatureFlags::denied_message(intent)).await);
        }

        let ctx = self.flow_context();
        match intent {
            Intent::CreateCampaign => {
                let mut flow = CampaignCreationFlow::new();
                let reply = flow.start(text);
                *active = ActiveFlow::CampaignCreation(flow);
                Outcome::Turns(self.settle(active, Ok(reply)).await)
            }
            Intent::CreateAudience => {
                let mut flow = AudienceCreationFlow::new();
                let result = flow.start(&ctx, text).await;
                *active = ActiveFlow::AudienceCreation(flow);
                Outcome::Turns(self.settle(active, result).await)
            }
            Intent::CloneObject => match self.resolve_catalog().await {
                Ok(catalog) => {
                    let mut flow = CloneObjectFlow::new();
                    let reply = flow.start(catalog, text);
                    *active = ActiveFlow::CloneObject(flow);
                    Outcome::Turns(self.settle(active, Ok(reply)).await)
                }
                Err(message) => Outcome::Turns(self.say(message).await),
            },
            Intent::QuickPost => {
                let mut flow = QuickPostFlow::new();
                let reply = flow.start(text);
                *active = ActiveFlow::QuickPost(flow);
                Outcome::Turns(self.settle(active, Ok(reply)).await)
            }
            Intent::ToggleCampaign => Outcome::Turns(self.start_toggle(active, text).await),
            Intent::DefineRule => Outcome::Turns(self.start_rule(active, text).await),
            Intent::Unknown => Outcome::Stream,
        }
    }

    async fn start_rule(&self, active: &mut ActiveFlow, text: &str) -> Vec<Turn> {
        if !self.flags.rule_definition {
            return self.say(FeatureFlags::denied_message(Intent::DefineRule)).await;
        }

        let ctx = self.flow_context();
        let mut flow = RuleDefinitionFlow::new();
        let result = flow.start(&ctx, text).await;
        *active = ActiveFlow::RuleDefinition(flow);
        self.settle(active, result).await
    }

    async fn start_toggle(&self, active: &mut ActiveFlow, text: &str) -> Vec<Turn> {
        if !self.flags.campaign_toggle {
            return self
                .say(FeatureFlags::denied_message(Intent::ToggleCampaign))
                .await;
        }

        match self.resolve_catalog().await {
            Ok(catalog) => {
                let mut flow = CampaignToggleFlow::new();
                let reply = flow.start_with_catalog(catalog, text);
                if flow.is_active() {
                    *active = ActiveFlow::CampaignToggle(flow);
                }
                let turn = reply_turn(reply);
                self.transcript.append(turn.clone()).await;
                vec![turn]
            }
            Err(message) => self.say(message).await,
        }
    }

    async fn start_campaign_with_media(
        &self,
        active: &mut ActiveFlow,
        inbound: &InboundMessage,
        attachment: &chat_core::Attachment,
    ) -> Vec<Turn> {
        // Attached media only ever feeds campaign creation. With text, the
        // classifier must confirm that's what the user meant before anything
        // gets uploaded.
        if inbound.has_text() {
            let history = self.transcript.recent(MAX_CONTEXT_TURNS).await;
            let confirmed = match self.classifier.detect(&inbound.text, &history).await {
                Ok(intent) => {
                    debug!(?intent, "Intent detected for attachment message");
                    intent == Intent::CreateCampaign
                }
                Err(e) => {
                    warn!("Intent classification failed for attachment: {}", e);
                    false
                }
            };
            if !confirmed {
                return self
                    .say(
                        "I can only use attached media to create a campaign. \
                         If that's what you want, say \"create a campaign\" \
                         and send the file again.",
                    )
                    .await;
            }
        }

        if !self.flags.campaign_creation {
            return self
                .say(FeatureFlags::denied_message(Intent::CreateCampaign))
                .await;
        }

        let ctx = self.flow_context();
        let mut flow = CampaignCreationFlow::new();
        let result = flow.start_with_media(&ctx, &inbound.text, attachment).await;
        *active = ActiveFlow::CampaignCreation(flow);
        self.settle(active, result).await
    }

    /// Turn a flow step result into exactly one assistant turn, freeing
    /// the active slot when the flow finished or failed fatally.
    async fn settle(
        &self,
        active: &mut ActiveFlow,
        result: Result<FlowReply, FlowError>,
    ) -> Vec<Turn> {
        let turn = match result {
            Ok(reply) => reply_turn(reply),
            Err(e) => {
                if e.resets_flow() {
                    info!(flow = active.name(), "Flow dropped after external failure");
                    *active = ActiveFlow::Idle;
                }
                Turn::assistant(e.to_string())
            }
        };

        if flow_finished(active) {
            debug!(flow = active.name(), "Flow finished, freeing the slot");
            *active = ActiveFlow::Idle;
        }

        self.transcript.append(turn.clone()).await;
        vec![turn]
    }

    /// Append a single plain assistant turn.
    async fn say(&self, message: impl Into<String>) -> Vec<Turn> {
        let turn = Turn::assistant(message);
        self.transcript.append(turn.clone()).await;
        vec![turn]
    }

    /// The account's object catalog: cached copy with local overrides when
    /// available, otherwise a fresh listing (which refreshes the cache).
    async fn resolve_catalog(&self) -> Result<Vec<AdObject>, String> {
        let creds = self
            .credentials
            .get_tokens()
            .await
            .map_err(|e| e.user_message())?;

        if let Some(store) = &self.store {
            match store.get_catalog(&creds.ad_account_id).await {
                Ok(cached) if !cached.is_empty() => {
                    debug!("Using cached catalog ({} objects)", cached.len());
                    return Ok(cached);
                }
                Ok(_) => {}
                Err(e) => warn!("Catalog cache read failed: {}", e),
            }
        }

        let mut catalog = Vec::new();
        for kind in [ObjectKind::Campaign, ObjectKind::AdSet, ObjectKind::Ad] {
            let objects = self
                .ads
                .list_objects(&creds, kind)
                .await
                .map_err(|e| e.user_message())?;
            catalog.extend(objects);
        }
        info!("Fetched catalog ({} objects)", catalog.len());

        if let Some(store) = &self.store {
            if let Err(e) = store.replace_catalog(&creds.ad_account_id, &catalog).await {
                warn!("Catalog cache write failed: {}", e);
            }
        }

        Ok(catalog)
    }

    /// Record a confirmed status change in the catalog cache.
    async fn remember_toggle(&self, object_id: &str, status: ObjectStatus) {
        let Some(store) = &self.store else {
            return;
        };
        match self.credentials.get_tokens().await {
            Ok(creds) => {
                if let Err(e) = store
                    .record_toggle(&creds.ad_account_id, object_id, status)
                    .await
                {
                    warn!("Failed to record toggle in cache: {}", e);
                }
            }
            Err(e) => warn!("Skipping toggle cache update: {}", e),
        }
    }

    /// Stream a general-chat reply token by token into the transcript.
    ///
    /// The partial turn is replaced in place as tokens arrive. A reset
    /// racing the stream wins: the partial content is discarded and no
    /// turn is returned.
    async fn stream_general_reply(&self, text: &str) -> Vec<Turn> {
        let epoch = self.reset_epoch.load(Ordering::SeqCst);
        let history = self.transcript.recent(MAX_CONTEXT_TURNS).await;

        let mut stream = match self.responder.stream_reply(text, &history).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Responder unavailable: {}", e);
                return self
                    .say("I'm having trouble replying right now. Please try again in a moment.")
                    .await;
            }
        };

        let stream_id = self.transcript.begin_streaming().await;
        while let Some(item) = stream.next().await {
            if self.reset_epoch.load(Ordering::SeqCst) != epoch {
                info!("Reset fired mid-stream, discarding partial reply");
                self.transcript.abort_streaming(stream_id).await;
                return Vec::new();
            }
            match item {
                Ok(token) => self.transcript.push_token(stream_id, &token).await,
                Err(e) => {
                    warn!("Stream failed mid-reply: {}", e);
                    self.transcript.abort_streaming(stream_id).await;
                    return self
                        .say("Sorry, my reply got cut off. Please try again.")
                        .await;
                }
            }
        }

        match self.transcript.finish_streaming(stream_id).await {
            Some(content) => vec![Turn::assistant(content)],
            // A reset or a newer stream invalidated this turn meanwhile
            None => Vec::new(),
        }
    }
}

fn reply_turn(reply: FlowReply) -> Turn {
    match reply.side_channel {
        Some(payload) => Turn::assistant_with_payload(reply.message, payload),
        None => Turn::assistant(reply.message),
    }
}

fn flow_finished(active: &ActiveFlow) -> bool {
    match active {
        ActiveFlow::Idle => false,
        ActiveFlow::CampaignCreation(flow) => !flow.is_active(),
        ActiveFlow::AudienceCreation(flow) => !flow.is_active(),
        ActiveFlow::CloneObject(flow) => !flow.is_active(),
        ActiveFlow::QuickPost(flow) => !flow.is_active(),
        ActiveFlow::RuleDefinition(flow) => !flow.is_active(),
        ActiveFlow::CampaignToggle(flow) => !flow.is_active(),
    }
}
