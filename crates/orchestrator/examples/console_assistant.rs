//! Console ads-assistant example.
//!
//! This example runs the orchestrator against scripted mock services so
//! the whole dispatch loop can be explored without any credentials:
//! type messages, watch the assistant walk you through the workflows.
//!
//! Run with: cargo run -p orchestrator --example console_assistant
//!
//! Try:
//!   pause the summer campaign
//!   clone a campaign
//!   boost https://example.com/posts/1
//!   reset

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use ads_client::{AdObject, ObjectKind, ObjectStatus};
use chat_core::{InboundMessage, Intent};
use mock_services::{
    RecordingAdsApi, ScriptedClassifier, ScriptedExtractor, StaticCredentials,
    TokenStreamResponder,
};
use orchestrator::Orchestrator;

fn demo_catalog() -> Vec<AdObject> {
    vec![
        AdObject {
            id: "120210000001".to_string(),
            name: "Summer sale".to_string(),
            kind: ObjectKind::Campaign,
            status: ObjectStatus::Active,
        },
        AdObject {
            id: "120210000002".to_string(),
            name: "Summer clearance".to_string(),
            kind: ObjectKind::Campaign,
            status: ObjectStatus::Active,
        },
        AdObject {
            id: "120210000003".to_string(),
            name: "Winter promo".to_string(),
            kind: ObjectKind::Campaign,
            status: ObjectStatus::Paused,
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let ads = Arc::new(RecordingAdsApi::with_catalog(demo_catalog()));
    let orchestrator = Orchestrator::new(
        Arc::new(ScriptedClassifier::always(Intent::Unknown)),
        Arc::new(ScriptedExtractor::empty()),
        Arc::new(TokenStreamResponder::single(
            "I'm the demo responder. Try a toggle, clone or quick-post request.",
        )),
        ads.clone(),
        Arc::new(StaticCredentials::default()),
    );

    println!("Ads assistant demo. Ctrl-D to exit.\n");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        for turn in orchestrator.handle(InboundMessage::text(line)).await {
            println!("assistant: {}", turn.content);
        }
    }

    println!("\nRecorded platform calls:");
    for call in ads.calls() {
        println!("  {:?}", call);
    }
    Ok(())
}
