//! Deterministic backfill pass for AI-assisted field extraction.
//!
//! The field extractor is a best-effort model call. On short inputs like
//! "5%" it occasionally misses values that are plainly there, so extracted
//! output runs through a deterministic second pass before the flow decides
//! what is still missing.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn ratio_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([0-9]{1,2})(?:\s*%|\b)").expect("static regex"))
}

/// Pull a lookalike ratio out of free text.
///
/// Accepts integers 1-20, with or without a percent sign. Returns the
/// first in-range match.
pub fn parse_ratio(text: &str) -> Option<u8> {
    for capture in ratio_regex().captures_iter(text) {
        if let Ok(value) = capture[1].parse::<u8>() {
            if (1..=20).contains(&value) {
                return Some(value);
            }
        }
    }
    None
}

/// Backfill a missing `ratio` field in extractor output.
///
/// When the extractor omitted the ratio but the text obviously contains
/// one, fill it in. Never overwrites a value the extractor did produce.
pub fn backfill_ratio(text: &str, extracted: &mut Value) {
    let Some(object) = extracted.as_object_mut() else {
        return;
    };

    let present = object
        .get("ratio")
        .map(|v| v.is_u64() || v.is_string())
        .unwrap_or(false);

    if !present {
        if let Some(ratio) = parse_ratio(text) {
            object.insert("ratio".to_string(), Value::from(ratio));
        }
    }
}
