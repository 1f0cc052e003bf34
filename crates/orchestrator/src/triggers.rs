//! Deterministic trigger phrases checked before the intent classifier.
//!
//! Toggle and rule requests are frequent and cheap to spot, so they skip
//! the classifier round-trip entirely.

/// Reset commands wipe every flow and the transcript.
pub fn is_reset(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "reset" | "/reset" | "start over" | "reset everything"
    )
}

/// Requests to define an automation rule.
pub fn mentions_rule(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["create a rule", "add a rule", "new rule", "define a rule", "set up a rule"]
        .iter()
        .any(|phrase| lower.contains(phrase))
        || (lower.contains("rule") && (lower.contains("pause") || lower.contains("when")))
}

/// Requests to toggle campaign delivery or list campaigns.
pub fn mentions_toggle(text: &str) -> bool {
    let lower = text.to_lowercase();
    let names_campaign = lower.contains("campaign");
    let toggle_verb = [
        "pause", "unpause", "resume", "turn on", "turn off", "activate", "deactivate", "enable",
        "disable",
    ]
    .iter()
    .any(|kw| lower.contains(kw));

    (names_campaign && toggle_verb) || lower.contains("list campaigns")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_commands() {
        assert!(is_reset("reset"));
        assert!(is_reset(" /reset "));
        assert!(is_reset("Start Over"));
        assert!(!is_reset("reset the campaign budget"));
    }

    #[test]
    fn test_rule_triggers() {
        assert!(mentions_rule("create a rule for overspending"));
        assert!(mentions_rule("add a rule: pause anything above 2.5"));
        assert!(mentions_rule("make a rule to pause bad ads"));
        assert!(!mentions_rule("what are the rules of cricket"));
    }

    #[test]
    fn test_toggle_triggers() {
        assert!(mentions_toggle("pause the summer campaign"));
        assert!(mentions_toggle("turn on my winter campaign"));
        assert!(mentions_toggle("list campaigns"));
        assert!(!mentions_toggle("pause for a second"));
        assert!(!mentions_toggle("how are my campaigns doing"));
    }
}
