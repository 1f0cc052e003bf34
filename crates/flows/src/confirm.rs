//! Yes/no token interpretation for confirmation stages.

/// Check if free text is an affirmative confirmation token.
pub fn is_affirmative(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "yeah" | "yep" | "ok" | "okay" | "confirm" | "sure" | "do it"
    )
}

/// Check if free text is a negative/cancel token.
pub fn is_negative(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "no" | "n" | "nope" | "cancel" | "stop" | "abort" | "never mind"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_tokens() {
        for token in ["yes", "Y", "ok", "OKAY", " confirm "] {
            assert!(is_affirmative(token), "{} should confirm", token);
        }
    }

    #[test]
    fn test_negative_tokens() {
        for token in ["no", "N", "cancel", " STOP "] {
            assert!(is_negative(token), "{} should cancel", token);
        }
    }

    #[test]
    fn test_free_text_is_neither() {
        assert!(!is_affirmative("yes please do that tomorrow"));
        assert!(!is_negative("not sure"));
    }
}
