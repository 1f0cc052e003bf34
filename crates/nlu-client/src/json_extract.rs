//! JSON recovery from model output.
//!
//! Model replies carry JSON in several shapes: bare, wrapped in a markdown
//! fence, buried in prose, or with stray closing braces appended. All of
//! them reduce to the same problem: find the first `{` and walk to its
//! matching `}` while respecting string literals.

/// Return the first balanced JSON object in `text`, or `None` if the text
/// contains no complete object.
///
/// Fenced and prose-wrapped replies need no special casing: nothing before
/// the object can contain an unquoted `{`, so scanning from the first one
/// is enough.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let body = &text[start..];

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[..=i]);
                }
            }
            _ => {}
        }
    }

    // Ran out of input with the object still open
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let input = r#"{"intent": "create_campaign"}"#;
        assert_eq!(first_json_object(input), Some(input));
    }

    #[test]
    fn test_trailing_braces_trimmed() {
        let input = r#"{"intent": "clone"}}}"#;
        assert_eq!(first_json_object(input), Some(r#"{"intent": "clone"}"#));
    }

    #[test]
    fn test_markdown_fence() {
        let input = "Here you go:\n```json\n{\"ratio\": 5}\n```";
        assert_eq!(first_json_object(input), Some(r#"{"ratio": 5}"#));
    }

    #[test]
    fn test_prose_then_object() {
        let input = r#"The answer is {"days": 30} as requested"#;
        assert_eq!(first_json_object(input), Some(r#"{"days": 30}"#));
    }

    #[test]
    fn test_braces_inside_strings() {
        let input = r#"{"note": "a { b } c", "nested": {"k": "v"}}"#;
        assert_eq!(first_json_object(input), Some(input));
    }

    #[test]
    fn test_escaped_quotes() {
        let input = r#"{"note": "he said \"hi\""}"#;
        assert_eq!(first_json_object(input), Some(input));
    }

    #[test]
    fn test_no_object_at_all() {
        assert_eq!(first_json_object("create_campaign"), None);
    }

    #[test]
    fn test_unterminated_object() {
        assert_eq!(first_json_object(r#"{"intent": "quick"#), None);
    }
}
