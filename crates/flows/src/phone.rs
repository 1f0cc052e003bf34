//! Phone number normalization for audience ingestion.
//!
//! Users paste heterogeneous blocks: mixed delimiters, legacy `00` country
//! prefixes, numbers with or without the leading zero. Everything is
//! normalized into a canonical `+<country><national>` form before being
//! shown back for confirmation.

/// Default country code applied to national-format numbers.
const DEFAULT_COUNTRY_CODE: &str = "84";

/// Minimum number of digits for an entry to be considered a phone number.
const MIN_DIGITS: usize = 9;

/// Normalize a single pasted entry into `+<country><national>` form.
///
/// Returns `None` for entries with fewer than 9 digits.
pub fn normalize_phone_number(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let has_plus = raw.starts_with('+');
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < MIN_DIGITS {
        return None;
    }

    // Legacy international prefix: 0084... is the same as +84...
    let digits = digits.strip_prefix("00").unwrap_or(&digits);

    let canonical = if has_plus {
        digits.to_string()
    } else if let Some(national) = digits.strip_prefix('0') {
        // National format with leading zero
        format!("{}{}", DEFAULT_COUNTRY_CODE, national)
    } else if digits.starts_with(DEFAULT_COUNTRY_CODE) && digits.len() > 10 {
        // Already country-coded, just missing the plus
        digits.to_string()
    } else {
        // Missing the leading zero entirely
        format!("{}{}", DEFAULT_COUNTRY_CODE, digits)
    };

    Some(format!("+{}", canonical))
}

/// Normalize a pasted block of phone numbers.
///
/// Splits on commas, semicolons and newlines, normalizes each entry,
/// drops entries under 9 digits and de-duplicates while preserving
/// first-seen order. Applying this to its own output is a no-op.
pub fn normalize_phone_list(input: &str) -> Vec<String> {
    let mut seen = Vec::new();

    for entry in input.split([',', ';', '\n']) {
        if entry.trim().is_empty() {
            continue;
        }
        if let Some(normalized) = normalize_phone_number(entry) {
            if !seen.contains(&normalized) {
                seen.push(normalized);
            }
        }
    }

    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_with_leading_zero() {
        assert_eq!(
            normalize_phone_number("0912345678").as_deref(),
            Some("+84912345678")
        );
    }

    #[test]
    fn test_spaces_inside_number() {
        assert_eq!(
            normalize_phone_number("098 765 4321").as_deref(),
            Some("+84987654321")
        );
    }

    #[test]
    fn test_already_canonical() {
        assert_eq!(
            normalize_phone_number("+84912345678").as_deref(),
            Some("+84912345678")
        );
    }

    #[test]
    fn test_legacy_double_zero_prefix() {
        assert_eq!(
            normalize_phone_number("0084912345678").as_deref(),
            Some("+84912345678")
        );
    }

    #[test]
    fn test_country_code_without_plus() {
        assert_eq!(
            normalize_phone_number("84912345678").as_deref(),
            Some("+84912345678")
        );
    }

    #[test]
    fn test_missing_leading_zero() {
        assert_eq!(
            normalize_phone_number("912345678").as_deref(),
            Some("+84912345678")
        );
    }

    #[test]
    fn test_too_short_discarded() {
        assert!(normalize_phone_number("12345678").is_none());
        assert!(normalize_phone_number("0123").is_none());
    }

    #[test]
    fn test_mixed_block_with_duplicate() {
        let result = normalize_phone_list("0912345678, 098 765 4321, 0912345678");
        assert_eq!(result, vec!["+84912345678", "+84987654321"]);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let result = normalize_phone_list("0987654321\n0912345678;0987654321");
        assert_eq!(result, vec!["+84987654321", "+84912345678"]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_phone_list("0912345678, 098 765 4321, 84911222333, 0084905666777");
        let twice = normalize_phone_list(&once.join(", "));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_duplicates_in_output() {
        let result =
            normalize_phone_list("0912345678, +84912345678, 84912345678, 0084912345678");
        assert_eq!(result, vec!["+84912345678"]);
    }

    #[test]
    fn test_empty_and_garbage_entries() {
        let result = normalize_phone_list(" , abc; \n 0912345678");
        assert_eq!(result, vec!["+84912345678"]);
    }
}
