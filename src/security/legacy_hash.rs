//! Keyed MD5 digests matching the legacy verification convention.
//!
//! Not a strong primitive. Retained solely for bit-exact compatibility with
//! verification values stored by the pre-existing system; new code hashes with
//! `security::toolkit` instead.

const PREFIX_SLOTS: usize = 8;

/// Renders the reference into the legacy bracketed token sequence: one `[c]`
/// token per reference character, `[ ]` for empty slots, always exactly
/// `PREFIX_SLOTS` tokens. Characters beyond the slot count are dropped.
fn format_prefix(reference: &str) -> String {
    let chars: Vec<char> = reference.chars().collect();
    let mut out = String::with_capacity(PREFIX_SLOTS * 3);
    for slot in 0..PREFIX_SLOTS {
        match chars.get(slot) {
            Some(c) => {
                out.push('[');
                out.push(*c);
                out.push(']');
            }
            None => out.push_str("[ ]"),
        }
    }
    out
}

/// Digest over `format_prefix(reference) + secret`, rendered as the legacy
/// peer renders it: the 16 MD5 bytes as one big unsigned integer in minimal
/// hexadecimal, then a single leading '0' stripped when present. Output length
/// varies; two digests are equal iff their hex strings are equal.
fn legacy_digest(secret: &str, reference: &str) -> String {
    let input = format!("{}{}", format_prefix(reference), secret);
    let digest = md5::compute(input.as_bytes());
    let hex = format!("{:x}", u128::from_be_bytes(digest.0));
    match hex.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => hex,
    }
}

pub fn hash_pin(pin: &str, reference: &str) -> String {
    legacy_digest(pin, reference)
}

pub fn hash_password(password: &str, reference: &str) -> String {
    legacy_digest(password, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_prefix_pads_short_reference() {
        assert_eq!(format_prefix("ABCD"), "[A][B][C][D][ ][ ][ ][ ]");
    }

    #[test]
    fn test_format_prefix_truncates_long_reference() {
        assert_eq!(format_prefix("123456789"), "[1][2][3][4][5][6][7][8]");
    }

    #[test]
    fn test_format_prefix_empty_reference() {
        assert_eq!(format_prefix(""), "[ ][ ][ ][ ][ ][ ][ ][ ]");
    }

    #[test]
    fn test_hash_pin_is_deterministic() {
        assert_eq!(hash_pin("1234", "ABCD"), hash_pin("1234", "ABCD"));
    }

    #[test]
    fn test_hash_pin_sensitive_to_both_arguments() {
        let base = hash_pin("1234", "ABCD");
        assert_ne!(base, hash_pin("1235", "ABCD"));
        assert_ne!(base, hash_pin("1234", "ABCE"));
    }

    #[test]
    fn test_hash_password_matches_hash_pin_construction() {
        // Same formatted input, same digest: the two entry points share one
        // legacy construction.
        assert_eq!(hash_password("1234", "ABCD"), hash_pin("1234", "ABCD"));
    }

    #[test]
    fn test_digest_is_variable_length_lowercase_hex() {
        for (secret, reference) in [("1234", "ABCD"), ("0000", "WXYZ"), ("secret", "")] {
            let digest = legacy_digest(secret, reference);
            assert!(!digest.is_empty());
            assert!(digest.len() <= 32, "never longer than 32 nibbles");
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            // Minimal rendering plus the single-strip quirk: no leading zero
            // ever survives.
            assert!(!digest.starts_with('0') || digest.len() == 1);
        }
    }
}
