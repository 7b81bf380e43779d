use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Generates an opaque token for session/verification/reset flows:
/// a random UUID concatenated with a hex millisecond timestamp.
pub fn generate_secure_token() -> String {
    format!("{}{:x}", Uuid::new_v4().simple(), Utc::now().timestamp_millis())
}

/// Trim, lowercase, collapse internal whitespace to single spaces.
fn normalize_answer(answer: &str) -> String {
    answer
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Salted SHA-256 over the normalized answer. Always 64 lowercase hex chars,
/// zero-padded per byte.
pub fn hash_security_answer(answer: &str, salt: &str) -> String {
    let normalized = normalize_answer(answer);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison against a stored answer hash.
pub fn verify_security_answer(answer: &str, hash: &str, salt: &str) -> bool {
    let computed = hash_security_answer(answer, salt);
    computed.as_bytes().ct_eq(hash.as_bytes()).into()
}

/// Accepts 4-6 digit PINs; rejects strictly ascending runs, strictly
/// descending runs and all-identical digits.
pub fn is_valid_pin(pin: &str) -> bool {
    if pin.len() < 4 || pin.len() > 6 {
        return false;
    }
    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<i16> = pin.bytes().map(|b| i16::from(b - b'0')).collect();
    let ascending = digits.windows(2).all(|w| w[1] - w[0] == 1);
    let descending = digits.windows(2).all(|w| w[0] - w[1] == 1);
    let identical = digits.windows(2).all(|w| w[0] == w[1]);

    !(ascending || descending || identical)
}

/// Request identifier: 6-digit date prefix (YYMMDD) plus 6 random digits.
pub fn generate_request_id() -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("{}{:06}", Utc::now().format("%y%m%d"), suffix)
}

pub fn is_token_expired(expiry: DateTime<Utc>) -> bool {
    expiry <= Utc::now()
}

pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token_uniqueness() {
        let token1 = generate_secure_token();
        let token2 = generate_secure_token();
        assert_ne!(token1, token2, "Generated tokens should be unique");
    }

    #[test]
    fn test_generate_secure_token_is_hex() {
        let token = generate_secure_token();
        assert!(token.len() > 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_security_answer_is_fixed_width() {
        let hash = hash_security_answer("blue car", "salt");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_security_answer_normalizes() {
        assert_eq!(
            hash_security_answer("  Blue   Car ", "salt"),
            hash_security_answer("blue car", "salt")
        );
    }

    #[test]
    fn test_hash_security_answer_salt_sensitive() {
        assert_ne!(
            hash_security_answer("blue car", "salt-a"),
            hash_security_answer("blue car", "salt-b")
        );
    }

    #[test]
    fn test_verify_security_answer() {
        let hash = hash_security_answer("blue car", "salt");
        assert!(verify_security_answer(" BLUE car ", &hash, "salt"));
        assert!(!verify_security_answer("red car", &hash, "salt"));
        assert!(!verify_security_answer("blue car", &hash, "other-salt"));
    }

    #[test]
    fn test_is_valid_pin_rejects_sequences() {
        assert!(!is_valid_pin("1234"));
        assert!(!is_valid_pin("4321"));
        assert!(!is_valid_pin("1111"));
        assert!(!is_valid_pin("345678"));
    }

    #[test]
    fn test_is_valid_pin_rejects_malformed() {
        assert!(!is_valid_pin("12a4"));
        assert!(!is_valid_pin("123"));
        assert!(!is_valid_pin("1234567"));
        assert!(!is_valid_pin(""));
    }

    #[test]
    fn test_is_valid_pin_accepts_irregular_digits() {
        assert!(is_valid_pin("1357"));
        assert!(is_valid_pin("4725"));
        assert!(is_valid_pin("904316"));
    }

    #[test]
    fn test_generate_request_id_shape() {
        let id = generate_request_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_is_token_expired() {
        assert!(is_token_expired(Utc::now() - chrono::Duration::seconds(1)));
        assert!(!is_token_expired(Utc::now() + chrono::Duration::minutes(5)));
    }
}
