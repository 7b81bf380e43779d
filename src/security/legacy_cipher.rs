use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyInit};
use std::path::Path;

use crate::error::AppError;

type TdesEcbDecryptor = ecb::Decryptor<des::TdesEde3>;

/// Derives the 24-byte triple-length DES key from the master key blob.
///
/// The legacy peer takes the MD5 digest of the master key and appends its
/// first 8 bytes to reach triple-DES key length. The exact byte ranges must
/// not change: stored ciphertext was produced with this derivation.
fn derive_key(master_key: &[u8]) -> [u8; 24] {
    let digest = md5::compute(master_key);
    let mut key = [0u8; 24];
    key[..16].copy_from_slice(&digest.0);
    key[16..].copy_from_slice(&digest.0[..8]);
    key
}

/// Decrypts base64 ciphertext produced by the legacy DESede/ECB/PKCS7 scheme.
pub fn decrypt(ciphertext_b64: &str, master_key: &[u8]) -> Result<String, AppError> {
    let ciphertext = BASE64
        .decode(ciphertext_b64)
        .map_err(|e| AppError::Crypto(format!("Invalid base64 key ciphertext: {}", e)))?;

    let key = derive_key(master_key);
    let decryptor = TdesEcbDecryptor::new_from_slice(&key)
        .map_err(|_| AppError::Crypto("Invalid DESede key length".to_string()))?;

    let plaintext = decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| AppError::Crypto("Key material decryption failed".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| AppError::Crypto("Invalid UTF-8 in decrypted key material".to_string()))
}

/// Loads the master unwrap key blob from its configured path.
///
/// A missing or unreadable file is a fatal configuration error, not a
/// transient condition.
pub fn load_master_key<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, AppError> {
    std::fs::read(path.as_ref()).map_err(|e| {
        AppError::Crypto(format!(
            "Cannot read master key file {}: {}",
            path.as_ref().display(),
            e
        ))
    })
}

#[cfg(test)]
pub(crate) fn encrypt(plaintext: &str, master_key: &[u8]) -> String {
    use ecb::cipher::BlockEncryptMut;

    type TdesEcbEncryptor = ecb::Encryptor<des::TdesEde3>;

    let key = derive_key(master_key);
    let encryptor = TdesEcbEncryptor::new_from_slice(&key).expect("24-byte key");
    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    BASE64.encode(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER_KEY: &[u8] = b"unit-test-master-key-material";

    #[test]
    fn test_derived_key_duplicates_leading_bytes() {
        let key = derive_key(MASTER_KEY);
        assert_eq!(&key[16..24], &key[..8]);
    }

    #[test]
    fn test_derived_key_is_deterministic() {
        assert_eq!(derive_key(MASTER_KEY), derive_key(MASTER_KEY));
        assert_ne!(derive_key(MASTER_KEY), derive_key(b"other-master-key"));
    }

    #[test]
    fn test_decrypt_round_trip() {
        let wrapped = encrypt("bank-secret-key-value", MASTER_KEY);
        let unwrapped = decrypt(&wrapped, MASTER_KEY).unwrap();
        assert_eq!(unwrapped, "bank-secret-key-value");
    }

    #[test]
    fn test_decrypt_rejects_invalid_base64() {
        let result = decrypt("not base64!!", MASTER_KEY);
        assert!(matches!(result, Err(AppError::Crypto(_))));
    }

    #[test]
    fn test_decrypt_rejects_wrong_master_key() {
        let wrapped = encrypt("bank-secret-key-value", MASTER_KEY);
        let result = decrypt(&wrapped, b"a-different-master-key");
        assert!(result.is_err() || result.unwrap() != "bank-secret-key-value");
    }

    #[test]
    fn test_load_master_key_missing_file() {
        let result = load_master_key("/nonexistent/master.key");
        assert!(matches!(result, Err(AppError::Crypto(_))));
    }
}
