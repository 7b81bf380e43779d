use aes_gcm::{aead::Aead, Aes256Gcm, Key, KeyInit, Nonce};
use sha2::Sha256;
use std::sync::Arc;

use crate::error::AppError;
use crate::security::bank_keys::{BankKeyCache, BankKeyMaterial};

/// AES-GCM nonce length. The configured per-bank IV string must decode to
/// exactly this many bytes.
pub const GCM_NONCE_LEN: usize = 12;
/// GCM authentication tag length appended to the ciphertext.
pub const GCM_TAG_LEN: usize = 16;

const PBKDF2_ROUNDS: u32 = 65_536;

/// Authenticated encryption of PIN payloads under per-institution keys,
/// interoperable with the legacy peer's payload layout:
/// `hex(nonce || ciphertext || tag)`.
pub struct CredentialCryptoService {
    keys: Arc<BankKeyCache>,
}

impl CredentialCryptoService {
    pub fn new(keys: Arc<BankKeyCache>) -> Self {
        Self { keys }
    }

    /// PBKDF2-HMAC-SHA256 over the bank's secret-key string, salted with the
    /// bank's IV-string bytes. Fixed iteration count; 256-bit output.
    fn derive_key(material: &BankKeyMaterial) -> [u8; 32] {
        let mut key = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            material.secret_key.as_bytes(),
            material.iv.as_bytes(),
            PBKDF2_ROUNDS,
            &mut key,
        );
        key
    }

    fn nonce_bytes(material: &BankKeyMaterial) -> Result<&[u8], AppError> {
        let nonce = material.iv.as_bytes();
        if nonce.len() != GCM_NONCE_LEN {
            return Err(AppError::Crypto(format!(
                "Bank {} IV must be exactly {} bytes, got {}",
                material.bank_code,
                GCM_NONCE_LEN,
                nonce.len()
            )));
        }
        Ok(nonce)
    }

    pub fn encrypt_pin(&self, pin: &str, bank_code: &str) -> Result<String, AppError> {
        let material = self.keys.get(bank_code)?;
        let key = Self::derive_key(&material);
        let nonce_bytes = Self::nonce_bytes(&material)?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let nonce = Nonce::from_slice(nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, pin.as_bytes())
            .map_err(|_| AppError::Crypto(format!("PIN encryption failed for bank {}", bank_code)))?;

        // nonce || ciphertext || tag
        let mut payload = Vec::with_capacity(GCM_NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(nonce_bytes);
        payload.extend_from_slice(&ciphertext);

        Ok(hex::encode(payload))
    }

    /// Structural inverse of `encrypt_pin`. The payload is decrypted as a
    /// unit; a truncated or tampered payload fails whole.
    pub fn decrypt_pin(&self, payload_hex: &str, bank_code: &str) -> Result<String, AppError> {
        let material = self.keys.get(bank_code)?;
        let key = Self::derive_key(&material);

        let payload = hex::decode(payload_hex)
            .map_err(|_| AppError::Crypto("Invalid hex in PIN payload".to_string()))?;

        if payload.len() < GCM_NONCE_LEN + GCM_TAG_LEN {
            return Err(AppError::Crypto("PIN payload too short".to_string()));
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let nonce = Nonce::from_slice(&payload[..GCM_NONCE_LEN]);

        let plaintext = cipher
            .decrypt(nonce, &payload[GCM_NONCE_LEN..])
            .map_err(|_| AppError::Crypto(format!("PIN decryption failed for bank {}", bank_code)))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Crypto("Invalid UTF-8 in decrypted PIN".to_string()))
    }
}
