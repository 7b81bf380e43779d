use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::security::legacy_cipher;

/// Decrypted key material for one institution. Immutable for the life of the
/// process once computed; there is no rotation path.
#[derive(Debug, Clone)]
pub struct BankKeyMaterial {
    pub bank_code: String,
    pub secret_key: String,
    pub iv: String,
}

/// Encrypted secret-key/IV pair as stored for a bank. Both fields require
/// `legacy_cipher::decrypt` before use.
#[derive(Debug, Clone)]
pub struct EncryptedBankKeys {
    pub secret_key_ciphertext: String,
    pub iv_ciphertext: String,
}

/// External key-material store collaborator.
pub trait KeyMaterialStore: Send + Sync {
    fn encrypted_keys_for(&self, bank_code: &str) -> AppResult<Option<EncryptedBankKeys>>;
}

/// In-memory store used as the development and test seam. A production
/// deployment supplies its own implementation backed by real storage.
#[derive(Default)]
pub struct InMemoryKeyMaterialStore {
    entries: DashMap<String, EncryptedBankKeys>,
}

impl InMemoryKeyMaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bank_code: &str, keys: EncryptedBankKeys) {
        self.entries.insert(bank_code.to_string(), keys);
    }
}

impl KeyMaterialStore for InMemoryKeyMaterialStore {
    fn encrypted_keys_for(&self, bank_code: &str) -> AppResult<Option<EncryptedBankKeys>> {
        Ok(self.entries.get(bank_code).map(|e| e.value().clone()))
    }
}

/// Process-wide cache of decrypted per-bank key material.
///
/// Concurrent first misses for the same bank code may both unwrap and insert;
/// the unwrap is a deterministic function of the stored ciphertext and the
/// fixed master key, so both writers produce identical bytes and last write
/// wins. No lock, no eviction, no TTL.
pub struct BankKeyCache {
    store: Arc<dyn KeyMaterialStore>,
    master_key: Vec<u8>,
    entries: DashMap<String, BankKeyMaterial>,
}

impl BankKeyCache {
    pub fn new(store: Arc<dyn KeyMaterialStore>, master_key: Vec<u8>) -> Self {
        Self {
            store,
            master_key,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, bank_code: &str) -> AppResult<BankKeyMaterial> {
        if let Some(material) = self.entries.get(bank_code) {
            debug!("Bank key cache hit for {}", bank_code);
            return Ok(material.value().clone());
        }

        let encrypted = self
            .store
            .encrypted_keys_for(bank_code)?
            .ok_or_else(|| AppError::Crypto(format!("No key material stored for bank {}", bank_code)))?;

        let secret_key = legacy_cipher::decrypt(&encrypted.secret_key_ciphertext, &self.master_key)?;
        let iv = legacy_cipher::decrypt(&encrypted.iv_ciphertext, &self.master_key)?;

        let material = BankKeyMaterial {
            bank_code: bank_code.to_string(),
            secret_key,
            iv,
        };

        self.entries.insert(bank_code.to_string(), material.clone());
        info!("Bank key material cached for {}", bank_code);

        Ok(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::legacy_cipher::encrypt;

    const MASTER_KEY: &[u8] = b"unit-test-master-key-material";

    fn store_with_bank(bank_code: &str, secret_key: &str, iv: &str) -> Arc<InMemoryKeyMaterialStore> {
        let store = Arc::new(InMemoryKeyMaterialStore::new());
        store.insert(
            bank_code,
            EncryptedBankKeys {
                secret_key_ciphertext: encrypt(secret_key, MASTER_KEY),
                iv_ciphertext: encrypt(iv, MASTER_KEY),
            },
        );
        store
    }

    #[test]
    fn test_get_unwraps_and_caches() {
        let store = store_with_bank("044", "per-bank-secret", "nonce-bytes!");
        let cache = BankKeyCache::new(store, MASTER_KEY.to_vec());

        let material = cache.get("044").unwrap();
        assert_eq!(material.bank_code, "044");
        assert_eq!(material.secret_key, "per-bank-secret");
        assert_eq!(material.iv, "nonce-bytes!");

        // Second call is served from the cache entry.
        let again = cache.get("044").unwrap();
        assert_eq!(again.secret_key, material.secret_key);
    }

    #[test]
    fn test_get_unknown_bank_is_crypto_error() {
        let store = Arc::new(InMemoryKeyMaterialStore::new());
        let cache = BankKeyCache::new(store, MASTER_KEY.to_vec());
        assert!(matches!(cache.get("999"), Err(AppError::Crypto(_))));
    }

    #[test]
    fn test_failure_for_one_bank_does_not_poison_others() {
        let store = store_with_bank("044", "per-bank-secret", "nonce-bytes!");
        store.insert(
            "057",
            EncryptedBankKeys {
                secret_key_ciphertext: "garbage".to_string(),
                iv_ciphertext: "garbage".to_string(),
            },
        );
        let cache = BankKeyCache::new(store, MASTER_KEY.to_vec());

        assert!(cache.get("057").is_err());
        assert!(cache.get("044").is_ok());
    }
}
