use serde::{Deserialize, Serialize};

/// Account record as returned by the external account directory.
///
/// Storage and query logic over these records live with the directory
/// collaborator; this crate only reads them to resolve a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    pub mobile_number: String,
    pub wallet_number: Option<String>,
    pub bank_code: Option<String>,
    pub client_code: Option<String>,
    pub blocked: bool,
    /// Raw legacy status code, carried untouched. The blocked flag is the
    /// single authority for gating; callers needing the status-code semantics
    /// re-derive them from this field.
    pub status_code: Option<String>,
    /// Stored legacy PIN digest (see `security::legacy_hash`).
    pub pin_digest: Option<String>,
    pub role: String,
}
