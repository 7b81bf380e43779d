use serde::{Deserialize, Serialize};

/// JWT claims structure that will be encoded/decoded for authentication.
///
/// Claim names on the wire match the legacy contract exactly
/// (`deviceId`, `ipAddress`, `walletNumber`, `bankCode`, `clientCode`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (mobile number)
    pub sub: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
    /// Device identifier the token was issued to (optional)
    #[serde(rename = "deviceId", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Client IP at issuance time (optional)
    #[serde(rename = "ipAddress", skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Wallet number copied from the account at issuance time (optional)
    #[serde(rename = "walletNumber", skip_serializing_if = "Option::is_none")]
    pub wallet_number: Option<String>,
    /// Institution code copied from the account at issuance time (optional)
    #[serde(rename = "bankCode", skip_serializing_if = "Option::is_none")]
    pub bank_code: Option<String>,
    /// Client code copied from the account at issuance time (optional)
    #[serde(rename = "clientCode", skip_serializing_if = "Option::is_none")]
    pub client_code: Option<String>,
}
