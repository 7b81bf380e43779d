use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error, trace};

use crate::error::AppError;
use crate::models::authenticated_principal::AuthenticatedPrincipal;
use crate::models::token_claims::Claims;

/// Issues and validates the bearer tokens carrying wallet/session claims.
///
/// Tokens are self-contained, stateless capabilities: HS256 over the encoded
/// claims with a server-wide secret. The signing key is derived once from the
/// configured base64 secret and never regenerated at runtime.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn from_base64_secret(secret_b64: &str) -> Result<Self, AppError> {
        let secret = BASE64
            .decode(secret_b64)
            .map_err(|e| AppError::Configuration(format!("JWT secret is not valid base64: {}", e)))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
        })
    }

    /// Issues a token for the principal. Wallet attributes, device id and
    /// client IP are copied into the claims at issuance time.
    pub fn issue(
        &self,
        principal: &AuthenticatedPrincipal,
        device_id: Option<&str>,
        ip_address: Option<&str>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let iat = Utc::now();
        let exp = iat
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("Failed to calculate token expiration time".to_string()))?;

        let claims = Claims {
            sub: principal.mobile_number.clone(),
            exp: exp.timestamp() as usize,
            iat: iat.timestamp() as usize,
            device_id: device_id.map(|s| s.to_string()),
            ip_address: ip_address.map(|s| s.to_string()),
            wallet_number: principal.wallet_number.clone(),
            bank_code: principal.bank_code.clone(),
            client_code: principal.client_code.clone(),
        };

        let header = Header::new(Algorithm::HS256);

        debug!("Issuing token for subject {} (exp: {})", principal.mobile_number, exp);
        encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to issue token: {}", e);
            AppError::Internal(format!("Token generation failed: {}", e))
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation
    }

    /// Parses and verifies the MAC, expiry and subject. Fails closed: any
    /// parse, signature or format error is `None`, never a panic.
    fn decode_claims(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &Self::validation()) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                trace!("Token rejected: {:?}", err.kind());
                None
            }
        }
    }

    /// Signature valid, not expired, non-empty subject.
    pub fn is_structurally_valid(&self, token: &str) -> bool {
        match self.decode_claims(token) {
            Some(claims) => !claims.sub.is_empty(),
            None => false,
        }
    }

    /// Subject equality against the principal identity plus an expiry
    /// re-check (the decode re-validates `exp`).
    pub fn matches_principal(&self, token: &str, principal: &AuthenticatedPrincipal) -> bool {
        match self.decode_claims(token) {
            Some(claims) => claims.sub == principal.mobile_number,
            None => false,
        }
    }

    /// Extracts the subject (mobile number) from a valid token.
    pub fn subject(&self, token: &str) -> Option<String> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// Generic claim accessor for callers needing individual claims
    /// (`deviceId`, `walletNumber`, `bankCode`, `clientCode`, `ipAddress`).
    pub fn extract_claim(&self, token: &str, claim_name: &str) -> Option<String> {
        let data = decode::<serde_json::Value>(token, &self.decoding_key, &Self::validation()).ok()?;
        data.claims
            .get(claim_name)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Decodes the full claim set for request-context binding.
    pub fn claims(&self, token: &str) -> Option<Claims> {
        self.decode_claims(token)
    }
}
