use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Duration;
use log::{info, warn};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::config::AppSettings;
use crate::error::AppError;
use crate::middleware::request_binding::extract_client_ip;
use crate::models::AuthenticatedPrincipal;
use crate::security::legacy_hash;
use crate::services::directory::AccountDirectory;
use crate::services::token_service::TokenService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub mobile_number: String,
    pub pin: String,
    pub device_id: Option<String>,
}

/// Exchanges mobile number + PIN for a bearer token.
///
/// PIN verification runs against the stored legacy digest keyed by the
/// account's mobile number. Lookup and verification failures share one
/// response so the endpoint does not leak which part failed.
pub async fn login(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    directory: web::Data<dyn AccountDirectory>,
    tokens: web::Data<TokenService>,
    settings: web::Data<AppSettings>,
) -> Result<HttpResponse, AppError> {
    let account = directory
        .find_by_mobile(&body.mobile_number)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid mobile number or PIN".to_string()))?;

    if account.blocked {
        warn!("Login attempt for blocked account {}", account.mobile_number);
        return Err(AppError::Forbidden("Account is blocked".to_string()));
    }

    let stored_digest = account
        .pin_digest
        .as_deref()
        .ok_or_else(|| AppError::Auth("No PIN set for this account".to_string()))?;

    let presented = legacy_hash::hash_pin(&body.pin, &account.mobile_number);
    let pin_matches: bool = presented.as_bytes().ct_eq(stored_digest.as_bytes()).into();
    if !pin_matches {
        warn!("PIN verification failed for {}", account.mobile_number);
        return Err(AppError::Auth("Invalid mobile number or PIN".to_string()));
    }

    let principal = AuthenticatedPrincipal::from_account(&account);
    let client_ip = extract_client_ip(&req);
    let ttl = Duration::minutes(settings.auth.token_ttl_minutes);

    let token = tokens.issue(&principal, body.device_id.as_deref(), Some(&client_ip), ttl)?;

    info!("Issued token for {}", principal.mobile_number);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": token,
        "expires_in": ttl.num_seconds(),
    })))
}

/// Echoes the principal bound by the authentication gate.
pub async fn session(principal: AuthenticatedPrincipal) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "mobile_number": principal.mobile_number,
        "wallet_number": principal.wallet_number,
        "bank_code": principal.bank_code,
        "client_code": principal.client_code,
        "role": principal.role,
    })))
}
