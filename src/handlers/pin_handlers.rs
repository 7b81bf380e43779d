use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::AuthenticatedPrincipal;
use crate::security::pin_crypto::CredentialCryptoService;
use crate::security::toolkit;

#[derive(Debug, Deserialize)]
pub struct EncryptPinRequest {
    pub pin: String,
}

/// Encrypts a PIN under the caller's institution key for onward delivery to
/// the legacy switch. The payload is opaque to the channel; this service
/// never stores it.
pub async fn encrypt_pin(
    principal: AuthenticatedPrincipal,
    body: web::Json<EncryptPinRequest>,
    crypto: web::Data<CredentialCryptoService>,
) -> Result<HttpResponse, AppError> {
    if !toolkit::is_valid_pin(&body.pin) {
        return Err(AppError::Validation(
            "PIN must be 4-6 digits and not a trivial sequence".to_string(),
        ));
    }

    let bank_code = principal
        .bank_code
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Account has no institution code".to_string()))?;

    let encrypted_pin = crypto.encrypt_pin(&body.pin, bank_code)?;

    info!(
        "Encrypted PIN payload for {} (bank {}), request {}",
        principal.mobile_number,
        bank_code,
        toolkit::generate_request_id()
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "encrypted_pin": encrypted_pin,
    })))
}
