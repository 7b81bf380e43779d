use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::models::wallet_account::WalletAccount;

/// Identity and authorization attributes bound to a request after successful
/// authentication. Built fresh per request from the account record and never
/// persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    pub mobile_number: String,
    pub wallet_number: Option<String>,
    pub bank_code: Option<String>,
    pub client_code: Option<String>,
    pub blocked: bool,
    pub role: String,
}

impl AuthenticatedPrincipal {
    pub fn from_account(account: &WalletAccount) -> Self {
        Self {
            mobile_number: account.mobile_number.clone(),
            wallet_number: account.wallet_number.clone(),
            bank_code: account.bank_code.clone(),
            client_code: account.client_code.clone(),
            blocked: account.blocked,
            role: account.role.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.blocked
    }
}

impl FromRequest for AuthenticatedPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(principal) = req.extensions().get::<AuthenticatedPrincipal>() {
            ready(Ok(principal.clone()))
        } else {
            ready(Err(actix_web::error::ErrorUnauthorized("Not authenticated")))
        }
    }
}
