use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, info, warn};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::middleware::rejection::AuthRejection;
use crate::middleware::request_binding::validate_device_binding;
use crate::models::authenticated_principal::AuthenticatedPrincipal;
use crate::services::directory::AccountDirectory;
use crate::services::token_service::TokenService;

/// Paths served without authentication. The auth endpoints match by prefix;
/// the remaining entries match exactly.
const OPEN_PATH_PREFIX: &str = "/api/v1/auth/";
const OPEN_PATHS: [&str; 3] = [
    "/api/v1/wallets/secret-question",
    "/api/v1/otp/verify",
    "/api/v1/customers/register",
];

fn is_open_path(path: &str) -> bool {
    path.starts_with(OPEN_PATH_PREFIX) || OPEN_PATHS.contains(&path)
}

/// Extracts the candidate bearer token, trying transport locations in strict
/// priority order; the first location that yields a value wins.
pub fn extract_token(req: &ServiceRequest) -> Option<String> {
    // 1. Authorization: Bearer <token>
    if let Some(header) = req.headers().get("authorization") {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    // 2. X-Auth-Token: raw value, no prefix
    if let Some(header) = req.headers().get("x-auth-token") {
        if let Ok(value) = header.to_str() {
            return Some(value.to_string());
        }
    }

    // 3. X-Bearer-Token: the Bearer prefix is required; a bare value in this
    //    header is not accepted.
    if let Some(header) = req.headers().get("x-bearer-token") {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    // 4. X-JWT: raw value
    if let Some(header) = req.headers().get("x-jwt") {
        if let Ok(value) = header.to_str() {
            return Some(value.to_string());
        }
    }

    // 5. access_token query parameter
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(name, _)| name == "access_token")
        .map(|(_, value)| value.into_owned())
}

struct GateInner {
    tokens: Arc<TokenService>,
    directory: Arc<dyn AccountDirectory>,
    enforce_device_binding: bool,
}

/// Ordered validation pipeline. Every step either continues or returns a
/// terminal rejection; the first rejection wins and no further steps run.
/// Unexpected collaborator failures are downgraded to a 401 rejection with
/// the cause embedded; the gate never answers 5xx.
async fn authenticate(gate: &GateInner, req: &ServiceRequest) -> Result<(), AuthRejection> {
    let token = extract_token(req).ok_or(AuthRejection::MissingToken)?;

    if !gate.tokens.is_structurally_valid(&token) {
        return Err(AuthRejection::InvalidToken);
    }
    let claims = gate.tokens.claims(&token).ok_or(AuthRejection::InvalidToken)?;

    let account = gate
        .directory
        .find_by_mobile(&claims.sub)
        .await
        .map_err(|e| AuthRejection::Unexpected(e.to_string()))?
        .ok_or(AuthRejection::AccountNotFound)?;

    let principal = AuthenticatedPrincipal::from_account(&account);

    if !principal.is_enabled() {
        warn!("Blocked account {} attempted access to {}", claims.sub, req.path());
        return Err(AuthRejection::AccountBlocked);
    }

    if !gate.tokens.matches_principal(&token, &principal) {
        return Err(AuthRejection::SubjectMismatch);
    }

    if gate.enforce_device_binding {
        validate_device_binding(req, &claims)?;
    }

    debug!(
        "Authenticated {} (wallet: {:?}, bank: {:?}) for {}",
        principal.mobile_number,
        principal.wallet_number,
        principal.bank_code,
        req.path()
    );

    // Bind the principal and the decoded claims for downstream handlers.
    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(principal);

    Ok(())
}

/// Per-request authentication middleware: allow-list check, multi-source
/// token extraction, token validation, account resolution, block check and
/// principal binding.
pub struct AuthenticationGate {
    inner: Arc<GateInner>,
}

impl AuthenticationGate {
    pub fn new(tokens: Arc<TokenService>, directory: Arc<dyn AccountDirectory>) -> Self {
        Self {
            inner: Arc::new(GateInner {
                tokens,
                directory,
                enforce_device_binding: false,
            }),
        }
    }

    /// Variant that additionally compares the token's device claim against
    /// the caller's device header (soft binding).
    pub fn with_device_binding(
        tokens: Arc<TokenService>,
        directory: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            inner: Arc::new(GateInner {
                tokens,
                directory,
                enforce_device_binding: true,
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthenticationGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthenticationGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationGateMiddleware {
            service: Rc::new(service),
            inner: self.inner.clone(),
        })
    }
}

pub struct AuthenticationGateMiddleware<S> {
    service: Rc<S>,
    inner: Arc<GateInner>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let inner = self.inner.clone();

        Box::pin(async move {
            let path = req.path().to_string();

            // CORS preflight never authenticates
            if req.method() == actix_web::http::Method::OPTIONS {
                debug!("Skipping authentication for OPTIONS request to: {}", path);
                return service.call(req).await;
            }

            if is_open_path(&path) {
                debug!("Open path, skipping authentication: {}", path);
                return service.call(req).await;
            }

            match authenticate(&inner, &req).await {
                Ok(()) => {
                    info!("Authentication successful for path: {}", path);
                    service.call(req).await
                }
                Err(rejection) => {
                    warn!(
                        "Authentication rejected for path {}: {}",
                        path,
                        rejection.message()
                    );
                    Err(rejection.into_error())
                }
            }
        })
    }
}
