use actix_web::web;

use crate::handlers;

/// Routes mounted under the "/api/v1" scope. The authentication gate wraps
/// the whole scope in main.rs; its allow-list passes the auth endpoints
/// through unauthenticated.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(handlers::auth_handlers::login)),
    );

    cfg.route("/session", web::get().to(handlers::auth_handlers::session));

    cfg.service(
        web::scope("/pins")
            .route("/encrypt", web::post().to(handlers::pin_handlers::encrypt_pin)),
    );
}
