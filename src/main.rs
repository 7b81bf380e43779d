use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;
use std::sync::Arc;

use walletcore_server::config::AppSettings;
use walletcore_server::middleware::AuthenticationGate;
use walletcore_server::routes::configure_routes;
use walletcore_server::security::bank_keys::{
    BankKeyCache, InMemoryKeyMaterialStore, KeyMaterialStore,
};
use walletcore_server::security::legacy_cipher;
use walletcore_server::security::pin_crypto::CredentialCryptoService;
use walletcore_server::services::directory::{AccountDirectory, InMemoryAccountDirectory};
use walletcore_server::services::token_service::TokenService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings
    let app_settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    // Load the master unwrap key; without it no bank key material can be
    // recovered, so startup fails hard.
    let master_key = match legacy_cipher::load_master_key(&app_settings.security.master_key_path) {
        Ok(key) => key,
        Err(e) => {
            log::error!("Failed to load master key: {}", e);
            log::error!("Cannot start server without the master unwrap key");
            std::process::exit(1);
        }
    };
    log::info!("Master unwrap key loaded successfully");

    // Derive the token signing key once from the configured secret
    let token_service = match TokenService::from_base64_secret(&app_settings.auth.jwt_secret_base64)
    {
        Ok(service) => web::Data::new(service),
        Err(e) => {
            log::error!("Failed to initialize token service: {}", e);
            log::error!("Cannot start server without working token keys");
            std::process::exit(1);
        }
    };
    log::info!("Token service initialized successfully");

    // Collaborator seams. The in-memory implementations are the development
    // seam; production deployments wire storage-backed collaborators here.
    let directory: Arc<dyn AccountDirectory> = Arc::new(InMemoryAccountDirectory::new());
    let key_store: Arc<dyn KeyMaterialStore> = Arc::new(InMemoryKeyMaterialStore::new());

    let bank_keys = Arc::new(BankKeyCache::new(key_store, master_key));
    let pin_crypto = web::Data::new(CredentialCryptoService::new(bank_keys));
    let directory_data: web::Data<dyn AccountDirectory> = web::Data::from(directory.clone());

    // Get server host and port from settings
    let host = &app_settings.server.host;
    let port = app_settings.server.port;

    log::info!("Starting server at http://{}:{}", host, port);

    let listener = TcpListener::bind(format!("{}:{}", host, port))?;

    HttpServer::new(move || {
        // Configure CORS using actix-cors
        let mut cors = Cors::default().supports_credentials();

        if app_settings.server.cors_origins.contains(&"*".to_string()) {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        cors = cors.allow_any_method().allow_any_header();

        let gate = AuthenticationGate::new(token_service.clone().into_inner(), directory.clone());

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(app_settings.clone()))
            .app_data(token_service.clone())
            .app_data(directory_data.clone())
            .app_data(pin_crypto.clone())
            .service(web::scope("/api/v1").wrap(gate).configure(configure_routes))
    })
    .listen(listener)?
    .run()
    .await
}
