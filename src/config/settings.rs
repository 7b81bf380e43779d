use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base64-encoded HS256 signing secret. Decoded once at startup.
    pub jwt_secret_base64: String,
    pub token_ttl_minutes: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Path to the master key blob used to unwrap per-bank key material.
    pub master_key_path: String,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        // App config
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "walletcore".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Server config
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a valid port number".to_string()))?;

        // CORS origins
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        // Auth config
        let jwt_secret_base64 = env::var("JWT_SECRET_BASE64")
            .map_err(|_| AppError::Configuration("JWT_SECRET_BASE64 must be set".to_string()))?;

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .map_err(|_| AppError::Configuration("TOKEN_TTL_MINUTES must be a valid number".to_string()))?;

        if token_ttl_minutes <= 0 {
            return Err(AppError::Configuration(
                "TOKEN_TTL_MINUTES must be positive".to_string(),
            ));
        }

        // Security config
        let master_key_path = env::var("MASTER_KEY_PATH")
            .map_err(|_| AppError::Configuration("MASTER_KEY_PATH must be set".to_string()))?;

        Ok(Self {
            app: AppConfig {
                name: app_name,
                environment,
            },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            auth: AuthConfig {
                jwt_secret_base64,
                token_ttl_minutes,
            },
            security: SecurityConfig { master_key_path },
        })
    }
}
