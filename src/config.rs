//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. The store backend is
//! selected with `STORE_BACKEND`; the hosted backend additionally needs its
//! project URL and API key.

use std::env;
use std::time::Duration;

/// Default duration of the claim count-up animation.
pub const DEFAULT_CLAIM_ANIMATION_MS: u64 = 800;

/// Which data-access backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Hosted PostgREST project (Supabase).
    Supabase,
    /// In-process tables; data is lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Data-access backend
    pub store_backend: StoreBackend,
    /// PostgREST project URL (e.g. `https://xyz.supabase.co`)
    pub supabase_url: Option<String>,
    /// How long a claim animates before the transfer commits
    pub claim_animation: Duration,

    // --- Secrets ---
    /// PostgREST API key
    pub supabase_key: Option<String>,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        let supabase_url = env::var("SUPABASE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string());
        let supabase_key = env::var("SUPABASE_KEY").ok().map(|v| v.trim().to_string());

        if store_backend == StoreBackend::Supabase {
            if supabase_url.is_none() {
                return Err(ConfigError::Missing("SUPABASE_URL"));
            }
            if supabase_key.is_none() {
                return Err(ConfigError::Missing("SUPABASE_KEY"));
            }
        }

        let claim_ms = match env::var("CLAIM_ANIMATION_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("CLAIM_ANIMATION_MS", raw))?,
            Err(_) => DEFAULT_CLAIM_ANIMATION_MS,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            supabase_url,
            claim_animation: Duration::from_millis(claim_ms),
            supabase_key,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests: in-memory store and an instant claim animation.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            supabase_url: None,
            claim_animation: Duration::ZERO,
            supabase_key: None,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("CLAIM_ANIMATION_MS", "250");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.claim_animation, Duration::from_millis(250));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("Supabase".parse::<StoreBackend>().unwrap(), StoreBackend::Supabase);
        assert_eq!(" memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!(matches!(
            "firestore".parse::<StoreBackend>(),
            Err(ConfigError::Invalid("STORE_BACKEND", _))
        ));
    }
}
