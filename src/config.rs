use std::env;
use std::path::PathBuf;

use axum::http::HeaderValue;

use crate::error::{AppError, AppResult};

/// AppConfig
///
/// Immutable runtime configuration, loaded once at startup and shared via
/// `FromRef` like every other piece of application state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and defaults.
    pub env: Env,
    // Base URL of the collaborating REST API, without trailing slash.
    pub api_base_url: String,
    // JSON file backing the durable client store (session, disclaimer flag).
    pub storage_path: PathBuf,
    // Address the portal listens on.
    pub bind_addr: String,
    // `limit` passed when listing enquiries.
    pub enquiry_limit: u32,
    // Confirm sub-admin tokens with the API on every protected entry.
    pub revalidate_sessions: bool,
    // The one browser origin allowed cross-origin access. None allows none.
    pub allowed_origin: Option<HeaderValue>,
}

/// Env
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe values for test state scaffolding; no environment access.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: "http://localhost:5000".to_string(),
            storage_path: PathBuf::from("portal-store.json"),
            bind_addr: "127.0.0.1:3000".to_string(),
            enquiry_limit: 1000,
            revalidate_sessions: false,
            allowed_origin: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from the environment. Production refuses to
    /// start without an explicit `API_BASE_URL`, and sub-admin sessions are
    /// revalidated there unless `REVALIDATE_SESSIONS` says otherwise.
    pub fn load() -> AppResult<Self> {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };
        let defaults = Self::default();

        let api_base_url = match env {
            Env::Production => env::var("API_BASE_URL").map_err(|_| {
                AppError::Config("FATAL: API_BASE_URL must be set in production.".to_string())
            })?,
            Env::Local => env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
        };
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "API_BASE_URL must be an http(s) URL, got '{}'",
                api_base_url
            )));
        }

        let enquiry_limit = match env::var("ENQUIRY_LIMIT") {
            Ok(raw) => raw.parse::<u32>().map_err(|_| {
                AppError::Config(format!("ENQUIRY_LIMIT must be a positive integer, got '{}'", raw))
            })?,
            Err(_) => defaults.enquiry_limit,
        };

        let revalidate_sessions = match env::var("REVALIDATE_SESSIONS") {
            Ok(raw) => matches!(raw.trim(), "1" | "true" | "yes"),
            Err(_) => env == Env::Production,
        };

        let allowed_origin = match env::var("PORTAL_ALLOWED_ORIGIN") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => Some(HeaderValue::from_str(raw.trim()).map_err(|_| {
                AppError::Config(format!("PORTAL_ALLOWED_ORIGIN is not a valid origin, got '{}'", raw))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            env,
            api_base_url,
            storage_path: env::var("PORTAL_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            bind_addr: env::var("PORTAL_BIND_ADDR").unwrap_or(defaults.bind_addr),
            enquiry_limit,
            revalidate_sessions,
            allowed_origin,
        })
    }
}
