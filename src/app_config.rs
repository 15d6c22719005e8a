//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with TAQYEEM_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets (the admin shared secret, the fingerprint salt) should be kept in
//! environment variables, not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::constants;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Identity hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Salt mixed into IP / user-agent fingerprints.
    /// Changing it invalidates all stored fingerprints.
    /// Should come from env var TAQYEEM_IDENTITY__HASH_SALT.
    pub hash_salt: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            hash_salt: "taqyeem-dev-salt".to_string(),
        }
    }
}

/// Admin authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret for the admin Authorization header.
    /// Empty disables the admin surface entirely.
    /// Should come from env var TAQYEEM_ADMIN__SECRET.
    pub secret: String,
}

/// Moderation policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub max_reviews_per_user_day: u64,
    pub max_reviews_per_ip_hour: u64,
    pub brigade_threshold: u64,
    pub brigade_window_secs: i64,
    pub report_escalation_threshold: u64,
    pub max_bulk_action_ids: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            max_reviews_per_user_day: constants::MAX_REVIEWS_PER_USER_DAY,
            max_reviews_per_ip_hour: constants::MAX_REVIEWS_PER_IP_HOUR,
            brigade_threshold: constants::BRIGADE_THRESHOLD,
            brigade_window_secs: constants::BRIGADE_WINDOW_SECS,
            report_escalation_threshold: constants::REPORT_ESCALATION_THRESHOLD,
            max_bulk_action_ids: constants::MAX_BULK_ACTION_IDS,
        }
    }
}

/// In-process throttle configuration (coarse infrastructure gate, distinct
/// from the store-backed per-user/per-IP limits)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub submission_max: usize,
    pub submission_window_seconds: u64,
    pub report_max: usize,
    pub report_window_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            submission_max: 20,
            submission_window_seconds: 60,
            report_max: 5,
            report_window_seconds: 300,
            cleanup_interval_seconds: 300,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub admin: AdminConfig,
    pub moderation: ModerationConfig,
    pub throttle: ThrottleConfig,
}

impl AppConfig {
    /// Load configuration from config.toml and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific file basename
    pub fn load_from(name: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix("TAQYEEM").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

/// Initialize configuration at startup (forces the lazy load so problems
/// surface early)
pub fn init() {
    let config = APP_CONFIG.read().expect("Config lock poisoned");
    log::info!(
        "Configuration loaded: bind={} daily_cap={} ip_cap={}",
        config.server.bind_address,
        config.moderation.max_reviews_per_user_day,
        config.moderation.max_reviews_per_ip_hour
    );
}

/// Snapshot of the current configuration
pub fn get() -> AppConfig {
    APP_CONFIG.read().expect("Config lock poisoned").clone()
}
