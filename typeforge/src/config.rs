use std::path::PathBuf;

use derive_more::From;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server configuration: defaults, merged with an optional TOML file and
/// `TYPEFORGE_`-prefixed environment variables, in that order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret with the external authentication service.
    pub jwt_secret: String,
    /// Maximum scored daily-mode attempts per user per UTC day.
    pub daily_attempt_cap: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: "sqlite:typeforge.db?mode=rwc".to_string(),
            jwt_secret: "insecure-dev-secret".to_string(),
            daily_attempt_cap: 3,
        }
    }
}

#[derive(Debug, From, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(Box<figment::Error>),
}

impl Config {
    /// Load configuration, optionally from an explicit file path.
    ///
    /// Without a path the local `typeforge.toml` is used when present.
    /// Environment variables always win over the file.
    pub fn load(override_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let file = override_path.unwrap_or_else(|| PathBuf::from("typeforge.toml"));

        Ok(Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("TYPEFORGE_"))
            .extract()
            .map_err(Box::new)?)
    }
}
