//! # rb-config
//!
//! Layered settings for the Rusty-Blog binary: built-in defaults, then an
//! optional `rusty-blog.toml`, then `RUSTY_BLOG__*` environment variables
//! (the binary loads `.env` into the environment before calling
//! `Settings::load`).
//!
//! ```text
//! RUSTY_BLOG__SERVER__PORT=9000
//! RUSTY_BLOG__DATABASE__URL=sqlite:blog.db?mode=rwc
//! RUSTY_BLOG__SESSION__KEY=<at least 64 bytes>
//! ```

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "RUSTY_BLOG";
pub const CONFIG_FILE: &str = "rusty-blog";
pub const SESSION_KEY_MIN_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("session.key too short: need >= {min_len} bytes, got {length}")]
    SessionKeyTooShort { length: usize, min_len: usize },

    #[error("session.idle_timeout_minutes must be greater than zero")]
    ZeroIdleTimeout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Signing/encryption key for the session cookie. When absent the
    /// binary generates an ephemeral one, so sessions die with the process.
    pub key: Option<SecretString>,
    pub idle_timeout_minutes: u32,
    pub cookie_secure: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Self::defaults()?
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("__")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:rusty_blog.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("session.idle_timeout_minutes", 30)?
            .set_default("session.cookie_secure", false)?)
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.session.key {
            let length = key.expose_secret().len();
            if length < SESSION_KEY_MIN_LEN {
                return Err(ConfigError::SessionKeyTooShort {
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
        }
        if self.session.idle_timeout_minutes == 0 {
            return Err(ConfigError::ZeroIdleTimeout);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
