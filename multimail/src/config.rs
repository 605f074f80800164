//! Environment-based configuration of mail profiles.
//!
//! Nested keys are separated by a double underscore, so a profile named
//! `office365` under the `MAIL` prefix is configured with:
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `MAIL__DEFAULT_PROFILE` | No | Name of the default profile (default: `default`) |
//! | `MAIL__CONCURRENCY` | No | Concurrent sends (default: 4) |
//! | `MAIL__PROFILES__OFFICE365__HOST` | Yes | SMTP server hostname |
//! | `MAIL__PROFILES__OFFICE365__PORT` | No | Port (default: 587) |
//! | `MAIL__PROFILES__OFFICE365__USERNAME` | No | Username for authentication |
//! | `MAIL__PROFILES__OFFICE365__PASSWORD` | No | Password for authentication |
//! | `MAIL__PROFILES__OFFICE365__FROM` | No | Sender address (default: username) |
//! | `MAIL__PROFILES__OFFICE365__TLS` | No | `starttls` (default), `tls`, or `none` |
//!
//! Environment keys are lowercased, so profile names read this way are
//! lowercase too.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

pub use config::ConfigError;

use crate::profile::{ConnectionProperties, DEFAULT_PROFILE};

const SEPARATOR: &str = "__";

pub trait EnvConfig: Sized {
    fn from_env() -> Result<Self, ConfigError>;
    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError>;
}

impl<D> EnvConfig for D
where
    D: DeserializeOwned,
{
    fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::Environment::default().separator(SEPARATOR))
            .build()?
            .try_deserialize()
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator(SEPARATOR)
                    .separator(SEPARATOR),
            )
            .build()?
            .try_deserialize()
    }
}

/// Every configured profile plus dispatch settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    /// Profile used when a call does not name one.
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// Maximum number of sends in flight (default: 4).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub profiles: HashMap<String, ConnectionProperties>,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            concurrency: default_concurrency(),
            profiles: HashMap::new(),
        }
    }
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_concurrency() -> usize {
    4
}
