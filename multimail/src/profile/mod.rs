//! Named mail profiles: connection settings plus a ready transport.

mod registry;

pub use registry::{ProfileRegistry, ProfileRegistryBuilder};

use std::fmt;
use std::sync::Arc;

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

use crate::mail::Transport;

/// Name of the profile used when nothing else is configured.
pub const DEFAULT_PROFILE: &str = "default";

/// TLS mode for the SMTP connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    #[default]
    StartTls,
    Tls,
    None,
}

/// Connection settings of one outbound account.
#[derive(Clone, Deserialize)]
pub struct ConnectionProperties {
    /// SMTP server hostname.
    pub host: String,

    /// SMTP server port (default: 587).
    #[serde(default = "default_port")]
    pub port: u16,

    /// SMTP username for authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password for authentication.
    #[serde(default)]
    pub password: Option<String>,

    /// Sender address. Falls back to the username when unset.
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub tls: TlsMode,

    /// Connection timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_port() -> u16 {
    587
}

fn default_timeout() -> u64 {
    10
}

impl ConnectionProperties {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: None,
            password: None,
            from: None,
            tls: TlsMode::default(),
            timeout: default_timeout(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Explicit sender address.
    pub fn sender(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    pub fn tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    /// The configured sender address, or the username if none is set.
    pub fn sender_address(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}

impl fmt::Debug for ConnectionProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProperties")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("tls", &self.tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One registered profile. Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct Profile {
    name: String,
    properties: ConnectionProperties,
    sender: Mailbox,
    transport: Arc<dyn Transport>,
}

impl Profile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &ConnectionProperties {
        &self.properties
    }

    /// Parsed sender mailbox, used as the `From` of every message.
    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("sender", &self.sender.to_string())
            .finish_non_exhaustive()
    }
}
