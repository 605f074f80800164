//! Transport trait and SMTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::{self, AsyncSmtpTransportBuilder};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::TransportError;
use crate::profile::{ConnectionProperties, TlsMode};

/// Delivers a fully built message.
///
/// One transport is shared by every concurrent send on its profile, so
/// implementations must not keep per-call mutable state. Implement this
/// trait to provide alternative backends (e.g., SES, Mailgun).
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, message: Message) -> Result<(), TransportError>;
}

/// SMTP transport using lettre. Connections are opened lazily per send.
#[derive(Clone)]
pub struct SmtpTransport {
    inner: Relay,
}

type Relay = AsyncSmtpTransport<Tokio1Executor>;

impl TlsMode {
    /// Relay builder for `host` secured according to this mode.
    fn relay(self, host: &str) -> Result<AsyncSmtpTransportBuilder, smtp::Error> {
        match self {
            TlsMode::None => Ok(Relay::builder_dangerous(host)),
            TlsMode::Tls => Relay::relay(host),
            TlsMode::StartTls => Relay::starttls_relay(host),
        }
    }
}

impl SmtpTransport {
    pub fn from_properties(properties: &ConnectionProperties) -> Result<Self, TransportError> {
        let timeout = Duration::from_secs(properties.timeout);
        let mut relay = properties
            .tls
            .relay(&properties.host)?
            .port(properties.port)
            .timeout(Some(timeout));

        if let (Some(user), Some(password)) = (&properties.username, &properties.password) {
            let credentials = Credentials::new(user.clone(), password.clone());
            relay = relay.credentials(credentials);
        }

        Ok(Self {
            inner: relay.build(),
        })
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        self.inner.send(message).await?;
        Ok(())
    }
}
