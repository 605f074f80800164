//! Outbound mail through several independently configured profiles.
//!
//! A process registers named profiles (server, credentials, sender) in a
//! [`ProfileRegistry`] once at startup. Each send names the profile it wants,
//! or none for the default one, and the selection holds for the dynamic
//! extent of that call only:
//!
//! ```ignore
//! let settings = MailSettings::from_env_with_prefix("MAIL")?;
//! let template = MailTemplate::from_settings(&settings)?;
//!
//! template.send_simple(&SimpleMessageRequest::new("abc@qq.com", "Hi", "Body")).await?;
//! template
//!     .interceptor()
//!     .intercept(Some("office365"), async {
//!         let request = MimeMessageRequest::new("abc@qq.com", "Hi", "<p>Body</p>");
//!         template.send_mime(&request, None).await
//!     })
//!     .await?;
//! ```
//!
//! The actual send runs on a [`DispatchExecutor`] task that inherits the
//! caller's [`AttributeBundle`]; the caller waits for it to finish.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod intercept;
pub mod mail;
pub mod profile;

pub use config::{EnvConfig, MailSettings};
pub use context::AttributeBundle;
pub use dispatch::{DispatchExecutor, DispatchHandle, DispatchUnit};
pub use error::{FieldError, MailError, ProfileError, TransportError, ValidationErrors};
pub use intercept::ProfileInterceptor;
pub use mail::{
    MailTemplate, MemoryTransport, MimeMessageRequest, SentMessage, SimpleMessageRequest,
    SmtpTransport, Transport, UploadedFile, Validate,
};
pub use profile::{ConnectionProperties, Profile, ProfileRegistry, TlsMode, DEFAULT_PROFILE};
