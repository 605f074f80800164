//! The send operations callers use.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MessageBuilder, MultiPart, SinglePart};
use lettre::Message;
use serde::Serialize;
use time::PrimitiveDateTime;

use super::validate::Validate;
use super::{MimeMessageRequest, SimpleMessageRequest, UploadedFile};
use crate::config::MailSettings;
use crate::context;
use crate::dispatch::{DispatchExecutor, DispatchUnit};
use crate::error::{MailError, ProfileError, TransportError};
use crate::intercept::ProfileInterceptor;
use crate::profile::{Profile, ProfileRegistry};

/// Builds messages and sends them through the profile selected for the
/// current call, falling back to the default profile.
///
/// Validation and profile errors are returned. Transport failures are logged
/// together with the request and swallowed: the send is best-effort and the
/// caller continues normally.
///
/// ```ignore
/// let template = MailTemplate::from_settings(&MailSettings::from_env_with_prefix("MAIL")?)?;
///
/// // default profile
/// template.send_simple(&SimpleMessageRequest::new("abc@qq.com", "Hi", "Body")).await?;
///
/// // named profile for this call only
/// let request = MimeMessageRequest::new("abc@qq.com", "Hi", "<p>Body</p>");
/// template.send_mime_with(Some("office365"), &request, None).await?;
/// ```
#[derive(Clone)]
pub struct MailTemplate {
    registry: Arc<ProfileRegistry>,
    executor: DispatchExecutor,
    interceptor: ProfileInterceptor,
}

impl MailTemplate {
    pub fn new(registry: Arc<ProfileRegistry>, executor: DispatchExecutor) -> Self {
        let interceptor = ProfileInterceptor::new(registry.clone());
        Self {
            registry,
            executor,
            interceptor,
        }
    }

    /// Build SMTP transports for every configured profile.
    pub fn from_settings(settings: &MailSettings) -> Result<Self, MailError> {
        let registry = ProfileRegistry::from_settings(settings)?;
        Ok(Self::new(
            Arc::new(registry),
            DispatchExecutor::with_concurrency(settings.concurrency),
        ))
    }

    pub fn registry(&self) -> &Arc<ProfileRegistry> {
        &self.registry
    }

    pub fn executor(&self) -> &DispatchExecutor {
        &self.executor
    }

    /// Interceptor bound to this template's registry, for wrapping caller
    /// operations that send through the template.
    pub fn interceptor(&self) -> &ProfileInterceptor {
        &self.interceptor
    }

    /// The profile in effect for the current task.
    pub fn effective_profile(&self) -> Result<&Profile, ProfileError> {
        self.registry
            .resolve_or_default(context::current_profile().as_deref())
    }

    /// Send a plain text message.
    pub async fn send_simple(&self, request: &SimpleMessageRequest) -> Result<(), MailError> {
        request.validate()?;
        let profile = self.effective_profile()?;
        tracing::info!(profile = profile.name(), to = %request.to, "sending simple message");

        let outcome = match build_simple(profile, request) {
            Ok(message) => self.dispatch(profile, message).await,
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            tracing::error!(
                profile = profile.name(),
                request = %payload(request),
                error = %e,
                "failed to send simple message"
            );
        }
        Ok(())
    }

    /// Send an HTML message with at most one uploaded file and one file read
    /// from `request.filepath`. Both are attached when both are given.
    pub async fn send_mime(
        &self,
        request: &MimeMessageRequest,
        upload: Option<UploadedFile>,
    ) -> Result<(), MailError> {
        request.validate()?;
        if let Some(file) = &upload {
            file.validate()?;
        }
        let profile = self.effective_profile()?;
        tracing::info!(profile = profile.name(), to = %request.to, "sending mime message");

        let outcome = match build_mime(profile, request, upload).await {
            Ok(message) => self.dispatch(profile, message).await,
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            tracing::error!(
                profile = profile.name(),
                request = %payload(request),
                error = %e,
                "failed to send mime message"
            );
        }
        Ok(())
    }

    /// [`send_simple`](Self::send_simple) with `profile` selected for the call.
    pub async fn send_simple_with(
        &self,
        profile: Option<&str>,
        request: &SimpleMessageRequest,
    ) -> Result<(), MailError> {
        self.interceptor
            .intercept(profile, self.send_simple(request))
            .await
    }

    /// [`send_mime`](Self::send_mime) with `profile` selected for the call.
    pub async fn send_mime_with(
        &self,
        profile: Option<&str>,
        request: &MimeMessageRequest,
        upload: Option<UploadedFile>,
    ) -> Result<(), MailError> {
        self.interceptor
            .intercept(profile, self.send_mime(request, upload))
            .await
    }

    async fn dispatch(&self, profile: &Profile, message: Message) -> Result<(), TransportError> {
        let unit = DispatchUnit::new(
            profile.name(),
            profile.transport().clone(),
            message,
            context::current_attributes(),
        );
        self.executor.submit(unit).await
    }
}

fn payload<T: Serialize + std::fmt::Debug>(request: &T) -> String {
    serde_json::to_string(request).unwrap_or_else(|_| format!("{request:?}"))
}

fn mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .trim()
        .parse()
        .map_err(|e| TransportError::Build(format!("{address}: {e}")))
}

fn headers(
    profile: &Profile,
    to: &str,
    cc: &[String],
    sent_date: Option<PrimitiveDateTime>,
    subject: &str,
) -> Result<MessageBuilder, TransportError> {
    let mut builder = Message::builder()
        .from(profile.sender().clone())
        .to(mailbox(to)?);
    for address in cc {
        builder = builder.cc(mailbox(address)?);
    }

    builder = match sent_date {
        Some(date) => builder.date(SystemTime::from(date.assume_utc())),
        None => builder.date_now(),
    };

    Ok(builder.subject(subject))
}

fn build_simple(
    profile: &Profile,
    request: &SimpleMessageRequest,
) -> Result<Message, TransportError> {
    let builder = headers(
        profile,
        &request.to,
        &request.cc,
        request.sent_date,
        &request.subject,
    )?;
    builder
        .header(ContentType::TEXT_PLAIN)
        .body(request.text.clone())
        .map_err(|e| TransportError::Build(e.to_string()))
}

async fn build_mime(
    profile: &Profile,
    request: &MimeMessageRequest,
    upload: Option<UploadedFile>,
) -> Result<Message, TransportError> {
    let body = SinglePart::html(request.text.clone());
    let mut parts = MultiPart::mixed().singlepart(body);

    if let Some(file) = upload.filter(|f| !f.is_empty()) {
        let name = file.filename.unwrap_or_default();
        let content_type = content_type(&name, file.content_type.as_deref())?;
        let attachment = Attachment::new(name).body(file.bytes, content_type);
        parts = parts.singlepart(attachment);
    }

    let filepath = request
        .filepath
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if let Some(path) = filepath.map(Path::new) {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TransportError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type(&name, None)?;
        let attachment = Attachment::new(name).body(bytes, content_type);
        parts = parts.singlepart(attachment);
    }

    let builder = headers(
        profile,
        &request.to,
        &request.cc,
        request.sent_date,
        &request.subject,
    )?;
    builder
        .multipart(parts)
        .map_err(|e| TransportError::Build(e.to_string()))
}

fn content_type(filename: &str, explicit: Option<&str>) -> Result<ContentType, TransportError> {
    let guessed = mime_guess::from_path(filename).first_or_octet_stream();
    let value = explicit.unwrap_or(guessed.essence_str());
    ContentType::parse(value)
        .map_err(|e| TransportError::Build(format!("content type '{value}': {e}")))
}
