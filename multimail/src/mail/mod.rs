//! Message building and delivery through the selected profile.
//!
//! This module provides a thin layer over [lettre](https://lettre.rs):
//!
//! - [`MailTemplate`]: the send operations. They validate, pick the profile,
//!   build the message and hand it to a dispatch worker.
//! - [`Transport`]: the delivery backend of a profile. [`SmtpTransport`]
//!   talks SMTP; [`MemoryTransport`] records messages for tests and
//!   development.
//! - [`SimpleMessageRequest`], [`MimeMessageRequest`], [`UploadedFile`]:
//!   what callers submit, checked through [`Validate`].

mod memory;
mod request;
mod template;
mod transport;
mod validate;

pub use memory::{MemoryTransport, SentMessage};
pub use request::{MimeMessageRequest, SimpleMessageRequest, UploadedFile};
pub use template::MailTemplate;
pub use transport::{SmtpTransport, Transport};
pub use validate::Validate;
