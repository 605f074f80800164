//! Sends through two profiles, one chosen per call.
//!
//! With `MAIL__PROFILES__...` variables set (see `multimail::config`), real
//! SMTP transports are used. Otherwise both profiles record into memory.
//!
//! ```sh
//! RUST_LOG=multimail=debug cargo run --example multi_profile
//! ```

use std::sync::Arc;

use anyhow::Result;
use multimail::context::{self, AttributeBundle};
use multimail::{
    ConnectionProperties, DispatchExecutor, EnvConfig, MailSettings, MailTemplate, MemoryTransport,
    MimeMessageRequest, ProfileRegistry, SimpleMessageRequest,
};
use tracing_subscriber::EnvFilter;

const OFFICE: &str = "office365";

fn memory_template() -> Result<(MailTemplate, MemoryTransport, MemoryTransport)> {
    let default = MemoryTransport::new();
    let office = MemoryTransport::new();
    let registry = ProfileRegistry::builder()
        .register(
            "default",
            ConnectionProperties::new("smtp.qq.com").sender("acct-a@qq.com"),
            default.clone(),
        )?
        .register(
            OFFICE,
            ConnectionProperties::new("smtp.office365.com").sender("acct-b@outlook.com"),
            office.clone(),
        )?
        .build();

    let template = MailTemplate::new(Arc::new(registry), DispatchExecutor::with_concurrency(2));
    Ok((template, default, office))
}

/// Unannotated operation that calls an annotated one.
async fn send_nested(template: &MailTemplate) -> Result<(), multimail::MailError> {
    let simple = SimpleMessageRequest::new("abc@qq.com", "232323", "cbd");
    tracing::info!(to = %simple.to, "send simple email");
    template.send_simple(&simple).await?;

    template
        .send_mime_with(
            Some(OFFICE),
            &MimeMessageRequest::new("abc@qq.com", "232323", "<p>cbd</p>"),
            None,
        )
        .await
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = MailSettings::from_env_with_prefix("MAIL")?;
    let request_id = uuid::Uuid::new_v4().to_string();
    let request = AttributeBundle::new().with("request_id", request_id);

    if settings.profiles.is_empty() {
        tracing::info!("no profiles configured, recording messages in memory");
        let (template, default, office) = memory_template()?;

        context::scope(request, send_nested(&template)).await?;

        let mut recorded = default.sent().await;
        recorded.extend(office.sent().await);
        for sent in &recorded {
            tracing::info!(
                from = ?sent.message.envelope().from(),
                request_id = sent.attributes.get("request_id").unwrap_or_default(),
                "recorded message"
            );
        }
    } else {
        let template = MailTemplate::from_settings(&settings)?;
        context::scope(request, send_nested(&template)).await?;
    }

    Ok(())
}
