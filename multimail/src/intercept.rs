use std::future::Future;
use std::sync::Arc;

use crate::context;
use crate::error::MailError;
use crate::profile::ProfileRegistry;

/// Binds a caller-selected profile to the dynamic extent of an operation.
///
/// Every send-capable call site passes its profile choice explicitly:
///
/// ```ignore
/// interceptor
///     .intercept(Some("office365"), template.send_mime(request, None))
///     .await?;
/// ```
///
/// With `None` the operation runs under a default frame, so it uses the
/// default profile even when called from inside another intercepted
/// operation. The frame is released on every exit path.
#[derive(Clone)]
pub struct ProfileInterceptor {
    registry: Arc<ProfileRegistry>,
}

impl ProfileInterceptor {
    pub fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self { registry }
    }

    /// Run `op` with `profile` selected. An unknown profile name fails with
    /// [`ProfileError::NotFound`](crate::ProfileError::NotFound) before `op`
    /// is polled.
    pub async fn intercept<F, T, E>(&self, profile: Option<&str>, op: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<MailError>,
    {
        if let Some(name) = profile {
            self.registry
                .resolve(name)
                .map_err(|e| E::from(MailError::from(e)))?;
        }

        tracing::trace!(
            profile = profile.unwrap_or("<default>"),
            depth = context::depth(),
            "entering profile"
        );
        context::enter(profile, op).await
    }
}
