use std::sync::Arc;

use lettre::Message;
use uuid::Uuid;

use crate::context::AttributeBundle;
use crate::error::TransportError;
use crate::mail::Transport;

/// One deferred send: a transport, a built message and the caller's
/// attribute bundle captured at creation time.
pub struct DispatchUnit {
    pub(crate) id: Uuid,
    pub(crate) profile: String,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) message: Message,
    pub(crate) attributes: AttributeBundle,
}

impl DispatchUnit {
    pub fn new(
        profile: impl Into<String>,
        transport: Arc<dyn Transport>,
        message: Message,
        attributes: AttributeBundle,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile: profile.into(),
            transport,
            message,
            attributes,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn attributes(&self) -> &AttributeBundle {
        &self.attributes
    }

    pub(crate) async fn run(self) -> Result<(), TransportError> {
        self.transport.send(self.message).await
    }
}
