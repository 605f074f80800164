use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::unit::DispatchUnit;
use crate::context;
use crate::error::TransportError;

/// Runs sends on spawned tokio tasks with bounded concurrency.
///
/// Before a unit runs, its worker task installs the attribute bundle captured
/// when the unit was created, so logging and transport code observe the
/// originating caller's attributes. The bundle is scoped to that one unit.
///
/// ```ignore
/// let executor = DispatchExecutor::with_concurrency(8);
/// let result = executor.submit(unit).await;
/// ```
#[derive(Clone)]
pub struct DispatchExecutor {
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl Default for DispatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchExecutor {
    pub fn new() -> Self {
        Self::with_concurrency(4)
    }

    /// Maximum number of sends in flight (default: 4). Values below one are
    /// raised to one.
    pub fn with_concurrency(n: usize) -> Self {
        let concurrency = n.max(1);
        Self {
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Permits not currently held by a running unit.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Stop accepting work. Units waiting for a permit, and any submitted
    /// later, fail with [`TransportError::Closed`].
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Spawn `unit` and return a handle resolving to its outcome.
    ///
    /// Must be called from within a tokio runtime. The unit runs to
    /// completion even if the handle is dropped.
    pub fn submit(&self, unit: DispatchUnit) -> DispatchHandle {
        let id = unit.id;
        let permits = self.permits.clone();
        let span = tracing::info_span!(
            "dispatch",
            %id,
            profile = %unit.profile,
            attributes = %unit.attributes
        );

        let inner = tokio::spawn(
            async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| TransportError::Closed)?;

                let thread = std::thread::current();
                tracing::info!(
                    thread = thread.name().unwrap_or("<unnamed>"),
                    "dispatching message"
                );
                let attributes = unit.attributes.clone();
                context::install(attributes, unit.run()).await
            }
            .instrument(span),
        );

        DispatchHandle { id, inner }
    }
}

/// Completion handle of a submitted [`DispatchUnit`].
///
/// A panic inside the worker is reported as [`TransportError::Aborted`].
pub struct DispatchHandle {
    id: Uuid,
    inner: JoinHandle<Result<(), TransportError>>,
}

impl DispatchHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Future for DispatchHandle {
    type Output = Result<(), TransportError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|joined| match joined {
                Ok(result) => result,
                Err(e) => Err(TransportError::Aborted(e.to_string())),
            })
    }
}
