//! Off-task execution of sends.
//!
//! - [`DispatchUnit`]: one send, packaged with its transport and the
//!   caller's attribute bundle.
//! - [`DispatchExecutor`]: spawns units with bounded concurrency and hands
//!   back a [`DispatchHandle`] the caller awaits.

mod executor;
mod unit;

pub use executor::{DispatchExecutor, DispatchHandle};
pub use unit::DispatchUnit;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use lettre::Message;
    use tracing_test::traced_test;

    use super::*;
    use crate::context::{self, AttributeBundle};
    use crate::error::TransportError;
    use crate::mail::{MemoryTransport, Transport};

    fn message() -> Message {
        Message::builder()
            .from("sender@example.com".parse().unwrap())
            .to("abc@qq.com".parse().unwrap())
            .subject("232323")
            .body(String::from("cbd"))
            .unwrap()
    }

    fn unit_for<T: Transport>(transport: T) -> DispatchUnit {
        let attributes = AttributeBundle::new();
        DispatchUnit::new("default", Arc::new(transport), message(), attributes)
    }

    struct Panicking;

    #[async_trait]
    impl Transport for Panicking {
        async fn send(&self, _message: Message) -> Result<(), TransportError> {
            panic!("transport exploded");
        }
    }

    struct Slow;

    #[async_trait]
    impl Transport for Slow {
        async fn send(&self, _message: Message) -> Result<(), TransportError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn worker_observes_submitted_bundle() {
        let transport = MemoryTransport::new();
        let executor = DispatchExecutor::new();
        let bundle = AttributeBundle::new().with("request_id", "r-1");
        let unit = DispatchUnit::new("default", Arc::new(transport.clone()), message(), bundle);

        executor.submit(unit).await.unwrap();

        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attributes.get("request_id"), Some("r-1"));
    }

    #[tokio::test]
    async fn bundles_do_not_leak_between_units() {
        let transport = MemoryTransport::new();
        let executor = DispatchExecutor::with_concurrency(1);

        let first = DispatchUnit::new(
            "default",
            Arc::new(transport.clone()),
            message(),
            AttributeBundle::new().with("request_id", "r-1"),
        );
        let second = unit_for(transport.clone());

        executor.submit(first).await.unwrap();
        executor.submit(second).await.unwrap();

        let sent = transport.sent().await;
        assert_eq!(sent[0].attributes.get("request_id"), Some("r-1"));
        assert!(sent[1].attributes.is_empty());
        assert!(context::current_attributes().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_returned_not_raised() {
        let executor = DispatchExecutor::new();
        let unit = unit_for(MemoryTransport::failing("550 rejected"));

        let result = executor.submit(unit).await;
        assert!(matches!(result, Err(TransportError::Smtp(msg)) if msg == "550 rejected"));
    }

    #[tokio::test]
    #[traced_test]
    async fn worker_logs_its_thread_at_info() {
        let executor = DispatchExecutor::new();
        executor.submit(unit_for(MemoryTransport::new())).await.unwrap();

        logs_assert(|lines: &[&str]| {
            match lines.iter().find(|line| line.contains("dispatching message")) {
                Some(line) if line.contains("INFO") && line.contains("thread=") => Ok(()),
                other => Err(format!("unexpected worker record: {other:?}")),
            }
        });
    }

    #[tokio::test]
    async fn panic_is_reported_as_aborted() {
        let executor = DispatchExecutor::new();
        let unit = unit_for(Panicking);

        assert!(matches!(executor.submit(unit).await, Err(TransportError::Aborted(_))));
        assert_eq!(executor.available(), executor.concurrency());
    }

    #[tokio::test]
    async fn closed_executor_rejects_units() {
        let executor = DispatchExecutor::new();
        executor.close();

        let unit = unit_for(MemoryTransport::new());
        assert!(matches!(executor.submit(unit).await, Err(TransportError::Closed)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_is_bounded() {
        let executor = DispatchExecutor::with_concurrency(2);
        let handles: Vec<_> = (0..4).map(|_| executor.submit(unit_for(Slow))).collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(executor.available(), 0);

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(executor.available(), 2);
    }

    #[test]
    fn zero_concurrency_is_raised_to_one() {
        assert_eq!(DispatchExecutor::with_concurrency(0).concurrency(), 1);
    }
}
