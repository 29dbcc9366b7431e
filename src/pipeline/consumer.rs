// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::consts::{group_name, stream_key};
use crate::departments::Department;
use crate::errors::{PipelineError, QueueError};
use crate::model::Package;
use crate::observability::messages::pipeline::{PackageCompleted, PackageForwarded, PackageReceived};
use crate::observability::messages::StructuredLog;
use crate::queue::{MessageHandler, StreamQueue};

/// Moves packages through one department: receive, process, forward.
///
/// A package's stream entry is acknowledged only after the forwarded copy
/// has been produced, so a crash in between redelivers rather than loses it.
pub struct PipelineConsumer {
    queue: StreamQueue,
    department: Arc<dyn Department>,
}

impl PipelineConsumer {
    pub fn new(queue: StreamQueue, department: Arc<dyn Department>) -> Self {
        Self { queue, department }
    }

    pub fn department(&self) -> &dyn Department {
        self.department.as_ref()
    }

    /// Consume the department's stream until `cancel` fires.
    pub async fn listen(&self, consumer: &str, cancel: &CancellationToken) -> Result<(), QueueError> {
        let tag = self.department.tag();
        self.queue
            .consume(&stream_key(tag), &group_name(tag), consumer, self, cancel)
            .await
    }

    /// Mark the current department handled, then apply the department's side
    /// effects.
    pub async fn process(&self, package: &mut Package) -> Result<(), PipelineError> {
        package.complete_current();
        self.department.process(package).await
    }

    /// Produce the package onto its next department's stream. Returns the
    /// entry id, or `None` when the route is exhausted and nothing was sent.
    pub async fn forward(&self, package: &Package) -> Result<Option<String>, PipelineError> {
        let Some(next) = package.next_department() else {
            PackageCompleted {
                package_id: package.id(),
                department: self.department.tag(),
                metadata_entries: package.metadata().len(),
            }
            .log();
            return Ok(None);
        };

        let stream = stream_key(next);
        let entry_id = self
            .queue
            .deliver(&stream, &group_name(next), &package.to_payload()?)
            .await?;

        PackageForwarded {
            package_id: package.id(),
            stream: &stream,
            entry_id: &entry_id,
        }
        .log();
        Ok(Some(entry_id))
    }
}

#[async_trait]
impl MessageHandler for PipelineConsumer {
    type Error = PipelineError;

    async fn handle(&self, payload: &str) -> Result<(), PipelineError> {
        let mut package = Package::from_payload(payload)?;

        let received = PackageReceived {
            department: self.department.tag(),
            package_id: package.id(),
            remaining: package.departments().len(),
        };
        received.log();
        let span = received.span("department");

        async {
            self.process(&mut package).await?;
            self.forward(&package).await?;
            Ok(())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;
    use crate::departments::HandlingDepartment;
    use crate::model::{Address, Parcel, Recipient};
    use crate::queue::{MemoryStreamBackend, QueueOptions, StreamBackend};

    fn parcel() -> Parcel {
        Parcel::new(
            Recipient {
                name: "Zaphod".to_string(),
                address: Address {
                    city: "Betelgeuse".to_string(),
                    ..Default::default()
                },
            },
            0.2,
            10.0,
        )
    }

    fn mail_consumer(backend: &Arc<MemoryStreamBackend>) -> PipelineConsumer {
        let queue = StreamQueue::new(backend.clone(), QueueOptions::default());
        let department = Arc::new(HandlingDepartment::mail(Arc::new(MemoryAuditLog::new())));
        PipelineConsumer::new(queue, department)
    }

    #[tokio::test]
    async fn test_forward_produces_only_on_next_department_stream() {
        let backend = Arc::new(MemoryStreamBackend::new());
        let consumer = mail_consumer(&backend);
        let mut package = Package::new(parcel(), ["Mail", "Heavy"]).unwrap();

        consumer.process(&mut package).await.unwrap();
        let entry_id = consumer.forward(&package).await.unwrap();

        assert!(entry_id.is_some());
        assert_eq!(backend.stream_keys(), vec!["Heavy-stream".to_string()]);
        let forwarded = backend.entries("Heavy-stream");
        let decoded = Package::from_payload(forwarded[0].payload.as_deref().unwrap()).unwrap();
        assert_eq!(decoded, package);
        assert_eq!(decoded.next_department(), Some("Heavy"));
    }

    #[tokio::test]
    async fn test_forward_of_exhausted_route_produces_nothing() {
        let backend = Arc::new(MemoryStreamBackend::new());
        let consumer = mail_consumer(&backend);
        let mut package = Package::new(parcel(), ["Mail"]).unwrap();

        consumer.process(&mut package).await.unwrap();
        let entry_id = consumer.forward(&package).await.unwrap();

        assert!(entry_id.is_none());
        assert!(package.is_terminal());
        assert!(backend.stream_keys().is_empty());
    }

    #[tokio::test]
    async fn test_forward_reaches_department_started_later() {
        let backend = Arc::new(MemoryStreamBackend::new());
        let consumer = mail_consumer(&backend);
        let mut package = Package::new(parcel(), ["Mail", "Regular"]).unwrap();

        consumer.process(&mut package).await.unwrap();
        consumer.forward(&package).await.unwrap();

        let queue = StreamQueue::new(backend.clone(), QueueOptions::default());
        queue
            .ensure_group("Regular-stream", "Regular-consumer-group")
            .await
            .unwrap();
        let delivered = backend
            .read_group("Regular-stream", "Regular-consumer-group", "regular-1", 10)
            .await
            .unwrap();
        assert_eq!(delivered.len(), 1);
    }

    #[tokio::test]
    async fn test_handle_rejects_malformed_payload() {
        let backend = Arc::new(MemoryStreamBackend::new());
        let consumer = mail_consumer(&backend);

        let result = consumer.handle("{\"not\": \"a package\"}").await;

        assert!(matches!(result, Err(PipelineError::Deserialization(_))));
        assert!(backend.stream_keys().is_empty());
    }

    #[tokio::test]
    async fn test_handle_processes_then_forwards() {
        let backend = Arc::new(MemoryStreamBackend::new());
        let consumer = mail_consumer(&backend);
        let package = Package::new(parcel(), ["Mail", "Insurance"]).unwrap();

        consumer.handle(&package.to_payload().unwrap()).await.unwrap();

        let forwarded = backend.entries("Insurance-stream");
        let decoded = Package::from_payload(forwarded[0].payload.as_deref().unwrap()).unwrap();
        assert_eq!(decoded.id(), package.id());
        assert_eq!(decoded.metadata().len(), 1);
        assert_eq!(decoded.departments().len(), 1);
    }
}
