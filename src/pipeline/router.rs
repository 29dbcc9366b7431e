// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::audit::{self, AuditLog};
use crate::config::consts::{group_name, stream_key, ENTRY_STREAM, ROUTER_GROUP, ROUTER_SOURCE};
use crate::errors::{PipelineError, QueueError};
use crate::model::{parse_raw_parcel, Package};
use crate::observability::messages::pipeline::{ParcelRouted, ParcelUnroutable};
use crate::observability::messages::StructuredLog;
use crate::queue::{MessageHandler, StreamQueue};
use crate::rules::RuleBook;

/// Reads raw parcels from the entry stream and dispatches each as a package
/// to the first department the active rules select.
pub struct Router {
    queue: StreamQueue,
    rules: Arc<RuleBook>,
    audit: Arc<dyn AuditLog>,
}

impl Router {
    pub fn new(queue: StreamQueue, rules: Arc<RuleBook>, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            queue,
            rules,
            audit,
        }
    }

    /// Create the consumer group of every department the active rules can
    /// route to. Groups only see entries appended after their creation, so
    /// this keeps packages dispatched before a department first starts.
    /// Departments that appear later through a reload get their group on
    /// first dispatch.
    pub async fn prepare_department_groups(&self) -> Result<(), QueueError> {
        let rules = self.rules.snapshot();
        for (tag, _) in rules.groups() {
            self.queue.ensure_group(&stream_key(tag), &group_name(tag)).await?;
        }
        Ok(())
    }

    /// Consume the entry stream until `cancel` fires.
    pub async fn listen(&self, consumer: &str, cancel: &CancellationToken) -> Result<(), QueueError> {
        self.queue
            .consume(ENTRY_STREAM, ROUTER_GROUP, consumer, self, cancel)
            .await
    }

    /// Route one raw parcel record and return the dispatched package.
    ///
    /// A parcel no department accepts is [`PipelineError::Unroutable`]; its
    /// entry stays pending for an operator.
    pub async fn route(&self, payload: &str) -> Result<Package, PipelineError> {
        let parcel = parse_raw_parcel(payload)?;
        let departments = self.rules.departments(&parcel);

        if departments.is_empty() {
            ParcelUnroutable {
                recipient: &parcel.recipient.name,
                weight: parcel.weight,
                value: parcel.value,
            }
            .log();
            return Err(PipelineError::Unroutable {
                recipient: parcel.recipient.name,
            });
        }

        let route = departments.iter().collect::<Vec<_>>().join(", ");
        let package = Package::new(parcel, departments)?;
        let first = package.next_department().ok_or(PipelineError::EmptyRoute)?;
        let stream = stream_key(first);
        let payload = package.to_payload()?;

        self.queue.deliver(&stream, &group_name(first), &payload).await?;

        ParcelRouted {
            package_id: package.id(),
            departments: &route,
            stream: &stream,
        }
        .log();
        audit::record(self.audit.as_ref(), ROUTER_SOURCE, &payload).await;

        Ok(package)
    }
}

#[async_trait]
impl MessageHandler for Router {
    type Error = PipelineError;

    async fn handle(&self, payload: &str) -> Result<(), PipelineError> {
        self.route(payload).await.map(|_| ())
    }
}
