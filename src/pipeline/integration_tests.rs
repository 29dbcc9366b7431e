// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::audit::{AuditLog, MemoryAuditLog};
use crate::config::consts::{consumer_name, ENTRY_STREAM, ROUTER_GROUP};
use crate::departments::DepartmentFactory;
use crate::errors::QueueError;
use crate::pipeline::{PipelineConsumer, Router};
use crate::queue::{MemoryStreamBackend, QueueOptions, StreamQueue};
use crate::rules::{RuleBook, RuleSet};

const RULE_BOOK: &str = "\
Insurance: Value>1000
Mail: Weight<0.5
Regular: Weight>=0.5
Regular: Weight<10
Heavy: Weight>=10
";

struct Pipeline {
    backend: Arc<MemoryStreamBackend>,
    audit: Arc<MemoryAuditLog>,
    queue: StreamQueue,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<Result<(), QueueError>>>,
}

impl Pipeline {
    /// Router plus one consumer per department, all on one in-memory broker.
    async fn start(rule_book: &str) -> Self {
        let backend = Arc::new(MemoryStreamBackend::new());
        let audit = Arc::new(MemoryAuditLog::new());
        let queue = StreamQueue::new(
            backend.clone(),
            QueueOptions {
                poll_interval: Duration::from_millis(5),
                idle_threshold: Duration::from_secs(10),
                read_batch: 10,
                claim_batch: 1,
            },
        );
        let cancel = CancellationToken::new();
        let rules = Arc::new(RuleBook::with_rules("rules-book.txt", RuleSet::parse(rule_book).unwrap()));
        let audit_log: Arc<dyn AuditLog> = audit.clone();

        let router = Arc::new(Router::new(queue.clone(), rules, audit_log.clone()));
        queue.ensure_group(ENTRY_STREAM, ROUTER_GROUP).await.unwrap();
        router.prepare_department_groups().await.unwrap();

        let mut tasks = Vec::new();
        {
            let router = router.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                router.listen(&consumer_name("rc"), &cancel).await
            }));
        }

        for tag in DepartmentFactory::list_available_departments() {
            let department = DepartmentFactory::create(tag, audit_log.clone()).unwrap();
            let consumer = Arc::new(PipelineConsumer::new(queue.clone(), department));
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                consumer.listen(&consumer_name(tag), &cancel).await
            }));
        }

        Self {
            backend,
            audit,
            queue,
            cancel,
            tasks,
        }
    }

    async fn submit(&self, weight: f64, value: f64, name: &str) {
        let xml = format!(
            "<Parcel><Receipient><Name>{name}</Name><Address><Street>Main</Street>\
             <HouseNumber>1</HouseNumber><PostalCode>1000 AA</PostalCode><City>Amsterdam</City>\
             </Address></Receipient><Weight>{weight}</Weight><Value>{value}</Value></Parcel>"
        );
        self.queue.produce(ENTRY_STREAM, &xml).await.unwrap();
    }

    /// Audit sources for entries mentioning `name`, in write order.
    fn trail(&self, name: &str) -> Vec<String> {
        self.audit
            .entries()
            .iter()
            .filter(|entry| entry.contains(name))
            .filter_map(|entry| {
                let (_, rest) = entry.split_once("] ")?;
                let (source, _) = rest.split_once(" - ")?;
                Some(source.to_string())
            })
            .collect()
    }

    /// Wait until the router and exactly `departments`, in that order, have
    /// audited the parcel. The router audits after dispatching, so its entry
    /// may land anywhere in the trail.
    async fn wait_for_trail(&self, name: &str, departments: &[&str]) {
        let settled = || {
            let trail = self.trail(name);
            let routed = trail.iter().filter(|source| *source == "RuleChecker").count();
            let hops: Vec<&str> = trail
                .iter()
                .map(String::as_str)
                .filter(|source| *source != "RuleChecker")
                .collect();
            routed == 1 && hops == departments
        };

        for _ in 0..500 {
            if settled() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("trail for {} was {:?}, expected router and {:?}", name, self.trail(name), departments);
    }

    async fn wait_until_settled(&self, stream: &str, group: &str) {
        for _ in 0..500 {
            if self.backend.pending(stream, group).is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("entries on {} still pending", stream);
    }

    async fn stop(self) {
        self.cancel.cancel();
        for task in self.tasks {
            task.await.unwrap().unwrap();
        }
    }
}

#[tokio::test]
async fn test_parcels_travel_their_full_route() {
    let pipeline = Pipeline::start(RULE_BOOK).await;

    pipeline.submit(0.4, 1500.0, "Marvin").await;
    pipeline.submit(5.0, 500.0, "Eddie").await;
    pipeline.submit(15.0, 2000.0, "Slartibartfast").await;
    pipeline.submit(50.0, 50.0, "Fenchurch").await;

    pipeline
        .wait_for_trail("Marvin", &["Insurance", "Mail"])
        .await;
    pipeline.wait_for_trail("Eddie", &["Regular"]).await;
    pipeline
        .wait_for_trail("Slartibartfast", &["Insurance", "Heavy"])
        .await;
    pipeline.wait_for_trail("Fenchurch", &["Heavy"]).await;

    pipeline.wait_until_settled(ENTRY_STREAM, ROUTER_GROUP).await;
    for stream in ["Insurance", "Mail", "Regular", "Heavy"] {
        pipeline
            .wait_until_settled(&format!("{stream}-stream"), &format!("{stream}-consumer-group"))
            .await;
    }

    pipeline.stop().await;
}

#[tokio::test]
async fn test_final_package_carries_metadata_from_every_hop() {
    let pipeline = Pipeline::start(RULE_BOOK).await;

    pipeline.submit(0.1, 5000.0, "Prostetnic").await;
    pipeline
        .wait_for_trail("Prostetnic", &["Insurance", "Mail"])
        .await;

    let last = pipeline
        .audit
        .entries()
        .into_iter()
        .rev()
        .find(|entry| entry.contains("] Mail - ") && entry.contains("Prostetnic"))
        .unwrap();
    let (_, payload) = last.split_once(" - ").unwrap();
    let package = crate::model::Package::from_payload(payload).unwrap();

    assert!(package.is_terminal());
    assert_eq!(package.metadata().len(), 2);
    assert!(package.metadata()[0].starts_with("Signed by the insurance department"));
    assert!(package.metadata()[1].starts_with("Handled by the mail department"));

    pipeline.stop().await;
}

#[tokio::test]
async fn test_unroutable_parcel_stays_pending_on_entry_stream() {
    let pipeline = Pipeline::start("Heavy: Weight>=10").await;

    pipeline.submit(1.0, 1.0, "Agrajag").await;
    pipeline.submit(20.0, 1.0, "Hotblack").await;

    pipeline.wait_for_trail("Hotblack", &["Heavy"]).await;

    let mut pending = pipeline.backend.pending(ENTRY_STREAM, ROUTER_GROUP);
    for _ in 0..500 {
        if pending.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        pending = pipeline.backend.pending(ENTRY_STREAM, ROUTER_GROUP);
    }
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].0, "1-0");
    assert!(pipeline.trail("Agrajag").is_empty());

    pipeline.stop().await;
}
