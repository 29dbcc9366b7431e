// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;

use parcel_router::audit::{AuditLog, RedisAuditLog};
use parcel_router::config::consts::{consumer_name, ROUTER_CONSUMER_PREFIX};
use parcel_router::config::{load_and_validate_config, Config};
use parcel_router::departments::DepartmentFactory;
use parcel_router::observability::init_tracing;
use parcel_router::pipeline::{PipelineConsumer, Router};
use parcel_router::queue::{connect, RedisStreamBackend, StreamQueue};
use parcel_router::rules::{RuleBook, RuleSet};

const DEFAULT_AUDIT_PAGE_SIZE: usize = 100;

fn usage(program: &str) {
    eprintln!("Usage: {} <config.yaml> router", program);
    eprintln!("       {} <config.yaml> department <Tag>", program);
    eprintln!("       {} <config.yaml> status <stream> [stream ...]", program);
    eprintln!("       {} <config.yaml> check-rules [rules-book.txt]", program);
    eprintln!("       {} <config.yaml> audit [page] [page_size] [filter]", program);
    eprintln!(
        "Departments: {}",
        DepartmentFactory::list_available_departments().join(", ")
    );
}

/// argv[0], which the platform does not guarantee to pass.
fn program_name(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("parcel-router")
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        usage(program_name(&args));
        std::process::exit(1);
    }

    if let Err(e) = run(&args).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let config = load_and_validate_config(&args[1])
        .with_context(|| format!("loading configuration from '{}'", args[1]))?;
    init_tracing(&config.logging.filter);

    let rest = &args[3..];
    match args[2].as_str() {
        "router" => run_router(&config).await,
        "department" => {
            let tag = rest.first().context("department mode needs a department tag")?;
            run_department(&config, tag).await
        }
        "status" => print_status(&config, rest).await,
        "check-rules" => check_rules(&config, rest.first()),
        "audit" => print_audit(&config, rest).await,
        other => {
            usage(program_name(args));
            bail!("unknown mode '{}'", other)
        }
    }
}

/// Cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

async fn run_router(config: &Config) -> Result<()> {
    let conn = connect(&config.redis.url)
        .await
        .with_context(|| format!("connecting to {}", config.redis.url))?;
    let queue = StreamQueue::new(
        Arc::new(RedisStreamBackend::new(conn.clone())),
        config.queue.options(),
    );
    let audit: Arc<dyn AuditLog> = Arc::new(RedisAuditLog::new(conn));
    let rules = Arc::new(RuleBook::load(&config.rule_book.path).await?);

    let router = Router::new(queue, rules.clone(), audit);
    router.prepare_department_groups().await?;

    let cancel = shutdown_token();
    let watcher = tokio::spawn(rules.watch(config.rule_book.reload_interval(), cancel.clone()));

    let result = router
        .listen(&consumer_name(ROUTER_CONSUMER_PREFIX), &cancel)
        .await;
    cancel.cancel();
    watcher.await?;
    Ok(result?)
}

async fn run_department(config: &Config, tag: &str) -> Result<()> {
    let conn = connect(&config.redis.url)
        .await
        .with_context(|| format!("connecting to {}", config.redis.url))?;
    let audit: Arc<dyn AuditLog> = Arc::new(RedisAuditLog::new(conn.clone()));
    let department = DepartmentFactory::create(tag, audit)?;
    let queue = StreamQueue::new(Arc::new(RedisStreamBackend::new(conn)), config.queue.options());

    let consumer = PipelineConsumer::new(queue, department);
    let cancel = shutdown_token();
    consumer.listen(&consumer_name(tag), &cancel).await?;
    Ok(())
}

async fn print_status(config: &Config, streams: &[String]) -> Result<()> {
    if streams.is_empty() {
        bail!("status mode needs at least one stream key");
    }

    let backend = RedisStreamBackend::connect(&config.redis.url).await?;
    let queue = StreamQueue::new(Arc::new(backend), config.queue.options());

    for stream in streams {
        let groups = queue.status(stream).await?;
        println!("📊 {}", stream);
        if groups.is_empty() {
            println!("   (no consumer groups)");
        }
        for group in groups {
            println!(
                "   {:<28} consumers={:<3} pending={:<6} entries-read={:<8} lag={}",
                group.name,
                group.consumers,
                group.pending,
                group.entries_read.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
                group.lag.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            );
        }
    }
    Ok(())
}

fn check_rules(config: &Config, path: Option<&String>) -> Result<()> {
    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.rule_book.path.clone());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading rule-book '{}'", path.display()))?;

    match RuleSet::parse(&text) {
        Ok(rules) => {
            println!("✅ {}: {} rules", path.display(), rules.len());
            for (tag, group) in rules.groups() {
                println!("   {}", tag);
                for rule in group {
                    println!("      {}", rule);
                }
            }
            Ok(())
        }
        Err(e) => {
            println!("❌ line {}: {}", e.line, e.kind);
            println!("   {}", e.text);
            bail!("rule-book '{}' is invalid", path.display())
        }
    }
}

async fn print_audit(config: &Config, args: &[String]) -> Result<()> {
    let page = match args.first() {
        Some(page) => page.parse().with_context(|| format!("invalid page '{}'", page))?,
        None => 1,
    };
    let page_size = match args.get(1) {
        Some(size) => size.parse().with_context(|| format!("invalid page size '{}'", size))?,
        None => DEFAULT_AUDIT_PAGE_SIZE,
    };
    let filter = args.get(2).map(String::as_str);

    let conn = connect(&config.redis.url).await?;
    let audit = RedisAuditLog::new(conn);
    for entry in audit.get(page, page_size, filter).await? {
        println!("{}", entry);
    }
    Ok(())
}
