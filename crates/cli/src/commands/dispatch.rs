//! `dispatch` command implementation.

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use config_loader::NamespaceVars;
use contracts::{DispatchResponse, RequestEnvelope, RequestMeta, Responder, STATUS_BAD_REQUEST};
use dispatcher::{Dispatcher, WriterResponder};
use observability::DispatchStats;

use super::load_manifest;
use crate::cli::DispatchArgs;
use crate::demo::{build_dispatcher, DemoStore};
use crate::error::CliError;

const NAMESPACE_KEYS: &[&str] = &["APP_NAME", "DEPLOY_ENV", "DEPLOY_BRANCH"];

/// One input line
enum Line {
    Request(RequestEnvelope),
    /// Not JSON; answered without reaching the dispatcher
    Malformed(String),
}

/// Execute the `dispatch` command
pub async fn run_dispatch(args: &DispatchArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading actions");
    let manifest = load_manifest(&args.config)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let meta = parse_headers(&args.headers)?;
    let namespace = config_loader::namespace(&namespace_vars());
    info!(namespace = %namespace, "Namespace derived");

    let dispatcher = build_dispatcher(&manifest, namespace);
    let lines = read_lines(args).await?;
    info!(
        requests = lines.len(),
        concurrent = args.concurrent,
        "Dispatching requests"
    );

    let requests: Vec<Line> = lines
        .iter()
        .map(|raw| parse_line(raw, &meta))
        .collect();

    let mut responder = WriterResponder::new("stdout", tokio::io::stdout());
    let mut stats = DispatchStats::new();

    if args.concurrent {
        let outcomes = join_all(requests.iter().map(|line| run_line(&dispatcher, line))).await;
        for (line, (response, elapsed)) in requests.iter().zip(outcomes) {
            record(&mut stats, line, &response, elapsed);
            responder.respond(&response.envelope, response.status).await?;
        }
    } else {
        for line in &requests {
            let (response, elapsed) = run_line(&dispatcher, line).await;
            record(&mut stats, line, &response, elapsed);
            responder.respond(&response.envelope, response.status).await?;
        }
    }

    let snapshot = dispatcher.metrics().snapshot();
    info!(
        total = snapshot.total,
        succeeded = snapshot.succeeded,
        rejected = snapshot.rejected,
        failed = snapshot.failed,
        store_initialized = dispatcher.store_initialized(),
        "Dispatch finished"
    );

    if args.stats {
        eprintln!("{}", stats.summary());
    }

    Ok(())
}

async fn run_line(
    dispatcher: &Dispatcher<DemoStore>,
    line: &Line,
) -> (DispatchResponse, std::time::Duration) {
    let started = Instant::now();
    let response = match line {
        Line::Request(request) => dispatcher.dispatch(request).await,
        Line::Malformed(message) => DispatchResponse::error(STATUS_BAD_REQUEST, message.clone()),
    };
    (response, started.elapsed())
}

fn record(
    stats: &mut DispatchStats,
    line: &Line,
    response: &DispatchResponse,
    elapsed: std::time::Duration,
) {
    let action = match line {
        Line::Request(request) => action_label(request),
        Line::Malformed(_) => "-".to_string(),
    };
    stats.update(&action, response.status, elapsed);
    observability::record_dispatch(&action, response.status, elapsed);
}

/// Metrics label for a request: the string action, or "-"
fn action_label(request: &RequestEnvelope) -> String {
    request
        .action_field()
        .and_then(|a| a.as_str())
        .filter(|a| !a.is_empty())
        .unwrap_or("-")
        .to_string()
}

fn parse_line(raw: &str, meta: &RequestMeta) -> Line {
    match RequestEnvelope::from_json(raw) {
        Ok(request) => Line::Request(request.with_meta(meta.clone())),
        Err(e) => {
            warn!(error = %e, "Malformed request line");
            Line::Malformed("Invalid JSON body".to_string())
        }
    }
}

async fn read_lines(args: &DispatchArgs) -> Result<Vec<String>> {
    let content = match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read requests from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read requests from stdin")?;
            buf
        }
    };
    Ok(content.lines().map(str::to_string).collect())
}

/// Parse repeated `NAME=VALUE` header flags
fn parse_headers(raw: &[String]) -> std::result::Result<RequestMeta, CliError> {
    raw.iter().try_fold(RequestMeta::new(), |meta, entry| {
        let (name, value) = entry
            .split_once('=')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| CliError::invalid_header(entry))?;
        Ok(meta.with_header(name.trim(), value.trim()))
    })
}

/// Collect only the namespace inputs from the process environment
fn namespace_vars() -> NamespaceVars {
    NAMESPACE_KEYS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
        .collect::<BTreeMap<_, _>>()
}
