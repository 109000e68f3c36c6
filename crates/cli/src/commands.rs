//! Subcommand implementations.
//!
//! Command output goes to stdout as JSON; logs go to stderr.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use swcache_client::{CacheProxy, FetchConfig, HttpNetwork, ProxyConfig, Route, TracingHost};
use swcache_core::{AppConfig, RequestDescriptor, SqliteStorage};

use crate::cli::Commands;

#[derive(Debug, Serialize)]
struct FetchOutput {
    intercepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PartitionSummary {
    name: String,
    current: bool,
    entries: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn build_proxy(config: &AppConfig) -> Result<CacheProxy> {
    let storage = SqliteStorage::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache store at {}", config.db_path.display()))?;
    let network = HttpNetwork::new(FetchConfig::from_app_config(config)?)?;

    Ok(CacheProxy::new(
        ProxyConfig::from_cache_config(&config.cache),
        Arc::new(storage),
        Arc::new(network),
        Arc::new(TracingHost),
    ))
}

fn not_intercepted() -> FetchOutput {
    FetchOutput { intercepted: false, route: None, status: None, headers: None, bytes: None }
}

pub async fn run(config: AppConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Route { url, method } => {
            let request = RequestDescriptor::new(&method, &url)?;
            let route = ProxyConfig::from_cache_config(&config.cache).route(&request);
            print_json(&FetchOutput { intercepted: route.is_some(), route, ..not_intercepted() })
        }
        Commands::Install => {
            let proxy = build_proxy(&config).await?;
            proxy.install().await.context("install rejected")?;
            print_json(&serde_json::json!({ "installed": proxy.config().manifest.len() }))
        }
        Commands::Activate => {
            let deleted = build_proxy(&config).await?.activate().await?;
            print_json(&serde_json::json!({ "deleted": deleted }))
        }
        Commands::Fetch { url, method, body } => {
            let proxy = build_proxy(&config).await?;
            let request = RequestDescriptor::new(&method, &url)?;
            let route = proxy.route(&request);
            let Some(response) = proxy.fetch(&request).await else {
                return print_json(&not_intercepted());
            };
            proxy.drain().await;

            if body {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&response.body)?;
                stdout.flush()?;
                return Ok(());
            }

            print_json(&FetchOutput {
                intercepted: true,
                route,
                status: Some(response.status),
                bytes: Some(response.body_len()),
                headers: Some(response.headers),
            })
        }
        Commands::Message { payload } => {
            let payload: serde_json::Value = serde_json::from_str(&payload).context("message payload must be JSON")?;
            match build_proxy(&config).await?.message(&payload).await? {
                Some(reply) => print_json(&reply),
                None => print_json(&serde_json::Value::Null),
            }
        }
        Commands::Partitions => {
            let proxy = build_proxy(&config).await?;
            let storage = proxy.storage();
            let mut summaries = Vec::new();
            for name in storage.names().await? {
                let entries = storage.keys(&name).await?.len();
                let current = proxy.config().names.is_current(&name);
                summaries.push(PartitionSummary { name, current, entries });
            }
            print_json(&summaries)
        }
        Commands::CacheSize => {
            let size = build_proxy(&config).await?.cache_size().await?;
            print_json(&serde_json::json!({ "cacheSize": size }))
        }
    }
}
