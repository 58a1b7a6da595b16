//! portfolio-cli: poke the portfolio backend through the resilient client.
//!
//! Usage:
//!   portfolio-cli get <path> [--param k=v]...   Fetch a path and print the JSON body
//!   portfolio-cli warm <path>...                Preload paths into the cache
//!   portfolio-cli config                        Print the effective configuration

use anyhow::{bail, Context};
use portfolio_client::{ClientConfig, HttpClient, HttpClientBuilder, RequestConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "get" => cmd_get(&args[2..]).await,
        "warm" => cmd_warm(&args[2..]).await,
        "config" => cmd_config(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("portfolio-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"portfolio-cli: resilient HTTP client for the portfolio backend

USAGE:
    portfolio-cli <COMMAND> [OPTIONS]

COMMANDS:
    get <path> [--param k=v]...   Fetch a path and print the JSON body
    warm <path>...                Preload paths into the cache, report hit counts
    config                        Print the effective configuration as YAML
    version                       Show version information
    help                          Show this help message

OPTIONS:
    --config <file>               YAML configuration file

ENVIRONMENT:
    PORTFOLIO_API_BASE_URL        Backend base URL (server side)
    PORTFOLIO_ORIGIN              Page origin (client side)
    PORTFOLIO_HTTP_TIMEOUT_MS     Request timeout
    PORTFOLIO_CACHE_TTL_MS        Default cache TTL
    PORTFOLIO_MAX_RETRIES         Retry budget for transient failures
    PORTFOLIO_DEV                 Log one timing line per request
    RUST_LOG                      Log filter (default: warn)"#
    );
}

/// Split `--config <file>` out of `args`, returning the remaining positionals.
fn split_config_flag(args: &[String]) -> anyhow::Result<(Option<String>, Vec<String>)> {
    let mut file = None;
    let mut rest = Vec::new();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        if arg == "--config" {
            let path = it.next().context("--config needs a file path")?;
            file = Some(path.clone());
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((file, rest))
}

fn load_config(file: Option<&str>) -> anyhow::Result<ClientConfig> {
    let cfg = match file {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => ClientConfig::from_env().context("reading PORTFOLIO_* environment")?,
    };
    Ok(cfg)
}

fn build_client(file: Option<&str>) -> anyhow::Result<HttpClient> {
    let cfg = load_config(file)?;
    let client = HttpClientBuilder::from_config(&cfg)
        .build()
        .context("building HTTP client")?;
    Ok(client)
}

async fn cmd_get(args: &[String]) -> anyhow::Result<()> {
    let (file, rest) = split_config_flag(args)?;
    let mut path = None;
    let mut request = RequestConfig::new();
    let mut it = rest.iter();
    while let Some(arg) = it.next() {
        if arg == "--param" {
            let pair = it.next().context("--param needs k=v")?;
            let (k, v) = pair
                .split_once('=')
                .with_context(|| format!("malformed --param {pair:?}, expected k=v"))?;
            request = request.param(k, v);
        } else if path.is_none() {
            path = Some(arg.clone());
        } else {
            bail!("unexpected argument: {arg}");
        }
    }
    let path = path.context("get needs a path, e.g. /skills")?;

    let client = build_client(file.as_deref())?;
    let resp = client.get::<Value>(&path, &request).await?;
    eprintln!("{} {}", resp.status, resp.status_text);
    println!("{}", serde_json::to_string_pretty(&resp.data)?);
    Ok(())
}

async fn cmd_warm(args: &[String]) -> anyhow::Result<()> {
    let (file, paths) = split_config_flag(args)?;
    if paths.is_empty() {
        bail!("warm needs at least one path");
    }

    let client = build_client(file.as_deref())?;
    let config = RequestConfig::new();
    let handles: Vec<_> = paths
        .iter()
        .map(|p| client.preload_data(p, &config))
        .collect();
    for handle in handles {
        handle.await.context("preload task panicked")?;
    }

    // Second pass should be served from cache.
    let requests: Vec<_> = paths
        .iter()
        .map(|p| {
            let client = client.clone();
            let config = config.clone();
            let p = p.clone();
            move || async move {
                let resp = client.get::<Value>(&p, &config).await;
                resp.map(|_| p)
            }
        })
        .collect();
    let result = client.batch_settled(requests).await;
    for (_, path) in &result.successes {
        println!("ok      {path}");
    }
    for (i, err) in &result.failures {
        println!("failed  {}: {err}", paths[*i]);
    }

    let stats = client.cache().stats();
    println!(
        "cache: {} hits, {} misses, {} entries",
        stats.hits,
        stats.misses,
        client.cache().len().await?
    );
    Ok(())
}

fn cmd_config(args: &[String]) -> anyhow::Result<()> {
    let (file, rest) = split_config_flag(args)?;
    if let Some(arg) = rest.first() {
        bail!("unexpected argument: {arg}");
    }
    let cfg = load_config(file.as_deref())?;
    print!("{}", serde_yaml::to_string(&cfg)?);
    Ok(())
}
