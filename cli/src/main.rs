//! chainpool CLI — discover public endpoints and send pooled JSON-RPC calls.
//!
//! Usage:
//! ```bash
//! # List usable public endpoints for Arbitrum One
//! chainpool discover --chain 42161
//!
//! # Send a call through the pool, falling back to a local node
//! chainpool call --chain 42161 --method eth_blockNumber
//!
//! # Call with parameters and an explicit fallback endpoint
//! chainpool call --chain 1 --endpoint https://rpc.example.com \
//!     --method eth_getBalance --params '["0x0000000000000000000000000000000000000000","latest"]'
//! ```

use std::env;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use chainpool_core::{EndpointDirectory, ProviderConfig, RetryConfig};
use chainpool_http::{connect, ChainlistDirectory};

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "discover" => cmd_discover(&args[2..]).await,
        "call" => cmd_call(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("chainpool {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("chainpool {}", env!("CARGO_PKG_VERSION"));
    println!("Pooled JSON-RPC client for public blockchain endpoints\n");
    println!("USAGE:");
    println!("    chainpool <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    discover   List usable endpoints for a chain");
    println!("    call       Send a JSON-RPC call through the endpoint pool");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("DISCOVER FLAGS:");
    println!("    --chain <ID>          Chain id                        [default: 1]");
    println!("    --directory <URL>     Directory URL template with {{chain_id}}\n");
    println!("CALL FLAGS:");
    println!("    --method <NAME>       JSON-RPC method                 [required]");
    println!("    --params <JSON>       JSON array of parameters        [default: []]");
    println!("    --chain <ID>          Chain id                        [env: CHAINPOOL_CHAIN_ID]");
    println!("    --endpoint <URL>      Fallback endpoint               [env: CHAINPOOL_HTTP_PROVIDER_URI]");
    println!("    --attempts <N>        Attempts per call               [default: 5]");
    println!("    --timeout <SECS>      Per-request timeout             [default: 30]");
}

async fn cmd_discover(args: &[String]) -> Result<()> {
    let chain_id = parse_chain(args)?;
    let mut directory = ChainlistDirectory::new().context("failed to set up chainlist directory")?;
    if let Some(template) = parse_flag(args, "--directory") {
        directory = directory.with_url_template(template);
    }

    let endpoints = directory
        .fetch(chain_id)
        .await
        .with_context(|| format!("discovery failed for chain {chain_id}"))?;

    println!("Chain {chain_id}: {} usable endpoint(s)", endpoints.len());
    for ep in &endpoints {
        println!("  {ep}");
    }
    Ok(())
}

async fn cmd_call(args: &[String]) -> Result<()> {
    let method = parse_flag(args, "--method").context("--method is required")?;
    let params = parse_params(parse_flag(args, "--params").as_deref())?;

    let mut config = ProviderConfig::from_env();
    if parse_flag(args, "--chain").is_some() {
        config.chain_id = parse_chain(args)?;
    }
    if let Some(endpoint) = parse_flag(args, "--endpoint") {
        config = config.with_endpoint(endpoint);
    }
    if let Some(attempts) = parse_flag(args, "--attempts") {
        let attempts: u32 = attempts.parse().context("--attempts must be a number")?;
        config = config.with_retry(RetryConfig::default().with_max_attempts(attempts));
    }
    if let Some(secs) = parse_flag(args, "--timeout") {
        let secs: u64 = secs.parse().context("--timeout must be whole seconds")?;
        config.request = config.request.with_timeout(Duration::from_secs(secs));
    }

    let provider = connect(config).await?;
    tracing::info!(pool = provider.pool().len(), "{provider}");

    let resp = provider.call(&method, params).await?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn parse_chain(args: &[String]) -> Result<u64> {
    match parse_flag(args, "--chain") {
        Some(id) => id.parse().with_context(|| format!("invalid chain id `{id}`")),
        None => Ok(1),
    }
}

fn parse_params(raw: Option<&str>) -> Result<Vec<Value>> {
    let Some(raw) = raw else {
        return Ok(vec![]);
    };
    match serde_json::from_str::<Value>(raw).context("--params is not valid JSON")? {
        Value::Array(items) => Ok(items),
        _ => bail!("--params must be a JSON array"),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
