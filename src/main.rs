//! `layered` command-line entrypoint.
//!
//! Builds the full cache from `LAYERED_*` environment variables and runs one
//! operation against it.

use mimalloc::MiMalloc;

use layered::cache::{LayeredCache, LookupMode};
use layered::config::CacheConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: layered <get KEY | contains KEY | set KEY VALUE> [--basic]";

#[derive(Debug)]
enum Command {
    Get(String),
    Contains(String),
    Set(String, String),
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let positional: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| !a.starts_with("--"))
        .collect();

    match positional.as_slice() {
        ["get", key] => Ok(Command::Get(key.to_string())),
        ["contains", key] => Ok(Command::Contains(key.to_string())),
        ["set", key, value] => Ok(Command::Set(key.to_string(), value.to_string())),
        _ => anyhow::bail!(USAGE),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command = parse_args(&args)?;
    let basic = args.iter().any(|arg| arg == "--basic");

    let config = if basic {
        CacheConfig::from_env()?.ttl_enabled(false)
    } else {
        CacheConfig::from_env()?
    };

    tracing::info!(
        node = %config.node_name,
        basic,
        redis_url = %config.redis_url,
        "Connecting layered cache"
    );

    let cache = if basic {
        LayeredCache::connect_basic(&config).await?
    } else {
        LayeredCache::connect_full(&config).await?
    };

    let outcome = run(&cache, command).await;
    cache.close().await?;
    outcome
}

async fn run(cache: &LayeredCache, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Get(key) => {
            let result = cache.lookup(&key, LookupMode::Value).await?;
            match result.value() {
                Some(value) => println!("{}\t{value}", result.status()),
                None => println!("{}", result.status()),
            }
        }
        Command::Contains(key) => {
            let result = cache.lookup(&key, LookupMode::Existence).await?;
            println!("{}\t{}", result.status(), result.is_hit());
        }
        Command::Set(key, value) => {
            cache.set(&key, &value).await?;
            println!("STORED");
        }
    }

    let stats = cache.stats();
    tracing::debug!(
        hits = stats.total_hits(),
        misses = stats.misses,
        promotions = stats.promotions,
        promotion_failures = stats.promotion_failures,
        "Cache stats"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(
            parse_args(&args(&["get", "Italy"])).unwrap(),
            Command::Get(k) if k == "Italy"
        ));
        assert!(matches!(
            parse_args(&args(&["contains", "Italy", "--basic"])).unwrap(),
            Command::Contains(k) if k == "Italy"
        ));
        assert!(matches!(
            parse_args(&args(&["set", "Italy", "u123"])).unwrap(),
            Command::Set(k, v) if k == "Italy" && v == "u123"
        ));
    }

    #[test]
    fn test_parse_rejects_bad_usage() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["get"])).is_err());
        assert!(parse_args(&args(&["delete", "Italy"])).is_err());
        assert!(parse_args(&args(&["set", "Italy"])).is_err());
    }
}
