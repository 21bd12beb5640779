//! Indexer configuration, read from environment variables (and `.env`).

use std::str::FromStr;

use crate::errors::{IndexerError, Result};

/// Upper bound the Soroban RPC accepts for `getEvents` pagination.
const MAX_EVENTS_PER_PAGE: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint (e.g. https://soroban-testnet.stellar.org)
    pub rpc_url: String,
    /// The Rahat protocol contract address (Strkey format)
    pub contract_id: String,
    /// SQLite database URL or path
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Seconds between RPC polls
    pub poll_interval_secs: u64,
    /// Maximum number of events to fetch per RPC request
    pub events_per_page: u32,
    /// Ledger to start from if no cursor is saved
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let contract_id = lookup("CONTRACT_ID")
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                IndexerError::Config("CONTRACT_ID environment variable is required".to_string())
            })?;

        let config = Config {
            rpc_url: lookup("RPC_URL")
                .unwrap_or_else(|| "https://soroban-testnet.stellar.org".to_string()),
            contract_id,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./rahat_events.db".to_string()),
            api_port: parse(&lookup, "API_PORT", 3001)?,
            poll_interval_secs: parse(&lookup, "POLL_INTERVAL_SECS", 5)?,
            events_per_page: parse(&lookup, "EVENTS_PER_PAGE", 100)?,
            start_ledger: parse(&lookup, "START_LEDGER", 0)?,
        };

        if config.poll_interval_secs == 0 {
            return Err(IndexerError::Config(
                "POLL_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }
        if config.events_per_page == 0 || config.events_per_page > MAX_EVENTS_PER_PAGE {
            return Err(IndexerError::Config(format!(
                "EVENTS_PER_PAGE must be between 1 and {MAX_EVENTS_PER_PAGE}"
            )));
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}: {raw:?}"))),
    }
}
