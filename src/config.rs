//! Process configuration loaded from the environment.
//!
//! Replaces the teacher's CSV-driven `TradingConfig`/asset-precision loader
//! with a flat env-var reader, following the
//! `std::env::var(..).ok().and_then(..).unwrap_or(..)` idiom already used for
//! `PG_POOL_SIZE` in `src/db/mod.rs`. Malformed input (an unparsable number,
//! a non-power-of-two ring size, a map entry missing its `=`) is a startup
//! failure, not a silent default — that default would hide a deploy mistake.

use crate::core_types::{ShardId, Symbol};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env_var(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("{key}: cannot parse {raw:?}")),
    }
}

fn parse_shard_map(raw: &str) -> Result<FxHashMap<ShardId, String>, String> {
    let mut map = FxHashMap::default();
    for entry in raw.split(',').filter(|s| !s.is_empty()) {
        let (shard_id, base_url) = entry
            .split_once('=')
            .ok_or_else(|| format!("ME_SHARD_MAP entry {entry:?} missing '='"))?;
        map.insert(shard_id.to_string(), base_url.to_string());
    }
    Ok(map)
}

fn parse_shard_symbols_map(raw: &str) -> Result<FxHashMap<Symbol, ShardId>, String> {
    let mut symbol_to_shard = FxHashMap::default();
    for entry in raw.split(',').filter(|s| !s.is_empty()) {
        let (shard_id, symbols) = entry
            .split_once('=')
            .ok_or_else(|| format!("SHARD_SYMBOLS_MAP entry {entry:?} missing '='"))?;
        for symbol in symbols.split(':').filter(|s| !s.is_empty()) {
            symbol_to_shard.insert(symbol.to_string(), shard_id.to_string());
        }
    }
    Ok(symbol_to_shard)
}

/// Ambient settings common to both processes: listener ports and logging.
#[derive(Debug, Clone)]
pub struct CommonConfig {
    pub http_port: u16,
    pub metrics_port: u16,
    pub log_dir: String,
    pub log_json: bool,
}

impl CommonConfig {
    fn from_env() -> Result<Self, String> {
        Ok(Self {
            http_port: env_parse("HTTP_PORT", 8080)?,
            metrics_port: env_parse("METRICS_PORT", 9091)?,
            log_dir: env_var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_json: env_parse::<u8>("LOG_JSON", 0)? != 0,
        })
    }
}

/// One shard process's configuration: its identity, the symbols it owns,
/// and the resources (ring, WAL, event bus) it opens at startup.
#[derive(Debug, Clone)]
pub struct ShardConfig {
    pub common: CommonConfig,
    pub shard_id: ShardId,
    pub symbols: Vec<Symbol>,
    pub kafka_bootstrap: String,
    pub wal_path: PathBuf,
    pub wal_size_mb: u64,
    pub ring_buffer_size: u64,
}

impl ShardConfig {
    pub fn from_env() -> Result<Self, String> {
        let common = CommonConfig::from_env()?;
        let shard_id = env_var("SHARD_ID").unwrap_or_else(|| "a".to_string());
        let symbols = env_var("SHARD_SYMBOLS")
            .map(|raw| raw.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();
        let ring_buffer_size: u64 = env_parse("RING_BUFFER_SIZE", 131_072)?;
        if !ring_buffer_size.is_power_of_two() {
            return Err(format!("RING_BUFFER_SIZE must be a power of two, got {ring_buffer_size}"));
        }

        Ok(Self {
            common,
            shard_id,
            symbols,
            kafka_bootstrap: env_var("KAFKA_BOOTSTRAP").unwrap_or_else(|| "localhost:9092".to_string()),
            wal_path: env_var("WAL_PATH").unwrap_or_else(|| "/tmp/wal".to_string()).into(),
            wal_size_mb: env_parse("WAL_SIZE_MB", 64)?,
            ring_buffer_size,
        })
    }
}

/// The gateway's configuration: its two routing maps.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: CommonConfig,
    pub shard_base_urls: FxHashMap<ShardId, String>,
    pub symbol_to_shard: FxHashMap<Symbol, ShardId>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, String> {
        let common = CommonConfig::from_env()?;
        let shard_base_urls = match env_var("ME_SHARD_MAP") {
            Some(raw) => parse_shard_map(&raw)?,
            None => FxHashMap::default(),
        };
        let symbol_to_shard = match env_var("SHARD_SYMBOLS_MAP") {
            Some(raw) => parse_shard_symbols_map(&raw)?,
            None => FxHashMap::default(),
        };

        Ok(Self {
            common,
            shard_base_urls,
            symbol_to_shard,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_map_parses_multiple_entries() {
        let map = parse_shard_map("a=http://shard-a:8080,b=http://shard-b:8080").unwrap();
        assert_eq!(map.get("a").map(String::as_str), Some("http://shard-a:8080"));
        assert_eq!(map.get("b").map(String::as_str), Some("http://shard-b:8080"));
    }

    #[test]
    fn shard_map_rejects_entry_without_equals() {
        assert!(parse_shard_map("a-http://shard-a").is_err());
    }

    #[test]
    fn shard_symbols_map_expands_colon_lists() {
        let map = parse_shard_symbols_map("a=BTCUSD:ETHUSD,b=SOLUSD").unwrap();
        assert_eq!(map.get("BTCUSD").map(String::as_str), Some("a"));
        assert_eq!(map.get("ETHUSD").map(String::as_str), Some("a"));
        assert_eq!(map.get("SOLUSD").map(String::as_str), Some("b"));
    }

    #[test]
    fn ring_buffer_size_must_be_power_of_two() {
        unsafe {
            std::env::set_var("RING_BUFFER_SIZE", "131072");
        }
        assert!(ShardConfig::from_env().is_ok());
        unsafe {
            std::env::set_var("RING_BUFFER_SIZE", "131073");
        }
        assert!(ShardConfig::from_env().is_err());
        unsafe {
            std::env::remove_var("RING_BUFFER_SIZE");
        }
    }
}
