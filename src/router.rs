//! `SymbolRouter` — the gateway's deterministic symbol-to-shard lookup.
//!
//! Repurposes the registry pattern of `src/symbol_manager.rs`'s
//! `SymbolManager` (two `FxHashMap`s built once at startup, queried by
//! symbol) but drops its precision/asset-scale APIs entirely — out of scope
//! here — and replaces `insert`-by-id with construction from the two
//! configured maps the external interface contract specifies. The name
//! "consistent hash router" used in some deployments is a misnomer: this is
//! a plain, deterministic lookup table, not a hash ring, and rebalancing,
//! weighting, and replication are explicitly out of scope.

use crate::core_types::{ShardId, Symbol};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UnknownSymbol,
    Misconfigured,
}

/// Built once from `shardId -> baseUrl` and `shardId -> symbols` maps; the
/// derived `symbol -> shardId` index never changes afterward.
pub struct SymbolRouter {
    shard_base_urls: FxHashMap<ShardId, String>,
    symbol_to_shard: FxHashMap<Symbol, ShardId>,
}

impl SymbolRouter {
    pub fn new(shard_base_urls: FxHashMap<ShardId, String>, symbol_to_shard: FxHashMap<Symbol, ShardId>) -> Self {
        Self {
            shard_base_urls,
            symbol_to_shard,
        }
    }

    /// The shard id owning `symbol`, or `UnknownSymbol` if unmapped.
    pub fn shard_id(&self, symbol: &str) -> Result<&ShardId, RouteError> {
        self.symbol_to_shard.get(symbol).ok_or(RouteError::UnknownSymbol)
    }

    /// The base URL of the shard owning `symbol`. `Misconfigured` means the
    /// symbol maps to a shard id that has no configured URL — a deploy
    /// mistake, distinct from the symbol simply not existing.
    pub fn shard_url(&self, symbol: &str) -> Result<&str, RouteError> {
        let shard_id = self.shard_id(symbol)?;
        self.shard_base_urls
            .get(shard_id)
            .map(String::as_str)
            .ok_or(RouteError::Misconfigured)
    }

    /// The base URL registered for an explicit shard id, used by
    /// shard-addressed endpoints like `POST /seed/{shardId}`.
    pub fn shard_url_by_id(&self, shard_id: &str) -> Option<&str> {
        self.shard_base_urls.get(shard_id).map(String::as_str)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbol_to_shard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> SymbolRouter {
        let mut base_urls = FxHashMap::default();
        base_urls.insert("a".to_string(), "http://shard-a:8080".to_string());
        let mut symbols = FxHashMap::default();
        symbols.insert("BTCUSD".to_string(), "a".to_string());
        symbols.insert("ETHUSD".to_string(), "b".to_string()); // shard b has no URL
        SymbolRouter::new(base_urls, symbols)
    }

    #[test]
    fn known_symbol_resolves_to_its_shard_url() {
        let router = router();
        assert_eq!(router.shard_url("BTCUSD"), Ok("http://shard-a:8080"));
    }

    #[test]
    fn unmapped_symbol_is_unknown() {
        let router = router();
        assert_eq!(router.shard_url("DOGEUSD"), Err(RouteError::UnknownSymbol));
    }

    #[test]
    fn symbol_mapped_to_urlless_shard_is_misconfigured() {
        let router = router();
        assert_eq!(router.shard_url("ETHUSD"), Err(RouteError::Misconfigured));
    }
}
