//! `OrderBookManager` — symbol -> `OrderBook` registry.
//!
//! Mutated by exactly one consumer thread per shard in steady state; the
//! type itself holds no lock. It is still wrapped in a `Mutex` by its
//! owner (`handler::spawn_consumer`, `shard_server::ShardState`) because the
//! `/seed` backdoor inserts into these same books from an HTTP handler
//! thread before load starts. That lock is taken at batch granularity by
//! the consumer, never per event, so steady-state contention is nil.

use crate::core_types::Symbol;
use crate::orderbook::OrderBook;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct OrderBookManager {
    books: FxHashMap<Symbol, OrderBook>,
}

impl OrderBookManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a symbol with an empty book. Idempotent.
    pub fn register(&mut self, symbol: &str) {
        self.books.entry(symbol.to_string()).or_default();
    }

    /// Fetch-or-create the book for `symbol`.
    pub fn book_mut(&mut self, symbol: &str) -> &mut OrderBook {
        self.books.entry(symbol.to_string()).or_default()
    }

    pub fn book(&self, symbol: &str) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_or_create_is_idempotent() {
        let mut mgr = OrderBookManager::new();
        mgr.register("X");
        assert!(mgr.book("X").is_some());
        assert!(mgr.book("Y").is_none());

        mgr.book_mut("Y"); // creates on demand
        assert!(mgr.book("Y").is_some());
    }
}
