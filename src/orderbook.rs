//! `OrderBook` — two sorted price maps (bids descending, asks ascending)
//! plus an id -> order index, for one symbol.
//!
//! This module holds only the data structure. Matching logic lives in
//! [`crate::matcher`].

use crate::core_types::{OrderId, Price, Side};
use crate::models::Order;
use crate::price_level::PriceLevel;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Price-time-priority order book for a single symbol.
///
/// # Key design
/// - Asks are keyed by `Price` directly (ascending order, lowest = best ask).
/// - Bids are keyed by `Reverse<Price>` so the lowest key — `Reverse` of the
///   highest price — iterates first, giving descending price order without
///   negating a signed value (prices here are signed cents, so the teacher's
///   `u64::MAX - price` trick does not apply).
///
/// # Complexity
/// | Operation | Time |
/// |-----------|------|
/// | `add` | O(log L) |
/// | `best_bid` / `best_ask` | O(1) amortized |
/// | `remove` by id | O(1) lookup + O(log L + k) removal |
#[derive(Debug, Default)]
pub struct OrderBook {
    asks: BTreeMap<Price, PriceLevel>,
    bids: BTreeMap<Reverse<Price>, PriceLevel>,
    /// OrderId -> (price, side), a lookup accelerator. Not an owner: entries
    /// must be removed whenever the order leaves the book.
    order_index: FxHashMap<OrderId, (Price, Side)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first_key_value().map(|(Reverse(p), _)| *p)
    }

    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(p, _)| *p)
    }

    /// Number of distinct price levels on each side, `(bid_levels, ask_levels)`.
    #[inline]
    pub fn depth(&self) -> (usize, usize) {
        (self.bids.len(), self.asks.len())
    }

    /// Total resting quantity on each side.
    pub fn quantity_depth(&self) -> (u64, u64) {
        let bid_qty = self.bids.values().map(PriceLevel::total_quantity).sum();
        let ask_qty = self.asks.values().map(PriceLevel::total_quantity).sum();
        (bid_qty, ask_qty)
    }

    /// The opposite side's levels, best price first, mutable — used only by
    /// the matcher.
    pub(crate) fn opposite_levels_mut(
        &mut self,
        side: Side,
    ) -> Box<dyn Iterator<Item = (Price, &mut PriceLevel)> + '_> {
        match side.opposite() {
            Side::Sell => Box::new(self.asks.iter_mut().map(|(p, l)| (*p, l))),
            Side::Buy => Box::new(self.bids.iter_mut().map(|(Reverse(p), l)| (*p, l))),
        }
    }

    pub(crate) fn remove_empty_level(&mut self, side: Side, price: Price) {
        match side {
            Side::Buy => {
                self.bids.remove(&Reverse(price));
            }
            Side::Sell => {
                self.asks.remove(&price);
            }
        }
    }

    /// Rest a resting (unfilled or partially filled) order on its own side.
    pub fn add(&mut self, order: Order) {
        self.order_index
            .insert(order.id.clone(), (order.limit_price, order.side));
        match order.side {
            Side::Buy => self
                .bids
                .entry(Reverse(order.limit_price))
                .or_insert_with(|| PriceLevel::new(order.limit_price))
                .push_back(order),
            Side::Sell => self
                .asks
                .entry(order.limit_price)
                .or_insert_with(|| PriceLevel::new(order.limit_price))
                .push_back(order),
        }
    }

    /// Remove a resting order by id, wherever it sits. Used for cleanup when
    /// a maker's index entry survives its level (defensive) and by tests.
    pub fn remove(&mut self, order_id: &str) -> Option<Order> {
        let (price, side) = self.order_index.remove(order_id)?;
        let level = match side {
            Side::Buy => self.bids.get_mut(&Reverse(price))?,
            Side::Sell => self.asks.get_mut(&price)?,
        };
        let order = level.remove(order_id);
        if level.is_empty() {
            self.remove_empty_level(side, price);
        }
        order
    }

    pub(crate) fn index_remove(&mut self, order_id: &str) {
        self.order_index.remove(order_id);
    }

    #[inline]
    pub fn contains(&self, order_id: &str) -> bool {
        self.order_index.contains_key(order_id)
    }

    pub fn quantity_at(&self, price: Price, side: Side) -> u64 {
        match side {
            Side::Buy => self
                .bids
                .get(&Reverse(price))
                .map(PriceLevel::total_quantity)
                .unwrap_or(0),
            Side::Sell => self
                .asks
                .get(&price)
                .map(PriceLevel::total_quantity)
                .unwrap_or(0),
        }
    }

    /// `true` iff the book is not crossed/locked: best bid strictly below
    /// best ask, or one/both sides empty.
    pub fn is_sane(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid < ask,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::OrderType;

    fn order(id: &str, price: Price, qty: u64, side: Side) -> Order {
        Order::new(id.to_string(), "X".into(), side, OrderType::Limit, price, qty, 0)
    }

    #[test]
    fn rest_order_sets_best_prices() {
        let mut book = OrderBook::new();
        book.add(order("1", 100, 10, Side::Buy));
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn best_bid_ask_with_signed_prices() {
        let mut book = OrderBook::new();
        book.add(order("1", 100, 10, Side::Buy));
        book.add(order("2", 99, 10, Side::Buy));
        book.add(order("3", 101, 10, Side::Sell));
        book.add(order("4", 102, 10, Side::Sell));

        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.best_ask(), Some(101));
        assert!(book.is_sane());
    }

    #[test]
    fn negative_prices_order_correctly() {
        let mut book = OrderBook::new();
        book.add(order("1", -5, 10, Side::Buy));
        book.add(order("2", -1, 10, Side::Buy));
        // -1 is the higher (better) bid price even though it's "more negative-adjacent".
        assert_eq!(book.best_bid(), Some(-1));
    }

    #[test]
    fn remove_by_id_cleans_up_empty_level() {
        let mut book = OrderBook::new();
        book.add(order("1", 100, 10, Side::Buy));
        let removed = book.remove("1");
        assert!(removed.is_some());
        assert_eq!(book.best_bid(), None);
        assert_eq!(book.depth(), (0, 0));
    }

    #[test]
    fn depth_counts_distinct_levels() {
        let mut book = OrderBook::new();
        book.add(order("1", 100, 10, Side::Buy));
        book.add(order("2", 99, 10, Side::Buy));
        book.add(order("3", 101, 10, Side::Sell));
        assert_eq!(book.depth(), (2, 1));
    }
}
