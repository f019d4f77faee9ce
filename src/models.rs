//! `Order`, `MatchResult` and `MatchResultSet` — the mutable fill state of a
//! live order and the record of what happened when it crossed the book.

use crate::core_types::{MatchId, OrderId, OrderStatus, OrderType, Price, Quantity, Side, Symbol};
use serde::Serialize;

/// A live order. Identity fields are set at construction and never change;
/// `remaining_quantity`, `filled_quantity` and `status` are mutated in place
/// by the matcher while the order is being filled, and otherwise belong to
/// whichever `PriceLevel` it rests in.
///
/// Invariants held at all times:
/// - `0 <= remaining_quantity <= original_quantity`
/// - `filled_quantity + remaining_quantity == original_quantity`
/// - `status == Filled` iff `remaining_quantity == 0`
/// - `status == PartiallyFilled` implies `0 < filled_quantity < original_quantity`
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub limit_price: Price,
    pub original_quantity: Quantity,
    pub timestamp_ms: u64,

    pub remaining_quantity: Quantity,
    pub filled_quantity: Quantity,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(
        id: OrderId,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        limit_price: Price,
        quantity: Quantity,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            id,
            symbol,
            side,
            order_type,
            limit_price,
            original_quantity: quantity,
            timestamp_ms,
            remaining_quantity: quantity,
            filled_quantity: 0,
            status: OrderStatus::New,
        }
    }

    /// Apply a fill of `qty` lots, advancing `status` monotonically.
    ///
    /// `qty` must not exceed `remaining_quantity`; callers (the matcher) are
    /// responsible for clamping to `min(taker.remaining, maker.remaining)`
    /// before calling this.
    pub fn fill(&mut self, qty: Quantity) {
        debug_assert!(qty <= self.remaining_quantity);
        self.remaining_quantity -= qty;
        self.filled_quantity += qty;
        self.status = if self.remaining_quantity == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }
}

/// One execution between a taker and a resting maker. `execution_price`
/// always equals the maker's resting limit price: the taker gets
/// price-improvement, never the maker.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub symbol: Symbol,
    pub execution_price: Price,
    pub execution_quantity: Quantity,
    pub timestamp_ms: u64,
    pub taker_side: Side,
}

/// Everything that happened while matching one incoming order, in the order
/// makers were consumed (best price to worst, FIFO within a price).
#[derive(Debug, Clone, Default)]
pub struct MatchResultSet {
    pub fills: Vec<MatchResult>,
    pub total_filled_quantity: Quantity,
    pub incoming_fully_filled: bool,
}

impl MatchResultSet {
    pub fn push(&mut self, fill: MatchResult) {
        self.total_filled_quantity += fill.execution_quantity;
        self.fills.push(fill);
    }

    #[inline]
    pub fn match_count(&self) -> usize {
        self.fills.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::OrderType;

    fn order(qty: Quantity) -> Order {
        Order::new(
            "o1".to_string(),
            "X".to_string(),
            Side::Buy,
            OrderType::Limit,
            100,
            qty,
            0,
        )
    }

    #[test]
    fn fill_transitions_to_partially_filled() {
        let mut o = order(10);
        o.fill(4);
        assert_eq!(o.status, OrderStatus::PartiallyFilled);
        assert_eq!(o.remaining_quantity, 6);
        assert_eq!(o.filled_quantity, 4);
    }

    #[test]
    fn full_fill_transitions_to_filled() {
        let mut o = order(10);
        o.fill(10);
        assert!(o.is_filled());
        assert_eq!(o.status, OrderStatus::Filled);
    }

    #[test]
    fn result_set_accumulates_total() {
        let mut set = MatchResultSet::default();
        set.push(MatchResult {
            match_id: uuid::Uuid::nil(),
            taker_order_id: "t".into(),
            maker_order_id: "m1".into(),
            symbol: "X".into(),
            execution_price: 100,
            execution_quantity: 4,
            timestamp_ms: 0,
            taker_side: Side::Buy,
        });
        set.push(MatchResult {
            match_id: uuid::Uuid::nil(),
            taker_order_id: "t".into(),
            maker_order_id: "m2".into(),
            symbol: "X".into(),
            execution_price: 100,
            execution_quantity: 6,
            timestamp_ms: 0,
            taker_side: Side::Buy,
        });
        assert_eq!(set.total_filled_quantity, 10);
        assert_eq!(set.match_count(), 2);
    }
}
