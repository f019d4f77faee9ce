//! `PriceTimePriorityMatcher` — consumes opposite-side liquidity for an
//! incoming order and, if anything remains, rests it on its own side.
//!
//! Grounded on the ascending/descending BTreeMap walk and FIFO-drain-then-
//! cleanup shape of the teacher's `match_buy`/`match_sell`, generalized to a
//! single side-agnostic algorithm operating through [`OrderBook`] instead of
//! duplicating the book's sorted maps inline.

use crate::core_types::{OrderType, Price, Side};
use crate::models::{MatchResult, MatchResultSet, Order};
use crate::orderbook::OrderBook;

/// Does `taker` cross `level_price` given its side and type?
///
/// MARKET orders always cross while liquidity exists; LIMIT orders cross
/// according to the usual BUY-reaches-up / SELL-reaches-down rule.
fn crosses(taker_side: Side, taker_type: OrderType, taker_limit: Price, level_price: Price) -> bool {
    if taker_type == OrderType::Market {
        return true;
    }
    match taker_side {
        Side::Buy => taker_limit >= level_price,
        Side::Sell => taker_limit <= level_price,
    }
}

/// Match `taker` against `book`, mutating the book in place, and return the
/// set of fills produced. The matcher owns insertion of any unfilled
/// residual — callers must never add-then-match, which would double-book a
/// partial fill.
pub fn match_order(taker: &mut Order, book: &mut OrderBook, now_ms: u64) -> MatchResultSet {
    let mut result = MatchResultSet::default();
    let mut drained_levels = Vec::new();
    let mut filled_maker_ids = Vec::new();

    {
        let mut levels = book.opposite_levels_mut(taker.side);
        'outer: while taker.remaining_quantity > 0 {
            let Some((level_price, level)) = levels.next() else {
                break;
            };

            if !crosses(taker.side, taker.order_type, taker.limit_price, level_price) {
                break;
            }

            while taker.remaining_quantity > 0 && !level.is_empty() {
                let (fill_qty, maker_id) = {
                    let maker = level.front_mut().expect("checked non-empty above");
                    (taker.remaining_quantity.min(maker.remaining_quantity), maker.id.clone())
                };

                taker.fill(fill_qty);
                let maybe_filled_maker = level.fill_front(fill_qty);

                result.push(MatchResult {
                    match_id: uuid::Uuid::new_v4(),
                    taker_order_id: taker.id.clone(),
                    maker_order_id: maker_id.clone(),
                    symbol: taker.symbol.clone(),
                    execution_price: level_price,
                    execution_quantity: fill_qty,
                    timestamp_ms: now_ms,
                    taker_side: taker.side,
                });

                if maybe_filled_maker.is_some() {
                    filled_maker_ids.push(maker_id);
                }

                if level.is_empty() {
                    drained_levels.push(level_price);
                }

                if taker.remaining_quantity == 0 {
                    break 'outer;
                }
            }
        }
    }

    for maker_id in filled_maker_ids {
        book.index_remove(&maker_id);
    }
    for price in drained_levels {
        book.remove_empty_level(taker.side.opposite(), price);
    }

    result.incoming_fully_filled = taker.is_filled();

    if taker.remaining_quantity > 0 && taker.order_type == OrderType::Limit {
        book.add(taker.clone());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::OrderType;

    fn limit(id: &str, side: Side, price: Price, qty: u64) -> Order {
        Order::new(id.to_string(), "X".into(), side, OrderType::Limit, price, qty, 0)
    }

    #[test]
    fn no_cross_insert_rests_on_own_side() {
        let mut book = OrderBook::new();
        let mut taker = limit("t1", Side::Buy, 100, 5);
        let result = match_order(&mut taker, &mut book, 0);

        assert_eq!(result.fills.len(), 0);
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.quantity_at(100, Side::Buy), 5);
    }

    #[test]
    fn full_fill_at_makers_price() {
        let mut book = OrderBook::new();
        book.add(limit("m1", Side::Sell, 100, 10));

        let mut taker = limit("t1", Side::Buy, 105, 10);
        let result = match_order(&mut taker, &mut book, 0);

        assert_eq!(result.fills.len(), 1);
        let fill = &result.fills[0];
        assert_eq!(fill.maker_order_id, "m1");
        assert_eq!(fill.execution_price, 100);
        assert_eq!(fill.execution_quantity, 10);
        assert_eq!(fill.taker_side, Side::Buy);
        assert_eq!(book.best_ask(), None);
        assert!(!book.contains("t1"));
    }

    #[test]
    fn partial_fill_remainder_rests() {
        let mut book = OrderBook::new();
        book.add(limit("m1", Side::Sell, 100, 4));

        let mut taker = limit("t1", Side::Buy, 100, 10);
        let result = match_order(&mut taker, &mut book, 0);

        assert_eq!(result.fills.len(), 1);
        assert_eq!(result.fills[0].execution_quantity, 4);
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.quantity_at(100, Side::Buy), 6);
    }

    #[test]
    fn sweeps_multiple_levels_fifo_within_level() {
        let mut book = OrderBook::new();
        book.add(limit("m1", Side::Sell, 100, 3));
        book.add(limit("m2", Side::Sell, 100, 2));
        book.add(limit("m3", Side::Sell, 101, 5));

        let mut taker = limit("t1", Side::Buy, 101, 8);
        let result = match_order(&mut taker, &mut book, 0);

        assert_eq!(result.fills.len(), 3);
        assert_eq!(
            result
                .fills
                .iter()
                .map(|f| (f.maker_order_id.as_str(), f.execution_price, f.execution_quantity))
                .collect::<Vec<_>>(),
            vec![("m1", 100, 3), ("m2", 100, 2), ("m3", 101, 3)]
        );
        assert!(taker.is_filled());
        assert_eq!(book.quantity_at(101, Side::Sell), 2);
    }

    #[test]
    fn non_crossing_limit_leaves_book_untouched_elsewhere() {
        let mut book = OrderBook::new();
        book.add(limit("m1", Side::Sell, 200, 5));

        let mut taker = limit("t1", Side::Buy, 100, 5);
        let result = match_order(&mut taker, &mut book, 0);

        assert_eq!(result.fills.len(), 0);
        assert_eq!(book.best_ask(), Some(200));
        assert_eq!(book.best_bid(), Some(100));
    }

    #[test]
    fn market_order_crosses_regardless_of_price_and_does_not_rest() {
        let mut book = OrderBook::new();
        book.add(limit("m1", Side::Sell, 100, 3));

        let mut taker = Order::new("t1".into(), "X".into(), Side::Buy, OrderType::Market, 0, 10, 0);
        let result = match_order(&mut taker, &mut book, 0);

        assert_eq!(result.total_filled_quantity, 3);
        assert!(!result.incoming_fully_filled);
        assert_eq!(book.best_bid(), None, "unfilled MARKET residual must not rest");
    }
}
