//! Core value types shared by the order book, matcher, ring and WAL.
//!
//! These are fundamental type aliases and small enums used by every module.
//! They provide semantic meaning and enable future type evolution without
//! touching call sites.

use serde::{Deserialize, Serialize};

/// Price in integer cents. Signed so that callers can express the gateway's
/// validation failures (`price <= 0`) without a separate unsigned-underflow
/// check.
///
/// # Constraints:
/// - Two prices are equal iff their cent values are equal.
/// - Resting bids are ordered descending, resting asks ascending.
pub type Price = i64;

/// Quantity in whole lots. No fractional lots in this generation.
pub type Quantity = u64;

/// Order ID assigned by the client. Opaque; uniqueness is the client's
/// obligation, not enforced here.
pub type OrderId = String;

/// Match ID assigned by the matcher. Unique per emitted `MatchResult`.
pub type MatchId = uuid::Uuid;

/// Sequence number assigned by the claim ring. Monotonically increasing,
/// never reused.
pub type SeqNum = u64;

/// Shard identity, e.g. `"a"`. Small, human-chosen strings.
pub type ShardId = String;

/// Trading symbol, e.g. `"BTCUSD"`.
pub type Symbol = String;

/// `BUY` or `SELL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// `LIMIT` or `MARKET`. The design assumes LIMIT; MARKET is recognized
/// syntactically and never rests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Limit
    }
}

/// Monotonic lifecycle of a resting order: `New -> PartiallyFilled -> Filled`,
/// or `New -> Filled` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_side_is_involutive() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::Buy.opposite().opposite(), Side::Buy);
    }
}
