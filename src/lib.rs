//! shardbook - a sharded, in-memory limit order matching engine with an
//! HTTP symbol-routing gateway.
//!
//! # Modules
//!
//! - [`core_types`] - shared value types and small enums
//! - [`models`] - `Order`, `MatchResult`, `MatchResultSet`
//! - [`price_level`] - one FIFO price level
//! - [`orderbook`] - a single symbol's bid/ask book
//! - [`order_book_manager`] - symbol -> `OrderBook` registry
//! - [`matcher`] - price-time-priority matching
//! - [`ring`] - the claim ring handoff from HTTP handlers to the consumer
//! - [`wal`] - memory-mapped write-ahead log
//! - [`publisher`] - fire-and-forget downstream event sink
//! - [`metrics`] - Prometheus registry and scrape rendering
//! - [`config`] - environment-driven process configuration
//! - [`logging`] - tracing subscriber setup
//! - [`error`] - HTTP error taxonomy for both processes
//! - [`router`] - gateway symbol-to-shard lookup
//! - [`handler`] - the shard's consumer thread
//! - [`shard_server`] - the shard's HTTP surface
//! - [`gateway_server`] - the gateway's HTTP surface

pub mod core_types;
pub mod models;
pub mod price_level;
pub mod orderbook;
pub mod order_book_manager;
pub mod matcher;
pub mod ring;
pub mod wal;
pub mod publisher;
pub mod metrics;
pub mod config;
pub mod logging;
pub mod error;
pub mod router;
pub mod handler;
pub mod shard_server;
pub mod gateway_server;

pub use config::{CommonConfig, GatewayConfig, ShardConfig};
pub use core_types::{MatchId, OrderId, OrderStatus, OrderType, Price, Quantity, SeqNum, ShardId, Side, Symbol};
pub use matcher::match_order;
pub use models::{MatchResult, MatchResultSet, Order};
pub use order_book_manager::OrderBookManager;
pub use orderbook::OrderBook;
pub use publisher::EventPublisher;
pub use ring::ClaimRing;
pub use router::SymbolRouter;
pub use wal::WriteAheadLog;
