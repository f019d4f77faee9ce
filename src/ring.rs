//! Claim ring: a bounded, pre-allocated MPSC handoff from network threads to
//! the single consumer thread.
//!
//! No off-the-shelf queue in the corpus matches this contract: the teacher's
//! `crossbeam_queue::ArrayQueue`-based queues (`pipeline.rs`, `pipeline_mt.rs`)
//! move owned values and spin-retry the push when full, which blocks the
//! producer — the opposite of the back-pressure rule this spec requires
//! (`try_claim` must fail immediately and surface as a 503, never block).
//! Built from scratch on `std::sync::atomic`, in the spirit of the
//! atomic-guarded mutation style demonstrated by
//! `examples/crypto-zero-apex-engine/apex-core/src/engine/types.rs`, but
//! scoped to exactly what a single consumer thread needs: a reusable slot
//! array addressed by claim sequence, with contiguous-prefix visibility.

use crate::core_types::{OrderId, OrderType, Price, Quantity, Side, Symbol};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Pre-allocated, reusable ring slot. Allocated once at ring construction;
/// fields are cleared by the consumer after each event, never reallocated.
#[derive(Debug, Clone, Default)]
pub struct OrderEvent {
    pub order_id: Option<OrderId>,
    pub symbol: Symbol,
    pub side: Option<Side>,
    pub order_type: OrderType,
    pub price_cents: Price,
    pub quantity: Quantity,
    pub wall_clock_millis: u64,
    pub received_monotonic_nanos: u64,
}

impl OrderEvent {
    pub fn clear(&mut self) {
        self.order_id = None;
        self.symbol.clear();
        self.side = None;
        self.order_type = OrderType::Limit;
        self.price_cents = 0;
        self.quantity = 0;
        self.wall_clock_millis = 0;
        self.received_monotonic_nanos = 0;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RingError {
    #[error("ring buffer full")]
    Full,
}

/// Bounded array of reused [`OrderEvent`] slots, addressed by claim
/// sequence. `capacity` must be a power of two (checked at construction).
pub struct ClaimRing {
    capacity: u64,
    mask: u64,
    slots: Box<[std::cell::UnsafeCell<OrderEvent>]>,
    /// Per-slot "ready for sequence N" marker. `u64::MAX` means not yet
    /// published for the lap currently occupying the slot.
    slot_ready: Box<[AtomicU64]>,
    claimed: AtomicU64,
    consumed: AtomicU64,
    epoch: Instant,
}

// SAFETY: each slot is written by at most one producer between its
// `try_claim` and `publish` (the CAS in `try_claim` hands out each sequence
// exactly once), and is only read by the single consumer thread after
// `slot_ready[idx]` publishes that sequence with Release/Acquire ordering.
// A producer can only claim slot index `seq % capacity` once the consumer
// has advanced `consumed` past `seq - capacity`, which happens-before via
// the Acquire load of `consumed` in `try_claim`.
unsafe impl Sync for ClaimRing {}
unsafe impl Send for ClaimRing {}

impl ClaimRing {
    pub fn new(capacity: u64) -> Self {
        assert!(capacity.is_power_of_two(), "ring capacity must be a power of two");
        let slots = (0..capacity)
            .map(|_| std::cell::UnsafeCell::new(OrderEvent::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let slot_ready = (0..capacity)
            .map(|_| AtomicU64::new(u64::MAX))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            capacity,
            mask: capacity - 1,
            slots,
            slot_ready,
            claimed: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Monotonic nanosecond clock shared by producers and the consumer, used
    /// to stamp `received_monotonic_nanos` / compute end-to-end latency.
    #[inline]
    pub fn monotonic_nanos(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Current occupancy, for the `ringbuffer_utilization` gauge.
    pub fn utilization(&self) -> f64 {
        let in_flight = self
            .claimed
            .load(Ordering::Relaxed)
            .saturating_sub(self.consumed.load(Ordering::Relaxed));
        in_flight as f64 / self.capacity as f64
    }

    /// Atomically reserve the next sequence, or fail immediately if the ring
    /// is full. Never blocks.
    pub fn try_claim(&self) -> Result<u64, RingError> {
        loop {
            let next = self.claimed.load(Ordering::Relaxed);
            let consumed = self.consumed.load(Ordering::Acquire);
            if next.wrapping_sub(consumed) >= self.capacity {
                return Err(RingError::Full);
            }
            if self
                .claimed
                .compare_exchange_weak(next, next + 1, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return Ok(next);
            }
            std::hint::spin_loop();
        }
    }

    /// Returns the reusable slot addressed by `sequence`. Valid only between
    /// `try_claim` and `publish` by the producer that claimed it.
    ///
    /// # Safety
    /// Callers must hold a sequence obtained from `try_claim` and not yet
    /// published; see the module-level safety argument above.
    #[allow(clippy::mut_from_ref)]
    pub fn slot(&self, sequence: u64) -> &mut OrderEvent {
        let idx = (sequence & self.mask) as usize;
        unsafe { &mut *self.slots[idx].get() }
    }

    /// Mark `sequence` visible to the consumer. Must be called exactly once
    /// per claimed sequence.
    pub fn publish(&self, sequence: u64) {
        let idx = (sequence & self.mask) as usize;
        self.slot_ready[idx].store(sequence, Ordering::Release);
    }

    /// Returns the first sequence of the largest contiguous published prefix
    /// not yet consumed, and how many sequences are ready, up to `max`.
    /// `None` if nothing is ready.
    pub fn poll_batch(&self, max: u64) -> Option<(u64, u64)> {
        let start = self.consumed.load(Ordering::Relaxed);
        let mut count = 0u64;
        while count < max {
            let seq = start + count;
            let idx = (seq & self.mask) as usize;
            if self.slot_ready[idx].load(Ordering::Acquire) != seq {
                break;
            }
            count += 1;
        }
        if count == 0 { None } else { Some((start, count)) }
    }

    /// Read-only access to slot `sequence`'s contents during consumption.
    /// Safe because only the single consumer thread calls this, and only
    /// for sequences returned by `poll_batch`.
    #[allow(clippy::mut_from_ref)]
    pub fn consumer_slot(&self, sequence: u64) -> &mut OrderEvent {
        self.slot(sequence)
    }

    /// Advance the consumer cursor past a fully-processed batch, freeing the
    /// slots it occupied for reuse by future producers.
    pub fn advance_consumer(&self, new_consumed: u64) {
        self.consumed.store(new_consumed, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_publish_poll_roundtrip() {
        let ring = ClaimRing::new(4);
        let seq = ring.try_claim().unwrap();
        assert_eq!(seq, 0);
        ring.slot(seq).order_id = Some("o1".into());
        ring.publish(seq);

        let (first, count) = ring.poll_batch(10).unwrap();
        assert_eq!(first, 0);
        assert_eq!(count, 1);
        assert_eq!(ring.consumer_slot(0).order_id.as_deref(), Some("o1"));
        ring.advance_consumer(1);
    }

    #[test]
    fn out_of_order_publish_blocks_visibility() {
        let ring = ClaimRing::new(4);
        let s0 = ring.try_claim().unwrap();
        let s1 = ring.try_claim().unwrap();

        ring.publish(s1); // publish out of order
        assert!(ring.poll_batch(10).is_none(), "must not see seq 1 before seq 0");

        ring.publish(s0);
        let (first, count) = ring.poll_batch(10).unwrap();
        assert_eq!(first, 0);
        assert_eq!(count, 2);
    }

    #[test]
    fn try_claim_fails_when_full() {
        let ring = ClaimRing::new(2);
        ring.try_claim().unwrap();
        ring.try_claim().unwrap();
        assert!(matches!(ring.try_claim(), Err(RingError::Full)));
    }

    #[test]
    fn freeing_a_slot_allows_reuse() {
        let ring = ClaimRing::new(2);
        let s0 = ring.try_claim().unwrap();
        ring.try_claim().unwrap();
        assert!(ring.try_claim().is_err());

        ring.publish(s0);
        ring.poll_batch(1).unwrap();
        ring.advance_consumer(1);

        assert!(ring.try_claim().is_ok());
    }

    #[test]
    fn utilization_reflects_in_flight_claims() {
        let ring = ClaimRing::new(4);
        assert_eq!(ring.utilization(), 0.0);
        ring.try_claim().unwrap();
        ring.try_claim().unwrap();
        assert_eq!(ring.utilization(), 0.5);
    }
}
