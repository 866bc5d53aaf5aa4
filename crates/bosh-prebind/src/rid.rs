//! BOSH request ID bookkeeping.

use rand::Rng;

/// Upper bound (exclusive) for the randomly seeded initial request ID.
const INITIAL_RID_BOUND: u64 = 100_000;

/// Produces the strictly increasing request ID stream required by BOSH.
///
/// The connection manager gap-checks RIDs against its window, so `next` must
/// be called exactly once per outgoing request, in send order. Speculative
/// calls would desynchronize the stream.
#[derive(Debug)]
pub struct RequestIdSequencer {
    next: Option<u64>,
    current: Option<u64>,
}

impl RequestIdSequencer {
    /// Create a sequencer that seeds itself on first use.
    pub fn new() -> Self {
        Self {
            next: None,
            current: None,
        }
    }

    /// Create a sequencer starting from a known value. Used by tests that
    /// need a deterministic RID stream.
    pub fn starting_at(rid: u64) -> Self {
        Self {
            next: Some(rid),
            current: None,
        }
    }

    /// The ID for the next outgoing request.
    ///
    /// First call draws uniformly from `[0, 100000)`; every later call
    /// returns the previous value plus one.
    pub fn next(&mut self) -> u64 {
        let rid = match (self.next.take(), self.current) {
            (Some(seeded), _) => seeded,
            (None, Some(previous)) => previous + 1,
            (None, None) => rand::rng().random_range(0..INITIAL_RID_BOUND),
        };
        self.current = Some(rid);
        rid
    }

    /// The most recently issued ID, if any request has gone out yet.
    pub fn current(&self) -> Option<u64> {
        self.current
    }
}

impl Default for RequestIdSequencer {
    fn default() -> Self {
        Self::new()
    }
}
