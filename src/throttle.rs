//! Per-method token-bucket bandwidth throttling.
//!
//! The server caps how fast the client may send any one method; the client
//! mirrors that cap locally so it can reject over-budget calls before they
//! ever hit the wire. A bucket's level never goes negative and never
//! exceeds its capacity.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A single method's admission state: capacity, refill rate, and current
/// level.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleState {
    pub capacity: f64,
    pub refill_per_sec: f64,
    pub level: f64,
}

struct Bucket {
    capacity: f64,
    refill_per_sec: f64,
    level: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(capacity: f64, refill_per_sec: f64) -> Self {
        Self {
            capacity,
            refill_per_sec,
            level: capacity,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.level = (self.level + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    fn try_admit(&mut self, cost: f64, now: Instant) -> bool {
        self.refill(now);
        if self.level >= cost {
            self.level -= cost;
            true
        } else {
            false
        }
    }

    fn state(&self) -> ThrottleState {
        ThrottleState {
            capacity: self.capacity,
            refill_per_sec: self.refill_per_sec,
            level: self.level,
        }
    }
}

/// Thread-safe per-method-name token buckets.
///
/// One [`Mutex`] guards the whole bucket map rather than one lock per
/// bucket: admission checks are cheap (a subtraction and a comparison), and
/// a single lock keeps `set_bandwidth_throttle` atomic with respect to
/// concurrent `try_admit` calls for the same method.
pub struct BandwidthThrottle {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl BandwidthThrottle {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Attempts to admit one call to `method` at `cost` tokens. A method
    /// with no configured bucket is admitted unconditionally. Returns
    /// `false` without mutating the bucket's level when funds are
    /// insufficient.
    pub fn try_admit(&self, method: &str, cost: f64) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().expect("bandwidth throttle mutex poisoned");
        match buckets.get_mut(method) {
            Some(bucket) => bucket.try_admit(cost, now),
            None => true,
        }
    }

    /// Installs or replaces the capacity and refill rate for `method`. The
    /// bucket's current level is clamped into the new capacity rather than
    /// reset, so an in-flight budget isn't lost by a server-pushed throttle
    /// update.
    pub fn set_bandwidth_throttle(&self, method: &str, capacity: f64, refill_per_sec: f64) {
        let mut buckets = self.buckets.lock().expect("bandwidth throttle mutex poisoned");
        let now = Instant::now();
        let bucket = buckets
            .entry(method.to_string())
            .or_insert_with(|| Bucket::new(capacity, refill_per_sec));
        bucket.refill(now);
        bucket.capacity = capacity;
        bucket.refill_per_sec = refill_per_sec;
        bucket.level = bucket.level.min(capacity).max(0.0);
    }

    /// Returns the current state of every method with an explicitly
    /// configured bucket. A method never passed to
    /// [`BandwidthThrottle::set_bandwidth_throttle`] has no entry here.
    pub fn get_throttle_state(&self) -> HashMap<String, ThrottleState> {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().expect("bandwidth throttle mutex poisoned");
        buckets
            .iter_mut()
            .map(|(method, bucket)| {
                bucket.refill(now);
                (method.clone(), bucket.state())
            })
            .collect()
    }
}

impl Default for BandwidthThrottle {
    fn default() -> Self {
        Self::new()
    }
}
