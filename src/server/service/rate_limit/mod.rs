//! Rate-limit gate shared by every outbound call to a remote service.
//!
//! Each service gets one gate holding a fixed-window budget. Clients acquire a unit of budget
//! before sending any request; when the budget is exhausted the request is not sent at all
//! and the reconciliation is deferred to a later run. Rate-limit responses from the remote
//! pause the gate for the duration the remote asked for.
//!
//! Two implementations are provided:
//! - [`LocalRateLimitGate`] - lock-free, process-wide budget
//! - [`RedisRateLimitGate`] - budget shared by every worker process through Valkey/Redis

mod lua;
mod redis;

pub use redis::RedisRateLimitGate;

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;

use crate::server::error::Error;

/// Length of a rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

/// Shared handle to a rate-limit gate.
pub type SharedRateLimitGate = Arc<dyn RateLimitGate>;

/// A fixed-window budget gating outbound remote calls.
#[async_trait]
pub trait RateLimitGate: Send + Sync {
    /// Attempts to take one unit of budget from the current window.
    ///
    /// # Returns
    /// - `Ok(true)` - Budget acquired, the call may proceed
    /// - `Ok(false)` - Budget exhausted or the gate is paused, the call must be skipped
    /// - `Err(Error)` - The shared budget store could not be reached
    async fn try_acquire(&self) -> Result<bool, Error>;

    /// Stops handing out budget for the provided duration.
    ///
    /// # Arguments
    /// - `duration` - How long the remote asked us to back off
    async fn pause(&self, duration: Duration) -> Result<(), Error>;
}

/// Process-wide rate-limit gate.
///
/// The window index and remaining budget are packed into a single `AtomicU64` (window index in
/// the high 32 bits, remaining budget in the low 32 bits) and updated with a compare-and-swap
/// loop, so concurrent workers never hand out more than `limit` calls per window.
pub struct LocalRateLimitGate {
    limit: u32,
    window_ms: u64,
    origin: Instant,
    state: AtomicU64,
    paused_until_ms: AtomicU64,
}

impl LocalRateLimitGate {
    /// Creates a gate allowing `limit` calls per `window`.
    ///
    /// # Arguments
    /// - `limit` - Calls allowed per window, a limit of 0 rejects every call
    /// - `window` - Window length, clamped to at least one millisecond
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window_ms: (window.as_millis() as u64).max(1),
            origin: Instant::now(),
            state: AtomicU64::new(pack(0, limit)),
            paused_until_ms: AtomicU64::new(0),
        }
    }

    /// Creates a gate allowing `limit` calls per second.
    pub fn per_second(limit: u32) -> Self {
        Self::new(limit, DEFAULT_WINDOW)
    }

    fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn acquire(&self) -> bool {
        let now_ms = self.elapsed_ms();

        if now_ms < self.paused_until_ms.load(Ordering::Acquire) {
            return false;
        }

        let window = (now_ms / self.window_ms) as u32;

        loop {
            let current = self.state.load(Ordering::Acquire);
            let Some(next) = take(current, window, self.limit) else {
                return false;
            };

            if self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return true;
            }
        }
    }
}

#[async_trait]
impl RateLimitGate for LocalRateLimitGate {
    async fn try_acquire(&self) -> Result<bool, Error> {
        Ok(self.acquire())
    }

    async fn pause(&self, duration: Duration) -> Result<(), Error> {
        let until = self.elapsed_ms() + duration.as_millis() as u64;
        self.paused_until_ms.fetch_max(until, Ordering::AcqRel);

        Ok(())
    }
}

/// Computes the state after taking one unit of budget, `None` when the budget is exhausted.
///
/// Only a later window resets the budget. A caller that observed an earlier window than the
/// stored one draws from the stored window.
fn take(current: u64, window: u32, limit: u32) -> Option<u64> {
    let (current_window, remaining) = unpack(current);

    let (window, remaining) = if window > current_window {
        (window, limit)
    } else {
        (current_window, remaining)
    };

    remaining.checked_sub(1).map(|left| pack(window, left))
}

fn pack(window: u32, remaining: u32) -> u64 {
    ((window as u64) << 32) | remaining as u64
}

fn unpack(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}
