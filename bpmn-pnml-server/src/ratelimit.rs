//! Token-bucket admission check gating `/transform` (C11, §4.11).
//!
//! Only active when `K_SERVICE` is set — outside a Cloud Run-style
//! deployment there's no shared quota to protect, so the gate is a no-op.

use governor::{clock::DefaultClock, state::{InMemoryState, NotKeyed}, Quota, RateLimiter as GovernorLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

pub struct RequestGate {
    limiter: Option<Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
}

impl RequestGate {
    /// `per_minute` is ignored (and the gate disabled) when `enabled` is
    /// false, mirroring the `K_SERVICE`-gated check in §4.11.
    pub fn new(enabled: bool, per_minute: u32) -> Self {
        if !enabled {
            return RequestGate { limiter: None };
        }
        let quota = NonZeroU32::new(per_minute)
            .map(Quota::per_minute)
            .unwrap_or_else(|| Quota::per_minute(NonZeroU32::new(1).unwrap()));
        RequestGate { limiter: Some(Arc::new(GovernorLimiter::direct(quota))) }
    }

    /// `true` if the request may proceed.
    pub fn admit(&self) -> bool {
        match &self.limiter {
            None => true,
            Some(limiter) => limiter.check().is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_gate_always_admits() {
        let gate = RequestGate::new(false, 1);
        for _ in 0..50 {
            assert!(gate.admit());
        }
    }

    #[test]
    fn enabled_gate_exhausts_its_quota() {
        let gate = RequestGate::new(true, 1);
        assert!(gate.admit());
        assert!(!gate.admit());
    }
}
