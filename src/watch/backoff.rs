// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded exponential backoff between watch subscriptions

use crate::constants::{HEALTHY_SUBSCRIPTION_SECS, RESTART_JITTER_MAX_MILLIS};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct RestartBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    min_healthy: Duration,
}

impl RestartBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
            min_healthy: Duration::from_secs(HEALTHY_SUBSCRIPTION_SECS),
        }
    }

    pub fn with_min_healthy(mut self, min_healthy: Duration) -> Self {
        self.min_healthy = min_healthy;
        self
    }

    /// Delay after a subscription ended. The API server closes watches routinely; a clean
    /// close after a healthy run is resumed at once and resets the sequence.
    pub fn delay_after(&mut self, clean: bool, healthy_for: Duration) -> Duration {
        if clean && healthy_for >= self.min_healthy {
            self.reset();
            return Duration::ZERO;
        }
        self.observe_run(healthy_for);
        self.next_delay()
    }

    /// Delay before the next resubscription, without jitter; doubles up to the cap
    pub fn next_base_delay(&mut self) -> Duration {
        let delay = self.current.min(self.max);
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn next_delay(&mut self) -> Duration {
        self.next_base_delay() + jitter()
    }

    /// Called after a subscription ended; a long healthy run starts the sequence over
    pub fn observe_run(&mut self, healthy_for: Duration) {
        if healthy_for >= self.max {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

fn jitter() -> Duration {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    Duration::from_millis(u64::from(nanos) % RESTART_JITTER_MAX_MILLIS)
}
