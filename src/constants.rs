// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Finalizer token that marks a namespace as claimed by the watcher
pub const FINALIZER: &str = "namespace-watcher.geeko.me/finalizer";

/// The marker workload created once in every eligible namespace
pub mod marker {
    /// Well-known pod name, unique per namespace
    pub const POD_NAME: &str = "echo-pod";
    pub const CONTAINER_NAME: &str = "echo";
    pub const IMAGE: &str = "busybox:stable";
    pub const RESTART_POLICY: &str = "Never";
}

/// Health gate routes
pub mod probes {
    pub const LIVENESS_PATH: &str = "/healthz";
    pub const READINESS_PATH: &str = "/readyz";
}

/// Requeue delays used by the reconciler error policy
pub mod requeue {
    /// Conflicting writes are retried soon, after re-reading the namespace
    pub const CONFLICT_SECS: u64 = 1;
    /// Any other failure
    pub const ERROR_SECS: u64 = 15;
}

/// Jitter added on top of every watch restart delay
pub const RESTART_JITTER_MAX_MILLIS: u64 = 50;

/// A watch that stayed open at least this long and then closed cleanly is resumed
/// without waiting
pub const HEALTHY_SUBSCRIPTION_SECS: u64 = 10;
