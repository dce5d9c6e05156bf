// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finalizer based claim/release protocol and the per-snapshot decision.

use crate::constants::FINALIZER;
use crate::eligibility::{created_after, Epoch, Exclusions};
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;

/// Where a namespace snapshot sits in the claim/release lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizerState {
    Unclaimed,
    Claimed,
    Releasing,
    Released,
}

impl FinalizerState {
    pub fn of(namespace: &Namespace) -> Self {
        match (is_deleting(namespace), has_finalizer(namespace)) {
            (false, false) => FinalizerState::Unclaimed,
            (false, true) => FinalizerState::Claimed,
            (true, true) => FinalizerState::Releasing,
            (true, false) => FinalizerState::Released,
        }
    }
}

/// Why a snapshot needs no action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Excluded,
    PreExisting,
    /// Deletion requested and our finalizer is already gone
    AlreadyReleased,
}

/// What the reconciler should do with the snapshot it just read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    /// Add the finalizer; provisioning happens on the next pass
    Claim,
    /// Remove the finalizer so deletion can complete
    Release,
    /// Ensure the marker workload exists
    Provision,
}

/// Policy the reconciler evaluates every snapshot against
#[derive(Debug, Clone)]
pub struct CoordinationPolicy {
    pub epoch: Epoch,
    pub exclusions: Exclusions,
}

impl CoordinationPolicy {
    pub fn new(epoch: Epoch, exclusions: Exclusions) -> Self {
        Self { epoch, exclusions }
    }

    /// Exclusion first, then deletion, then claim-and-act.
    ///
    /// Release is not gated on the epoch: a namespace claimed by an earlier run of the
    /// watcher must still be let go after a restart moved the epoch forward.
    pub fn decide(&self, namespace: &Namespace) -> Decision {
        if self.exclusions.contains(&namespace.name_any()) {
            return Decision::Skip(SkipReason::Excluded);
        }

        match FinalizerState::of(namespace) {
            FinalizerState::Releasing => Decision::Release,
            FinalizerState::Released => Decision::Skip(SkipReason::AlreadyReleased),
            _ if !created_after(namespace, self.epoch) => Decision::Skip(SkipReason::PreExisting),
            FinalizerState::Unclaimed => Decision::Claim,
            FinalizerState::Claimed => Decision::Provision,
        }
    }
}

pub fn has_finalizer(namespace: &Namespace) -> bool {
    namespace.finalizers().iter().any(|f| f == FINALIZER)
}

pub fn is_deleting(namespace: &Namespace) -> bool {
    namespace.metadata.deletion_timestamp.is_some()
}

/// Copy of the snapshot with the finalizer present, keeping its resourceVersion
pub fn with_finalizer(namespace: &Namespace) -> Namespace {
    let mut claimed = namespace.clone();
    if !has_finalizer(&claimed) {
        claimed.finalizers_mut().push(FINALIZER.to_string());
    }
    claimed
}

/// Copy of the snapshot with the finalizer removed, keeping its resourceVersion
pub fn without_finalizer(namespace: &Namespace) -> Namespace {
    let mut released = namespace.clone();
    released.finalizers_mut().retain(|f| f != FINALIZER);
    released
}
