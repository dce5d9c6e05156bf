// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API operations: namespace finalizer updates and the marker workload.

pub mod namespaces;
pub mod workload;

pub use namespaces::{claim_namespace, get_namespace, release_namespace};
pub use workload::{ensure_marker_workload, marker_pod, WorkloadOutcome};
