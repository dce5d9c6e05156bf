// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decides whether a namespace qualifies for the marker workload.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use std::collections::HashSet;

/// Immutable set of namespace names that are ignored entirely
#[derive(Debug, Clone, Default)]
pub struct Exclusions(HashSet<String>);

impl Exclusions {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Instant the event source attached; namespaces created at or before it are pre-existing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(DateTime<Utc>);

impl Epoch {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

/// True when the namespace was created strictly after the epoch.
/// A namespace without a creation timestamp is treated as pre-existing.
pub fn created_after(namespace: &Namespace, epoch: Epoch) -> bool {
    namespace
        .metadata
        .creation_timestamp
        .as_ref()
        .is_some_and(|ts| ts.0 > epoch.instant())
}

/// Eligible means not excluded and created after the epoch
pub fn is_eligible(namespace: &Namespace, epoch: Epoch, exclusions: &Exclusions) -> bool {
    !exclusions.contains(&namespace.name_any()) && created_after(namespace, epoch)
}
