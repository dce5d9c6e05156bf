// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event filter in front of the namespace reconciler.
//!
//! Creations (and the initial listing) always pass. An update passes only when the
//! namespace starts deleting or when the watcher finalizer appears; everything else is
//! dropped before it reaches the work queue. Deletions never pass.

use crate::coordination::{has_finalizer, is_deleting};
use k8s_openapi::api::core::v1::Namespace;
use kube::runtime::watcher::Event;
use kube::ResourceExt;
use std::collections::{HashMap, HashSet};

/// The two bits of a snapshot the filter compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    deleting: bool,
    claimed: bool,
}

impl Fingerprint {
    fn of(namespace: &Namespace) -> Self {
        Self {
            deleting: is_deleting(namespace),
            claimed: has_finalizer(namespace),
        }
    }

    fn admits_transition_to(&self, new: &Fingerprint) -> bool {
        (!self.deleting && new.deleting) || (!self.claimed && new.claimed)
    }
}

#[derive(Debug, Default)]
pub struct TransitionFilter {
    last_seen: HashMap<String, Fingerprint>,
    /// Names seen since the current relist began, `None` outside a relist
    relisted: Option<HashSet<String>>,
}

impl TransitionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one watcher event, returns the namespace when it should be reconciled
    pub fn admit(&mut self, event: Event<Namespace>) -> Option<Namespace> {
        match event {
            Event::Init => {
                self.relisted = Some(HashSet::new());
                None
            }
            Event::InitApply(ns) => {
                if let Some(seen) = self.relisted.as_mut() {
                    seen.insert(ns.name_any());
                }
                self.observe(ns)
            }
            Event::InitDone => {
                if let Some(seen) = self.relisted.take() {
                    self.last_seen.retain(|name, _| seen.contains(name));
                }
                None
            }
            Event::Apply(ns) => self.observe(ns),
            Event::Delete(ns) => {
                self.last_seen.remove(&ns.name_any());
                None
            }
        }
    }

    fn observe(&mut self, ns: Namespace) -> Option<Namespace> {
        let current = Fingerprint::of(&ns);
        let previous = self.last_seen.insert(ns.name_any(), current);

        match previous {
            None => Some(ns),
            Some(previous) if previous.admits_transition_to(&current) => Some(ns),
            Some(_) => None,
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.last_seen.len()
    }
}
